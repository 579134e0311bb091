use std::{fs::File, io::BufReader, path::Path};

use serde::Deserialize;

use crate::codec::osm_xml::DEFAULT_GENERATOR;
use crate::collaborators::issue_tracker::{Repository, DEFAULT_REPO_NAME, DEFAULT_REPO_OWNER};
use crate::collaborators::search;
use crate::data::Coordinate;
use crate::errors::{Error, ErrorKind, Result};

/// Settings read from a JSON file. Every field may be left out.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where a new record starts before anything is picked on the map.
    pub fallback_lat: String,
    pub fallback_lon: String,
    pub repo_owner: String,
    pub repo_name: String,
    /// Most place search results kept.
    pub search_limit: usize,
    pub generator: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            fallback_lat: "0".to_string(),
            fallback_lon: "0".to_string(),
            repo_owner: DEFAULT_REPO_OWNER.to_string(),
            repo_name: DEFAULT_REPO_NAME.to_string(),
            search_limit: search::DEFAULT_LIMIT,
            generator: DEFAULT_GENERATOR.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<AppConfig> {
        let file = File::open(path).map_err(|err| {
            Error::new(
                ErrorKind::Config,
                format!("could not open config {}: {}", path.display(), err),
            )
        })?;
        let config: AppConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.fallback_coordinate().degrees().map_err(|err| {
            Error::new(ErrorKind::Config, format!("invalid fallback location: {}", err.message))
        })?;
        if self.search_limit == 0 {
            return Err(Error::new(ErrorKind::Config, "search_limit must be at least 1"));
        }
        Ok(())
    }

    pub fn fallback_coordinate(&self) -> Coordinate {
        Coordinate::new(self.fallback_lat.as_str(), self.fallback_lon.as_str())
    }

    pub fn repository(&self) -> Repository {
        Repository {
            owner: self.repo_owner.clone(),
            name: self.repo_name.clone(),
        }
    }
}
