use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

pub const DEFAULT_LIMIT: usize = 5;

/// One ranked result of a place-name lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

pub trait PlaceSearch {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<PlaceCandidate>>;
}

/// Decodes a Nominatim `format=json` search response. Extra fields are ignored.
pub fn decode_nominatim(body: &str) -> Result<Vec<PlaceCandidate>> {
    serde_json::from_str(body)
        .map_err(|err| Error::upstream(format!("unreadable search response: {}", err)))
}

/// Blank queries never reach the service. Failures come back as upstream errors.
pub fn run_search(
    service: &dyn PlaceSearch,
    query: &str,
    limit: usize,
) -> Result<Vec<PlaceCandidate>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    info!(query = query, limit = limit; "Searching for place");
    match service.search(query, limit) {
        Ok(mut candidates) => {
            candidates.truncate(limit);
            Ok(candidates)
        },
        Err(err) => {
            warn!(query = query, err = err.message.as_str(); "Place search failed");
            Err(Error::upstream(err.message))
        },
    }
}
