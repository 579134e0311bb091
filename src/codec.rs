pub mod line_format;
pub mod osm_xml;
pub mod stamp;

use std::path::Path;

use log::{error, info};

use crate::data::TagRecord;
use crate::errors::Result;

pub use self::line_format::{from_line_format, to_line_format, LineFormat};
pub use self::osm_xml::{from_xml, to_xml, OsmXml};

/// A text representation of a single node.
pub trait Format {
    fn format_name(&self) -> &str;

    fn render(&self, record: &TagRecord) -> String;
    fn parse(&self, text: &str) -> Result<TagRecord>;

    fn import(&self, text: &str) -> Result<TagRecord> {
        info!(format = self.format_name(); "Parsing record");
        match self.parse(text) {
            Ok(record) => {
                info!(format = self.format_name(), tags = record.tags().len(); "Parsed record");
                Ok(record)
            },
            Err(err) => {
                error!(format = self.format_name(), err = err.message.as_str(); "Parsing failed with error");
                Err(err)
            },
        }
    }
}

/// Picks a format by file extension. `.xml` and `.osm` are XML, anything else is line format.
/// A trailing `.xz` is ignored.
pub fn for_path(path: &Path, generator: &str) -> Box<dyn Format> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".xz").unwrap_or(&name);
    if name.ends_with(".xml") || name.ends_with(".osm") {
        Box::new(OsmXml::new(generator))
    } else {
        Box::new(LineFormat)
    }
}
