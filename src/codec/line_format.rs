use crate::data::{Coordinate, TagRecord};
use crate::errors::{Error, Result};

use super::Format;

const FORMAT_NAME: &str = "line_format";

pub const LAT_KEY: &str = "lat";
pub const LON_KEY: &str = "lon";

/// `lat=..`, `lon=..`, then one `key=value` per non-empty tag. No trailing newline.
pub fn to_line_format(record: &TagRecord) -> String {
    let mut lines = vec![
        format!("{}={}", LAT_KEY, record.coordinate.lat),
        format!("{}={}", LON_KEY, record.coordinate.lon),
    ];
    lines.extend(
        record
            .to_ordered_entries()
            .map(|(key, value)| format!("{}={}", key, value)),
    );
    lines.join("\n")
}

/// Lines are trimmed and split on their first `=`, so values may contain `=`.
/// Repeated keys overwrite earlier ones.
pub fn from_line_format(text: &str) -> Result<TagRecord> {
    let mut lat: Option<&str> = None;
    let mut lon: Option<&str> = None;
    let mut record = TagRecord::default();

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| Error::malformed_input(idx + 1, line))?;
        match key {
            LAT_KEY => lat = Some(value),
            LON_KEY => lon = Some(value),
            _ => record.set(key, value),
        }
    }

    record.coordinate = Coordinate::new(
        lat.ok_or_else(|| Error::missing_attribute(LAT_KEY))?,
        lon.ok_or_else(|| Error::missing_attribute(LON_KEY))?,
    );
    Ok(record)
}

pub struct LineFormat;

impl Format for LineFormat {
    fn format_name(&self) -> &str {
        FORMAT_NAME
    }

    fn render(&self, record: &TagRecord) -> String {
        to_line_format(record)
    }

    fn parse(&self, text: &str) -> Result<TagRecord> {
        from_line_format(text)
    }
}
