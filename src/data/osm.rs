use indexmap::IndexMap;

use crate::errors::{Error, Result};

/// Tag keys in insertion order. Order decides serialized line order.
pub type Tags = IndexMap<String, String>;

pub const SHOP: &str = "shop";
pub const AMENITY: &str = "amenity";
pub const NAME: &str = "name";
pub const IMAGE: &str = "image";

const UNNAMED: &str = "Unnamed Location";

/// `shop` and `amenity` classify the same node, so only one may be set.
fn exclusive_rival(key: &str) -> Option<&'static str> {
    match key {
        SHOP => Some(AMENITY),
        AMENITY => Some(SHOP),
        _ => None,
    }
}

/// Coordinate as the decimal text it was entered or read with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Coordinate {
    pub lat: String,
    pub lon: String,
}

impl Coordinate {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Coordinate {
            lat: lat.into(),
            lon: lon.into(),
        }
    }

    /// Numeric latitude and longitude, checked against [-90, 90] and [-180, 180].
    pub fn degrees(&self) -> Result<(f64, f64)> {
        let lat = parse_component("lat", &self.lat, 90.0)?;
        let lon = parse_component("lon", &self.lon, 180.0)?;
        Ok((lat, lon))
    }

    pub fn is_blank(&self) -> bool {
        self.lat.trim().is_empty() || self.lon.trim().is_empty()
    }
}

fn parse_component(name: &str, text: &str, limit: f64) -> Result<f64> {
    let value: f64 = text.trim().parse().map_err(|_| {
        Error::validation(format!("{} {:?} is not a decimal number", name, text))
    })?;
    if !value.is_finite() || value < -limit || value > limit {
        return Err(Error::validation(format!(
            "{} {} is outside [-{}, {}]",
            name, value, limit, limit
        )));
    }
    Ok(value)
}

/// A single OSM node being edited: a coordinate plus ordered tags.
#[derive(Debug, Clone, Default)]
pub struct TagRecord {
    pub coordinate: Coordinate,
    tags: Tags,
}

impl TagRecord {
    pub fn new(coordinate: Coordinate) -> Self {
        TagRecord {
            coordinate,
            tags: Tags::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Insert or overwrite a tag. An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if let Some(rival) = exclusive_rival(&key) {
            self.unset(rival);
        }
        self.tags.insert(key, value.into());
    }

    pub fn unset(&mut self, key: &str) -> Option<String> {
        self.tags.shift_remove(key)
    }

    pub fn set_coordinate(&mut self, lat: impl Into<String>, lon: impl Into<String>) {
        self.coordinate = Coordinate::new(lat, lon);
    }

    /// Boolean-flag tags only ever hold `yes` or `no`.
    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.set(key, if value { "yes" } else { "no" });
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some("yes") => Some(true),
            Some("no") => Some(false),
            _ => None,
        }
    }

    /// Tags with a non-empty value, in insertion order.
    pub fn to_ordered_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn name(&self) -> Option<&str> {
        self.get(NAME).filter(|name| !name.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(UNNAMED)
    }
}

impl PartialEq for TagRecord {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate && self.tags.iter().eq(other.tags.iter())
    }
}

impl Eq for TagRecord {}
