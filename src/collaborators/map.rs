use crate::data::{Coordinate, TagRecord};

/// Receives clicks, marker drags and search selections from the map widget.
pub trait LocationListener {
    fn on_location_select(&mut self, lat: &str, lon: &str);
}

/// What the map widget is given to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub initial_lat: f64,
    pub initial_lon: f64,
    pub marker: Option<(f64, f64)>,
}

impl MapView {
    /// Centres on the record when its coordinate is valid, otherwise on the
    /// fallback (or 0, 0) without a marker.
    pub fn for_record(record: &TagRecord, fallback: &Coordinate) -> MapView {
        match record.coordinate.degrees() {
            Ok((lat, lon)) => MapView {
                initial_lat: lat,
                initial_lon: lon,
                marker: Some((lat, lon)),
            },
            Err(_) => {
                let (lat, lon) = fallback.degrees().unwrap_or((0.0, 0.0));
                MapView {
                    initial_lat: lat,
                    initial_lon: lon,
                    marker: None,
                }
            },
        }
    }
}
