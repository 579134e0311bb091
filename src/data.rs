pub mod catalog;
pub mod osm;

pub use self::osm::{Coordinate, TagRecord, Tags};
