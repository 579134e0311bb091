//! Builds a single OpenStreetMap node (a coordinate plus ordered tags) and
//! keeps its structured form, `key=value` text and OSM-XML views in step.

pub mod codec;
pub mod collaborators;
pub mod config;
pub mod controller;
pub mod data;
pub mod errors;

pub use crate::controller::{FormController, Mode, UpdateOutcome};
pub use crate::data::{Coordinate, TagRecord};
pub use crate::errors::{Error, ErrorKind, Result};
