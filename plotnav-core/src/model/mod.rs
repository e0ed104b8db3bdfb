//! Data model for the road network
//!
//! Contains the coordinate value type and the street graph built from
//! road polylines.

pub mod coordinate;
pub mod streets;

pub use coordinate::Coordinate;
pub use streets::{QuantizedKey, StreetEdge, StreetGraph, StreetNode};
