//! Street network components - nodes and edges

use serde::{Deserialize, Serialize};

use crate::{Meters, model::Coordinate};

/// Coordinate rounded to a fixed number of decimals, used to merge
/// endpoints that are numerically identical up to that precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuantizedKey {
    lat: i64,
    lng: i64,
}

impl QuantizedKey {
    /// 5 decimals is roughly 1.1 m at the equator
    pub const DEFAULT_DECIMALS: u32 = 5;

    #[allow(clippy::cast_possible_truncation)]
    pub fn new(coordinate: Coordinate, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals as i32);
        Self {
            lat: (coordinate.lat * scale).round() as i64,
            lng: (coordinate.lng * scale).round() as i64,
        }
    }
}

/// Street graph node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreetNode {
    /// Node coordinates
    pub coordinate: Coordinate,
    /// Deduplication key
    pub key: QuantizedKey,
    /// Created by mid-segment snapping rather than read from a road
    pub junction: bool,
}

/// Street graph edge (road segment)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreetEdge {
    /// Geodesic length of the segment
    pub weight: Meters,
}
