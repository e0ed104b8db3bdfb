use geo::LineString;
use serde::Serialize;

use crate::{Meters, NodeId, model::Coordinate};

/// Path through the street graph.
///
/// An unreachable route has no nodes and an infinite distance; that is the
/// "no route" signal, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    node_ids: Vec<NodeId>,
    coordinates: Vec<Coordinate>,
    distance: Meters,
}

impl Route {
    pub(crate) fn new(
        node_ids: Vec<NodeId>,
        coordinates: Vec<Coordinate>,
        distance: Meters,
    ) -> Self {
        Self {
            node_ids,
            coordinates,
            distance,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            node_ids: Vec::new(),
            coordinates: Vec::new(),
            distance: f64::INFINITY,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Total length in meters, infinite when unreachable
    pub fn distance(&self) -> Meters {
        self.distance
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Route geometry with x = longitude, y = latitude
    pub fn to_line_string(&self) -> LineString<f64> {
        self.coordinates.iter().copied().map(geo::Coord::from).collect()
    }
}
