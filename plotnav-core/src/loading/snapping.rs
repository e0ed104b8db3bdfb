//! Endpoint and mid-segment snapping

use log::trace;
use rstar::{AABB, RTree, primitives::GeomWithData};

use crate::{
    Meters, NodeId,
    geodesy::{EARTH_RADIUS_M, distance_meters, project_onto_segment},
    model::{Coordinate, StreetGraph},
};

type IndexedNode = GeomWithData<[f64; 2], NodeId>;

/// Connects every pair of distinct nodes that lie within `tolerance` of each
/// other. Returns the number of edges added.
///
/// Candidates come from an R-tree over `[lng, lat]`; the envelopes cover the
/// whole tolerance disc, wrapping across the antimeridian and over the poles,
/// so the result equals an all-pairs scan.
pub(super) fn snap_endpoints(graph: &mut StreetGraph, tolerance: Meters) -> usize {
    let coordinates: Vec<Coordinate> = graph.nodes().map(|(_, node)| node.coordinate).collect();
    let tree = RTree::bulk_load(
        coordinates
            .iter()
            .enumerate()
            .map(|(id, c)| IndexedNode::new([c.lng, c.lat], id))
            .collect(),
    );

    let mut added = 0;
    for (i, &origin) in coordinates.iter().enumerate() {
        let mut candidates: Vec<NodeId> = search_envelopes(origin, tolerance)
            .iter()
            .flat_map(|envelope| tree.locate_in_envelope(envelope))
            .map(|indexed| indexed.data)
            .filter(|&j| j > i)
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        for j in candidates {
            let gap = distance_meters(origin, coordinates[j]);
            if gap > 0.0 && gap <= tolerance && graph.connect(i, j) {
                trace!("Snapped endpoints {i} and {j} ({gap:.2} m)");
                added += 1;
            }
        }
    }
    added
}

/// Outcome counters of [`snap_to_segments`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct SegmentSnaps {
    /// Nodes connected to a junction in a segment interior
    pub links: usize,
    /// Junction nodes created
    pub junctions: usize,
    /// Nodes whose projection quantized onto themselves, spliced into the
    /// segment directly
    pub splices: usize,
}

/// Splits recorded segments where a node lies within `tolerance` of their
/// interior, and links the node to the new junction.
///
/// `segments` is updated in place so later nodes project onto the pieces.
/// A NaN tolerance snaps nothing.
pub(super) fn snap_to_segments(
    graph: &mut StreetGraph,
    segments: &mut Vec<(NodeId, NodeId)>,
    tolerance: Meters,
) -> SegmentSnaps {
    let road_nodes = graph.node_count();
    let mut snaps = SegmentSnaps::default();

    for p in 0..road_nodes {
        let Some(point) = graph.coordinate(p) else {
            continue;
        };

        let mut s = 0;
        while s < segments.len() {
            let (a, b) = segments[s];
            s += 1;
            if p == a || p == b {
                continue;
            }
            let (Some(start), Some(end)) = (graph.coordinate(a), graph.coordinate(b)) else {
                continue;
            };

            let projection = project_onto_segment(point, start, end);
            let within = projection.distance <= tolerance;
            if projection.t <= 0.0 || projection.t >= 1.0 || !within {
                continue;
            }

            let nodes_before = graph.node_count();
            let junction = graph.intern_junction(projection.point);
            if junction == a || junction == b {
                // Projection collapsed onto an endpoint after quantization
                if graph.connect(p, junction) {
                    snaps.links += 1;
                }
                continue;
            }

            if !graph.split_edge(a, b, junction) {
                continue;
            }
            if graph.node_count() > nodes_before {
                snaps.junctions += 1;
            }
            segments[s - 1] = (a, junction);
            segments.push((junction, b));

            if junction == p {
                snaps.splices += 1;
                trace!("Node {p} spliced into segment {a}-{b}");
                continue;
            }
            if graph.connect(p, junction) {
                snaps.links += 1;
            }
            trace!(
                "Node {p} joined segment {a}-{b} at junction {junction} ({:.2} m)",
                projection.distance
            );
        }
    }

    snaps
}

/// Axis-aligned boxes in `[lng, lat]` degrees that together contain every
/// point within `radius` meters of `center`. A box crossing ±180° longitude is
/// split in two; near a pole the whole longitude range is searched.
fn search_envelopes(center: Coordinate, radius: Meters) -> Vec<AABB<[f64; 2]>> {
    const SLACK_DEG: f64 = 1e-9;

    let angular = radius / EARTH_RADIUS_M;
    let dlat = angular.to_degrees() + SLACK_DEG;
    let (min_lat, max_lat) = (center.lat - dlat, center.lat + dlat);
    let strip = |west: f64, east: f64| AABB::from_corners([west, min_lat], [east, max_lat]);

    let max_abs_lat = (center.lat.abs() + dlat).min(90.0);
    let cos_max = max_abs_lat.to_radians().cos();
    let half_sin = (angular / 2.0).sin();
    if cos_max <= half_sin {
        return vec![strip(-180.0, 180.0)];
    }

    let dlng = 2.0 * (half_sin / cos_max).asin().to_degrees() + SLACK_DEG;
    if dlng >= 180.0 {
        return vec![strip(-180.0, 180.0)];
    }

    let (west, east) = (center.lng - dlng, center.lng + dlng);
    let mut envelopes = vec![strip(west, east)];
    if west < -180.0 {
        envelopes.push(strip(west + 360.0, 180.0));
    }
    if east > 180.0 {
        envelopes.push(strip(-180.0, east - 360.0));
    }
    envelopes
}
