use log::{debug, info, warn};
use serde::Serialize;

use super::{
    config::GraphConfig,
    snapping::{snap_endpoints, snap_to_segments},
};
use crate::{
    NodeId,
    geodesy::distance_meters,
    model::{Coordinate, StreetGraph},
};

/// Counters describing one graph build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Road segments inserted as edges
    pub segments: usize,
    /// Segments dropped because both ends coincide
    pub zero_length_skipped: usize,
    /// Segments already present from another road
    pub duplicate_segments: usize,
    /// Segments dropped because an endpoint was not a valid coordinate
    pub invalid_skipped: usize,
    /// Edges added between nearby endpoints
    pub endpoint_snaps: usize,
    /// Nodes linked into the interior of another segment
    pub segment_snaps: usize,
    /// Junction nodes created by mid-segment snapping
    pub junctions: usize,
    /// Nodes spliced directly into a segment they lay on
    pub segment_splices: usize,
}

/// Builds a street graph from road polylines.
///
/// Empty or malformed input produces an empty graph rather than an error.
/// `config` should have passed [`GraphConfig::validate`]; a NaN snap
/// tolerance disables snapping instead of connecting everything.
pub fn build_graph<R>(roads: &[R], config: &GraphConfig) -> StreetGraph
where
    R: AsRef<[Coordinate]>,
{
    build_graph_with_stats(roads, config).0
}

/// Same as [`build_graph`], also reporting what the builder did
pub fn build_graph_with_stats<R>(roads: &[R], config: &GraphConfig) -> (StreetGraph, BuildStats)
where
    R: AsRef<[Coordinate]>,
{
    let mut graph = StreetGraph::with_precision(config.quantization_decimals);
    let mut stats = BuildStats::default();
    let tolerance = config.snap_tolerance_m;

    let mut segments = insert_segments(&mut graph, roads, &mut stats);
    debug!(
        "Inserted {} road segments over {} nodes",
        stats.segments,
        graph.node_count()
    );

    stats.endpoint_snaps = snap_endpoints(&mut graph, tolerance);
    debug!("Endpoint snapping added {} edges", stats.endpoint_snaps);

    let snaps = snap_to_segments(&mut graph, &mut segments, tolerance);
    stats.segment_snaps = snaps.links;
    stats.junctions = snaps.junctions;
    stats.segment_splices = snaps.splices;
    debug!(
        "Mid-segment snapping linked {} nodes through {} new junctions, spliced {}",
        snaps.links, snaps.junctions, snaps.splices
    );

    if stats.invalid_skipped > 0 {
        warn!(
            "Skipped {} road segments with out-of-range coordinates",
            stats.invalid_skipped
        );
    }

    info!(
        "Built road graph from {} roads: {} nodes, {} edges",
        roads.len(),
        graph.node_count(),
        graph.edge_count()
    );

    (graph, stats)
}

/// Interns every consecutive coordinate pair and records the inserted segments
fn insert_segments<R>(
    graph: &mut StreetGraph,
    roads: &[R],
    stats: &mut BuildStats,
) -> Vec<(NodeId, NodeId)>
where
    R: AsRef<[Coordinate]>,
{
    let mut segments = Vec::new();

    for road in roads {
        for pair in road.as_ref().windows(2) {
            let (start, end) = (pair[0], pair[1]);

            if !start.is_valid() || !end.is_valid() {
                stats.invalid_skipped += 1;
                continue;
            }
            if distance_meters(start, end) == 0.0 {
                stats.zero_length_skipped += 1;
                continue;
            }

            let a = graph.intern(start);
            let b = graph.intern(end);
            if a == b {
                stats.zero_length_skipped += 1;
                continue;
            }

            if graph.connect(a, b) {
                segments.push((a, b));
                stats.segments += 1;
            } else {
                stats.duplicate_segments += 1;
            }
        }
    }

    segments
}
