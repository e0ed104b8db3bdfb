use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use log::trace;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use super::state::State;
use crate::{NodeId, model::StreetGraph, routing::Route};

/// Dijkstra's algorithm between two nodes of the street graph.
///
/// Returns [`Route::unreachable`] when either id is out of range or the
/// target lies in a different component.
pub fn shortest_path(graph: &StreetGraph, source: NodeId, target: NodeId) -> Route {
    let node_count = graph.node_count();
    if source >= node_count || target >= node_count {
        return Route::unreachable();
    }

    let start = NodeIndex::new(source);
    let goal = NodeIndex::new(target);

    let mut distances = vec![f64::INFINITY; node_count];
    let mut predecessors: Vec<Option<NodeIndex>> = vec![None; node_count];
    let mut settled = FixedBitSet::with_capacity(node_count);
    let mut heap = BinaryHeap::new();

    // Start node has distance 0
    distances[source] = 0.0;
    heap.push(State {
        cost: 0.0,
        node: start,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if node == goal {
            break;
        }

        // Skip stale heap entries
        if settled.put(node.index()) {
            continue;
        }

        for edge in graph.graph.edges(node) {
            let next = edge.target();
            if settled.contains(next.index()) {
                continue;
            }
            let next_cost = cost + edge.weight().weight;
            if next_cost < distances[next.index()] {
                distances[next.index()] = next_cost;
                predecessors[next.index()] = Some(node);
                heap.push(State {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    let distance = distances[target];
    if !distance.is_finite() {
        trace!("No route from node {source} to node {target}");
        return Route::unreachable();
    }

    // Follow predecessors backward from target to start
    let mut node_path = vec![goal];
    let mut current = goal;
    while current != start {
        match predecessors[current.index()] {
            Some(prev) => {
                node_path.push(prev);
                current = prev;
            }
            None => return Route::unreachable(),
        }
    }
    node_path.reverse();

    let coordinates = node_path
        .iter()
        .map(|&idx| graph.graph[idx].coordinate)
        .collect();
    let node_ids = node_path.iter().map(|idx| idx.index()).collect();

    Route::new(node_ids, coordinates, distance)
}
