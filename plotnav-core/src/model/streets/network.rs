//! Undirected street graph with geodesic edge weights

use hashbrown::HashMap;
use petgraph::{
    graph::{NodeIndex, UnGraph},
    visit::EdgeRef,
};

use super::components::{QuantizedKey, StreetEdge, StreetNode};
use crate::{Meters, NodeId, geodesy::distance_meters, model::Coordinate};

/// Road network graph.
///
/// Nodes are addressed by dense 0-based ids. Adjacency is symmetric, there is
/// at most one edge per node pair and no self-edges. Once [`crate::build_graph`]
/// returns, the graph is never mutated; rebuilding produces a new value, so a
/// graph can be shared behind an `Arc` across threads without locking.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    pub(crate) graph: UnGraph<StreetNode, StreetEdge>,
    keys: HashMap<QuantizedKey, NodeIndex>,
    decimals: u32,
}

impl Default for StreetGraph {
    fn default() -> Self {
        Self::with_precision(QuantizedKey::DEFAULT_DECIMALS)
    }
}

impl StreetGraph {
    pub(crate) fn with_precision(decimals: u32) -> Self {
        Self {
            graph: UnGraph::default(),
            keys: HashMap::new(),
            decimals,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Copy of the node with the given id
    pub fn node(&self, id: NodeId) -> Option<StreetNode> {
        self.graph.node_weight(NodeIndex::new(id)).copied()
    }

    pub fn coordinate(&self, id: NodeId) -> Option<Coordinate> {
        self.node(id).map(|node| node.coordinate)
    }

    /// Iterates over `(id, node)` pairs in id order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, StreetNode)> + '_ {
        self.graph
            .node_indices()
            .map(|idx| (idx.index(), self.graph[idx]))
    }

    /// Iterates over every undirected edge once as `(a, b, weight)`
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, Meters)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index(), edge.weight().weight))
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.contains(a) && self.contains(b) && self.find_edge(a, b).is_some()
    }

    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<Meters> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        self.find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
            .map(|edge| edge.weight)
    }

    /// Adjacent nodes of `id` with the connecting edge weight
    pub fn neighbors(&self, id: NodeId) -> Vec<(NodeId, Meters)> {
        if !self.contains(id) {
            return Vec::new();
        }
        self.graph
            .edges(NodeIndex::new(id))
            .map(|edge| (edge.target().index(), edge.weight().weight))
            .collect()
    }

    /// Closest node to `coordinate` by haversine distance.
    ///
    /// Linear scan; ties resolve to the lowest id. `None` for an empty graph.
    pub fn nearest_node(&self, coordinate: Coordinate) -> Option<(NodeId, Meters)> {
        self.graph
            .node_indices()
            .map(|idx| {
                (
                    idx.index(),
                    distance_meters(coordinate, self.graph[idx].coordinate),
                )
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn contains(&self, id: NodeId) -> bool {
        id < self.graph.node_count()
    }

    fn find_edge(&self, a: NodeId, b: NodeId) -> Option<petgraph::graph::EdgeIndex> {
        self.graph.find_edge(NodeIndex::new(a), NodeIndex::new(b))
    }

    /// Returns the node for `coordinate`, creating it if no node shares its key
    pub(crate) fn intern(&mut self, coordinate: Coordinate) -> NodeId {
        let key = QuantizedKey::new(coordinate, self.decimals);
        if let Some(&idx) = self.keys.get(&key) {
            return idx.index();
        }
        let idx = self.graph.add_node(StreetNode {
            coordinate,
            key,
            junction: false,
        });
        self.keys.insert(key, idx);
        idx.index()
    }

    /// Like [`Self::intern`], but a freshly created node is flagged as a junction
    pub(crate) fn intern_junction(&mut self, coordinate: Coordinate) -> NodeId {
        let before = self.graph.node_count();
        let id = self.intern(coordinate);
        if id == before {
            self.graph[NodeIndex::new(id)].junction = true;
        }
        id
    }

    /// Connects `a` and `b` with their haversine distance.
    ///
    /// Returns `false` without touching the graph for self-edges and
    /// for pairs that are already connected.
    pub(crate) fn connect(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || self.find_edge(a, b).is_some() {
            return false;
        }
        let (a, b) = (NodeIndex::new(a), NodeIndex::new(b));
        let weight = distance_meters(self.graph[a].coordinate, self.graph[b].coordinate);
        self.graph.add_edge(a, b, StreetEdge { weight });
        true
    }

    /// Replaces edge `a`–`b` with `a`–`junction`–`b`.
    ///
    /// Returns `false` if `a`–`b` does not exist.
    pub(crate) fn split_edge(&mut self, a: NodeId, b: NodeId, junction: NodeId) -> bool {
        let Some(edge) = self.find_edge(a, b) else {
            return false;
        };
        self.graph.remove_edge(edge);
        self.connect(a, junction);
        self.connect(junction, b);
        true
    }
}
