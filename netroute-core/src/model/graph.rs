//! Undirected, distance-weighted graph over line network vertices

use geo::{BoundingRect, MultiPoint, Rect};
use hashbrown::HashMap;
use petgraph::{
    graph::{NodeIndex, UnGraph},
    visit::EdgeRef,
};

use super::Coordinate;
use super::coordinate::VertexKey;

/// Network graph with coordinates as node weights and kilometers as edge weights
pub type NetworkGraph = UnGraph<Coordinate, f64>;

/// Routing graph keyed by exact coordinate identity.
///
/// Node indices are handed out in insertion order, so every iteration over
/// vertices is deterministic for a given input.
#[derive(Debug, Clone, Default)]
pub struct RoutingGraph {
    pub(crate) graph: NetworkGraph,
    vertices: HashMap<VertexKey, NodeIndex>,
}

impl RoutingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: NetworkGraph::with_capacity(nodes, edges),
            vertices: HashMap::with_capacity(nodes),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Inserts a vertex, or returns the existing one with the same identity.
    pub fn add_vertex(&mut self, coord: Coordinate) -> NodeIndex {
        debug_assert!(coord.is_finite(), "non-finite vertex {coord}");
        *self
            .vertices
            .entry(coord.key())
            .or_insert_with(|| self.graph.add_node(coord))
    }

    /// Adds an undirected edge. Returns `false` for self-loops and for
    /// vertex pairs that are already adjacent.
    pub fn connect(&mut self, a: NodeIndex, b: NodeIndex, distance_km: f64) -> bool {
        if a == b || self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, distance_km);
        true
    }

    /// Adds both endpoints and the great-circle edge between them.
    pub fn add_segment(&mut self, a: Coordinate, b: Coordinate) -> bool {
        let from = self.add_vertex(a);
        let to = self.add_vertex(b);
        self.connect(from, to, a.distance_km(&b))
    }

    pub fn node_of(&self, coord: &Coordinate) -> Option<NodeIndex> {
        self.vertices.get(&coord.key()).copied()
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        self.vertices.contains_key(&coord.key())
    }

    pub fn coordinate(&self, node: NodeIndex) -> Option<Coordinate> {
        self.graph.node_weight(node).copied()
    }

    /// Weight of the edge between two vertices, if they are adjacent.
    pub fn weight(&self, a: NodeIndex, b: NodeIndex) -> Option<f64> {
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
    }

    pub fn is_adjacent(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    /// Neighbours of `node` together with the connecting edge weight.
    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.graph.edges(node).map(move |edge| {
            let other = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            (other, *edge.weight())
        })
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (NodeIndex, Coordinate)> + '_ {
        self.graph
            .node_indices()
            .map(move |node| (node, self.graph[node]))
    }

    /// All edges as `(from, to, distance_km)`, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, f64)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target(), *edge.weight()))
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        let points: MultiPoint = self
            .graph
            .node_weights()
            .map(Coordinate::point)
            .collect();
        points.bounding_rect()
    }

    pub fn inner(&self) -> &NetworkGraph {
        &self.graph
    }
}
