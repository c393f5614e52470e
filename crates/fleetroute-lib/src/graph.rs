//! Owned routing graph and the cached graph bundle.
//!
//! # Data layout
//!
//! A [`Graph`] is a directed multigraph. Vertices are point names, stored once
//! and addressed by dense [`VertexId`]s. Edges are kept in a flat list and
//! addressed by [`EdgeId`]; every edge is one directed traversal of one
//! [`Path`]. An outgoing-edge index per vertex is rebuilt whenever the edge
//! list changes, so algorithms can scan a vertex's neighbours directly.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::model::{Path, Point, Vehicle};

/// Dense vertex index within one [`Graph`].
pub type VertexId = usize;

/// Dense edge index within one [`Graph`]. Not stable across edits.
pub type EdgeId = usize;

/// One directed traversal option of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub path: Arc<Path>,
    /// `true` if this edge travels from the path's destination to its source.
    pub reverse: bool,
}

impl Edge {
    pub fn new(path: Arc<Path>, reverse: bool) -> Self {
        Self { path, reverse }
    }

    /// Name of the point this edge starts at.
    pub fn source_point(&self) -> &str {
        if self.reverse {
            &self.path.destination_point
        } else {
            &self.path.source_point
        }
    }

    /// Name of the point this edge ends at.
    pub fn target_point(&self) -> &str {
        if self.reverse {
            &self.path.source_point
        } else {
            &self.path.destination_point
        }
    }
}

/// An edge placed in a graph, with its endpoints resolved and its weight.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub edge: Edge,
    pub source: VertexId,
    pub target: VertexId,
    pub weight: f64,
}

/// Directed weighted multigraph over point names.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: Vec<String>,
    index: HashMap<String, VertexId>,
    edges: Vec<GraphEdge>,
    outgoing: Vec<Vec<EdgeId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Add a vertex for `name`, returning the existing id if already present.
    pub fn add_vertex(&mut self, name: &str) -> VertexId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.vertices.len();
        self.vertices.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.outgoing.push(Vec::new());
        id
    }

    /// Add a weighted edge. Both endpoints must already be vertices of the
    /// graph; otherwise nothing is added and `None` is returned.
    pub fn add_edge(&mut self, edge: Edge, weight: f64) -> Option<EdgeId> {
        let source = self.vertex_id(edge.source_point())?;
        let target = self.vertex_id(edge.target_point())?;
        let id = self.edges.len();
        self.edges.push(GraphEdge {
            edge,
            source,
            target,
            weight,
        });
        self.outgoing[source].push(id);
        Some(id)
    }

    /// Drop every edge derived from one of the named paths.
    pub fn remove_edges_of_paths(&mut self, path_names: &BTreeSet<String>) {
        self.edges
            .retain(|graph_edge| !path_names.contains(&graph_edge.edge.path.name));
        self.rebuild_outgoing();
    }

    fn rebuild_outgoing(&mut self) {
        for out in &mut self.outgoing {
            out.clear();
        }
        for (id, graph_edge) in self.edges.iter().enumerate() {
            self.outgoing[graph_edge.source].push(id);
        }
    }

    pub fn vertex_id(&self, name: &str) -> Option<VertexId> {
        self.index.get(name).copied()
    }

    pub fn vertex_name(&self, id: VertexId) -> &str {
        &self.vertices[id]
    }

    pub fn contains_vertex(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &str> + '_ {
        self.vertices.iter().map(String::as_str)
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> &GraphEdge {
        &self.edges[id]
    }

    /// Ids of the edges leaving `vertex`.
    pub fn outgoing(&self, vertex: VertexId) -> &[EdgeId] {
        &self.outgoing[vertex]
    }

    /// Edges derived from the named path (zero, one or two).
    pub fn edges_of_path<'a>(&'a self, path_name: &'a str) -> impl Iterator<Item = &'a GraphEdge> {
        self.edges
            .iter()
            .filter(move |graph_edge| graph_edge.edge.path.name == path_name)
    }

    /// Weight of the edge traversing `path_name` in the given direction.
    pub fn edge_weight(&self, path_name: &str, reverse: bool) -> Option<f64> {
        self.edges_of_path(path_name)
            .find(|graph_edge| graph_edge.edge.reverse == reverse)
            .map(|graph_edge| graph_edge.weight)
    }
}

/// A graph together with the entities it was built from.
///
/// The point and path bases are what incremental updates and derivations
/// start from. Instances are immutable; updates produce new bundles.
#[derive(Debug, Clone)]
pub struct GraphResult {
    pub vehicle: Vehicle,
    pub point_base: BTreeMap<String, Arc<Point>>,
    pub path_base: BTreeMap<String, Arc<Path>>,
    pub graph: Arc<Graph>,
}

impl GraphResult {
    pub fn new(
        vehicle: Vehicle,
        point_base: BTreeMap<String, Arc<Point>>,
        path_base: BTreeMap<String, Arc<Path>>,
        graph: Graph,
    ) -> Self {
        Self {
            vehicle,
            point_base,
            path_base,
            graph: Arc::new(graph),
        }
    }

    /// Check that every vertex comes from the point base, every edge's path is
    /// the one recorded in the path base, and every edge endpoint is a vertex.
    pub fn is_consistent(&self) -> bool {
        let vertices_known = self
            .graph
            .vertices()
            .all(|name| self.point_base.contains_key(name));
        let edges_known = self.graph.edges().iter().all(|graph_edge| {
            let path = &graph_edge.edge.path;
            self.path_base
                .get(&path.name)
                .is_some_and(|base| base.as_ref() == path.as_ref())
                && self.graph.vertex_name(graph_edge.source) == graph_edge.edge.source_point()
                && self.graph.vertex_name(graph_edge.target) == graph_edge.edge.target_point()
        });
        vertices_known && edges_known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bidirectional(name: &str, from: &str, to: &str) -> Arc<Path> {
        Arc::new(Path::new(name, from, to, 1000.0, 500.0).with_reverse_velocity(500.0))
    }

    #[test]
    fn reverse_edge_swaps_endpoints() {
        let edge = Edge::new(bidirectional("A--B", "A", "B"), true);
        assert_eq!(edge.source_point(), "B");
        assert_eq!(edge.target_point(), "A");
    }

    #[test]
    fn add_vertex_is_idempotent() {
        let mut graph = Graph::new();
        let first = graph.add_vertex("A");
        let second = graph.add_vertex("A");
        assert_eq!(first, second);
        assert_eq!(graph.vertex_count(), 1);
    }

    #[test]
    fn edge_with_missing_endpoint_is_rejected() {
        let mut graph = Graph::new();
        graph.add_vertex("A");
        assert!(graph
            .add_edge(Edge::new(bidirectional("A--B", "A", "B"), false), 1.0)
            .is_none());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn removing_path_edges_rebuilds_adjacency() {
        let mut graph = Graph::new();
        let a = graph.add_vertex("A");
        graph.add_vertex("B");
        graph.add_vertex("C");
        let ab = bidirectional("A--B", "A", "B");
        let ac = bidirectional("A--C", "A", "C");
        graph.add_edge(Edge::new(ab.clone(), false), 1.0);
        graph.add_edge(Edge::new(ab, true), 1.0);
        graph.add_edge(Edge::new(ac, false), 2.0);

        graph.remove_edges_of_paths(&BTreeSet::from(["A--B".to_string()]));

        assert_eq!(graph.edge_count(), 1);
        let out: Vec<_> = graph
            .outgoing(a)
            .iter()
            .map(|&id| graph.edge(id).edge.path.name.as_str())
            .collect();
        assert_eq!(out, vec!["A--C"]);
        assert_eq!(graph.edge_weight("A--C", false), Some(2.0));
        assert_eq!(graph.edge_weight("A--B", false), None);
    }
}
