//! Translation of points and paths into a routing [`Graph`].
//!
//! Every point becomes a vertex. Every path contributes up to two edges, one
//! per direction it may be travelled in. Weights come from an
//! [`EdgeEvaluator`]; an edge whose weight makes the direction impassable is
//! left out of the graph:
//!
//! - an infinite (or NaN) weight is dropped quietly,
//! - a negative weight is dropped with a warning unless the target algorithm
//!   handles negative weights.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::algorithm::RouteAlgorithm;
use crate::evaluator::{DistanceEvaluator, EdgeEvaluator};
use crate::graph::{Edge, Graph};
use crate::model::{Path, Point, Vehicle};

/// Maps plant topology to graphs for one evaluator and navigability policy.
#[derive(Clone)]
pub struct ModelGraphMapper {
    evaluator: Arc<dyn EdgeEvaluator>,
    handles_negative_costs: bool,
    exclude_locked_paths: bool,
}

impl ModelGraphMapper {
    /// Mapper for per-vehicle graphs: locked paths are excluded and weights
    /// come from `evaluator`.
    pub fn new(evaluator: Arc<dyn EdgeEvaluator>, algorithm: RouteAlgorithm) -> Self {
        Self {
            evaluator,
            handles_negative_costs: algorithm.handles_negative_costs(),
            exclude_locked_paths: true,
        }
    }

    /// Mapper for the general topology graph: lock state and cost properties
    /// are ignored and every edge is weighted by path length.
    pub fn general() -> Self {
        Self {
            evaluator: Arc::new(DistanceEvaluator),
            handles_negative_costs: false,
            exclude_locked_paths: false,
        }
    }

    pub fn excludes_locked_paths(&self) -> bool {
        self.exclude_locked_paths
    }

    /// Build a graph from scratch.
    pub fn translate_model<'a>(
        &self,
        points: impl IntoIterator<Item = &'a Point>,
        paths: impl IntoIterator<Item = &'a Arc<Path>>,
        vehicle: &Vehicle,
    ) -> Graph {
        let started = Instant::now();
        let mut graph = Graph::new();
        for point in points {
            graph.add_vertex(&point.name);
        }
        for path in paths {
            self.add_path_edges(&mut graph, path, vehicle);
        }

        debug!(
            vehicle = %vehicle.name,
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "translated plant model to graph"
        );
        graph
    }

    /// Copy `graph` with the edges of `changed_paths` re-evaluated. Edges of
    /// all other paths are carried over untouched.
    pub fn update_graph(&self, changed_paths: &[Arc<Path>], vehicle: &Vehicle, graph: &Graph) -> Graph {
        let names: BTreeSet<String> = changed_paths.iter().map(|path| path.name.clone()).collect();
        let mut updated = graph.clone();
        updated.remove_edges_of_paths(&names);
        for path in changed_paths {
            self.add_path_edges(&mut updated, path, vehicle);
        }

        debug!(
            vehicle = %vehicle.name,
            changed = changed_paths.len(),
            edges = updated.edge_count(),
            "updated graph edges for changed paths"
        );
        updated
    }

    fn add_path_edges(&self, graph: &mut Graph, path: &Arc<Path>, vehicle: &Vehicle) {
        if self.forward_candidate(path) {
            self.add_edge(graph, Edge::new(path.clone(), false), vehicle);
        }
        if self.reverse_candidate(path) {
            self.add_edge(graph, Edge::new(path.clone(), true), vehicle);
        }
    }

    fn forward_candidate(&self, path: &Path) -> bool {
        if self.exclude_locked_paths {
            path.is_navigable_forward()
        } else {
            path.max_velocity != 0.0
        }
    }

    fn reverse_candidate(&self, path: &Path) -> bool {
        if self.exclude_locked_paths {
            path.is_navigable_reverse()
        } else {
            path.max_reverse_velocity != 0.0
        }
    }

    fn add_edge(&self, graph: &mut Graph, edge: Edge, vehicle: &Vehicle) {
        let weight = self.evaluator.compute_weight(&edge, vehicle);

        if weight < 0.0 && !self.handles_negative_costs {
            warn!(
                path = %edge.path.name,
                reverse = edge.reverse,
                weight,
                "negative edge weight not supported by the routing algorithm; excluding edge"
            );
            return;
        }
        if !weight.is_finite() {
            debug!(
                path = %edge.path.name,
                reverse = edge.reverse,
                weight,
                "edge weight is not finite; excluding edge"
            );
            return;
        }

        let path_name = edge.path.name.clone();
        if graph.add_edge(edge, weight).is_none() {
            debug!(path = %path_name, "edge endpoint missing from graph; excluding edge");
        }
    }
}
