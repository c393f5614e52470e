//! Point-to-point route queries over one routing graph.

use std::sync::Arc;

use serde::Serialize;

use crate::algorithm::{instantiate, RouteAlgorithm, ShortestPathAlgorithm};
use crate::graph::{Graph, GraphResult};
use crate::model::VehicleOrientation;

/// Cost reported for unreachable destinations.
pub const INFINITE_COSTS: i64 = i64::MAX;

/// One step of a route: travelling one path in one direction.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteStep {
    /// Path travelled; `None` only for placeholder steps that do not move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_point: Option<String>,
    pub destination_point: String,
    pub vehicle_orientation: VehicleOrientation,
    pub route_index: usize,
    pub cost: i64,
}

/// An ordered, non-empty sequence of steps and their total cost.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Route {
    pub steps: Vec<RouteStep>,
    pub costs: i64,
}

impl Route {
    /// Build a route whose total is the sum of its step costs.
    pub fn new(steps: Vec<RouteStep>) -> Self {
        let costs = steps
            .iter()
            .fold(0i64, |total, step| total.saturating_add(step.cost));
        Self { steps, costs }
    }

    /// Route for a vehicle that is already at `point`.
    pub fn stationary(point: impl Into<String>) -> Self {
        Self::new(vec![RouteStep {
            path: None,
            source_point: None,
            destination_point: point.into(),
            vehicle_orientation: VehicleOrientation::Forward,
            route_index: 0,
            cost: 0,
        }])
    }

    pub fn final_destination(&self) -> Option<&str> {
        self.steps.last().map(|step| step.destination_point.as_str())
    }

    pub fn hop_count(&self) -> usize {
        self.steps.iter().filter(|step| step.path.is_some()).count()
    }
}

/// Answers route and cost queries for one routing group's graph.
pub struct PointRouter {
    graph_result: Arc<GraphResult>,
    algorithm: Box<dyn ShortestPathAlgorithm>,
}

impl PointRouter {
    pub fn new(graph_result: Arc<GraphResult>, algorithm: Box<dyn ShortestPathAlgorithm>) -> Self {
        Self {
            graph_result,
            algorithm,
        }
    }

    pub fn graph_result(&self) -> &Arc<GraphResult> {
        &self.graph_result
    }

    pub fn graph(&self) -> &Graph {
        &self.graph_result.graph
    }

    pub fn algorithm(&self) -> RouteAlgorithm {
        self.algorithm.algorithm()
    }

    /// Steps leading from `source` to `destination`.
    ///
    /// Returns an empty list when both are the same point and `None` when the
    /// destination cannot be reached (including points absent from the graph).
    pub fn get_route_steps(&self, source: &str, destination: &str) -> Option<Vec<RouteStep>> {
        if source == destination {
            return Some(Vec::new());
        }

        let graph = self.graph();
        let source_id = graph.vertex_id(source)?;
        let destination_id = graph.vertex_id(destination)?;
        let found = self.algorithm.shortest_path(source_id, destination_id)?;

        // Step costs are differences of truncated running totals, so they
        // add up to the truncated total weight.
        let mut travelled = 0.0;
        let mut charged = 0i64;
        let mut steps = Vec::with_capacity(found.edges.len());
        for (route_index, &edge_id) in found.edges.iter().enumerate() {
            let graph_edge = graph.edge(edge_id);
            let path = &graph_edge.edge.path;
            let from = graph.vertex_name(graph_edge.source);
            let orientation = if path.source_point == from {
                VehicleOrientation::Forward
            } else {
                VehicleOrientation::Backward
            };

            travelled += graph_edge.weight;
            let total = truncated_cost(travelled);
            steps.push(RouteStep {
                path: Some(path.name.clone()),
                source_point: Some(from.to_string()),
                destination_point: graph.vertex_name(graph_edge.target).to_string(),
                vehicle_orientation: orientation,
                route_index,
                cost: total.saturating_sub(charged),
            });
            charged = total;
        }
        Some(steps)
    }

    /// Total weight of the cheapest route truncated to an integer, `0` for
    /// the same point and [`INFINITE_COSTS`] when unreachable.
    pub fn get_costs(&self, source: &str, destination: &str) -> i64 {
        if source == destination {
            return 0;
        }
        let graph = self.graph();
        let (Some(source_id), Some(destination_id)) =
            (graph.vertex_id(source), graph.vertex_id(destination))
        else {
            return INFINITE_COSTS;
        };
        match self.algorithm.shortest_path(source_id, destination_id) {
            Some(found) => {
                let travelled = found
                    .edges
                    .iter()
                    .fold(0.0, |total, &edge_id| total + graph.edge(edge_id).weight);
                truncated_cost(travelled)
            }
            None => INFINITE_COSTS,
        }
    }

    /// The full route, or `None` when unreachable.
    pub fn get_route(&self, source: &str, destination: &str) -> Option<Route> {
        if source == destination {
            return Some(Route::stationary(destination));
        }
        self.get_route_steps(source, destination).map(Route::new)
    }
}

/// Truncate a path weight to an integral cost.
fn truncated_cost(weight: f64) -> i64 {
    weight.trunc() as i64
}

/// Builds [`PointRouter`]s with a fixed algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointRouterFactory {
    algorithm: RouteAlgorithm,
}

impl PointRouterFactory {
    pub fn new(algorithm: RouteAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> RouteAlgorithm {
        self.algorithm
    }

    /// Instantiate (and warm up) the algorithm over `graph_result`'s graph.
    pub fn create_point_router(&self, graph_result: Arc<GraphResult>) -> PointRouter {
        let algorithm = instantiate(self.algorithm, graph_result.graph.clone());
        PointRouter::new(graph_result, algorithm)
    }
}
