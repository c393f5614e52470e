//! Shortest-path strategies over a [`Graph`].
//!
//! # Strategy Pattern
//!
//! Each algorithm implements [`ShortestPathAlgorithm`]; [`instantiate`] picks
//! one for a [`RouteAlgorithm`] and runs a warm-up query so algorithms that
//! defer work (Floyd-Warshall) pay for it up front rather than on the first
//! real request.
//!
//! | Algorithm      | Work per graph | Work per query | Negative weights |
//! |----------------|----------------|----------------|------------------|
//! | Dijkstra       | none           | O(E log V)     | no               |
//! | Bellman-Ford   | none           | O(V·E)         | yes              |
//! | Floyd-Warshall | O(V³), once    | O(path length) | no               |

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;
use crate::graph::{EdgeId, Graph, VertexId};

/// Supported routing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteAlgorithm {
    /// Single-source search per query; non-negative weights only.
    #[default]
    Dijkstra,
    /// Single-source search per query; tolerates negative weights.
    BellmanFord,
    /// All-pairs table computed once per graph.
    FloydWarshall,
}

impl RouteAlgorithm {
    pub const ALL: [RouteAlgorithm; 3] = [
        RouteAlgorithm::Dijkstra,
        RouteAlgorithm::BellmanFord,
        RouteAlgorithm::FloydWarshall,
    ];

    /// Whether graphs for this algorithm may keep negative-weight edges.
    pub fn handles_negative_costs(self) -> bool {
        matches!(self, RouteAlgorithm::BellmanFord)
    }

    fn as_str(self) -> &'static str {
        match self {
            RouteAlgorithm::Dijkstra => "DIJKSTRA",
            RouteAlgorithm::BellmanFord => "BELLMAN_FORD",
            RouteAlgorithm::FloydWarshall => "FLOYD_WARSHALL",
        }
    }
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteAlgorithm {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace('-', "_");
        RouteAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == normalized)
            .ok_or_else(|| Error::UnknownSetting {
                kind: "algorithm",
                value: value.to_string(),
            })
    }
}

/// A path found in a graph: edges in traversal order and their summed weight.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPath {
    pub edges: Vec<EdgeId>,
    pub weight: f64,
}

/// Answers shortest-path queries against one graph.
pub trait ShortestPathAlgorithm: Send + Sync {
    /// The algorithm identifier for this strategy.
    fn algorithm(&self) -> RouteAlgorithm;

    /// Cheapest path from `source` to `target`, or `None` if unreachable.
    fn shortest_path(&self, source: VertexId, target: VertexId) -> Option<GraphPath>;
}

/// Create the strategy for `algorithm` over `graph` and warm it up.
pub fn instantiate(algorithm: RouteAlgorithm, graph: Arc<Graph>) -> Box<dyn ShortestPathAlgorithm> {
    let started = Instant::now();
    let strategy: Box<dyn ShortestPathAlgorithm> = match algorithm {
        RouteAlgorithm::Dijkstra => Box::new(DijkstraShortestPath::new(graph.clone())),
        RouteAlgorithm::BellmanFord => Box::new(BellmanFordShortestPath::new(graph.clone())),
        RouteAlgorithm::FloydWarshall => Box::new(FloydWarshallShortestPaths::new(graph.clone())),
    };

    if graph.vertex_count() >= 2 {
        let _ = strategy.shortest_path(0, 1);
    }

    debug!(
        %algorithm,
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "instantiated shortest path algorithm"
    );
    strategy
}

// =============================================================================
// Dijkstra
// =============================================================================

/// Dijkstra's algorithm, run from scratch for every query.
pub struct DijkstraShortestPath {
    graph: Arc<Graph>,
}

impl DijkstraShortestPath {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }
}

impl ShortestPathAlgorithm for DijkstraShortestPath {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dijkstra
    }

    fn shortest_path(&self, source: VertexId, target: VertexId) -> Option<GraphPath> {
        let graph = self.graph.as_ref();
        let n = graph.vertex_count();
        if source >= n || target >= n {
            return None;
        }
        if source == target {
            return Some(GraphPath {
                edges: Vec::new(),
                weight: 0.0,
            });
        }

        let mut distances = vec![f64::INFINITY; n];
        let mut parents: Vec<Option<EdgeId>> = vec![None; n];
        let mut queue = BinaryHeap::new();

        distances[source] = 0.0;
        queue.push(QueueEntry::new(source, 0.0));

        while let Some(entry) = queue.pop() {
            // Skip stale heap entries.
            if entry.cost.0 > distances[entry.node] {
                continue;
            }
            if entry.node == target {
                return reconstruct(graph, &parents, source, target, entry.cost.0);
            }

            for &edge_id in graph.outgoing(entry.node) {
                let edge = graph.edge(edge_id);
                let next_cost = entry.cost.0 + edge.weight;
                if next_cost < distances[edge.target] {
                    distances[edge.target] = next_cost;
                    parents[edge.target] = Some(edge_id);
                    queue.push(QueueEntry::new(edge.target, next_cost));
                }
            }
        }

        None
    }
}

// =============================================================================
// Bellman-Ford
// =============================================================================

/// Bellman-Ford, run from scratch for every query.
pub struct BellmanFordShortestPath {
    graph: Arc<Graph>,
}

impl BellmanFordShortestPath {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }
}

impl ShortestPathAlgorithm for BellmanFordShortestPath {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::BellmanFord
    }

    fn shortest_path(&self, source: VertexId, target: VertexId) -> Option<GraphPath> {
        let graph = self.graph.as_ref();
        let n = graph.vertex_count();
        if source >= n || target >= n {
            return None;
        }

        let mut distances = vec![f64::INFINITY; n];
        let mut parents: Vec<Option<EdgeId>> = vec![None; n];
        distances[source] = 0.0;

        for _ in 1..n {
            if !relax_all(graph, &mut distances, &mut parents) {
                break;
            }
        }

        if relax_all(graph, &mut distances, &mut parents) {
            warn!(
                source = graph.vertex_name(source),
                "negative cycle reachable from source; no shortest path defined"
            );
            return None;
        }

        if source == target {
            return Some(GraphPath {
                edges: Vec::new(),
                weight: 0.0,
            });
        }
        if distances[target].is_infinite() {
            return None;
        }
        reconstruct(graph, &parents, source, target, distances[target])
    }
}

/// One relaxation pass over all edges. Returns `true` if any distance improved.
fn relax_all(graph: &Graph, distances: &mut [f64], parents: &mut [Option<EdgeId>]) -> bool {
    let mut changed = false;
    for (edge_id, edge) in graph.edges().iter().enumerate() {
        let from = distances[edge.source];
        if from.is_infinite() {
            continue;
        }
        let candidate = from + edge.weight;
        if candidate < distances[edge.target] {
            distances[edge.target] = candidate;
            parents[edge.target] = Some(edge_id);
            changed = true;
        }
    }
    changed
}

// =============================================================================
// Floyd-Warshall
// =============================================================================

/// Floyd-Warshall all-pairs table, computed on first use and kept for the
/// lifetime of the strategy.
pub struct FloydWarshallShortestPaths {
    graph: Arc<Graph>,
    table: OnceCell<DistanceTable>,
}

/// Row-major `n × n` distances plus the first edge of each shortest path.
struct DistanceTable {
    n: usize,
    distances: Vec<f64>,
    first_edge: Vec<Option<EdgeId>>,
}

impl FloydWarshallShortestPaths {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            table: OnceCell::new(),
        }
    }

    fn table(&self) -> &DistanceTable {
        self.table.get_or_init(|| compute_table(&self.graph))
    }
}

fn compute_table(graph: &Graph) -> DistanceTable {
    let started = Instant::now();
    let n = graph.vertex_count();
    let mut distances = vec![f64::INFINITY; n * n];
    let mut first_edge: Vec<Option<EdgeId>> = vec![None; n * n];

    for v in 0..n {
        distances[v * n + v] = 0.0;
    }
    for (edge_id, edge) in graph.edges().iter().enumerate() {
        let slot = edge.source * n + edge.target;
        if edge.weight < distances[slot] {
            distances[slot] = edge.weight;
            first_edge[slot] = Some(edge_id);
        }
    }

    for k in 0..n {
        for i in 0..n {
            let via = distances[i * n + k];
            if via.is_infinite() {
                continue;
            }
            for j in 0..n {
                let candidate = via + distances[k * n + j];
                if candidate < distances[i * n + j] {
                    distances[i * n + j] = candidate;
                    first_edge[i * n + j] = first_edge[i * n + k];
                }
            }
        }
    }

    debug!(
        vertices = n,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "computed all-pairs shortest path table"
    );
    DistanceTable {
        n,
        distances,
        first_edge,
    }
}

impl ShortestPathAlgorithm for FloydWarshallShortestPaths {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::FloydWarshall
    }

    fn shortest_path(&self, source: VertexId, target: VertexId) -> Option<GraphPath> {
        let table = self.table();
        let n = table.n;
        if source >= n || target >= n {
            return None;
        }
        if source == target {
            return Some(GraphPath {
                edges: Vec::new(),
                weight: 0.0,
            });
        }

        let weight = table.distances[source * n + target];
        if weight.is_infinite() {
            return None;
        }

        let mut edges = Vec::new();
        let mut current = source;
        while current != target {
            let edge_id = table.first_edge[current * n + target]?;
            edges.push(edge_id);
            current = self.graph.edge(edge_id).target;
            if edges.len() > n {
                return None;
            }
        }

        Some(GraphPath { edges, weight })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn reconstruct(
    graph: &Graph,
    parents: &[Option<EdgeId>],
    source: VertexId,
    target: VertexId,
    weight: f64,
) -> Option<GraphPath> {
    let mut edges = Vec::new();
    let mut current = target;
    while current != source {
        let edge_id = parents[current]?;
        edges.push(edge_id);
        current = graph.edge(edge_id).source;
        if edges.len() > graph.vertex_count() {
            return None;
        }
    }
    edges.reverse();
    Some(GraphPath { edges, weight })
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: VertexId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: VertexId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
