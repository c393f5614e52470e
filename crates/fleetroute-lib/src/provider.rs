//! Graph cache: one graph per routing group, plus a general topology graph.
//!
//! Two kinds of topology change are handled differently:
//!
//! - [`GraphProvider::update_graph_results`] patches the edges of a handful of
//!   paths whose lock state or cost changed, keeping every cached graph.
//! - [`GraphProvider::invalidate`] drops everything; the next request maps the
//!   model from scratch. Use it when points, paths or vehicles are added or
//!   removed.
//!
//! Derived graphs (for resource avoidance) are filtered copies of a base graph
//! and are never cached.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::cache::GroupCache;
use crate::graph::{Graph, GraphResult};
use crate::mapper::ModelGraphMapper;
use crate::model::{Path, Point, Vehicle};
use crate::service::{ObjectService, RoutingGroupMapper};

/// Name of the placeholder vehicle the general graph is mapped for.
pub const GENERAL_GRAPH_VEHICLE: &str = "Dummy";

/// Computes and caches graphs for routing groups.
pub struct GraphProvider {
    objects: Arc<dyn ObjectService>,
    group_mapper: Arc<dyn RoutingGroupMapper>,
    default_mapper: ModelGraphMapper,
    general_mapper: ModelGraphMapper,
    graph_results: GroupCache<GraphResult>,
    general: RwLock<GeneralSlot>,
}

#[derive(Default)]
struct GeneralSlot {
    generation: u64,
    result: Option<Arc<GraphResult>>,
}

impl GraphProvider {
    pub fn new(
        objects: Arc<dyn ObjectService>,
        group_mapper: Arc<dyn RoutingGroupMapper>,
        default_mapper: ModelGraphMapper,
    ) -> Self {
        Self {
            objects,
            group_mapper,
            default_mapper,
            general_mapper: ModelGraphMapper::general(),
            graph_results: GroupCache::new(),
            general: RwLock::new(GeneralSlot::default()),
        }
    }

    /// The graph for `vehicle`'s routing group, mapped on first use.
    pub fn get_graph_result(&self, vehicle: &Vehicle) -> Arc<GraphResult> {
        let group = self.group_mapper.routing_group(vehicle);
        self.graph_results.get_or_compute(&group, || {
            debug!(group = %group, vehicle = %vehicle.name, "computing graph for routing group");
            self.compute_graph_result(&self.default_mapper, vehicle)
        })
    }

    /// The evaluator-independent topology graph, mapped on first use.
    pub fn get_general_graph_result(&self) -> Arc<GraphResult> {
        let generation = {
            let slot = self.general.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(result) = slot.result.as_ref() {
                return result.clone();
            }
            slot.generation
        };

        let vehicle = Vehicle::new(GENERAL_GRAPH_VEHICLE, 0.0, 0.0);
        let computed = Arc::new(self.compute_graph_result(&self.general_mapper, &vehicle));

        let mut slot = self.general.write().unwrap_or_else(PoisonError::into_inner);
        if slot.generation != generation {
            return computed;
        }
        match slot.result.as_ref() {
            Some(existing) => existing.clone(),
            None => {
                slot.result = Some(computed.clone());
                computed
            }
        }
    }

    /// A copy of `vehicle`'s group graph without the given points and paths.
    pub fn get_derived_graph_result(
        &self,
        vehicle: &Vehicle,
        points_to_exclude: &BTreeSet<String>,
        paths_to_exclude: &BTreeSet<String>,
    ) -> GraphResult {
        let base = self.get_graph_result(vehicle);
        derive_graph_result(&base, points_to_exclude, paths_to_exclude)
    }

    /// A copy of the general graph without the given points and paths.
    pub fn get_derived_general_graph_result(
        &self,
        points_to_exclude: &BTreeSet<String>,
        paths_to_exclude: &BTreeSet<String>,
    ) -> GraphResult {
        let base = self.get_general_graph_result();
        derive_graph_result(&base, points_to_exclude, paths_to_exclude)
    }

    /// Re-evaluate the edges of `changed_paths` in every cached group graph.
    ///
    /// Paths unknown to a graph's path base are ignored; adding paths is a
    /// structural change and calls for [`invalidate`](Self::invalidate). The
    /// general graph is left alone.
    pub fn update_graph_results(&self, changed_paths: &[Path]) {
        let changed: Vec<Arc<Path>> = changed_paths.iter().cloned().map(Arc::new).collect();

        self.graph_results.update_all(|group, result| {
            let relevant: Vec<Arc<Path>> = changed
                .iter()
                .filter(|path| result.path_base.contains_key(&path.name))
                .cloned()
                .collect();

            let mut path_base = result.path_base.clone();
            for path in &relevant {
                path_base.insert(path.name.clone(), path.clone());
            }
            let graph = self
                .default_mapper
                .update_graph(&relevant, &result.vehicle, &result.graph);

            debug!(group = %group, paths = relevant.len(), "patched cached graph");
            GraphResult::new(result.vehicle.clone(), result.point_base.clone(), path_base, graph)
        });
    }

    /// Drop all cached graphs, including the general graph.
    pub fn invalidate(&self) {
        self.graph_results.clear();
        {
            let mut slot = self.general.write().unwrap_or_else(PoisonError::into_inner);
            slot.generation += 1;
            slot.result = None;
        }
        info!("invalidated cached routing graphs");
    }

    /// Routing groups that currently have a cached graph.
    pub fn cached_groups(&self) -> Vec<String> {
        self.graph_results.keys()
    }

    fn compute_graph_result(&self, mapper: &ModelGraphMapper, vehicle: &Vehicle) -> GraphResult {
        let point_base: BTreeMap<String, Arc<Point>> = self
            .objects
            .fetch_points()
            .into_iter()
            .map(|point| (point.name.clone(), Arc::new(point)))
            .collect();
        let path_base: BTreeMap<String, Arc<Path>> = self
            .objects
            .fetch_paths()
            .into_iter()
            .map(|path| (path.name.clone(), Arc::new(path)))
            .collect();

        let graph = mapper.translate_model(
            point_base.values().map(|point| &**point),
            path_base.values(),
            vehicle,
        );
        GraphResult::new(vehicle.clone(), point_base, path_base, graph)
    }
}

/// Filter `base` down to the points and paths not excluded.
///
/// Only edges whose path survives and whose endpoints both survive are
/// copied, with their original weights.
pub fn derive_graph_result(
    base: &GraphResult,
    points_to_exclude: &BTreeSet<String>,
    paths_to_exclude: &BTreeSet<String>,
) -> GraphResult {
    let point_base: BTreeMap<String, Arc<Point>> = base
        .point_base
        .iter()
        .filter(|(name, _)| !points_to_exclude.contains(*name))
        .map(|(name, point)| (name.clone(), point.clone()))
        .collect();
    let path_base: BTreeMap<String, Arc<Path>> = base
        .path_base
        .iter()
        .filter(|(name, path)| {
            !paths_to_exclude.contains(*name)
                && point_base.contains_key(&path.source_point)
                && point_base.contains_key(&path.destination_point)
        })
        .map(|(name, path)| (name.clone(), path.clone()))
        .collect();

    let mut graph = Graph::new();
    for name in base.graph.vertices() {
        if point_base.contains_key(name) {
            graph.add_vertex(name);
        }
    }
    for graph_edge in base.graph.edges() {
        let edge = &graph_edge.edge;
        if path_base.contains_key(&edge.path.name)
            && graph.contains_vertex(edge.source_point())
            && graph.contains_vertex(edge.target_point())
        {
            graph.add_edge(edge.clone(), graph_edge.weight);
        }
    }

    debug!(
        vehicle = %base.vehicle.name,
        excluded_points = points_to_exclude.len(),
        excluded_paths = paths_to_exclude.len(),
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "derived filtered graph"
    );
    GraphResult::new(base.vehicle.clone(), point_base, path_base, graph)
}
