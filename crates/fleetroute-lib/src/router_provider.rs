//! Router cache: one [`PointRouter`] per routing group.
//!
//! This is the entry point the dispatcher talks to. It resolves a vehicle's
//! routing group and the resources its order wants avoided, and hands out
//! either the group's cached router or, when something must be avoided, a
//! fresh router over a derived graph.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::GroupCache;
use crate::config::RoutingConfig;
use crate::error::Result;
use crate::evaluator::CompositeEvaluator;
use crate::mapper::ModelGraphMapper;
use crate::model::{Path, Vehicle};
use crate::provider::GraphProvider;
use crate::router::{PointRouter, PointRouterFactory, Route};
use crate::service::{
    AvoidanceRequest, ObjectService, OrderPropertyAvoidanceExtractor, PropertyRoutingGroupMapper,
    ResourceAvoidanceExtractor, RoutingGroupMapper,
};

/// Caches point routers per routing group and coordinates invalidation with
/// the underlying [`GraphProvider`].
pub struct PointRouterProvider {
    objects: Arc<dyn ObjectService>,
    graph_provider: Arc<GraphProvider>,
    group_mapper: Arc<dyn RoutingGroupMapper>,
    avoidance: Arc<dyn ResourceAvoidanceExtractor>,
    factory: PointRouterFactory,
    routers: GroupCache<PointRouter>,
}

impl PointRouterProvider {
    pub fn new(
        objects: Arc<dyn ObjectService>,
        graph_provider: Arc<GraphProvider>,
        group_mapper: Arc<dyn RoutingGroupMapper>,
        avoidance: Arc<dyn ResourceAvoidanceExtractor>,
        factory: PointRouterFactory,
    ) -> Self {
        Self {
            objects,
            graph_provider,
            group_mapper,
            avoidance,
            factory,
            routers: GroupCache::new(),
        }
    }

    /// Wire up the default collaborators for `config`: property-based routing
    /// groups, order-property resource avoidance and a composite evaluator.
    pub fn from_config(objects: Arc<dyn ObjectService>, config: &RoutingConfig) -> Result<Self> {
        config.validate()?;

        let group_mapper: Arc<dyn RoutingGroupMapper> = Arc::new(PropertyRoutingGroupMapper);
        let evaluator = CompositeEvaluator::from_kinds(&config.edge_evaluators, group_mapper.clone());
        let mapper = ModelGraphMapper::new(Arc::new(evaluator), config.algorithm);
        let graph_provider = Arc::new(GraphProvider::new(
            objects.clone(),
            group_mapper.clone(),
            mapper,
        ));
        let avoidance = Arc::new(OrderPropertyAvoidanceExtractor::new(objects.clone()));

        Ok(Self::new(
            objects,
            graph_provider,
            group_mapper,
            avoidance,
            PointRouterFactory::new(config.algorithm),
        ))
    }

    pub fn graph_provider(&self) -> &Arc<GraphProvider> {
        &self.graph_provider
    }

    /// Drop all cached routers and graphs.
    pub fn invalidate(&self) {
        // Graphs first: a router built after this point must see fresh graphs.
        self.graph_provider.invalidate();
        self.routers.clear();
        info!("invalidated cached point routers");
    }

    /// React to a topology change.
    ///
    /// An empty `changed_paths` means the topology changed structurally and
    /// everything is rebuilt; otherwise only the given paths' edges are
    /// re-evaluated. Cached routers are always dropped.
    pub fn update_routing_topology(&self, changed_paths: &[Path]) {
        if changed_paths.is_empty() {
            self.graph_provider.invalidate();
        } else {
            self.graph_provider.update_graph_results(changed_paths);
        }
        self.routers.clear();
        debug!(paths = changed_paths.len(), "updated routing topology");
    }

    /// The router to use for `vehicle`.
    ///
    /// With nothing to avoid this is the routing group's shared router.
    /// Otherwise a new router over a derived graph is built on the calling
    /// thread and not cached.
    pub fn get_point_router_for_vehicle(
        &self,
        vehicle: &Vehicle,
        avoid: AvoidanceRequest<'_>,
    ) -> Arc<PointRouter> {
        let resources = self.avoidance.extract(avoid);
        if !resources.is_empty() {
            debug!(
                vehicle = %vehicle.name,
                points = resources.points.len(),
                paths = resources.paths.len(),
                "building uncached router avoiding resources"
            );
            let derived = self.graph_provider.get_derived_graph_result(
                vehicle,
                &resources.points,
                &resources.paths,
            );
            return Arc::new(self.factory.create_point_router(Arc::new(derived)));
        }

        let group = self.group_mapper.routing_group(vehicle);
        self.routers.get_or_compute(&group, || {
            debug!(group = %group, vehicle = %vehicle.name, "building point router");
            let graph_result = self.graph_provider.get_graph_result(vehicle);
            self.factory.create_point_router(graph_result)
        })
    }

    /// Build routers for any routing group of the known vehicles that lacks
    /// one, then return a snapshot of the whole router cache.
    pub fn get_point_routers_by_vehicle_group(&self) -> BTreeMap<String, Arc<PointRouter>> {
        for vehicle in self.objects.fetch_vehicles() {
            let group = self.group_mapper.routing_group(&vehicle);
            if self.routers.get(&group).is_none() {
                self.get_point_router_for_vehicle(&vehicle, AvoidanceRequest::Nothing);
            }
        }
        self.routers.snapshot()
    }

    /// Convenience: the route for `vehicle` between two points, honouring
    /// resources to avoid.
    pub fn route_for_vehicle(
        &self,
        vehicle: &Vehicle,
        avoid: AvoidanceRequest<'_>,
        source: &str,
        destination: &str,
    ) -> Option<Route> {
        self.get_point_router_for_vehicle(vehicle, avoid)
            .get_route(source, destination)
    }

    /// Routing groups that currently have a cached router.
    pub fn cached_groups(&self) -> Vec<String> {
        self.routers.keys()
    }

    /// Current contents of the router cache.
    pub fn cached_routers(&self) -> BTreeMap<String, Arc<PointRouter>> {
        self.routers.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::RouteAlgorithm;
    use crate::evaluator::EvaluatorKind;
    use crate::model::{PlantModel, Point};
    use crate::service::{ModelObjectService, PROPKEY_ROUTING_GROUP};

    fn provider() -> PointRouterProvider {
        let model = PlantModel {
            points: vec![Point::new("A"), Point::new("B")],
            paths: vec![Path::new("A--B", "A", "B", 1000.0, 1000.0)],
            vehicles: vec![
                Vehicle::new("V1", 1000.0, 1000.0),
                Vehicle::new("V2", 1000.0, 1000.0),
                Vehicle::new("V3", 1000.0, 1000.0).with_property(PROPKEY_ROUTING_GROUP, "north"),
            ],
        };
        let config = RoutingConfig {
            algorithm: RouteAlgorithm::Dijkstra,
            edge_evaluators: vec![EvaluatorKind::Hops],
        };
        PointRouterProvider::from_config(Arc::new(ModelObjectService::new(model)), &config)
            .expect("valid config")
    }

    #[test]
    fn router_is_cached_per_group() {
        let provider = provider();
        let v1 = Vehicle::new("V1", 1000.0, 1000.0);
        let first = provider.get_point_router_for_vehicle(&v1, AvoidanceRequest::Nothing);
        let second = provider.get_point_router_for_vehicle(&v1, AvoidanceRequest::Nothing);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.cached_groups(), vec!["".to_string()]);
    }

    #[test]
    fn routers_exist_for_every_vehicle_group() {
        let provider = provider();
        let routers = provider.get_point_routers_by_vehicle_group();
        assert_eq!(
            routers.keys().cloned().collect::<Vec<_>>(),
            vec!["".to_string(), "north".to_string()]
        );
        assert_eq!(provider.cached_routers().len(), 2);
    }

    #[test]
    fn group_snapshot_keeps_routers_of_vehicles_outside_the_model() {
        let provider = provider();
        let visitor = Vehicle::new("Visitor", 1000.0, 1000.0).with_property(PROPKEY_ROUTING_GROUP, "south");
        let cached = provider.get_point_router_for_vehicle(&visitor, AvoidanceRequest::Nothing);

        let routers = provider.get_point_routers_by_vehicle_group();
        assert_eq!(
            routers.keys().cloned().collect::<Vec<_>>(),
            vec!["".to_string(), "north".to_string(), "south".to_string()]
        );
        assert!(Arc::ptr_eq(&routers["south"], &cached));
    }

    #[test]
    fn update_routing_topology_drops_routers() {
        let provider = provider();
        let v1 = Vehicle::new("V1", 1000.0, 1000.0);
        let before = provider.get_point_router_for_vehicle(&v1, AvoidanceRequest::Nothing);

        provider.update_routing_topology(&[]);
        assert!(provider.cached_groups().is_empty());
        assert!(provider.graph_provider().cached_groups().is_empty());

        let after = provider.get_point_router_for_vehicle(&v1, AvoidanceRequest::Nothing);
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn empty_evaluator_list_is_rejected() {
        let config = RoutingConfig {
            algorithm: RouteAlgorithm::Dijkstra,
            edge_evaluators: Vec::new(),
        };
        let objects = Arc::new(ModelObjectService::default());
        assert!(PointRouterProvider::from_config(objects, &config).is_err());
    }
}
