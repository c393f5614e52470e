//! Collaborators the routing core consumes: topology snapshots, routing
//! group assignment and per-order resource avoidance.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::model::{Path, PlantModel, Point, TransportOrder, Vehicle};

/// Vehicle property naming the routing group a vehicle belongs to.
pub const PROPKEY_ROUTING_GROUP: &str = "tcs:routingGroup";

/// Transport order property listing resources (points or paths) to avoid.
pub const PROPKEY_RESOURCES_TO_AVOID: &str = "tcs:resourcesToAvoid";

/// Routing group of vehicles without an explicit group property.
pub const DEFAULT_ROUTING_GROUP: &str = "";

/// Source of the current plant topology.
pub trait ObjectService: Send + Sync {
    fn fetch_points(&self) -> Vec<Point>;

    fn fetch_paths(&self) -> Vec<Path>;

    fn fetch_vehicles(&self) -> Vec<Vehicle>;
}

/// Maps vehicles to the key of the routing group whose graph they share.
pub trait RoutingGroupMapper: Send + Sync {
    fn routing_group(&self, vehicle: &Vehicle) -> String;
}

/// Reads the routing group from the [`PROPKEY_ROUTING_GROUP`] vehicle property.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyRoutingGroupMapper;

impl RoutingGroupMapper for PropertyRoutingGroupMapper {
    fn routing_group(&self, vehicle: &Vehicle) -> String {
        vehicle
            .property(PROPKEY_ROUTING_GROUP)
            .unwrap_or(DEFAULT_ROUTING_GROUP)
            .to_string()
    }
}

/// Points and paths a derived graph must not contain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcesToAvoid {
    pub points: BTreeSet<String>,
    pub paths: BTreeSet<String>,
}

impl ResourcesToAvoid {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.paths.is_empty()
    }
}

/// What a routing request wants to avoid.
#[derive(Debug, Clone, Copy, Default)]
pub enum AvoidanceRequest<'a> {
    /// Plain request; the routing group's cached router is used.
    #[default]
    Nothing,
    /// Resources named by a transport order's properties.
    Order(&'a TransportOrder),
    /// An explicit set of resource names.
    Resources(&'a BTreeSet<String>),
}

/// Turns orders or explicit resource names into points and paths to avoid.
pub trait ResourceAvoidanceExtractor: Send + Sync {
    fn extract_from_order(&self, order: &TransportOrder) -> ResourcesToAvoid;

    fn extract_from_names(&self, names: &BTreeSet<String>) -> ResourcesToAvoid;

    fn extract(&self, request: AvoidanceRequest<'_>) -> ResourcesToAvoid {
        match request {
            AvoidanceRequest::Nothing => ResourcesToAvoid::default(),
            AvoidanceRequest::Order(order) => self.extract_from_order(order),
            AvoidanceRequest::Resources(names) => self.extract_from_names(names),
        }
    }
}

/// Resolves the comma separated [`PROPKEY_RESOURCES_TO_AVOID`] order property
/// against the current topology.
pub struct OrderPropertyAvoidanceExtractor {
    objects: Arc<dyn ObjectService>,
}

impl OrderPropertyAvoidanceExtractor {
    pub fn new(objects: Arc<dyn ObjectService>) -> Self {
        Self { objects }
    }
}

impl ResourceAvoidanceExtractor for OrderPropertyAvoidanceExtractor {
    fn extract_from_order(&self, order: &TransportOrder) -> ResourcesToAvoid {
        let Some(value) = order.property(PROPKEY_RESOURCES_TO_AVOID) else {
            return ResourcesToAvoid::default();
        };

        let names: BTreeSet<String> = value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        self.extract_from_names(&names)
    }

    fn extract_from_names(&self, names: &BTreeSet<String>) -> ResourcesToAvoid {
        if names.is_empty() {
            return ResourcesToAvoid::default();
        }

        let points: BTreeSet<String> = self
            .objects
            .fetch_points()
            .into_iter()
            .map(|point| point.name)
            .collect();
        let paths: BTreeSet<String> = self
            .objects
            .fetch_paths()
            .into_iter()
            .map(|path| path.name)
            .collect();

        let mut resources = ResourcesToAvoid::default();
        for name in names {
            if points.contains(name) {
                resources.points.insert(name.clone());
            } else if paths.contains(name) {
                resources.paths.insert(name.clone());
            } else {
                debug!(resource = %name, "ignoring unknown resource to avoid");
            }
        }
        resources
    }
}

/// In-memory [`ObjectService`] over a [`PlantModel`] snapshot.
///
/// Topology edits made here are not propagated to any cache; callers notify
/// the router provider themselves.
#[derive(Debug, Default)]
pub struct ModelObjectService {
    model: RwLock<PlantModel>,
}

impl ModelObjectService {
    pub fn new(model: PlantModel) -> Self {
        Self {
            model: RwLock::new(model),
        }
    }

    /// Copy of the current model.
    pub fn snapshot(&self) -> PlantModel {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the whole model.
    pub fn replace_model(&self, model: PlantModel) {
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = model;
    }

    /// Replace the path with the same name, or add it if it is new. Returns
    /// the stored path.
    pub fn update_path(&self, path: Path) -> Path {
        let mut model = self.model.write().unwrap_or_else(PoisonError::into_inner);
        match model.paths.iter_mut().find(|p| p.name == path.name) {
            Some(existing) => *existing = path.clone(),
            None => model.paths.push(path.clone()),
        }
        path
    }

    /// Apply `change` to the named path and return the updated copy.
    pub fn modify_path(&self, name: &str, change: impl FnOnce(&mut Path)) -> Option<Path> {
        let mut model = self.model.write().unwrap_or_else(PoisonError::into_inner);
        let path = model.paths.iter_mut().find(|p| p.name == name)?;
        change(path);
        Some(path.clone())
    }
}

impl ObjectService for ModelObjectService {
    fn fetch_points(&self) -> Vec<Point> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .points
            .clone()
    }

    fn fetch_paths(&self) -> Vec<Path> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .paths
            .clone()
    }

    fn fetch_vehicles(&self) -> Vec<Vehicle> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .vehicles
            .clone()
    }
}
