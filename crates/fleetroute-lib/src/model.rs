//! Plant model entities consumed by the routing core.
//!
//! Points and paths describe the topology, vehicles and transport orders
//! describe who is asking for a route. All entities are identified by their
//! name. [`PlantModel`] is a plain snapshot of all of them that can be loaded
//! from JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Free-form key/value properties attached to model objects.
pub type Properties = BTreeMap<String, String>;

/// Maximum number of "did you mean" suggestions for unknown names.
const MAX_SUGGESTIONS: usize = 3;

/// Minimum Jaro-Winkler similarity for a name to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Named vertex of the plant topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub name: String,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Point {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
        }
    }
}

/// Connector between two points.
///
/// Lengths are in millimetres and velocities in millimetres per second. A
/// direction with a maximum velocity of zero cannot be travelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub name: String,
    pub source_point: String,
    pub destination_point: String,
    pub length: f64,
    #[serde(default)]
    pub max_velocity: f64,
    #[serde(default)]
    pub max_reverse_velocity: f64,
    #[serde(default)]
    pub locked: bool,
    /// Explicit routing cost used by the `EXPLICIT` evaluator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_cost: Option<i64>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Path {
    /// Create an unlocked path that is only navigable forward.
    pub fn new(
        name: impl Into<String>,
        source_point: impl Into<String>,
        destination_point: impl Into<String>,
        length: f64,
        max_velocity: f64,
    ) -> Self {
        Self {
            name: name.into(),
            source_point: source_point.into(),
            destination_point: destination_point.into(),
            length,
            max_velocity,
            max_reverse_velocity: 0.0,
            locked: false,
            routing_cost: None,
            properties: Properties::new(),
        }
    }

    pub fn with_reverse_velocity(mut self, max_reverse_velocity: f64) -> Self {
        self.max_reverse_velocity = max_reverse_velocity;
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_routing_cost(mut self, routing_cost: i64) -> Self {
        self.routing_cost = Some(routing_cost);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// `true` if a vehicle may travel from source to destination.
    pub fn is_navigable_forward(&self) -> bool {
        !self.locked && self.max_velocity != 0.0
    }

    /// `true` if a vehicle may travel from destination to source.
    pub fn is_navigable_reverse(&self) -> bool {
        !self.locked && self.max_reverse_velocity != 0.0
    }
}

/// A vehicle requesting routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub name: String,
    #[serde(default)]
    pub max_velocity: f64,
    #[serde(default)]
    pub max_reverse_velocity: f64,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Vehicle {
    pub fn new(name: impl Into<String>, max_velocity: f64, max_reverse_velocity: f64) -> Self {
        Self {
            name: name.into(),
            max_velocity,
            max_reverse_velocity,
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// The parts of a transport order the router looks at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportOrder {
    pub name: String,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl TransportOrder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Direction a vehicle faces while travelling along a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleOrientation {
    Forward,
    Backward,
}

impl fmt::Display for VehicleOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            VehicleOrientation::Forward => "forward",
            VehicleOrientation::Backward => "backward",
        };
        f.write_str(value)
    }
}

/// Snapshot of the plant topology and the known vehicles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantModel {
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub paths: Vec<Path>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
}

impl PlantModel {
    /// Load a plant model from a JSON file.
    pub fn from_path(path: &FsPath) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a plant model from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn point(&self, name: &str) -> Option<&Point> {
        self.points.iter().find(|point| point.name == name)
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        self.paths.iter().find(|path| path.name == name)
    }

    pub fn vehicle(&self, name: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.name == name)
    }

    /// Look up a point, suggesting close matches when the name is unknown.
    pub fn resolve_point(&self, name: &str) -> Result<&Point> {
        self.point(name).ok_or_else(|| Error::UnknownPoint {
            name: name.to_string(),
            suggestions: fuzzy_matches(name, self.points.iter().map(|p| p.name.as_str())),
        })
    }

    /// Look up a vehicle, suggesting close matches when the name is unknown.
    pub fn resolve_vehicle(&self, name: &str) -> Result<&Vehicle> {
        self.vehicle(name).ok_or_else(|| Error::UnknownVehicle {
            name: name.to_string(),
            suggestions: fuzzy_matches(name, self.vehicles.iter().map(|v| v.name.as_str())),
        })
    }
}

fn fuzzy_matches<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = candidates
        .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
