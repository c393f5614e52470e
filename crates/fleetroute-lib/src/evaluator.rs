//! Edge cost evaluators.
//!
//! An evaluator turns one directed traversal of one path into a weight for a
//! given vehicle. Evaluators run once per candidate edge while a graph is
//! built; they are never consulted during route queries.
//!
//! | Kind                  | Weight                                                   |
//! |-----------------------|----------------------------------------------------------|
//! | `DISTANCE`            | path length                                              |
//! | `TRAVELTIME`          | length / min(vehicle velocity, path velocity)            |
//! | `HOPS`                | 1                                                        |
//! | `EXPLICIT`            | the path's scalar routing cost                           |
//! | `EXPLICIT_PROPERTIES` | per-group, per-direction routing cost property           |
//!
//! A [`CompositeEvaluator`] sums the weights of its components.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;
use crate::graph::Edge;
use crate::model::Vehicle;
use crate::service::RoutingGroupMapper;

/// Weight substituted for missing or malformed cost properties.
pub const HIGH_COSTS: f64 = 1.0e10;

/// Path property prefix for forward routing costs; the routing group is appended.
pub const PROPKEY_ROUTING_COST_FORWARD: &str = "tcs:routingCostForward";

/// Path property prefix for reverse routing costs; the routing group is appended.
pub const PROPKEY_ROUTING_COST_REVERSE: &str = "tcs:routingCostReverse";

/// Routing cost of paths that carry no explicit cost.
const DEFAULT_EXPLICIT_COST: i64 = 1;

/// Computes the weight of one directed traversal of a path.
pub trait EdgeEvaluator: Send + Sync {
    fn compute_weight(&self, edge: &Edge, vehicle: &Vehicle) -> f64;
}

/// Evaluator kinds selectable through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluatorKind {
    Distance,
    #[serde(rename = "TRAVELTIME")]
    TravelTime,
    Hops,
    Explicit,
    ExplicitProperties,
}

impl EvaluatorKind {
    pub const ALL: [EvaluatorKind; 5] = [
        EvaluatorKind::Distance,
        EvaluatorKind::TravelTime,
        EvaluatorKind::Hops,
        EvaluatorKind::Explicit,
        EvaluatorKind::ExplicitProperties,
    ];

    fn as_str(self) -> &'static str {
        match self {
            EvaluatorKind::Distance => "DISTANCE",
            EvaluatorKind::TravelTime => "TRAVELTIME",
            EvaluatorKind::Hops => "HOPS",
            EvaluatorKind::Explicit => "EXPLICIT",
            EvaluatorKind::ExplicitProperties => "EXPLICIT_PROPERTIES",
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvaluatorKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace('-', "_");
        EvaluatorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::UnknownSetting {
                kind: "evaluator",
                value: value.to_string(),
            })
    }
}

/// Weight is the path length.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceEvaluator;

impl EdgeEvaluator for DistanceEvaluator {
    fn compute_weight(&self, edge: &Edge, _vehicle: &Vehicle) -> f64 {
        edge.path.length
    }
}

/// Every edge costs one hop.
#[derive(Debug, Clone, Copy, Default)]
pub struct HopsEvaluator;

impl EdgeEvaluator for HopsEvaluator {
    fn compute_weight(&self, _edge: &Edge, _vehicle: &Vehicle) -> f64 {
        1.0
    }
}

/// Weight is the time needed to traverse the path at the highest velocity
/// both the vehicle and the path allow in the direction of travel.
#[derive(Debug, Clone, Copy, Default)]
pub struct TravelTimeEvaluator;

impl EdgeEvaluator for TravelTimeEvaluator {
    fn compute_weight(&self, edge: &Edge, vehicle: &Vehicle) -> f64 {
        let max_velocity = if edge.reverse {
            vehicle.max_reverse_velocity.min(edge.path.max_reverse_velocity)
        } else {
            vehicle.max_velocity.min(edge.path.max_velocity)
        };

        // Zero velocity: this vehicle cannot make progress in this direction.
        if max_velocity <= 0.0 {
            return f64::INFINITY;
        }
        edge.path.length / max_velocity
    }
}

/// Weight is the path's explicit routing cost, regardless of direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitCostEvaluator;

impl EdgeEvaluator for ExplicitCostEvaluator {
    fn compute_weight(&self, edge: &Edge, _vehicle: &Vehicle) -> f64 {
        edge.path.routing_cost.unwrap_or(DEFAULT_EXPLICIT_COST) as f64
    }
}

/// Weight is read from the path property
/// `tcs:routingCost{Forward,Reverse}<routing group>`.
pub struct ExplicitPropertiesEvaluator {
    group_mapper: Arc<dyn RoutingGroupMapper>,
}

impl ExplicitPropertiesEvaluator {
    pub fn new(group_mapper: Arc<dyn RoutingGroupMapper>) -> Self {
        Self { group_mapper }
    }
}

impl EdgeEvaluator for ExplicitPropertiesEvaluator {
    fn compute_weight(&self, edge: &Edge, vehicle: &Vehicle) -> f64 {
        let prefix = if edge.reverse {
            PROPKEY_ROUTING_COST_REVERSE
        } else {
            PROPKEY_ROUTING_COST_FORWARD
        };
        let key = format!("{prefix}{}", self.group_mapper.routing_group(vehicle));

        match edge.path.properties.get(&key) {
            Some(value) => match value.trim().parse::<f64>() {
                Ok(cost) if !cost.is_nan() => cost,
                _ => {
                    warn!(
                        path = %edge.path.name,
                        property = %key,
                        value = %value,
                        "unparsable routing cost property; using high costs"
                    );
                    HIGH_COSTS
                }
            },
            None => {
                warn!(
                    path = %edge.path.name,
                    property = %key,
                    "missing routing cost property; using high costs"
                );
                HIGH_COSTS
            }
        }
    }
}

/// Sums the weights of its components.
///
/// Whether the combination makes sense (e.g. adding hops to millimetres) is up
/// to whoever configures it.
pub struct CompositeEvaluator {
    components: Vec<Box<dyn EdgeEvaluator>>,
}

impl CompositeEvaluator {
    pub fn new(components: Vec<Box<dyn EdgeEvaluator>>) -> Self {
        Self { components }
    }

    /// Build a composite from configured kinds, in order.
    pub fn from_kinds(kinds: &[EvaluatorKind], group_mapper: Arc<dyn RoutingGroupMapper>) -> Self {
        let components = kinds
            .iter()
            .map(|kind| -> Box<dyn EdgeEvaluator> {
                match kind {
                    EvaluatorKind::Distance => Box::new(DistanceEvaluator),
                    EvaluatorKind::TravelTime => Box::new(TravelTimeEvaluator),
                    EvaluatorKind::Hops => Box::new(HopsEvaluator),
                    EvaluatorKind::Explicit => Box::new(ExplicitCostEvaluator),
                    EvaluatorKind::ExplicitProperties => {
                        Box::new(ExplicitPropertiesEvaluator::new(group_mapper.clone()))
                    }
                }
            })
            .collect();
        Self { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl EdgeEvaluator for CompositeEvaluator {
    fn compute_weight(&self, edge: &Edge, vehicle: &Vehicle) -> f64 {
        self.components
            .iter()
            .map(|component| component.compute_weight(edge, vehicle))
            .sum()
    }
}
