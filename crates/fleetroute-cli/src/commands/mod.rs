//! Subcommand handlers and the routing session they share.

pub mod costs;
pub mod groups;
pub mod route;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use fleetroute_lib::{
    EvaluatorKind, ModelObjectService, PlantModel, PointRouterProvider, RouteAlgorithm,
    RoutingConfig, Vehicle,
};

/// Where to load the model and configuration from, plus command-line overrides.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub model: PathBuf,
    pub config: Option<PathBuf>,
    pub algorithm: Option<RouteAlgorithm>,
    pub evaluators: Vec<EvaluatorKind>,
}

/// A loaded plant model with a router provider over it.
pub struct RoutingSession {
    pub model: PlantModel,
    pub config: RoutingConfig,
    pub provider: PointRouterProvider,
}

impl RoutingSession {
    pub fn load(options: &SessionOptions) -> Result<Self> {
        let model = PlantModel::from_path(&options.model)
            .with_context(|| format!("failed to load plant model from {}", options.model.display()))?;

        let mut config = match options.config.as_deref() {
            Some(path) => RoutingConfig::from_path(path)
                .with_context(|| format!("failed to load routing config from {}", path.display()))?,
            None => RoutingConfig::default(),
        };
        if let Some(algorithm) = options.algorithm {
            config.algorithm = algorithm;
        }
        if !options.evaluators.is_empty() {
            config.edge_evaluators = options.evaluators.clone();
        }

        debug!(
            points = model.points.len(),
            paths = model.paths.len(),
            vehicles = model.vehicles.len(),
            algorithm = %config.algorithm,
            "loaded plant model"
        );

        let objects = Arc::new(ModelObjectService::new(model.clone()));
        let provider = PointRouterProvider::from_config(objects, &config)?;
        Ok(Self {
            model,
            config,
            provider,
        })
    }

    /// Resolve a vehicle and both endpoints, failing with suggestions on
    /// unknown names.
    pub fn resolve_query(&self, vehicle: &str, from: &str, to: &str) -> Result<Vehicle> {
        let vehicle = self.model.resolve_vehicle(vehicle)?.clone();
        self.model.resolve_point(from)?;
        self.model.resolve_point(to)?;
        Ok(vehicle)
    }
}
