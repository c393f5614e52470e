//! Route command handler.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use tracing::info;

use fleetroute_lib::AvoidanceRequest;

use crate::commands::RoutingSession;
use crate::output::{OutputFormat, RouteReport};

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub vehicle: String,
    /// Starting point name.
    pub from: String,
    /// Destination point name.
    pub to: String,
    /// Point or path names to keep out of the route.
    pub avoid: Vec<String>,
}

impl RouteCommandArgs {
    fn avoided(&self) -> BTreeSet<String> {
        self.avoid
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Handle the route subcommand.
///
/// An unreachable destination is reported, not treated as a failure.
pub fn handle_route_command(
    session: &RoutingSession,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<()> {
    let vehicle = session.resolve_query(&args.vehicle, &args.from, &args.to)?;
    let avoided = args.avoided();
    let request = if avoided.is_empty() {
        AvoidanceRequest::Nothing
    } else {
        AvoidanceRequest::Resources(&avoided)
    };

    let route = session
        .provider
        .route_for_vehicle(&vehicle, request, &args.from, &args.to);
    if route.is_none() {
        info!(vehicle = %vehicle.name, from = %args.from, to = %args.to, "no route found");
    }

    let (costs, steps) = match route {
        Some(route) => (Some(route.costs), route.steps),
        None => (None, Vec::new()),
    };
    let report = RouteReport {
        vehicle: vehicle.name,
        source: args.from.clone(),
        destination: args.to.clone(),
        algorithm: session.config.algorithm,
        avoided: avoided.into_iter().collect(),
        costs,
        steps,
    };
    format
        .render_route(&report)
        .context("failed to write route output")
}
