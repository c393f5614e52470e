//! Costs command handler.

use anyhow::{Context, Result};

use fleetroute_lib::AvoidanceRequest;

use crate::commands::RoutingSession;
use crate::output::{is_reachable, CostsReport, OutputFormat};

/// Arguments for the costs command.
#[derive(Debug, Clone)]
pub struct CostsCommandArgs {
    pub vehicle: String,
    pub from: String,
    pub to: String,
}

/// Handle the costs subcommand.
pub fn handle_costs_command(
    session: &RoutingSession,
    format: OutputFormat,
    args: &CostsCommandArgs,
) -> Result<()> {
    let vehicle = session.resolve_query(&args.vehicle, &args.from, &args.to)?;
    let router = session
        .provider
        .get_point_router_for_vehicle(&vehicle, AvoidanceRequest::Nothing);
    let costs = router.get_costs(&args.from, &args.to);

    let report = CostsReport {
        vehicle: vehicle.name,
        source: args.from.clone(),
        destination: args.to.clone(),
        algorithm: router.algorithm(),
        reachable: is_reachable(costs),
        costs,
    };
    format
        .render_costs(&report)
        .context("failed to write costs output")
}
