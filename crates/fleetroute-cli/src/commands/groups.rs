//! Groups command handler: which routing groups exist and how big their
//! graphs are.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use fleetroute_lib::{PropertyRoutingGroupMapper, RoutingGroupMapper, Vehicle};

use crate::commands::RoutingSession;
use crate::output::{GroupReport, OutputFormat};

pub fn handle_groups_command(session: &RoutingSession, format: OutputFormat) -> Result<()> {
    let mut vehicles_by_group = group_vehicles(&session.model.vehicles, &PropertyRoutingGroupMapper);

    let routers = session.provider.get_point_routers_by_vehicle_group();
    let groups: Vec<GroupReport> = routers
        .iter()
        .map(|(group, router)| GroupReport {
            group: group.clone(),
            vehicles: vehicles_by_group.remove(group).unwrap_or_default(),
            vertices: router.graph().vertex_count(),
            edges: router.graph().edge_count(),
        })
        .collect();

    format
        .render_groups(&groups)
        .context("failed to write groups output")
}

/// Vehicle names keyed by the routing group `mapper` assigns them.
fn group_vehicles(
    vehicles: &[Vehicle],
    mapper: &dyn RoutingGroupMapper,
) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for vehicle in vehicles {
        grouped
            .entry(mapper.routing_group(vehicle))
            .or_default()
            .push(vehicle.name.clone());
    }
    grouped
}
