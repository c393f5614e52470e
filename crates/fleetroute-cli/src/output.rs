//! Output formatting for route, cost and group reports.
//!
//! Every report is a plain serde struct. Text rendering is for people; JSON
//! rendering is the same struct serialised, for scripts.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use fleetroute_lib::{RouteAlgorithm, RouteStep, VehicleOrientation, INFINITE_COSTS};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Result of a `route` query.
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub vehicle: String,
    pub source: String,
    pub destination: String,
    pub algorithm: RouteAlgorithm,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub avoided: Vec<String>,
    /// `None` when the destination is unreachable.
    pub costs: Option<i64>,
    pub steps: Vec<RouteStep>,
}

/// Result of a `costs` query.
#[derive(Debug, Clone, Serialize)]
pub struct CostsReport {
    pub vehicle: String,
    pub source: String,
    pub destination: String,
    pub algorithm: RouteAlgorithm,
    pub reachable: bool,
    pub costs: i64,
}

/// One routing group and the graph its router works on.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group: String,
    pub vehicles: Vec<String>,
    pub vertices: usize,
    pub edges: usize,
}

impl OutputFormat {
    pub fn render_route(self, report: &RouteReport) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self {
            OutputFormat::Text => write_route_text(&mut out, report),
            OutputFormat::Json => write_json(&mut out, report),
        }
    }

    pub fn render_costs(self, report: &CostsReport) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self {
            OutputFormat::Text => write_costs_text(&mut out, report),
            OutputFormat::Json => write_json(&mut out, report),
        }
    }

    pub fn render_groups(self, groups: &[GroupReport]) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self {
            OutputFormat::Text => write_groups_text(&mut out, groups),
            OutputFormat::Json => write_json(&mut out, groups),
        }
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// Human-friendly route view with algorithm annotation.
pub fn write_route_text(out: &mut impl Write, report: &RouteReport) -> io::Result<()> {
    let Some(costs) = report.costs else {
        writeln!(
            out,
            "No route from {} to {} for {} (algorithm: {}).",
            report.source, report.destination, report.vehicle, report.algorithm
        )?;
        return write_avoided(out, &report.avoided);
    };

    writeln!(
        out,
        "Route for {} from {} to {} ({} steps; algorithm: {}):",
        report.vehicle,
        report.source,
        report.destination,
        report.steps.len(),
        report.algorithm
    )?;
    for step in &report.steps {
        write_step(out, step)?;
    }
    write_avoided(out, &report.avoided)?;
    writeln!(out, "\nTotal costs: {}", costs)
}

fn write_step(out: &mut impl Write, step: &RouteStep) -> io::Result<()> {
    match (step.path.as_deref(), step.source_point.as_deref()) {
        (Some(path), Some(source)) => writeln!(
            out,
            "{:>3}. {} -> {} via {} ({}, cost {})",
            step.route_index,
            source,
            step.destination_point,
            path,
            orientation_label(step.vehicle_orientation),
            step.cost
        ),
        _ => writeln!(
            out,
            "{:>3}. stay at {}",
            step.route_index, step.destination_point
        ),
    }
}

fn orientation_label(orientation: VehicleOrientation) -> &'static str {
    match orientation {
        VehicleOrientation::Forward => "forward",
        VehicleOrientation::Backward => "backward",
    }
}

fn write_avoided(out: &mut impl Write, avoided: &[String]) -> io::Result<()> {
    if avoided.is_empty() {
        return Ok(());
    }
    writeln!(out, "Avoiding: {}", avoided.join(", "))
}

pub fn write_costs_text(out: &mut impl Write, report: &CostsReport) -> io::Result<()> {
    if !report.reachable {
        return writeln!(
            out,
            "{} -> {} for {}: unreachable",
            report.source, report.destination, report.vehicle
        );
    }
    writeln!(
        out,
        "{} -> {} for {}: {}",
        report.source, report.destination, report.vehicle, report.costs
    )
}

pub fn write_groups_text(out: &mut impl Write, groups: &[GroupReport]) -> io::Result<()> {
    if groups.is_empty() {
        return writeln!(out, "No vehicles in the plant model.");
    }
    for group in groups {
        let label = if group.group.is_empty() {
            "<default>"
        } else {
            group.group.as_str()
        };
        writeln!(
            out,
            "{}: {} vertices, {} edges; vehicles: {}",
            label,
            group.vertices,
            group.edges,
            group.vehicles.join(", ")
        )?;
    }
    Ok(())
}

/// `true` if `costs` denotes a reachable destination.
pub fn is_reachable(costs: i64) -> bool {
    costs != INFINITE_COSTS
}
