use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fleetroute_cli::commands::costs::{handle_costs_command, CostsCommandArgs};
use fleetroute_cli::commands::groups::handle_groups_command;
use fleetroute_cli::commands::route::{handle_route_command, RouteCommandArgs};
use fleetroute_cli::commands::{RoutingSession, SessionOptions};
use fleetroute_cli::output::OutputFormat;
use fleetroute_lib::{EvaluatorKind, RouteAlgorithm};

#[derive(Parser, Debug)]
#[command(author, version, about = "Route queries against an AGV plant model")]
struct Cli {
    /// Plant model (JSON) to route on.
    #[arg(long)]
    model: PathBuf,

    /// Routing configuration (JSON). Defaults to Dijkstra with the distance evaluator.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured algorithm (dijkstra, bellman-ford, floyd-warshall).
    #[arg(long)]
    algorithm: Option<RouteAlgorithm>,

    /// Override the configured edge evaluators; repeat to combine several.
    #[arg(long = "evaluator")]
    evaluators: Vec<EvaluatorKind>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the cheapest route between two points for a vehicle.
    Route {
        /// Vehicle the route is planned for.
        #[arg(long)]
        vehicle: String,
        /// Starting point name.
        #[arg(long = "from")]
        from: String,
        /// Destination point name.
        #[arg(long = "to")]
        to: String,
        /// Points or paths to avoid (comma separated or repeated).
        #[arg(long, value_delimiter = ',')]
        avoid: Vec<String>,
    },
    /// Report only the cost of the cheapest route.
    Costs {
        /// Vehicle the route is planned for.
        #[arg(long)]
        vehicle: String,
        /// Starting point name.
        #[arg(long = "from")]
        from: String,
        /// Destination point name.
        #[arg(long = "to")]
        to: String,
    },
    /// List the routing groups of the model's vehicles and their graphs.
    Groups,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let session = RoutingSession::load(&SessionOptions {
        model: cli.model,
        config: cli.config,
        algorithm: cli.algorithm,
        evaluators: cli.evaluators,
    })?;

    match cli.command {
        Command::Route {
            vehicle,
            from,
            to,
            avoid,
        } => handle_route_command(
            &session,
            cli.format,
            &RouteCommandArgs {
                vehicle,
                from,
                to,
                avoid,
            },
        ),
        Command::Costs { vehicle, from, to } => handle_costs_command(
            &session,
            cli.format,
            &CostsCommandArgs { vehicle, from, to },
        ),
        Command::Groups => handle_groups_command(&session, cli.format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
