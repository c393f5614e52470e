//! Fleet routing CLI library.
//!
//! Subcommand handlers and output rendering for the `fleetroute-cli` binary.
//! Handlers take a loaded [`commands::RoutingSession`] and write to stdout.

pub mod commands;
pub mod output;
