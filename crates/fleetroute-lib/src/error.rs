use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the routing library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// "No route" is not an error: routers report it as `None` or
/// [`INFINITE_COSTS`](crate::router::INFINITE_COSTS).
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a point name could not be found in the plant model.
    #[error("unknown point: {name}{}", format_suggestions(.suggestions))]
    UnknownPoint {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a vehicle name could not be found in the plant model.
    #[error("unknown vehicle: {name}{}", format_suggestions(.suggestions))]
    UnknownVehicle {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when an algorithm or evaluator name cannot be parsed.
    #[error("unknown {kind} '{value}'")]
    UnknownSetting { kind: &'static str, value: String },

    /// Raised when a routing configuration is structurally invalid.
    #[error("invalid routing configuration: {message}")]
    InvalidConfig { message: String },

    /// Raised when a plant model or configuration file cannot be parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Wrapper for JSON errors on in-memory documents.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
