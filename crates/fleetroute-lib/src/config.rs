//! Routing configuration: algorithm choice and the evaluators whose weights
//! are summed per edge.
//!
//! ```json
//! { "algorithm": "FLOYD_WARSHALL", "edge_evaluators": ["TRAVELTIME", "HOPS"] }
//! ```

use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::algorithm::RouteAlgorithm;
use crate::error::{Error, Result};
use crate::evaluator::EvaluatorKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub algorithm: RouteAlgorithm,
    pub edge_evaluators: Vec<EvaluatorKind>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            algorithm: RouteAlgorithm::Dijkstra,
            edge_evaluators: vec![EvaluatorKind::Distance],
        }
    }
}

impl RoutingConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_path(path: &FsPath) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.edge_evaluators.is_empty() {
            return Err(Error::InvalidConfig {
                message: "at least one edge evaluator is required".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_to_dijkstra_with_distance() {
        let config = RoutingConfig::from_json_str("{}").expect("defaults apply");
        assert_eq!(config, RoutingConfig::default());
    }

    #[test]
    fn parses_algorithm_and_evaluators() {
        let config = RoutingConfig::from_json_str(
            r#"{ "algorithm": "BELLMAN_FORD", "edge_evaluators": ["TRAVELTIME", "EXPLICIT_PROPERTIES"] }"#,
        )
        .expect("config parses");
        assert_eq!(config.algorithm, RouteAlgorithm::BellmanFord);
        assert_eq!(
            config.edge_evaluators,
            vec![EvaluatorKind::TravelTime, EvaluatorKind::ExplicitProperties]
        );
    }

    #[test]
    fn rejects_empty_evaluator_list() {
        let error = RoutingConfig::from_json_str(r#"{ "edge_evaluators": [] }"#)
            .expect_err("empty list rejected");
        assert!(error.to_string().contains("at least one edge evaluator"));
    }

    #[test]
    fn reports_file_path_on_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ \"algorithm\": \"A_STAR\" }}").expect("write config");

        let error = RoutingConfig::from_path(file.path()).expect_err("unknown algorithm");
        assert!(error
            .to_string()
            .contains(&file.path().display().to_string()));
    }
}
