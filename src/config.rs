/// Service configuration loader - parses floodrisk.toml
///
/// Separates deployment knobs from code: the merged-data path, the
/// elevated-state label, the endpoint port, forest hyperparameters, and
/// the jitter spread can all change without recompiling the service.
/// The core query modules never read this file themselves — everything is
/// handed to them as constructor parameters by `main`.

use serde::Deserialize;
use std::fs;

use crate::classifier::ForestParams;
use crate::model::ELEVATED_STATE;
use crate::service::DEFAULT_JITTER_STD_DEV;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub jitter: JitterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path to the merged sensor+weather CSV the store is built from.
    pub merged_csv: String,
    /// State string that marks the positive training class.
    #[serde(default = "default_elevated_state")]
    pub elevated_state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { n_trees: default_n_trees(), max_depth: default_max_depth(), seed: default_seed() }
    }
}

impl ModelConfig {
    /// Converts the TOML model section into classifier hyperparameters.
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            seed: self.seed,
            ..ForestParams::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JitterConfig {
    #[serde(default = "default_jitter_std_dev")]
    pub std_dev: f64,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self { std_dev: default_jitter_std_dev() }
    }
}

fn default_elevated_state() -> String {
    ELEVATED_STATE.to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_n_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    15
}

fn default_seed() -> u64 {
    42
}

fn default_jitter_std_dev() -> f64 {
    DEFAULT_JITTER_STD_DEV
}

/// Loads the service configuration from floodrisk.toml.
///
/// # Panics
/// Panics if the configuration file is missing or malformed. This is
/// intentional — the service cannot operate without knowing where its
/// training data lives.
///
/// # File Location
/// Expects `floodrisk.toml` in the current working directory (project root
/// when running via `cargo run`).
pub fn load_config() -> ServiceConfig {
    let config_path = "floodrisk.toml";

    let contents = fs::read_to_string(config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path, e));

    toml::from_str(&contents).unwrap_or_else(|e| panic!("Failed to parse {}: {}", config_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_succeeds() {
        let config = load_config();
        assert!(!config.data.merged_csv.is_empty());
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [data]
            merged_csv = "data/merged.csv"
            "#,
        )
        .expect("minimal config should parse");

        assert_eq!(config.data.elevated_state, "High High");
        assert_eq!(config.endpoint.port, 5000);
        assert_eq!(config.model.n_trees, 100);
        assert_eq!(config.model.max_depth, 15);
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.jitter.std_dev, 5.0);
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [data]
            merged_csv = "other.csv"
            elevated_state = "Flood"

            [endpoint]
            port = 8080

            [model]
            n_trees = 25
            max_depth = 6
            seed = 7

            [jitter]
            std_dev = 2.5
            "#,
        )
        .expect("full config should parse");

        assert_eq!(config.data.elevated_state, "Flood");
        assert_eq!(config.endpoint.port, 8080);
        let params = config.model.forest_params();
        assert_eq!(params.n_trees, 25);
        assert_eq!(params.max_depth, 6);
        assert_eq!(params.seed, 7);
        assert_eq!(config.jitter.std_dev, 2.5);
    }

    #[test]
    fn test_config_without_data_section_fails() {
        assert!(toml::from_str::<ServiceConfig>("[endpoint]\nport = 80\n").is_err());
    }
}
