use crate::clustering::params::{
    ClusteringParams, ConvergencePolicy, EmptyClusterPolicy, InitializationMethod,
};
use crate::core::error::{KClusterError, KClusterResult};
use crate::core::float::KFloat;
use crate::dataset::{Dataset, LoadOptions};
use log::{error, LevelFilter};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ConvergenceConfig {
    pub policy: String, // "membership_delta" or "centroid_shift"
    pub threshold: Option<f64>,
    pub max_iterations: usize,
}

#[derive(Debug, Deserialize)]
pub struct ClusteringParamsConfig {
    pub k: usize,
    pub initialization_method: String, // "Random" or "FirstK"
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default = "default_empty_cluster_policy")]
    pub empty_cluster_policy: String, // "Fail" or "Reseed"
    pub convergence: ConvergenceConfig,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String, // Log level, e.g., "info", "debug", "warn", "error"
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub clustering_params: ClusteringParamsConfig,
    pub data_file: Option<String>, // Path to the delimited dataset
    #[serde(default = "default_has_label")]
    pub has_label: bool, // First column holds record labels
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    pub logging: LoggingConfig,
}

fn default_empty_cluster_policy() -> String {
    "Fail".to_string()
}

fn default_has_label() -> bool {
    true
}

fn default_delimiter() -> char {
    ','
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = &self.clustering_params;
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Clustering Parameters:")?;
        writeln!(f, "    K: {}", params.k)?;
        writeln!(
            f,
            "    Initialization Method: {}",
            params.initialization_method
        )?;
        match params.rng_seed {
            Some(seed) => writeln!(f, "    RNG Seed: {}", seed)?,
            None => writeln!(f, "    RNG Seed: None")?,
        }
        writeln!(f, "    Empty Cluster Policy: {}", params.empty_cluster_policy)?;
        writeln!(f, "    Convergence Policy: {}", params.convergence.policy)?;
        match params.convergence.threshold {
            Some(threshold) => writeln!(f, "    Threshold: {}", threshold)?,
            None => writeln!(f, "    Threshold: default")?,
        }
        writeln!(
            f,
            "    Max Iterations: {}",
            params.convergence.max_iterations
        )?;
        match params.timeout_ms {
            Some(ms) => writeln!(f, "    Timeout: {} ms", ms)?,
            None => writeln!(f, "    Timeout: None")?,
        }
        if let Some(data_file) = &self.data_file {
            writeln!(f, "  Data File: {}", data_file)?;
        } else {
            writeln!(f, "  Data File: None")?;
        }
        writeln!(f, "  Has Label: {}", self.has_label)?;
        writeln!(f, "  Delimiter: {:?}", self.delimiter)?;
        writeln!(f, "  Logging:")?;
        writeln!(f, "    Level: {}", self.logging.level)?;
        Ok(())
    }
}

impl Config {
    /// Reads the YAML configuration file and returns a validated `Config`.
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> KClusterResult<Self> {
        let file_content = std::fs::read_to_string(file_path)?;
        Self::from_yaml(&file_content)
    }

    pub fn from_yaml(yaml: &str) -> KClusterResult<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> KClusterResult<()> {
        let params = &self.clustering_params;

        // Validate initialization method
        match params.initialization_method.as_str() {
            "Random" | "FirstK" => (),
            other => {
                return Err(KClusterError::Config(format!(
                    "Unsupported initialization method: {}",
                    other
                )))
            }
        }

        // Validate empty cluster policy
        match params.empty_cluster_policy.as_str() {
            "Fail" | "Reseed" => (),
            other => {
                return Err(KClusterError::Config(format!(
                    "Unsupported empty cluster policy: {}",
                    other
                )))
            }
        }

        // Validate convergence policy
        match params.convergence.policy.as_str() {
            "membership_delta" | "centroid_shift" => (),
            other => {
                return Err(KClusterError::Config(format!(
                    "Unsupported convergence policy: {}",
                    other
                )))
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "debug" | "info" | "warn" | "error" => (),
            other => {
                return Err(KClusterError::Config(format!(
                    "Unsupported log level: {}",
                    other
                )))
            }
        }

        if !self.delimiter.is_ascii() {
            return Err(KClusterError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }

        // Validate numeric parameters
        if params.k == 0 {
            return Err(KClusterError::Config(
                "k must be greater than 0".to_string(),
            ));
        }
        self.to_clustering_params()?.validate()
    }

    /// Converts `ClusteringParamsConfig` into `ClusteringParams`.
    pub fn to_clustering_params(&self) -> KClusterResult<ClusteringParams> {
        let params = &self.clustering_params;

        let initialization_method = match params.initialization_method.as_str() {
            "Random" => InitializationMethod::Random,
            "FirstK" => InitializationMethod::FirstK,
            other => {
                return Err(KClusterError::Config(format!(
                    "Unsupported initialization method: {}",
                    other
                )))
            }
        };
        let empty_cluster_policy = match params.empty_cluster_policy.as_str() {
            "Fail" => EmptyClusterPolicy::Fail,
            "Reseed" => EmptyClusterPolicy::Reseed,
            other => {
                return Err(KClusterError::Config(format!(
                    "Unsupported empty cluster policy: {}",
                    other
                )))
            }
        };
        let convergence = match params.convergence.policy.as_str() {
            "membership_delta" => ConvergencePolicy::MembershipDelta {
                threshold: params
                    .convergence
                    .threshold
                    .unwrap_or(ConvergencePolicy::DEFAULT_MEMBERSHIP_THRESHOLD),
            },
            "centroid_shift" => ConvergencePolicy::CentroidShift {
                tolerance: params
                    .convergence
                    .threshold
                    .unwrap_or(ConvergencePolicy::DEFAULT_SHIFT_TOLERANCE),
            },
            other => {
                return Err(KClusterError::Config(format!(
                    "Unsupported convergence policy: {}",
                    other
                )))
            }
        };

        Ok(ClusteringParams {
            k: params.k,
            initialization_method,
            rng_seed: params.rng_seed,
            convergence,
            max_iterations: params.convergence.max_iterations,
            empty_cluster_policy,
            timeout: params.timeout_ms.map(Duration::from_millis),
        })
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            has_label: self.has_label,
            delimiter: self.delimiter as u8,
        }
    }

    /// Sets up logging based on the logging level in the configuration.
    pub fn setup_logging(&self) {
        let level_filter = match self.logging.level.to_lowercase().as_str() {
            "debug" => LevelFilter::Debug,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            _ => LevelFilter::Info,
        };

        if let Err(e) = env_logger::Builder::new()
            .filter_level(level_filter)
            .try_init()
        {
            error!("Failed to initialize logger: {}", e);
        }
    }

    /// Reads and normalizes the configured dataset file.
    pub fn load_data<F: KFloat>(&self) -> KClusterResult<Dataset<F>> {
        let data_file = self
            .data_file
            .as_ref()
            .ok_or_else(|| KClusterError::Config("no data_file configured".to_string()))?;
        Dataset::from_path(data_file, &self.load_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
clustering_params:
  k: 4
  initialization_method: Random
  rng_seed: 42
  convergence:
    policy: centroid_shift
    max_iterations: 500
  timeout_ms: 250
data_file: demos/countries.csv
logging:
  level: info
"#;

    #[test]
    fn test_parse_and_convert() {
        let config = Config::from_yaml(EXAMPLE).unwrap();
        assert!(config.has_label);
        assert_eq!(config.delimiter, ',');

        let params = config.to_clustering_params().unwrap();
        assert_eq!(params.k, 4);
        assert_eq!(params.rng_seed, Some(42));
        assert_eq!(params.initialization_method, InitializationMethod::Random);
        assert_eq!(params.empty_cluster_policy, EmptyClusterPolicy::Fail);
        assert_eq!(
            params.convergence,
            ConvergencePolicy::CentroidShift { tolerance: 0.0001 }
        );
        assert_eq!(params.max_iterations, 500);
        assert_eq!(params.timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_display_lists_parameters() {
        let config = Config::from_yaml(EXAMPLE).unwrap();
        let text = config.to_string();
        assert!(text.contains("K: 4"));
        assert!(text.contains("Convergence Policy: centroid_shift"));
        assert!(text.contains("Data File: demos/countries.csv"));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let yaml = EXAMPLE.replace("centroid_shift", "random_walk");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, KClusterError::Config(msg) if msg.contains("random_walk")));
    }

    #[test]
    fn test_rejects_zero_k_and_zero_iterations() {
        let yaml = EXAMPLE.replace("k: 4", "k: 0");
        assert!(matches!(Config::from_yaml(&yaml), Err(KClusterError::Config(_))));

        let yaml = EXAMPLE.replace("max_iterations: 500", "max_iterations: 0");
        assert!(matches!(Config::from_yaml(&yaml), Err(KClusterError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        let err = Config::from_yaml("clustering_params: [").unwrap_err();
        assert!(matches!(err, KClusterError::Yaml(_)));
    }

    #[test]
    fn test_load_data_requires_data_file() {
        let yaml = EXAMPLE.replace("data_file: demos/countries.csv\n", "");
        let config = Config::from_yaml(&yaml).unwrap();
        let err = config.load_data::<f64>().unwrap_err();
        assert!(matches!(err, KClusterError::Config(_)));
    }
}
