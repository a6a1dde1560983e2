//! Layered settings: defaults, an optional TOML file, then `ANOMALYSCAN__*`
//! environment variables.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::cluster::ClusterParams;
use crate::error::Result;
use crate::preprocessing::DEFAULT_DROP_COLUMNS;

pub const ENV_PREFIX: &str = "ANOMALYSCAN";

/// Knobs of one pipeline pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Exact, case-sensitive names of non-feature columns
    pub drop_columns: Vec<String>,

    /// DBSCAN parameters fixed for the deployment
    pub cluster: ClusterParams,

    /// Rows shown in the dataset preview
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            drop_columns: DEFAULT_DROP_COLUMNS.iter().map(|c| c.to_string()).collect(),
            cluster: ClusterParams::default(),
            preview_rows: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pre-fitted scaler artifact, required at startup
    pub scaler_path: PathBuf,

    /// Where the clustered CSV is written
    pub output_path: PathBuf,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    pub pipeline: PipelineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scaler_path: PathBuf::from("scaler.json"),
            output_path: PathBuf::from("dbscan_clustered_output.csv"),
            log_level: "info".to_string(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings, reading `file` when given (it must exist then).
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("pipeline.drop_columns"),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.pipeline.cluster.eps, 1.5);
        assert_eq!(settings.pipeline.cluster.min_samples, 5);
        assert_eq!(settings.pipeline.drop_columns, vec!["Class", "Time"]);
        assert_eq!(
            settings.output_path,
            PathBuf::from("dbscan_clustered_output.csv")
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
scaler_path = "models/scaler.json"

[pipeline]
preview_rows = 10
drop_columns = ["Class", "Time", "Id"]
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.scaler_path, PathBuf::from("models/scaler.json"));
        assert_eq!(settings.pipeline.preview_rows, 10);
        assert_eq!(settings.pipeline.drop_columns.len(), 3);
        assert_eq!(settings.pipeline.cluster, ClusterParams::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/anomalyscan.toml"))).is_err());
    }
}
