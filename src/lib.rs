//! Density-based anomaly detection for tabular CSV data.
//!
//! A single upload flows through one linear pipeline:
//! feature selection, scaling with a pre-fitted [`Scaler`], DBSCAN clustering,
//! a 2D principal-component projection for plotting, and result assembly.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use anomalyscan::{Pipeline, PipelineConfig, Scaler};
//!
//! let scaler = Arc::new(Scaler::from_path("scaler.json")?);
//! let pipeline = Pipeline::new(scaler, PipelineConfig::default())?;
//!
//! let file = std::fs::File::open("transactions.csv")?;
//! let output = pipeline.run_csv(file)?;
//! println!("{}", output.anomalies);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod cluster;
pub mod config;
pub mod dataset;
pub mod decomposition;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod result;

pub use cluster::{ClusterLabel, ClusterParams, DBSCAN, NOISE};
pub use crate::config::{PipelineConfig, Settings};
pub use dataset::{Table, Value};
pub use decomposition::{PCA, Projection, ProjectionPoint, project_2d};
pub use error::{Error, Result};
pub use metrics::{AnomalySummary, ClusterDistribution, anomaly_ratio, cluster_distribution};
pub use pipeline::{Pipeline, PipelineOutput};
pub use preprocessing::{FeatureSelector, Scaler, ScalingMethod};
pub use result::ResultTable;

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;
