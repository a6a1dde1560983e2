//! Density-based clustering.
//!
//! `DBSCAN` groups points whose `eps`-neighborhoods are dense enough and marks
//! everything unreachable from a dense region with [`NOISE`].
//!
//! # Examples
//!
//! ```rust
//! use anomalyscan::{DBSCAN, NOISE};
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 1.0],
//!     [1.2, 1.1],
//!     [1.1, 1.2],
//!     [8.0, 8.0],
//!     [8.1, 8.1],
//!     [8.2, 7.9],
//!     [15.0, 1.0] // Outlier
//! ];
//!
//! let mut dbscan = DBSCAN::new(1.0, 2).unwrap(); // eps=1.0, min_samples=2
//! let labels = dbscan.fit_predict(&x).unwrap();
//!
//! assert_eq!(dbscan.get_n_clusters(), Some(2));
//! assert_eq!(labels[6], NOISE);
//! ```

mod dbscan;

use serde::{Deserialize, Serialize};

pub use dbscan::DBSCAN;

/// Per-row cluster identifier. Non-negative values only group rows.
pub type ClusterLabel = i32;

/// Label reserved for rows not density-reachable from any core point.
pub const NOISE: ClusterLabel = -1;

pub const DEFAULT_EPS: f64 = 1.5;
pub const DEFAULT_MIN_SAMPLES: usize = 5;

/// Fixed DBSCAN parameters of a deployment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Neighborhood radius (Euclidean)
    pub eps: f64,
    /// Neighbors within `eps`, the point itself included, that make a core point
    pub min_samples: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl ClusterParams {
    pub fn build(&self) -> crate::Result<DBSCAN> {
        DBSCAN::new(self.eps, self.min_samples)
    }
}
