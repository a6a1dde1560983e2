//! Dimensionality reduction for visualizing clustered data.
//!
//! - `PCA`: Principal Component Analysis
//! - `project_2d`: the two leading principal directions of a scaled matrix,
//!   ready to be plotted next to cluster labels
//!
//! # Examples
//!
//! ```rust
//! use anomalyscan::{PCA, project_2d};
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 2.0, 3.0],
//!     [4.0, 5.0, 7.0],
//!     [7.0, 8.0, 8.0]
//! ];
//!
//! let mut pca = PCA::new().n_components(2);
//! let transformed = pca.fit_transform(&x).unwrap();
//! assert_eq!(transformed.ncols(), 2);
//!
//! let projection = project_2d(&x).unwrap();
//! assert_eq!(projection.points.len(), 3);
//! ```

mod pca;

use serde::Serialize;
use tracing::debug;

use crate::Matrix;
use crate::cluster::ClusterLabel;
use crate::error::Result;

pub use pca::PCA;

/// Position of one row on the 2D scatter plot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub x: f64,
    pub y: f64,
}

/// A projected point joined with its cluster label, for plotting only.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub cluster: ClusterLabel,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub points: Vec<ProjectionPoint>,
    /// Share of total variance carried by each of the two axes.
    pub explained_variance_ratio: [f64; 2],
}

impl Projection {
    /// Join points with labels by row position.
    pub fn with_labels(&self, labels: &[ClusterLabel]) -> Result<Vec<PlotPoint>> {
        if labels.len() != self.points.len() {
            return Err(crate::Error::LengthMismatch {
                rows: self.points.len(),
                labels: labels.len(),
            });
        }

        Ok(self
            .points
            .iter()
            .zip(labels)
            .map(|(p, &cluster)| PlotPoint {
                x: p.x,
                y: p.y,
                cluster,
            })
            .collect())
    }
}

/// Project a scaled matrix onto its two directions of maximum variance.
///
/// With a single feature or a single row there is at most one component;
/// the second axis is then zero-filled so every row still gets a 2D point.
pub fn project_2d(x: &Matrix) -> Result<Projection> {
    let n_components = x.ncols().min(x.nrows()).min(2);
    let mut pca = PCA::new().n_components(n_components.max(1));
    let reduced = pca.fit_transform(x)?;

    let mut ratio = [0.0; 2];
    if let Some(r) = pca.explained_variance_ratio.as_ref() {
        for (slot, value) in ratio.iter_mut().zip(r.iter()) {
            *slot = *value;
        }
    }

    let points = reduced
        .rows()
        .into_iter()
        .map(|row| ProjectionPoint {
            x: row[0],
            y: if row.len() > 1 { row[1] } else { 0.0 },
        })
        .collect();

    debug!(n_components, explained = ?ratio, "projected to 2D");

    Ok(Projection {
        points,
        explained_variance_ratio: ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_project_keeps_row_count() {
        let x = array![
            [0.0, 1.0, 2.0, 3.0],
            [1.0, 0.0, 2.5, 2.0],
            [2.0, 2.0, 0.0, 1.0],
            [3.0, 1.5, 1.0, 0.0],
            [4.0, 3.0, 2.0, 1.0]
        ];

        let projection = project_2d(&x).unwrap();
        assert_eq!(projection.points.len(), 5);
        assert!(projection.explained_variance_ratio[0] >= projection.explained_variance_ratio[1]);
    }

    #[test]
    fn test_single_feature_zero_fills_second_axis() {
        let x = array![[1.0], [2.0], [4.0]];
        let projection = project_2d(&x).unwrap();
        assert!(projection.points.iter().all(|p| p.y == 0.0));
        assert!((projection.explained_variance_ratio[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_row_projects_to_origin() {
        let x = array![[3.0, -1.0, 2.0]];
        let projection = project_2d(&x).unwrap();
        assert_eq!(projection.points, vec![ProjectionPoint { x: 0.0, y: 0.0 }]);
    }

    #[test]
    fn test_with_labels() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [2.0, 0.5]];
        let projection = project_2d(&x).unwrap();

        let plot = projection.with_labels(&[0, 0, -1]).unwrap();
        assert_eq!(plot[2].cluster, -1);
        assert!(projection.with_labels(&[0]).is_err());
    }
}
