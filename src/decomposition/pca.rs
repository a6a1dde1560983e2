use std::cmp::Ordering;

use ndarray::Axis;

use crate::error::{Error, Result};
use crate::{Matrix, Vector};

const JACOBI_MAX_SWEEPS: usize = 100;
const JACOBI_TOLERANCE: f64 = 1e-12;

#[derive(Clone, Debug)]
pub struct PCA {
    pub components: Option<Matrix>,
    pub explained_variance: Option<Vector>,
    pub explained_variance_ratio: Option<Vector>,
    pub mean: Option<Vector>,
    n_components: Option<usize>,
}

impl PCA {
    pub fn new() -> Self {
        Self {
            components: None,
            explained_variance: None,
            explained_variance_ratio: None,
            mean: None,
            n_components: None,
        }
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = Some(n_components);
        self
    }

    pub fn fit(&mut self, x: &Matrix) -> Result<()> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(Error::NoSamples);
        }

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_components = self.n_components.unwrap_or(n_features.min(n_samples));

        if n_components == 0 || n_components > n_features.min(n_samples) {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: format!(
                    "{} must be between 1 and min(n_samples, n_features)={}",
                    n_components,
                    n_features.min(n_samples)
                ),
            });
        }

        let mean = x.mean_axis(Axis(0)).ok_or(Error::NoSamples)?;
        let x_centered = x - &mean.view().insert_axis(Axis(0));

        let dof = (n_samples.max(2) - 1) as f64;
        let cov = x_centered.t().dot(&x_centered) / dof;

        let (eigenvalues, eigenvectors) = symmetric_eigen(&cov);

        let mut order: Vec<usize> = (0..n_features).collect();
        order.sort_by(|&a, &b| {
            eigenvalues[b]
                .partial_cmp(&eigenvalues[a])
                .unwrap_or(Ordering::Equal)
        });

        let mut components = Matrix::zeros((n_components, n_features));
        let mut explained_variance = Vector::zeros(n_components);
        for (i, &k) in order.iter().take(n_components).enumerate() {
            let mut v = eigenvectors.column(k).to_owned();
            // Sign convention: the largest-magnitude loading is positive.
            let pivot = v
                .iter()
                .copied()
                .fold(0.0_f64, |acc, c| if c.abs() > acc.abs() { c } else { acc });
            if pivot < 0.0 {
                v.mapv_inplace(|c| -c);
            }
            components.row_mut(i).assign(&v);
            explained_variance[i] = eigenvalues[k].max(0.0);
        }

        let total_variance: f64 = eigenvalues.iter().map(|v| v.max(0.0)).sum();
        let explained_variance_ratio = if total_variance > 0.0 {
            &explained_variance / total_variance
        } else {
            Vector::zeros(n_components)
        };

        self.components = Some(components);
        self.explained_variance = Some(explained_variance);
        self.explained_variance_ratio = Some(explained_variance_ratio);
        self.mean = Some(mean);

        Ok(())
    }

    pub fn transform(&self, x: &Matrix) -> Result<Matrix> {
        let (Some(components), Some(mean)) = (self.components.as_ref(), self.mean.as_ref()) else {
            return Err(Error::InvalidParameter {
                name: "pca",
                message: "not fitted, call fit() first".to_string(),
            });
        };

        if x.ncols() != mean.len() {
            return Err(Error::InvalidParameter {
                name: "x",
                message: format!(
                    "number of features ({}) doesn't match training data ({})",
                    x.ncols(),
                    mean.len()
                ),
            });
        }

        let x_centered = x - &mean.view().insert_axis(Axis(0));
        Ok(x_centered.dot(&components.t()))
    }

    pub fn fit_transform(&mut self, x: &Matrix) -> Result<Matrix> {
        self.fit(x)?;
        self.transform(x)
    }
}

impl Default for PCA {
    fn default() -> Self {
        Self::new()
    }
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns the eigenvalues and a matrix whose columns are the matching
/// unit eigenvectors.
fn symmetric_eigen(matrix: &Matrix) -> (Vector, Matrix) {
    let n = matrix.nrows();
    let mut a = matrix.clone();
    let mut v = Matrix::eye(n);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let mut off_diagonal = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off_diagonal += a[[p, q]] * a[[p, q]];
            }
        }
        let scale: f64 = a.iter().map(|x| x * x).sum::<f64>().max(f64::MIN_POSITIVE);
        if off_diagonal <= JACOBI_TOLERANCE * JACOBI_TOLERANCE * scale {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }

                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}
