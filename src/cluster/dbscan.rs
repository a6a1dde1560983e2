use std::collections::{HashSet, VecDeque};

use tracing::debug;

use super::{ClusterLabel, NOISE};
use crate::Matrix;
use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct DBSCAN {
    pub labels: Option<Vec<ClusterLabel>>,
    pub core_sample_indices: Option<Vec<usize>>,
    eps: f64,
    min_samples: usize,
}

impl DBSCAN {
    pub fn new(eps: f64, min_samples: usize) -> Result<Self> {
        if !eps.is_finite() || eps <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "eps",
                message: format!("must be a finite value > 0, got {}", eps),
            });
        }
        if min_samples == 0 {
            return Err(Error::InvalidParameter {
                name: "min_samples",
                message: "must be > 0".to_string(),
            });
        }

        Ok(Self {
            labels: None,
            core_sample_indices: None,
            eps,
            min_samples,
        })
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    pub fn fit(&mut self, x: &Matrix) -> Result<()> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(Error::NoSamples);
        }

        let n_samples = x.nrows();
        let neighborhoods: Vec<Vec<usize>> = (0..n_samples)
            .map(|i| self.region_query(x, i))
            .collect();
        let is_core: Vec<bool> = neighborhoods
            .iter()
            .map(|n| n.len() >= self.min_samples)
            .collect();

        let mut labels = vec![NOISE; n_samples];
        let mut current_cluster: ClusterLabel = 0;

        // Clusters grow from cores in index order; a border point stays with
        // the first cluster that reaches it.
        for seed in 0..n_samples {
            if !is_core[seed] || labels[seed] != NOISE {
                continue;
            }

            labels[seed] = current_cluster;
            let mut queue: VecDeque<usize> = VecDeque::from([seed]);

            while let Some(idx) = queue.pop_front() {
                for &neighbor in &neighborhoods[idx] {
                    if labels[neighbor] != NOISE {
                        continue;
                    }
                    labels[neighbor] = current_cluster;
                    if is_core[neighbor] {
                        queue.push_back(neighbor);
                    }
                }
            }

            current_cluster += 1;
        }

        let core_samples: Vec<usize> = (0..n_samples).filter(|&i| is_core[i]).collect();
        debug!(
            n_samples,
            n_clusters = current_cluster,
            n_core = core_samples.len(),
            "dbscan fit"
        );

        self.labels = Some(labels);
        self.core_sample_indices = Some(core_samples);

        Ok(())
    }

    pub fn fit_predict(&mut self, x: &Matrix) -> Result<Vec<ClusterLabel>> {
        self.fit(x)?;
        Ok(self.labels.clone().unwrap_or_default())
    }

    // The neighborhood of a point includes the point itself.
    fn region_query(&self, x: &Matrix, point_idx: usize) -> Vec<usize> {
        let point = x.row(point_idx);
        let eps_sq = self.eps * self.eps;

        x.rows()
            .into_iter()
            .enumerate()
            .filter(|(_, other)| {
                point
                    .iter()
                    .zip(other.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>()
                    <= eps_sq
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn get_n_clusters(&self) -> Option<usize> {
        self.labels.as_ref().map(|labels| {
            let unique_clusters: HashSet<ClusterLabel> =
                labels.iter().copied().filter(|&l| l != NOISE).collect();
            unique_clusters.len()
        })
    }

    pub fn get_n_noise_points(&self) -> Option<usize> {
        self.labels
            .as_ref()
            .map(|labels| labels.iter().filter(|&&l| l == NOISE).count())
    }

    pub fn is_core_sample(&self, sample_idx: usize) -> Option<bool> {
        self.core_sample_indices
            .as_ref()
            .map(|core_indices| core_indices.binary_search(&sample_idx).is_ok())
    }
}
