use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::cluster::{ClusterLabel, NOISE};

/// Row count per cluster label, most populated first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClusterDistribution {
    entries: Vec<(ClusterLabel, usize)>,
}

impl ClusterDistribution {
    pub fn entries(&self) -> &[(ClusterLabel, usize)] {
        &self.entries
    }

    pub fn count(&self, label: ClusterLabel) -> usize {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Number of proper clusters, noise excluded.
    pub fn n_clusters(&self) -> usize {
        self.entries.iter().filter(|(l, _)| *l != NOISE).count()
    }
}

pub fn cluster_distribution(labels: &[ClusterLabel]) -> ClusterDistribution {
    let mut counts: BTreeMap<ClusterLabel, usize> = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut entries: Vec<(ClusterLabel, usize)> = counts.into_iter().collect();
    // Stable sort keeps ascending label order among equal counts.
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    ClusterDistribution { entries }
}

pub fn anomaly_count(labels: &[ClusterLabel]) -> usize {
    labels.iter().filter(|&&l| l == NOISE).count()
}

/// Fraction of rows labeled as noise, in `[0, 1]`; zero for no rows.
pub fn anomaly_ratio(labels: &[ClusterLabel]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    anomaly_count(labels) as f64 / labels.len() as f64
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AnomalySummary {
    pub anomalies: usize,
    pub total: usize,
    pub ratio: f64,
}

impl AnomalySummary {
    pub fn from_labels(labels: &[ClusterLabel]) -> Self {
        Self {
            anomalies: anomaly_count(labels),
            total: labels.len(),
            ratio: anomaly_ratio(labels),
        }
    }

    pub fn percentage(&self) -> f64 {
        self.ratio * 100.0
    }
}

impl fmt::Display for AnomalySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Anomalies Detected: {} out of {} rows ({:.2}%)",
            self.anomalies,
            self.total,
            self.percentage()
        )
    }
}
