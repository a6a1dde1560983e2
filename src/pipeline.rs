//! One upload, one pass: select → scale → cluster → project → assemble.

use std::io::Read;
use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::cluster::DBSCAN;
use crate::config::PipelineConfig;
use crate::dataset::Table;
use crate::decomposition::{Projection, project_2d};
use crate::error::Result;
use crate::metrics::{AnomalySummary, ClusterDistribution};
use crate::preprocessing::{FeatureSelector, Scaler};
use crate::result::ResultTable;

/// Everything a front end renders after a successful run.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    /// First rows of the upload after the named columns were dropped
    pub preview: Table,
    /// Column names at the same stage as `preview`
    pub columns: Vec<String>,
    pub result: ResultTable,
    pub distribution: ClusterDistribution,
    pub anomalies: AnomalySummary,
    /// 2D coordinates for plotting; never part of the exported file
    pub projection: Projection,
}

/// The composed pipeline. Holds only read-only state, so one instance can
/// serve any number of runs.
#[derive(Clone, Debug)]
pub struct Pipeline {
    scaler: Arc<Scaler>,
    selector: FeatureSelector,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(scaler: Arc<Scaler>, config: PipelineConfig) -> Result<Self> {
        // Reject bad clustering parameters before the first upload.
        config.cluster.build()?;

        let selector = FeatureSelector::new().drop_columns(config.drop_columns.iter().cloned());
        Ok(Self {
            scaler,
            selector,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    /// Parse an uploaded CSV and run it. Parse failures surface before any stage runs.
    pub fn run_csv<R: Read>(&self, reader: R) -> Result<PipelineOutput> {
        let table = Table::from_csv_reader(reader)?;
        info!(
            rows = table.n_rows(),
            columns = table.n_columns(),
            "upload parsed"
        );
        self.run(&table)
    }

    pub fn run(&self, table: &Table) -> Result<PipelineOutput> {
        let span = info_span!("pipeline", rows = table.n_rows());
        let _guard = span.enter();

        let named = self.selector.drop_named(table);
        let preview = named.head(self.config.preview_rows);
        let columns = named.columns().to_vec();

        let selected = self.selector.select(table)?;
        info!(
            features = selected.n_columns(),
            rows = selected.n_rows(),
            "features selected"
        );

        let scaled = self.scaler.transform(&selected)?;
        debug!(shape = ?scaled.shape(), "scaled");

        let mut dbscan: DBSCAN = self.config.cluster.build()?;
        let labels = dbscan.fit_predict(&scaled)?;

        let projection = project_2d(&scaled)?;

        let result = ResultTable::assemble(selected, labels)?;
        let distribution = result.distribution();
        let anomalies = result.anomalies();
        info!(
            clusters = distribution.n_clusters(),
            anomalies = anomalies.anomalies,
            total = anomalies.total,
            "clustering complete"
        );

        Ok(PipelineOutput {
            preview,
            columns,
            result,
            distribution,
            anomalies,
            projection,
        })
    }
}
