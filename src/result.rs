use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::cluster::ClusterLabel;
use crate::dataset::{Table, Value};
use crate::error::{Error, Result};
use crate::metrics::{AnomalySummary, ClusterDistribution, cluster_distribution};

pub const CLUSTER_COLUMN: &str = "Cluster";

/// Selected feature rows joined with their cluster label; the downloadable artifact.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultTable {
    table: Table,
    labels: Vec<ClusterLabel>,
}

impl ResultTable {
    /// Join labels onto rows by position.
    ///
    /// A feature column already named `Cluster` (say, from re-uploading an
    /// exported file) is replaced by the new labels.
    pub fn assemble(table: Table, labels: Vec<ClusterLabel>) -> Result<Self> {
        if table.n_rows() != labels.len() {
            return Err(Error::LengthMismatch {
                rows: table.n_rows(),
                labels: labels.len(),
            });
        }

        let table = match table.column_index(CLUSTER_COLUMN) {
            Some(idx) => {
                debug!("replacing existing {:?} column with new labels", CLUSTER_COLUMN);
                let keep: Vec<usize> = (0..table.n_columns()).filter(|&i| i != idx).collect();
                table.select_columns(&keep)
            }
            None => table,
        };

        Ok(Self { table, labels })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn labels(&self) -> &[ClusterLabel] {
        &self.labels
    }

    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    /// Header of the exported file: feature columns, then `Cluster`.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.table.columns().to_vec();
        columns.push(CLUSTER_COLUMN.to_string());
        columns
    }

    pub fn distribution(&self) -> ClusterDistribution {
        cluster_distribution(&self.labels)
    }

    pub fn anomalies(&self) -> AnomalySummary {
        AnomalySummary::from_labels(&self.labels)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.columns())?;

        for (row, label) in self.table.rows().iter().zip(&self.labels) {
            let mut record: Vec<String> = row.iter().map(Value::to_string).collect();
            record.push(label.to_string());
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }

    /// Write the export to `path`. The file appears only once fully written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persist_atomically(path.as_ref(), |file| self.write_csv(BufWriter::new(file)))
    }

    /// Parse an exported file back into a result table.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let table = Table::from_csv_reader(reader)?;
        let idx = table.column_index(CLUSTER_COLUMN).ok_or_else(|| {
            Error::MalformedInput(format!("missing {:?} column", CLUSTER_COLUMN))
        })?;

        let labels = table
            .column(idx)
            .enumerate()
            .map(|(i, v)| match v {
                Value::Number(n) if n.fract() == 0.0 => Ok(*n as ClusterLabel),
                _ => Err(Error::MalformedInput(format!(
                    "row {} has a non-integer cluster label",
                    i + 1
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Self::assemble(table, labels)
    }
}

/// Write through a temporary file in the target directory, then rename it
/// into place. On error the temporary file is removed and `path` is untouched.
pub(crate) fn persist_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(())
}
