//! Plain-text renderings of a pipeline run, and the scatter-plot data file.

use std::fmt::Write as _;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cluster::ClusterLabel;
use crate::dataset::Table;
use crate::decomposition::Projection;
use crate::error::Result;
use crate::metrics::ClusterDistribution;
use crate::pipeline::PipelineOutput;
use crate::result::persist_atomically;

/// Render a table as aligned text columns.
pub fn render_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(j, name)| {
            cells
                .iter()
                .map(|row| row[j].chars().count())
                .fold(name.chars().count(), usize::max)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = table
        .columns()
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{:>w$}", name, w = *w))
        .collect();
    let _ = writeln!(out, "{}", header.join("  "));

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:>w$}", cell, w = *w))
            .collect();
        let _ = writeln!(out, "{}", line.join("  "));
    }

    out
}

pub fn render_distribution(distribution: &ClusterDistribution) -> String {
    let mut out = String::from("Cluster  Count\n");
    for (label, count) in distribution.entries() {
        let _ = writeln!(out, "{:>7}  {:>5}", label, count);
    }
    out
}

/// Full text report of a successful run, in display order.
pub fn render(output: &PipelineOutput) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Dataset Preview");
    out.push_str(&render_table(&output.preview));
    let _ = writeln!(out);
    let _ = writeln!(out, "Columns: {}", output.columns.join(", "));
    let _ = writeln!(out);
    let _ = writeln!(out, "Cluster Distribution");
    out.push_str(&render_distribution(&output.distribution));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", output.anomalies);
    let [pc1, pc2] = output.projection.explained_variance_ratio;
    let _ = writeln!(
        out,
        "PCA projection explains {:.2}% + {:.2}% of variance",
        pc1 * 100.0,
        pc2 * 100.0
    );

    out
}

/// Write `PCA1,PCA2,Cluster` rows for an external scatter plot.
pub fn write_plot_data<W: Write>(
    projection: &Projection,
    labels: &[ClusterLabel],
    writer: W,
) -> Result<()> {
    let points = projection.with_labels(labels)?;

    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["PCA1", "PCA2", "Cluster"])?;
    for p in points {
        writer.write_record([p.x.to_string(), p.y.to_string(), p.cluster.to_string()])?;
    }
    writer.flush()?;

    Ok(())
}

/// Like [`write_plot_data`], but to a file that appears only once complete.
pub fn save_plot_data<P: AsRef<Path>>(
    projection: &Projection,
    labels: &[ClusterLabel],
    path: P,
) -> Result<()> {
    persist_atomically(path.as_ref(), |file| {
        write_plot_data(projection, labels, BufWriter::new(file))
    })
}
