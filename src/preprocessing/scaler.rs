use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dataset::Table;
use crate::error::{Error, Result};
use crate::{Matrix, Vector};

/// Fitted parameters of a per-feature affine transform.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalingMethod {
    /// `(x - mean) / scale`
    Standard { mean: Vector, scale: Vector },
    /// `(x - data_min) / (data_max - data_min)` mapped onto `feature_range`
    MinMax {
        data_min: Vector,
        data_max: Vector,
        feature_range: (f64, f64),
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ScalerArtifact {
    Standard {
        feature_names: Option<Vec<String>>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    MinMax {
        feature_names: Option<Vec<String>>,
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "unit_range")]
        feature_range: (f64, f64),
    },
}

fn unit_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Pre-fitted normalizer, loaded once and shared read-only between runs.
#[derive(Clone, Debug, PartialEq)]
pub struct Scaler {
    feature_names: Option<Vec<String>>,
    method: ScalingMethod,
}

impl Scaler {
    pub fn standard(mean: Vector, scale: Vector) -> Result<Self> {
        Self::build(None, ScalingMethod::Standard { mean, scale })
    }

    pub fn min_max(data_min: Vector, data_max: Vector, feature_range: (f64, f64)) -> Result<Self> {
        Self::build(
            None,
            ScalingMethod::MinMax {
                data_min,
                data_max,
                feature_range,
            },
        )
    }

    /// Align input columns by name instead of by position.
    pub fn with_feature_names<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self.validate()?;
        Ok(self)
    }

    /// Load a JSON scaler artifact from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ScalerArtifact(format!("cannot read {}: {}", path.display(), e))
        })?;
        let scaler = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            n_features = scaler.n_features(),
            by_name = scaler.feature_names.is_some(),
            "scaler loaded"
        );
        Ok(scaler)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let artifact: ScalerArtifact =
            serde_json::from_str(text).map_err(|e| Error::ScalerArtifact(e.to_string()))?;

        match artifact {
            ScalerArtifact::Standard {
                feature_names,
                mean,
                scale,
            } => Self::build(
                feature_names,
                ScalingMethod::Standard {
                    mean: Vector::from(mean),
                    scale: Vector::from(scale),
                },
            ),
            ScalerArtifact::MinMax {
                feature_names,
                data_min,
                data_max,
                feature_range,
            } => Self::build(
                feature_names,
                ScalingMethod::MinMax {
                    data_min: Vector::from(data_min),
                    data_max: Vector::from(data_max),
                    feature_range,
                },
            ),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let feature_names = self.feature_names.clone();
        let artifact = match &self.method {
            ScalingMethod::Standard { mean, scale } => ScalerArtifact::Standard {
                feature_names,
                mean: mean.to_vec(),
                scale: scale.to_vec(),
            },
            ScalingMethod::MinMax {
                data_min,
                data_max,
                feature_range,
            } => ScalerArtifact::MinMax {
                feature_names,
                data_min: data_min.to_vec(),
                data_max: data_max.to_vec(),
                feature_range: *feature_range,
            },
        };
        serde_json::to_string_pretty(&artifact).map_err(|e| Error::ScalerArtifact(e.to_string()))
    }

    fn build(feature_names: Option<Vec<String>>, method: ScalingMethod) -> Result<Self> {
        let scaler = Self {
            feature_names,
            method,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> Result<()> {
        let (a, b) = match &self.method {
            ScalingMethod::Standard { mean, scale } => (mean, scale),
            ScalingMethod::MinMax {
                data_min, data_max, ..
            } => (data_min, data_max),
        };

        if a.is_empty() {
            return Err(Error::ScalerArtifact("scaler has no features".to_string()));
        }
        if a.len() != b.len() {
            return Err(Error::ScalerArtifact(format!(
                "parameter lengths differ: {} vs {}",
                a.len(),
                b.len()
            )));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(Error::ScalerArtifact(
                "parameters must be finite".to_string(),
            ));
        }
        if let ScalingMethod::MinMax { feature_range, .. } = &self.method {
            if !(feature_range.0 < feature_range.1) {
                return Err(Error::ScalerArtifact(format!(
                    "feature_range {:?} must be increasing",
                    feature_range
                )));
            }
        }
        if let Some(names) = &self.feature_names {
            if names.len() != a.len() {
                return Err(Error::ScalerArtifact(format!(
                    "{} feature names for {} features",
                    names.len(),
                    a.len()
                )));
            }
            for (i, name) in names.iter().enumerate() {
                if names[..i].contains(name) {
                    return Err(Error::ScalerArtifact(format!(
                        "duplicate feature name {:?}",
                        name
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn n_features(&self) -> usize {
        match &self.method {
            ScalingMethod::Standard { mean, .. } => mean.len(),
            ScalingMethod::MinMax { data_min, .. } => data_min.len(),
        }
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn method(&self) -> &ScalingMethod {
        &self.method
    }

    /// Column positions in `table` feeding each scaler feature, in scaler order.
    fn align(&self, table: &Table) -> Result<Vec<usize>> {
        let expected = self.n_features();
        let found = table.n_columns();

        let Some(names) = &self.feature_names else {
            if found != expected {
                return Err(Error::FeatureMismatch {
                    expected,
                    found,
                    missing: Vec::new(),
                    unexpected: Vec::new(),
                });
            }
            warn!("scaler carries no feature names; aligning columns by position");
            return Ok((0..found).collect());
        };

        let missing: Vec<String> = names
            .iter()
            .filter(|n| table.column_index(n).is_none())
            .cloned()
            .collect();
        let unexpected: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| !names.contains(c))
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(Error::FeatureMismatch {
                expected,
                found,
                missing,
                unexpected,
            });
        }

        Ok(names
            .iter()
            .filter_map(|n| table.column_index(n))
            .collect())
    }

    /// Scale a selected, fully numeric table into a feature matrix.
    ///
    /// Infinite cells are rejected rather than scaled.
    pub fn transform(&self, table: &Table) -> Result<Matrix> {
        let order = self.align(table)?;
        let aligned = table.select_columns(&order);
        let data = aligned.to_matrix()?;

        if let Some(((i, j), v)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::MalformedInput(format!(
                "column {:?} row {} holds non-finite value {}",
                aligned.columns()[j],
                i + 1,
                v
            )));
        }

        Ok(self.transform_matrix(&data))
    }

    fn transform_matrix(&self, data: &Matrix) -> Matrix {
        let mut result = data.clone();
        match &self.method {
            ScalingMethod::Standard { mean, scale } => {
                let scale = scale.mapv(nonzero);
                for mut row in result.axis_iter_mut(ndarray::Axis(0)) {
                    row -= mean;
                    row /= &scale;
                }
            }
            ScalingMethod::MinMax {
                data_min,
                data_max,
                feature_range,
            } => {
                let range = (data_max - data_min).mapv(nonzero);
                let (lo, hi) = *feature_range;
                for mut row in result.axis_iter_mut(ndarray::Axis(0)) {
                    row -= data_min;
                    row /= &range;
                    row *= hi - lo;
                    row += lo;
                }
            }
        }
        result
    }
}

// Constant features keep their offset but are not stretched.
fn nonzero(v: f64) -> f64 {
    if v == 0.0 { 1.0 } else { v }
}
