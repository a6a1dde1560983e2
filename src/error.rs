use thiserror::Error;

/// Errors raised by any stage of the anomaly pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The uploaded file could not be parsed as a CSV table.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// No numeric feature column survived selection.
    #[error("no numeric feature columns remain after selection (dropped: {dropped:?})")]
    NoFeatures {
        /// Columns removed during selection.
        dropped: Vec<String>,
    },

    /// Feature columns survived but no complete row did.
    #[error("no complete rows remain after removing rows with missing values")]
    NoSamples,

    /// Table columns disagree with what the scaler was fitted on.
    #[error(
        "feature mismatch: scaler expects {expected} features, table has {found} \
         (missing: {missing:?}, unexpected: {unexpected:?})"
    )]
    FeatureMismatch {
        expected: usize,
        found: usize,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// Label count does not match the table it is joined onto.
    #[error("length mismatch: {rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        name: &'static str,
        message: String,
    },

    /// The pre-fitted scaler artifact is missing or inconsistent.
    #[error("scaler artifact: {0}")]
    ScalerArtifact(String),

    #[error("configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// True for errors caused by the uploaded data rather than the deployment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedInput(_)
                | Error::NoFeatures { .. }
                | Error::NoSamples
                | Error::FeatureMismatch { .. }
        )
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
