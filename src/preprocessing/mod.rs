//! Preparing uploaded tables for distance-based clustering.
//!
//! - `FeatureSelector`: drops label/timestamp columns, keeps complete numeric features
//! - `Scaler`: applies a pre-fitted per-feature affine transform
//!
//! # Examples
//!
//! ```rust
//! use anomalyscan::{FeatureSelector, Scaler, Table};
//!
//! let table = Table::from_csv_reader("Time,V1,V2,Class\n0,1.0,2.0,0\n1,3.0,4.0,1\n".as_bytes()).unwrap();
//! let selected = FeatureSelector::default().select(&table).unwrap();
//! assert_eq!(selected.columns(), &["V1", "V2"]);
//!
//! let scaler = Scaler::from_json(r#"{
//!     "kind": "standard",
//!     "feature_names": ["V1", "V2"],
//!     "mean": [2.0, 3.0],
//!     "scale": [1.0, 1.0]
//! }"#).unwrap();
//! let scaled = scaler.transform(&selected).unwrap();
//! assert_eq!(scaled[[0, 0]], -1.0);
//! ```

mod scaler;
mod selector;

pub use scaler::{Scaler, ScalingMethod};
pub use selector::{DEFAULT_DROP_COLUMNS, FeatureSelector};
