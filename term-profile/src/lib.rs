//! # term-profile - Feature Profiling for Rust
//!
//! term-profile computes descriptive statistics for every feature of a tabular
//! dataset, and compares a *reference* dataset against an optional *current*
//! one. It is the data layer behind feature overview dashboards: per column it
//! reports counts, missing and infinite values, uniqueness, the most common
//! value, percentiles and spread, and for categorical features how many
//! categories appeared or disappeared between the two datasets.
//!
//! Datasets are Apache Arrow record batches. They can be built in memory, read
//! from CSV, or collected from a DataFusion table.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
//! use arrow::record_batch::RecordBatch;
//! use term_profile::prelude::*;
//!
//! # fn main() -> term_profile::Result<()> {
//! let reference = Dataset::new(
//!     RecordBatch::try_from_iter(vec![
//!         ("income", Arc::new(Float64Array::from(vec![1.5, f64::NAN, 3.0, 2.0])) as ArrayRef),
//!         ("plan", Arc::new(StringArray::from(vec!["free", "pro", "free", "team"])) as ArrayRef),
//!         ("churned", Arc::new(Int64Array::from(vec![0, 1, 0, 0])) as ArrayRef),
//!     ])?,
//! );
//!
//! let mapping = ColumnMapping::builder()
//!     .target("churned")
//!     .task(TaskType::Classification)
//!     .build();
//!
//! let result = DataProfileAnalyzer::new().calculate(&reference, None, &mapping)?;
//! let stats = &result.reference_features_stats;
//!
//! let income = stats.get("income").unwrap();
//! assert_eq!(income.count, 3);
//! assert_eq!(income.missing_count, Some(1));
//!
//! let churned = stats.get("churned").unwrap();
//! assert_eq!(churned.feature_type, FeatureKind::Cat);
//! assert_eq!(churned.most_common_value, Some(ProfileValue::Int(0)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Comparing datasets
//!
//! Pass a current dataset to profile both sides with the same column roles.
//! Categorical statistics of the current side then carry
//! `new_in_current_values_count` and `unused_in_current_values_count`.
//!
//! ## Logging
//!
//! Profiling is instrumented with `tracing`. Use
//! [`logging::setup::init_logging`] to install a subscriber, and [`LogConfig`]
//! to enable per-column events.

pub mod analyzers;
pub mod dataset;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod mapping;
pub mod prelude;

pub use error::{ProfileError, Result};
pub use logging::LogConfig;
