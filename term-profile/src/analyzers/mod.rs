//! Feature profiling analyzers.
//!
//! Profiling a dataset pair happens in four stages, each in its own module:
//!
//! - **Values** (`values`): normalizes Arrow columns into [`Cell`]s, unifying
//!   nulls and NaN into a single missing marker
//! - **Columns** (`columns`): resolves utility columns and the numerical,
//!   categorical and datetime feature groups from a [`ColumnMapping`](crate::mapping::ColumnMapping)
//! - **Statistics** (`stats`): computes one [`FeatureProfileStats`] record per column
//! - **Delta** (`delta`): counts categories new in, or unused by, the current dataset
//!
//! The [`DataProfileAnalyzer`] in `profiler` runs the stages for a reference
//! dataset and an optional current dataset.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, StringArray};
//! use arrow::record_batch::RecordBatch;
//! use term_profile::analyzers::{DataProfileAnalyzer, FeatureKind};
//! use term_profile::dataset::Dataset;
//! use term_profile::mapping::ColumnMapping;
//!
//! let batch = |values: Vec<&str>| {
//!     Dataset::new(
//!         RecordBatch::try_from_iter(vec![(
//!             "country",
//!             Arc::new(StringArray::from(values)) as ArrayRef,
//!         )])
//!         .unwrap(),
//!     )
//! };
//! let reference = batch(vec!["de", "fr", "fr"]);
//! let current = batch(vec!["fr", "it"]);
//!
//! let result = DataProfileAnalyzer::new()
//!     .calculate(&reference, Some(&current), &ColumnMapping::new())
//!     .unwrap();
//!
//! let country = &result.current_features_stats.unwrap().cat_features_stats["country"];
//! assert_eq!(country.feature_type, FeatureKind::Cat);
//! assert_eq!(country.new_in_current_values_count, Some(1));
//! assert_eq!(country.unused_in_current_values_count, Some(1));
//! ```

pub mod columns;
pub mod delta;
pub mod profiler;
pub mod stats;
pub mod values;

pub use columns::{classify, DatasetColumns, DatasetUtilityColumns};
pub use delta::{category_delta, CategoryDelta};
pub use profiler::{
    DataProfileAnalyzer, DataProfileAnalyzerBuilder, DatasetProfileStats, DatasetSide,
    ProfileResult, ProfilerConfig, ProfilerProgress,
};
pub use stats::{compute_feature_stats, FeatureKind, FeatureProfileStats};
pub use values::{Cell, CellKey, ProfileValue};
