//! Prelude for commonly used types and traits in term-profile.

pub use crate::analyzers::{
    DataProfileAnalyzer, DatasetColumns, DatasetProfileStats, FeatureKind, FeatureProfileStats,
    ProfileResult, ProfileValue,
};
pub use crate::dataset::Dataset;
pub use crate::error::{ProfileError, Result};
pub use crate::formatters::{FormatterConfig, ProfileFormatter};
pub use crate::logging::LogConfig;
pub use crate::mapping::{ColumnMapping, Prediction, TaskType};
