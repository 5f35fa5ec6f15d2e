//! Reference/current feature profiling.
//!
//! The [`DataProfileAnalyzer`] drives a full profile run:
//!
//! **Step 1: Column classification**
//! - Resolve utility columns (date, id, target, prediction) from the mapping
//! - Partition the remaining reference columns into numerical, categorical and
//!   datetime features
//!
//! **Step 2: Per-column statistics**
//! - Profile every feature column and the target on the reference dataset
//! - Repeat on the current dataset when one is supplied
//!
//! **Step 3: Category deltas**
//! - For categorical columns, count values new in current and unused in current,
//!   attached to the current-side statistics
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Float64Array, StringArray};
//! use arrow::record_batch::RecordBatch;
//! use term_profile::analyzers::profiler::DataProfileAnalyzer;
//! use term_profile::dataset::Dataset;
//! use term_profile::mapping::ColumnMapping;
//!
//! let reference = Dataset::new(
//!     RecordBatch::try_from_iter(vec![
//!         ("price", Arc::new(Float64Array::from(vec![1.0, 2.0, 4.0])) as ArrayRef),
//!         ("plan", Arc::new(StringArray::from(vec!["a", "b", "a"])) as ArrayRef),
//!     ])
//!     .unwrap(),
//! );
//!
//! let analyzer = DataProfileAnalyzer::new();
//! let result = analyzer
//!     .calculate(&reference, None, &ColumnMapping::new())
//!     .unwrap();
//!
//! let price = &result.reference_features_stats.num_features_stats["price"];
//! assert_eq!(price.count, 3);
//! assert!(result.current_features_stats.is_none());
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::analyzers::columns::{classify, DatasetColumns};
use crate::analyzers::delta::category_delta;
use crate::analyzers::stats::{compute_feature_stats, FeatureKind, FeatureProfileStats};
use crate::dataset::{Dataset, DtypeClass};
use crate::error::{ProfileError, Result};
use crate::logging::{truncate_field, LogConfig};
use crate::mapping::{ColumnMapping, TaskType};
use crate::{log_column, log_data_op, perf_debug};

/// Column name to statistics, in resolved column order.
pub type FeatureStatsMap = IndexMap<String, FeatureProfileStats>;

/// Statistics of every profiled column of one dataset side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfileStats {
    pub num_features_stats: FeatureStatsMap,
    pub cat_features_stats: FeatureStatsMap,
    pub datetime_features_stats: FeatureStatsMap,
    pub target_stats: FeatureStatsMap,
}

impl DatasetProfileStats {
    /// Statistics of a column, searching features first and then the target.
    pub fn get(&self, column: &str) -> Option<&FeatureProfileStats> {
        self.num_features_stats
            .get(column)
            .or_else(|| self.cat_features_stats.get(column))
            .or_else(|| self.datetime_features_stats.get(column))
            .or_else(|| self.target_stats.get(column))
    }

    /// Number of profiled columns, target included.
    pub fn len(&self) -> usize {
        self.num_features_stats.len()
            + self.cat_features_stats.len()
            + self.datetime_features_stats.len()
            + self.target_stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn group_mut(&mut self, kind: FeatureKind) -> &mut FeatureStatsMap {
        match kind {
            FeatureKind::Num => &mut self.num_features_stats,
            FeatureKind::Cat => &mut self.cat_features_stats,
            FeatureKind::Datetime => &mut self.datetime_features_stats,
        }
    }
}

/// Outcome of a profile run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResult {
    pub columns: DatasetColumns,
    pub reference_features_stats: DatasetProfileStats,
    /// `None` when no current dataset was supplied
    pub current_features_stats: Option<DatasetProfileStats>,
}

/// Which dataset a column is being profiled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSide {
    Reference,
    Current,
}

impl DatasetSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetSide::Reference => "reference",
            DatasetSide::Current => "current",
        }
    }
}

/// Configuration for a profile run
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Profile the target column alongside the features
    pub profile_target: bool,
    /// Logging behavior during profiling
    pub log: LogConfig,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            profile_target: true,
            log: LogConfig::default(),
        }
    }
}

/// Progress callback for profiling operations
pub type ProgressCallback = Arc<dyn Fn(ProfilerProgress) + Send + Sync>;

/// Progress information during profiling
#[derive(Debug, Clone)]
pub struct ProfilerProgress {
    pub side: DatasetSide,
    pub column_name: String,
    pub feature_kind: FeatureKind,
    pub completed: usize,
    pub total: usize,
}

/// Builder for DataProfileAnalyzer
pub struct DataProfileAnalyzerBuilder {
    config: ProfilerConfig,
    progress_callback: Option<ProgressCallback>,
}

impl DataProfileAnalyzerBuilder {
    /// Enable or disable profiling of the target column
    pub fn profile_target(mut self, enable: bool) -> Self {
        self.config.profile_target = enable;
        self
    }

    /// Set the logging configuration
    pub fn log_config(mut self, log: LogConfig) -> Self {
        self.config.log = log;
        self
    }

    /// Set progress callback
    pub fn progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProfilerProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Build the DataProfileAnalyzer
    pub fn build(self) -> DataProfileAnalyzer {
        DataProfileAnalyzer {
            config: self.config,
            progress_callback: self.progress_callback,
        }
    }
}

/// Computes feature profiles of a reference and an optional current dataset.
#[derive(Clone)]
pub struct DataProfileAnalyzer {
    config: ProfilerConfig,
    progress_callback: Option<ProgressCallback>,
}

/// One column scheduled for profiling.
struct ProfileTask<'a> {
    column: &'a str,
    kind: FeatureKind,
    is_target: bool,
}

impl DataProfileAnalyzer {
    /// Create a new builder for DataProfileAnalyzer
    pub fn builder() -> DataProfileAnalyzerBuilder {
        DataProfileAnalyzerBuilder {
            config: ProfilerConfig::default(),
            progress_callback: None,
        }
    }

    /// Create a DataProfileAnalyzer with default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profiles `reference` and, if given, `current` under `mapping`.
    ///
    /// Columns are classified once, from the reference dataset. Every resolved
    /// column must also exist in `current`.
    #[instrument(skip_all, fields(reference_rows = reference.num_rows(), has_current = current.is_some()))]
    pub fn calculate(
        &self,
        reference: &Dataset,
        current: Option<&Dataset>,
        mapping: &ColumnMapping,
    ) -> Result<ProfileResult> {
        let start_time = std::time::Instant::now();
        let columns = classify(reference, mapping);

        log_data_op!(
            self.config.log,
            num_features = columns.num_feature_names.len(),
            cat_features = columns.cat_feature_names.len(),
            datetime_features = columns.datetime_feature_names.len(),
            target_column = ?columns.utility_columns.target,
            "Starting feature profiling"
        );

        let tasks = self.plan(&columns, reference, mapping);

        let reference_features_stats =
            self.profile_side(reference, None, DatasetSide::Reference, &tasks)?;
        let current_features_stats = current
            .map(|current| {
                self.profile_side(current, Some(reference), DatasetSide::Current, &tasks)
            })
            .transpose()?;

        info!(
            columns = tasks.len(),
            time_ms = start_time.elapsed().as_millis() as u64,
            "Completed feature profiling"
        );

        Ok(ProfileResult {
            columns,
            reference_features_stats,
            current_features_stats,
        })
    }

    /// Orders the columns to profile: numerical, categorical, datetime, target.
    fn plan<'a>(
        &self,
        columns: &'a DatasetColumns,
        reference: &Dataset,
        mapping: &ColumnMapping,
    ) -> Vec<ProfileTask<'a>> {
        let features = [
            (&columns.num_feature_names, FeatureKind::Num),
            (&columns.cat_feature_names, FeatureKind::Cat),
            (&columns.datetime_feature_names, FeatureKind::Datetime),
        ];
        let mut tasks: Vec<ProfileTask<'a>> = features
            .into_iter()
            .flat_map(|(names, kind)| {
                names.iter().map(move |column| ProfileTask {
                    column,
                    kind,
                    is_target: false,
                })
            })
            .collect();

        if self.config.profile_target {
            if let Some(target) = &columns.utility_columns.target {
                tasks.push(ProfileTask {
                    column: target,
                    kind: target_kind(reference, target, mapping.task),
                    is_target: true,
                });
            }
        }
        tasks
    }

    fn profile_side(
        &self,
        dataset: &Dataset,
        reference: Option<&Dataset>,
        side: DatasetSide,
        tasks: &[ProfileTask<'_>],
    ) -> Result<DatasetProfileStats> {
        let mut result = DatasetProfileStats::default();

        for (completed, task) in tasks.iter().enumerate() {
            let array = dataset
                .column(task.column)
                .ok_or_else(|| ProfileError::column_not_found(task.column, side.as_str()))?;
            let mut stats = compute_feature_stats(task.column, array, task.kind)?;

            if task.kind == FeatureKind::Cat {
                if let Some(reference) = reference {
                    let reference_array = reference.column(task.column).ok_or_else(|| {
                        ProfileError::column_not_found(task.column, DatasetSide::Reference.as_str())
                    })?;
                    let delta = category_delta(task.column, reference_array, array)?;
                    stats.new_in_current_values_count = Some(delta.new_count);
                    stats.unused_in_current_values_count = Some(delta.unused_count);
                }
            }

            log_column!(
                self.config.log,
                side = side.as_str(),
                column = task.column,
                kind = %task.kind,
                count = stats.count,
                most_common = %stats
                    .most_common_value
                    .as_ref()
                    .map(|v| truncate_field(&v.to_string(), self.config.log.max_field_length))
                    .unwrap_or_default(),
                "Profiled column"
            );
            self.report_progress(side, task, completed + 1, tasks.len());

            if task.is_target {
                result.target_stats.insert(task.column.to_string(), stats);
            } else {
                result
                    .group_mut(task.kind)
                    .insert(task.column.to_string(), stats);
            }
        }

        perf_debug!(
            self.config.log,
            side = side.as_str(),
            columns = result.len(),
            "Profiled dataset side"
        );
        Ok(result)
    }

    /// Report progress to callback if configured
    fn report_progress(
        &self,
        side: DatasetSide,
        task: &ProfileTask<'_>,
        completed: usize,
        total: usize,
    ) {
        if let Some(callback) = &self.progress_callback {
            callback(ProfilerProgress {
                side,
                column_name: task.column.to_string(),
                feature_kind: task.kind,
                completed,
                total,
            });
        }
    }
}

impl Default for DataProfileAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DataProfileAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProfileAnalyzer")
            .field("config", &self.config)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

/// Target kind from the declared task, falling back to the column's dtype.
fn target_kind(reference: &Dataset, target: &str, task: Option<TaskType>) -> FeatureKind {
    match task {
        Some(TaskType::Regression) => FeatureKind::Num,
        Some(TaskType::Classification) => FeatureKind::Cat,
        None => match reference.dtype_class(target) {
            Some(DtypeClass::Numeric) => FeatureKind::Num,
            _ => FeatureKind::Cat,
        },
    }
}
