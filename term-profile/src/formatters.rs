//! Rendering of profile results.
//!
//! A [`ProfileResult`] can be written as JSON for dashboards and other tools,
//! or as plain text tables for the console. [`metrics_table`] exposes the
//! per-feature rows both renderers share.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array};
//! use arrow::record_batch::RecordBatch;
//! use term_profile::prelude::*;
//! use term_profile::formatters::{HumanFormatter, ProfileFormatter};
//!
//! let data = Dataset::new(
//!     RecordBatch::try_from_iter(vec![
//!         ("age", Arc::new(Int64Array::from(vec![31, 45, 27])) as ArrayRef),
//!     ])
//!     .unwrap(),
//! );
//! let result = DataProfileAnalyzer::new()
//!     .calculate(&data, None, &ColumnMapping::new())
//!     .unwrap();
//!
//! let output = HumanFormatter::new().format(&result).unwrap();
//! assert!(output.contains("age (num)"));
//! ```

use std::fmt::Write;

use serde::Serialize;

use crate::analyzers::profiler::{DatasetProfileStats, ProfileResult};
use crate::analyzers::stats::FeatureProfileStats;
use crate::analyzers::values::ProfileValue;
use crate::error::{ProfileError, Result};

/// Configuration options for rendering profile results.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include current-dataset statistics when present
    pub include_current: bool,
    /// Include the resolved column roles
    pub include_columns: bool,
    /// Include the target statistics
    pub include_target: bool,
    /// Maximum number of features to render (-1 for all)
    pub max_features: i32,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_current: true,
            include_columns: true,
            include_target: true,
            max_features: -1,
            use_colors: false,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing reference statistics only.
    pub fn minimal() -> Self {
        Self {
            include_current: false,
            include_columns: false,
            include_target: false,
            max_features: -1,
            use_colors: false,
        }
    }

    /// Sets whether to include current-dataset statistics.
    pub fn with_current(mut self, include: bool) -> Self {
        self.include_current = include;
        self
    }

    /// Sets whether to include resolved column roles.
    pub fn with_columns(mut self, include: bool) -> Self {
        self.include_columns = include;
        self
    }

    /// Sets the maximum number of features to render.
    pub fn with_max_features(mut self, max: i32) -> Self {
        self.max_features = max;
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

/// Trait for rendering profile results into an output format.
pub trait ProfileFormatter {
    /// Formats a profile result into a string representation.
    fn format(&self, result: &ProfileResult) -> Result<String>;

    /// Formats a profile result with custom configuration.
    fn format_with_config(
        &self,
        result: &ProfileResult,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(result)
    }
}

/// One statistic of one feature, with a value per dataset side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub label: &'static str,
    /// Reference value, followed by the current value when a current dataset was profiled
    pub values: Vec<Option<String>>,
}

/// Builds the metric rows of `feature`, in statistic record order.
///
/// Fails with [`ProfileError::ColumnNotFound`] when the feature was not profiled.
pub fn metrics_table(result: &ProfileResult, feature: &str) -> Result<Vec<MetricRow>> {
    let reference = result
        .reference_features_stats
        .get(feature)
        .ok_or_else(|| ProfileError::column_not_found(feature, "reference"))?;
    let current = match &result.current_features_stats {
        Some(stats) => Some(
            stats
                .get(feature)
                .ok_or_else(|| ProfileError::column_not_found(feature, "current"))?,
        ),
        None => None,
    };

    let reference_cells = metric_cells(reference);
    let current_cells = current.map(metric_cells);

    Ok(reference_cells
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let mut values = vec![value];
            if let Some(cells) = &current_cells {
                values.push(cells[i].1.clone());
            }
            MetricRow { label, values }
        })
        .collect())
}

fn metric_cells(stats: &FeatureProfileStats) -> Vec<(&'static str, Option<String>)> {
    fn int(value: Option<u64>) -> Option<String> {
        value.map(|v| v.to_string())
    }
    fn float(value: Option<f64>) -> Option<String> {
        value.map(|v| v.to_string())
    }
    fn profile(value: &Option<ProfileValue>) -> Option<String> {
        value.as_ref().map(ProfileValue::to_string)
    }

    vec![
        ("feature_type", Some(stats.feature_type.to_string())),
        ("count", Some(stats.count.to_string())),
        ("infinite_count", int(stats.infinite_count)),
        ("infinite_fraction", float(stats.infinite_fraction)),
        ("missing_count", int(stats.missing_count)),
        ("missing_fraction", float(stats.missing_fraction)),
        ("unique", int(stats.unique)),
        ("unique_fraction", float(stats.unique_fraction)),
        ("percentile_25", float(stats.percentile_25)),
        ("percentile_50", float(stats.percentile_50)),
        ("percentile_75", float(stats.percentile_75)),
        ("max", profile(&stats.max)),
        ("min", profile(&stats.min)),
        ("mean", float(stats.mean)),
        ("most_common_value", profile(&stats.most_common_value)),
        (
            "most_common_value_fraction",
            float(stats.most_common_value_fraction),
        ),
        ("std", float(stats.std)),
        (
            "most_common_not_null_value",
            profile(&stats.most_common_not_null_value),
        ),
        (
            "most_common_not_null_value_fraction",
            float(stats.most_common_not_null_value_fraction),
        ),
        (
            "new_in_current_values_count",
            int(stats.new_in_current_values_count),
        ),
        (
            "unused_in_current_values_count",
            int(stats.unused_in_current_values_count),
        ),
    ]
}

/// Formats profile results as structured JSON.
///
/// The output keeps every statistic field, with `null` where a value is unset.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    /// Creates a new JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileFormatter for JsonFormatter {
    fn format(&self, result: &ProfileResult) -> Result<String> {
        self.format_with_config(result, &self.config)
    }

    fn format_with_config(&self, result: &ProfileResult, config: &FormatterConfig) -> Result<String> {
        let filtered = filter_result_for_config(result, config);
        let output = if self.pretty {
            serde_json::to_string_pretty(&filtered)?
        } else {
            serde_json::to_string(&filtered)?
        };
        Ok(output)
    }
}

/// Formats profile results as plain text tables, one per feature.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a new human formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    /// Creates a new human formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileFormatter for HumanFormatter {
    fn format(&self, result: &ProfileResult) -> Result<String> {
        self.format_with_config(result, &self.config)
    }

    fn format_with_config(&self, result: &ProfileResult, config: &FormatterConfig) -> Result<String> {
        let result = filter_result_for_config(result, config);
        let mut output = String::new();

        writeln!(output)?;
        let title = "Data Profile";
        if config.use_colors {
            writeln!(output, "\x1b[1m{title}\x1b[0m")?;
        } else {
            writeln!(output, "{title}")?;
        }

        if config.include_columns {
            let utility = &result.columns.utility_columns;
            writeln!(output)?;
            writeln!(output, "Columns:")?;
            writeln!(output, "   Target: {}", utility.target.as_deref().unwrap_or("-"))?;
            writeln!(output, "   Date: {}", utility.date.as_deref().unwrap_or("-"))?;
            writeln!(output, "   Id: {}", utility.id_column.as_deref().unwrap_or("-"))?;
            writeln!(
                output,
                "   Numerical: {}",
                result.columns.num_feature_names.join(", ")
            )?;
            writeln!(
                output,
                "   Categorical: {}",
                result.columns.cat_feature_names.join(", ")
            )?;
            writeln!(
                output,
                "   Datetime: {}",
                result.columns.datetime_feature_names.join(", ")
            )?;
        }

        let features = feature_names(&result.reference_features_stats);
        let shown = if config.max_features < 0 {
            features.as_slice()
        } else {
            let max = config.max_features as usize;
            &features[..std::cmp::min(max, features.len())]
        };

        let has_current = result.current_features_stats.is_some();
        for feature in shown {
            let stats = result.reference_features_stats.get(feature);
            let kind = stats.map(|s| s.feature_type.as_str()).unwrap_or("-");
            let rows = metrics_table(&result, feature)?;
            let width = rows.iter().map(|row| row.label.len()).max().unwrap_or(0);

            writeln!(output)?;
            writeln!(output, "{feature} ({kind})")?;
            if has_current {
                writeln!(output, "   {:<width$}  {:>12}  {:>12}", "", "reference", "current")?;
            }
            for row in rows {
                write!(output, "   {:<width$}", row.label)?;
                for value in &row.values {
                    write!(output, "  {:>12}", value.as_deref().unwrap_or("-"))?;
                }
                writeln!(output)?;
            }
        }

        if features.len() > shown.len() {
            writeln!(output)?;
            writeln!(
                output,
                "   ... and {} more features",
                features.len() - shown.len()
            )?;
        }

        writeln!(output)?;
        Ok(output)
    }
}

/// Feature names in rendering order: target, categorical, numerical, datetime.
fn feature_names(stats: &DatasetProfileStats) -> Vec<String> {
    stats
        .target_stats
        .keys()
        .chain(stats.cat_features_stats.keys())
        .chain(stats.num_features_stats.keys())
        .chain(stats.datetime_features_stats.keys())
        .cloned()
        .collect()
}

/// Drops the parts of a result a configuration excludes.
fn filter_result_for_config(result: &ProfileResult, config: &FormatterConfig) -> ProfileResult {
    let mut filtered = result.clone();
    if !config.include_current {
        filtered.current_features_stats = None;
    }
    if !config.include_target {
        filtered.reference_features_stats.target_stats.clear();
        if let Some(current) = filtered.current_features_stats.as_mut() {
            current.target_stats.clear();
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::profiler::DataProfileAnalyzer;
    use crate::dataset::Dataset;
    use crate::mapping::ColumnMapping;
    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn dataset(x: Vec<f64>, plan: Vec<&str>, target: Vec<i64>) -> Dataset {
        Dataset::new(
            RecordBatch::try_from_iter(vec![
                ("x", Arc::new(Float64Array::from(x)) as ArrayRef),
                ("plan", Arc::new(StringArray::from(plan)) as ArrayRef),
                ("target", Arc::new(Int64Array::from(target)) as ArrayRef),
            ])
            .unwrap(),
        )
    }

    fn result(with_current: bool) -> ProfileResult {
        let reference = dataset(vec![1.0, 2.0, 3.0], vec!["a", "b", "a"], vec![0, 1, 1]);
        let current = dataset(vec![2.0, 4.0], vec!["a", "c"], vec![1, 1]);
        let mapping = ColumnMapping::builder().target("target").build();
        DataProfileAnalyzer::new()
            .calculate(&reference, with_current.then_some(&current), &mapping)
            .unwrap()
    }

    #[test]
    fn test_metrics_table_reference_only() {
        let rows = metrics_table(&result(false), "x").unwrap();
        assert_eq!(rows.len(), 21);
        assert_eq!(rows[0].label, "feature_type");
        assert_eq!(rows[0].values, vec![Some("num".to_string())]);
        assert_eq!(rows[1].values, vec![Some("3".to_string())]);
        let mean = rows.iter().find(|r| r.label == "mean").unwrap();
        assert_eq!(mean.values, vec![Some("2".to_string())]);
        let new_values = rows.last().unwrap();
        assert_eq!(new_values.values, vec![None]);
    }

    #[test]
    fn test_metrics_table_with_current() {
        let rows = metrics_table(&result(true), "plan").unwrap();
        let new_values = rows
            .iter()
            .find(|r| r.label == "new_in_current_values_count")
            .unwrap();
        assert_eq!(new_values.values, vec![None, Some("1".to_string())]);
        let mode = rows.iter().find(|r| r.label == "most_common_value").unwrap();
        assert_eq!(mode.values[0].as_deref(), Some("a"));
    }

    #[test]
    fn test_metrics_table_unknown_feature() {
        let err = metrics_table(&result(false), "nope").unwrap_err();
        assert!(matches!(err, ProfileError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_json_formatter() {
        let output = JsonFormatter::new().format(&result(true)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            parsed["reference_features_stats"]["num_features_stats"]["x"]["feature_type"],
            "num"
        );
        assert!(parsed["reference_features_stats"]["num_features_stats"]["x"]
            .as_object()
            .unwrap()
            .contains_key("most_common_not_null_value"));
        assert_eq!(
            parsed["current_features_stats"]["cat_features_stats"]["plan"]
                ["new_in_current_values_count"],
            1
        );

        let compact = JsonFormatter::new().with_pretty(false).format(&result(true)).unwrap();
        assert!(!compact.contains('\n'));
        let roundtrip: ProfileResult = serde_json::from_str(&compact).unwrap();
        assert_eq!(roundtrip, result(true));
    }

    #[test]
    fn test_json_formatter_minimal_config() {
        let output = JsonFormatter::with_config(FormatterConfig::minimal())
            .format(&result(true))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed["current_features_stats"].is_null());
        assert!(parsed["reference_features_stats"]["target_stats"]
            .as_object()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_human_formatter() {
        let output = HumanFormatter::new().format(&result(true)).unwrap();
        assert!(output.contains("Data Profile"));
        assert!(output.contains("Target: target"));
        assert!(output.contains("x (num)"));
        assert!(output.contains("plan (cat)"));
        assert!(output.contains("target (num)"));
        assert!(output.contains("reference"));
        assert!(output.contains("current"));

        let target = output.find("target (num)").unwrap();
        let plan = output.find("plan (cat)").unwrap();
        let x = output.find("x (num)").unwrap();
        assert!(target < plan && plan < x);
    }

    #[test]
    fn test_metric_rows_serialize_as_label_values() {
        let rows = metrics_table(&result(true), "x").unwrap();
        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json, serde_json::json!({"label": "count", "values": ["3", "2"]}));
    }

    #[test]
    fn test_human_formatter_limits_features() {
        let config = FormatterConfig::default()
            .with_max_features(1)
            .with_columns(false)
            .with_current(false);
        let output = HumanFormatter::with_config(config).format(&result(true)).unwrap();
        assert!(output.contains("target (num)"));
        assert!(!output.contains("plan (cat)"));
        assert!(output.contains("... and 2 more features"));
        assert!(!output.contains("Columns:"));
    }
}
