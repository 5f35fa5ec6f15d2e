//! User-declared column roles and feature types.
//!
//! A [`ColumnMapping`] says which columns play a structural role (date, id,
//! target, prediction) and, optionally, which columns are numerical,
//! categorical or datetime features. Any feature list left unset is inferred
//! from the dataset's column types.
//!
//! # Example
//!
//! ```rust
//! use term_profile::mapping::{ColumnMapping, TaskType};
//!
//! let mapping = ColumnMapping::builder()
//!     .target("label")
//!     .prediction("score")
//!     .numerical_features(["age", "income"])
//!     .task(TaskType::Regression)
//!     .build();
//!
//! assert_eq!(mapping.target.as_deref(), Some("label"));
//! assert!(mapping.categorical_features.is_none());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The kind of model task the target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Classification,
    Regression,
}

/// One prediction column, or several (e.g. per-class probabilities).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for Prediction {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<String> for Prediction {
    fn from(name: String) -> Self {
        Self::Single(name)
    }
}

impl From<Vec<String>> for Prediction {
    fn from(names: Vec<String>) -> Self {
        Self::Multiple(names)
    }
}

impl From<Vec<&str>> for Prediction {
    fn from(names: Vec<&str>) -> Self {
        Self::Multiple(names.into_iter().map(str::to_string).collect())
    }
}

/// Column role and feature type declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    /// Date column used for time-ordering
    #[serde(alias = "date")]
    pub datetime: Option<String>,
    /// Row identifier column
    pub id: Option<String>,
    /// Target column
    pub target: Option<String>,
    /// Prediction column(s)
    pub prediction: Option<Prediction>,
    /// Explicit numerical features; `None` infers them from column types
    pub numerical_features: Option<Vec<String>>,
    /// Explicit categorical features; `None` infers them from column types
    pub categorical_features: Option<Vec<String>>,
    /// Explicit datetime features; `None` infers them from column types
    pub datetime_features: Option<Vec<String>>,
    /// Labels of a multi-class target
    pub target_names: Option<Vec<String>>,
    /// Task type, used to decide how the target is profiled
    pub task: Option<TaskType>,
}

impl ColumnMapping {
    /// Creates an empty mapping: no utility columns, all features inferred.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for a mapping.
    pub fn builder() -> ColumnMappingBuilder {
        ColumnMappingBuilder {
            mapping: Self::default(),
        }
    }

    /// Parses a mapping from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builder for [`ColumnMapping`].
#[derive(Debug, Clone)]
pub struct ColumnMappingBuilder {
    mapping: ColumnMapping,
}

fn names<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns.into_iter().map(Into::into).collect()
}

impl ColumnMappingBuilder {
    /// Set the date column
    pub fn datetime(mut self, column: impl Into<String>) -> Self {
        self.mapping.datetime = Some(column.into());
        self
    }

    /// Set the id column
    pub fn id(mut self, column: impl Into<String>) -> Self {
        self.mapping.id = Some(column.into());
        self
    }

    /// Set the target column
    pub fn target(mut self, column: impl Into<String>) -> Self {
        self.mapping.target = Some(column.into());
        self
    }

    /// Set the prediction column or columns
    pub fn prediction(mut self, prediction: impl Into<Prediction>) -> Self {
        self.mapping.prediction = Some(prediction.into());
        self
    }

    /// Declare the numerical features explicitly
    pub fn numerical_features<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mapping.numerical_features = Some(names(columns));
        self
    }

    /// Declare the categorical features explicitly
    pub fn categorical_features<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mapping.categorical_features = Some(names(columns));
        self
    }

    /// Declare the datetime features explicitly
    pub fn datetime_features<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mapping.datetime_features = Some(names(columns));
        self
    }

    /// Set the target labels
    pub fn target_names<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mapping.target_names = Some(names(labels));
        self
    }

    /// Set the task type
    pub fn task(mut self, task: TaskType) -> Self {
        self.mapping.task = Some(task);
        self
    }

    /// Build the mapping
    pub fn build(self) -> ColumnMapping {
        self.mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_every_option() {
        let mapping = ColumnMapping::builder()
            .datetime("ts")
            .id("row_id")
            .target("y")
            .prediction(vec!["p_a", "p_b"])
            .numerical_features(["n1"])
            .categorical_features(vec!["c1".to_string()])
            .datetime_features(Vec::<String>::new())
            .target_names(["a", "b"])
            .task(TaskType::Classification)
            .build();

        assert_eq!(mapping.datetime.as_deref(), Some("ts"));
        assert_eq!(mapping.id.as_deref(), Some("row_id"));
        assert_eq!(mapping.target.as_deref(), Some("y"));
        assert_eq!(
            mapping.prediction,
            Some(Prediction::Multiple(vec!["p_a".into(), "p_b".into()]))
        );
        assert_eq!(mapping.numerical_features, Some(vec!["n1".to_string()]));
        assert_eq!(mapping.categorical_features, Some(vec!["c1".to_string()]));
        assert_eq!(mapping.datetime_features, Some(vec![]));
        assert_eq!(mapping.target_names, Some(vec!["a".into(), "b".into()]));
        assert_eq!(mapping.task, Some(TaskType::Classification));
    }

    #[test]
    fn test_default_infers_everything() {
        let mapping = ColumnMapping::new();
        assert!(mapping.numerical_features.is_none());
        assert!(mapping.categorical_features.is_none());
        assert!(mapping.datetime_features.is_none());
        assert!(mapping.prediction.is_none());
    }

    #[test]
    fn test_from_json() {
        let mapping = ColumnMapping::from_json(
            r#"{
                "date": "event_time",
                "target": "churned",
                "prediction": ["p0", "p1"],
                "categorical_features": ["plan"],
                "task": "classification"
            }"#,
        )
        .unwrap();

        assert_eq!(mapping.datetime.as_deref(), Some("event_time"));
        assert_eq!(mapping.target.as_deref(), Some("churned"));
        assert_eq!(
            mapping.prediction,
            Some(Prediction::Multiple(vec!["p0".into(), "p1".into()]))
        );
        assert_eq!(mapping.categorical_features, Some(vec!["plan".to_string()]));
        assert!(mapping.numerical_features.is_none());
        assert_eq!(mapping.task, Some(TaskType::Classification));
    }

    #[test]
    fn test_from_json_single_prediction() {
        let mapping = ColumnMapping::from_json(r#"{"prediction": "score"}"#).unwrap();
        assert_eq!(mapping.prediction, Some(Prediction::Single("score".into())));
    }

    #[test]
    fn test_from_json_rejects_unknown_task() {
        assert!(ColumnMapping::from_json(r#"{"task": "ranking"}"#).is_err());
    }
}
