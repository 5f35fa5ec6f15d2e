//! Column role resolution and feature grouping.
//!
//! [`classify`] combines a [`ColumnMapping`] with a dataset's schema into
//! [`DatasetColumns`]: the utility columns that actually exist and three
//! disjoint, ordered feature groups (numerical, categorical, datetime).
//!
//! Resolution is permissive. A mapping that names a column the dataset does not
//! have degrades to "absent" instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::dataset::{Dataset, DtypeClass};
use crate::mapping::{ColumnMapping, Prediction};

/// Resolved structural columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetUtilityColumns {
    pub date: Option<String>,
    #[serde(rename = "id")]
    pub id_column: Option<String>,
    pub target: Option<String>,
    pub prediction: Option<Prediction>,
}

impl DatasetUtilityColumns {
    /// All utility column names, prediction columns included.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = [&self.date, &self.id_column, &self.target]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        match &self.prediction {
            Some(Prediction::Single(name)) => names.push(name),
            Some(Prediction::Multiple(list)) => names.extend(list.iter().map(String::as_str)),
            None => {}
        }
        names
    }
}

/// Resolved column classification of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetColumns {
    pub utility_columns: DatasetUtilityColumns,
    pub num_feature_names: Vec<String>,
    pub cat_feature_names: Vec<String>,
    pub datetime_feature_names: Vec<String>,
    pub target_names: Option<Vec<String>>,
}

impl DatasetColumns {
    /// Lists feature names, categorical or numerical first, optionally followed
    /// by datetime features.
    pub fn all_features(&self, cat_before_num: bool, include_datetime: bool) -> Vec<&str> {
        let (first, second) = if cat_before_num {
            (&self.cat_feature_names, &self.num_feature_names)
        } else {
            (&self.num_feature_names, &self.cat_feature_names)
        };
        let datetime: &[String] = if include_datetime {
            &self.datetime_feature_names
        } else {
            &[]
        };
        first
            .iter()
            .chain(second)
            .chain(datetime)
            .map(String::as_str)
            .collect()
    }

    /// Number of features, optionally counting datetime features.
    pub fn features_len(&self, include_datetime: bool) -> usize {
        let datetime = if include_datetime {
            self.datetime_feature_names.len()
        } else {
            0
        };
        self.num_feature_names.len() + self.cat_feature_names.len() + datetime
    }
}

/// Resolves utility columns and feature groups of `dataset` under `mapping`.
pub fn classify(dataset: &Dataset, mapping: &ColumnMapping) -> DatasetColumns {
    let present = |name: &Option<String>| name.clone().filter(|n| dataset.contains(n));

    let prediction = match &mapping.prediction {
        Some(Prediction::Single(name)) if dataset.contains(name) => {
            Some(Prediction::Single(name.clone()))
        }
        Some(Prediction::Multiple(names)) => {
            let found: Vec<String> = names
                .iter()
                .filter(|n| dataset.contains(n))
                .cloned()
                .collect();
            (!found.is_empty()).then_some(Prediction::Multiple(found))
        }
        _ => None,
    };

    let utility_columns = DatasetUtilityColumns {
        date: present(&mapping.datetime),
        id_column: present(&mapping.id),
        target: present(&mapping.target),
        prediction,
    };

    let mut claimed: HashSet<String> = utility_columns
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let explicit = |list: &Option<Vec<String>>| -> Option<Vec<String>> {
        list.as_ref()
            .map(|names| names.iter().filter(|n| dataset.contains(n)).cloned().collect())
    };
    let inferred = |class: DtypeClass| -> Vec<String> {
        dataset
            .column_names()
            .into_iter()
            .filter(|name| dataset.dtype_class(name) == Some(class))
            .collect()
    };

    // Declared lists claim their columns before any group is inferred.
    let num_explicit = explicit(&mapping.numerical_features).map(|l| claim(&mut claimed, l));
    let cat_explicit = explicit(&mapping.categorical_features).map(|l| claim(&mut claimed, l));
    let datetime_explicit = explicit(&mapping.datetime_features).map(|l| claim(&mut claimed, l));

    let num_feature_names = match num_explicit {
        Some(names) => names,
        None => claim(&mut claimed, inferred(DtypeClass::Numeric)),
    };
    let cat_feature_names = match cat_explicit {
        Some(names) => names,
        None => claim(&mut claimed, inferred(DtypeClass::Other)),
    };
    let datetime_feature_names = match datetime_explicit {
        Some(names) => names,
        None => claim(&mut claimed, inferred(DtypeClass::Datetime)),
    };

    DatasetColumns {
        utility_columns,
        num_feature_names,
        cat_feature_names,
        datetime_feature_names,
        target_names: mapping.target_names.clone(),
    }
}

/// Keeps the names not yet claimed by another role or group, claiming them.
fn claim(claimed: &mut HashSet<String>, names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| claimed.insert(name.clone()))
        .collect()
}
