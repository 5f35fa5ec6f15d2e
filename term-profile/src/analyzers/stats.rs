//! Per-column descriptive statistics.
//!
//! [`compute_feature_stats`] turns one column into a [`FeatureProfileStats`]
//! record. The record has a single shape for every [`FeatureKind`]; which
//! fields are populated depends on the kind:
//!
//! | field | num | cat | datetime |
//! |---|---|---|---|
//! | `count`, `missing_*`, `unique*`, `most_common_value*` | yes | yes | yes |
//! | `infinite_*` | yes | - | - |
//! | `percentile_*`, `mean`, `std` | yes | - | - |
//! | `min`, `max` | yes | - | yes (as strings) |
//!
//! Fractions are relative to the total number of rows. Fractions, percentiles,
//! mean, std and float min/max are rounded to two decimals.
//!
//! A column with zero rows yields `count = 0` and every other field `None`.

use std::fmt;

use arrow::array::ArrayRef;
use arrow::datatypes::DataType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analyzers::values::{column_cells, parse_timestamp, Cell, CellKey, ProfileValue};
use crate::dataset::DtypeClass;
use crate::error::{ProfileError, Result};

/// How a column is profiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    #[serde(rename = "num")]
    Num,
    #[serde(rename = "cat")]
    Cat,
    #[serde(rename = "datetime")]
    Datetime,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Num => "num",
            FeatureKind::Cat => "cat",
            FeatureKind::Datetime => "datetime",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive statistics of one column on one dataset side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProfileStats {
    pub feature_type: FeatureKind,
    pub count: u64,
    pub infinite_count: Option<u64>,
    pub infinite_fraction: Option<f64>,
    pub missing_count: Option<u64>,
    pub missing_fraction: Option<f64>,
    pub unique: Option<u64>,
    pub unique_fraction: Option<f64>,
    pub percentile_25: Option<f64>,
    pub percentile_50: Option<f64>,
    pub percentile_75: Option<f64>,
    pub max: Option<ProfileValue>,
    pub min: Option<ProfileValue>,
    pub mean: Option<f64>,
    pub most_common_value: Option<ProfileValue>,
    pub most_common_value_fraction: Option<f64>,
    pub std: Option<f64>,
    /// Reserved, always `None`
    pub most_common_not_null_value: Option<ProfileValue>,
    /// Reserved, always `None`
    pub most_common_not_null_value_fraction: Option<f64>,
    /// Set on current-side categorical stats only
    pub new_in_current_values_count: Option<u64>,
    /// Set on current-side categorical stats only
    pub unused_in_current_values_count: Option<u64>,
}

impl FeatureProfileStats {
    /// An all-empty record of the given kind.
    pub fn empty(feature_type: FeatureKind) -> Self {
        Self {
            feature_type,
            count: 0,
            infinite_count: None,
            infinite_fraction: None,
            missing_count: None,
            missing_fraction: None,
            unique: None,
            unique_fraction: None,
            percentile_25: None,
            percentile_50: None,
            percentile_75: None,
            max: None,
            min: None,
            mean: None,
            most_common_value: None,
            most_common_value_fraction: None,
            std: None,
            most_common_not_null_value: None,
            most_common_not_null_value_fraction: None,
            new_in_current_values_count: None,
            unused_in_current_values_count: None,
        }
    }

    /// Rows the statistics were computed over, when known.
    pub fn total_rows(&self) -> Option<u64> {
        self.missing_count
            .map(|missing| self.count + missing + self.infinite_count.unwrap_or(0))
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn fraction(part: usize, total: usize) -> f64 {
    round2(part as f64 / total as f64)
}

/// Percentile of sorted values with linear interpolation between closest ranks.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + weight * (sorted[upper] - sorted[lower]))
}

/// Sample standard deviation (n - 1 denominator); `None` below two values.
pub fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Distinct-value tally in first-appearance order.
struct ValueCounts<'a> {
    counts: IndexMap<CellKey, (usize, &'a Cell)>,
}

impl<'a> ValueCounts<'a> {
    fn new(cells: impl Iterator<Item = &'a Cell>) -> Self {
        let mut counts: IndexMap<CellKey, (usize, &'a Cell)> = IndexMap::new();
        for cell in cells {
            counts.entry(cell.key()).or_insert((0, cell)).0 += 1;
        }
        Self { counts }
    }

    fn unique(&self) -> usize {
        self.counts.len()
    }

    /// Most frequent value; ties go to the value seen first.
    fn mode(&self) -> Option<(&'a Cell, usize)> {
        let mut best: Option<(&'a Cell, usize)> = None;
        for (count, cell) in self.counts.values() {
            if best.map_or(true, |(_, c)| *count > c) {
                best = Some((cell, *count));
            }
        }
        best
    }
}

/// Computes the statistics of one column profiled as `kind`.
///
/// Returns [`ProfileError::InvalidColumnData`] when the column's Arrow type
/// cannot be profiled as `kind` (e.g. strings declared numerical).
pub fn compute_feature_stats(
    column: &str,
    array: &ArrayRef,
    kind: FeatureKind,
) -> Result<FeatureProfileStats> {
    let cells = match kind {
        FeatureKind::Num => numeric_cells(column, array)?,
        FeatureKind::Cat => column_cells(column, array)?,
        FeatureKind::Datetime => datetime_cells(column, array)?,
    };
    Ok(stats_from_cells(&cells, kind))
}

fn numeric_cells(column: &str, array: &ArrayRef) -> Result<Vec<Cell>> {
    match DtypeClass::of(array.data_type()) {
        DtypeClass::Numeric => column_cells(column, array),
        _ if array.data_type() == &DataType::Null => column_cells(column, array),
        _ => Err(ProfileError::invalid_column_data(
            column,
            "numeric column",
            array.data_type().to_string(),
        )),
    }
}

fn datetime_cells(column: &str, array: &ArrayRef) -> Result<Vec<Cell>> {
    match array.data_type() {
        DataType::Null | DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
            column_cells(column, array)
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => column_cells(column, array)?
            .into_iter()
            .map(|cell| match cell {
                Cell::Str(s) if s.trim().is_empty() => Ok(Cell::Missing),
                Cell::Str(s) => parse_timestamp(&s).map(Cell::Timestamp).ok_or_else(|| {
                    ProfileError::invalid_column_data(column, "timestamp string", format!("'{s}'"))
                }),
                other => Ok(other),
            })
            .collect(),
        other => Err(ProfileError::invalid_column_data(
            column,
            "datetime column",
            other.to_string(),
        )),
    }
}

/// Computes statistics from already-normalized cells.
pub fn stats_from_cells(cells: &[Cell], kind: FeatureKind) -> FeatureProfileStats {
    let mut stats = FeatureProfileStats::empty(kind);
    let total = cells.len();
    if total == 0 {
        return stats;
    }

    let missing = cells.iter().filter(|c| c.is_missing()).count();
    let infinite = match kind {
        FeatureKind::Num => cells.iter().filter(|c| c.is_infinite()).count(),
        _ => 0,
    };
    let count = total - missing - infinite;

    stats.count = count as u64;
    stats.missing_count = Some(missing as u64);
    stats.missing_fraction = Some(fraction(missing, total));
    if kind == FeatureKind::Num {
        stats.infinite_count = Some(infinite as u64);
        stats.infinite_fraction = Some(fraction(infinite, total));
    }
    if count == 0 {
        return stats;
    }

    let present = cells
        .iter()
        .filter(|c| !c.is_missing() && !(kind == FeatureKind::Num && c.is_infinite()));
    let counts = ValueCounts::new(present.clone());
    stats.unique = Some(counts.unique() as u64);
    stats.unique_fraction = Some(fraction(counts.unique(), total));
    if let Some((cell, mode_count)) = counts.mode() {
        stats.most_common_value = cell.to_profile_value();
        stats.most_common_value_fraction = Some(fraction(mode_count, total));
    }

    match kind {
        FeatureKind::Num => fill_numeric(&mut stats, present),
        FeatureKind::Datetime => fill_datetime(&mut stats, present),
        FeatureKind::Cat => {}
    }
    stats
}

fn fill_numeric<'a>(stats: &mut FeatureProfileStats, present: impl Iterator<Item = &'a Cell>) {
    let present: Vec<&Cell> = present.collect();
    let mut values: Vec<f64> = present.iter().filter_map(|c| c.as_finite_f64()).collect();
    values.sort_by(f64::total_cmp);

    let ints: Option<Vec<i64>> = present
        .iter()
        .map(|c| match c {
            Cell::Int(v) => Some(*v),
            _ => None,
        })
        .collect();
    match ints {
        Some(ints) => {
            stats.min = ints.iter().min().map(|v| ProfileValue::Int(*v));
            stats.max = ints.iter().max().map(|v| ProfileValue::Int(*v));
        }
        None => {
            stats.min = values.first().map(|v| ProfileValue::Float(round2(*v)));
            stats.max = values.last().map(|v| ProfileValue::Float(round2(*v)));
        }
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    stats.mean = Some(round2(mean));
    stats.std = sample_std(&values, mean).map(round2);
    stats.percentile_25 = percentile(&values, 0.25).map(round2);
    stats.percentile_50 = percentile(&values, 0.5).map(round2);
    stats.percentile_75 = percentile(&values, 0.75).map(round2);
}

fn fill_datetime<'a>(stats: &mut FeatureProfileStats, present: impl Iterator<Item = &'a Cell>) {
    let timestamps = present.filter_map(|c| match c {
        Cell::Timestamp(ts) => Some(*ts),
        _ => None,
    });
    let (min, max) = timestamps.fold((None, None), |(min, max), ts| {
        (
            Some(min.map_or(ts, |m: chrono::NaiveDateTime| m.min(ts))),
            Some(max.map_or(ts, |m: chrono::NaiveDateTime| m.max(ts))),
        )
    });
    stats.min = min.and_then(|ts| Cell::Timestamp(ts).to_profile_value());
    stats.max = max.and_then(|ts| Cell::Timestamp(ts).to_profile_value());
}
