//! Canonical cell values shared by the statistic and category delta engines.
//!
//! Arrow columns are flattened into [`Cell`]s before any statistic is computed.
//! This is where null sentinels are unified: an Arrow null and a floating point
//! NaN both become [`Cell::Missing`]. Infinite floats stay values.
//!
//! [`CellKey`] is the hashable identity of a cell. Integral floats key as
//! integers, so `2` in one dataset and `2.0` in another are the same category.

use std::fmt;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast, cast_with_options, CastOptions};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float64Type, Int64Type, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt64Type,
};
use arrow::temporal_conversions::{
    date32_to_datetime, date64_to_datetime, timestamp_ms_to_datetime, timestamp_ns_to_datetime,
    timestamp_s_to_datetime, timestamp_us_to_datetime,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// A single normalized column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Null or NaN
    Missing,
    Int(i64),
    Float(f64),
    Str(String),
    Timestamp(NaiveDateTime),
}

/// Hashable identity of a [`Cell`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Missing,
    Int(i64),
    /// Bit pattern of a non-integral float
    Float(u64),
    Str(String),
    Timestamp(NaiveDateTime),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Finite numeric value, if any.
    pub fn as_finite_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Cell::Float(v) if v.is_infinite())
    }

    pub fn key(&self) -> CellKey {
        match self {
            Cell::Missing => CellKey::Missing,
            Cell::Int(v) => CellKey::Int(*v),
            Cell::Float(v) => float_key(*v),
            Cell::Str(s) => CellKey::Str(s.clone()),
            Cell::Timestamp(ts) => CellKey::Timestamp(*ts),
        }
    }

    /// Reportable value; timestamps are rendered as strings.
    pub fn to_profile_value(&self) -> Option<ProfileValue> {
        match self {
            Cell::Missing => None,
            Cell::Int(v) => Some(ProfileValue::Int(*v)),
            Cell::Float(v) => Some(ProfileValue::Float(*v)),
            Cell::Str(s) => Some(ProfileValue::Str(s.clone())),
            Cell::Timestamp(ts) => Some(ProfileValue::Str(format_timestamp(ts))),
        }
    }
}

fn float_key(v: f64) -> CellKey {
    if v.is_nan() {
        CellKey::Missing
    } else if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        CellKey::Int(v as i64)
    } else {
        CellKey::Float(v.to_bits())
    }
}

/// A statistic value reported in a profile (min, max, most common value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ProfileValue {
    /// Numeric value as f64, if the value is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ProfileValue::Int(v) => Some(*v as f64),
            ProfileValue::Float(v) => Some(*v),
            ProfileValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ProfileValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ProfileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileValue::Int(v) => write!(f, "{v}"),
            ProfileValue::Float(v) => write!(f, "{v}"),
            ProfileValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ProfileValue {
    fn from(value: i64) -> Self {
        ProfileValue::Int(value)
    }
}

impl From<f64> for ProfileValue {
    fn from(value: f64) -> Self {
        ProfileValue::Float(value)
    }
}

impl From<&str> for ProfileValue {
    fn from(value: &str) -> Self {
        ProfileValue::Str(value.to_string())
    }
}

/// Renders a timestamp as `YYYY-MM-DD HH:MM:SS`, with fractional seconds only when non-zero.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.to_string()
}

/// Parses the timestamp string layouts accepted for string-typed datetime columns.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Flattens an Arrow column into normalized cells.
///
/// Fails with [`ProfileError::InvalidColumnData`] for Arrow types that have no
/// cell representation (lists, structs, binary, ...).
pub fn column_cells(column: &str, array: &ArrayRef) -> Result<Vec<Cell>> {
    let unsupported = || {
        ProfileError::invalid_column_data(column, "a scalar column", array.data_type().to_string())
    };
    let timestamp_out_of_range =
        || ProfileError::invalid_column_data(column, "timestamps within range", "out-of-range value");

    let cells = match array.data_type() {
        DataType::Null => vec![Cell::Missing; array.len()],
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let options = CastOptions {
                safe: false,
                ..Default::default()
            };
            let ints = cast_with_options(array, &DataType::Int64, &options)?;
            ints.as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map_or(Cell::Missing, Cell::Int))
                .collect()
        }
        DataType::UInt64 => array
            .as_primitive::<UInt64Type>()
            .iter()
            .map(|v| match v {
                None => Cell::Missing,
                Some(v) => i64::try_from(v).map_or(Cell::Float(v as f64), Cell::Int),
            })
            .collect(),
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => {
            let floats = cast(array, &DataType::Float64)?;
            floats
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| match v {
                    Some(v) if !v.is_nan() => Cell::Float(v),
                    _ => Cell::Missing,
                })
                .collect()
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let strings = cast(array, &DataType::Utf8)?;
            strings
                .as_string::<i32>()
                .iter()
                .map(|v| v.map_or(Cell::Missing, |s| Cell::Str(s.to_string())))
                .collect()
        }
        DataType::Boolean => array
            .as_boolean()
            .iter()
            .map(|v| v.map_or(Cell::Missing, |b| Cell::Str(b.to_string())))
            .collect(),
        DataType::Dictionary(_, value_type) => {
            let values = cast(array, value_type)?;
            return column_cells(column, &values);
        }
        DataType::Timestamp(unit, _) => {
            let convert: fn(i64) -> Option<NaiveDateTime> = match unit {
                TimeUnit::Second => timestamp_s_to_datetime,
                TimeUnit::Millisecond => timestamp_ms_to_datetime,
                TimeUnit::Microsecond => timestamp_us_to_datetime,
                TimeUnit::Nanosecond => timestamp_ns_to_datetime,
            };
            let raw: Vec<Option<i64>> = match unit {
                TimeUnit::Second => array.as_primitive::<TimestampSecondType>().iter().collect(),
                TimeUnit::Millisecond => array
                    .as_primitive::<TimestampMillisecondType>()
                    .iter()
                    .collect(),
                TimeUnit::Microsecond => array
                    .as_primitive::<TimestampMicrosecondType>()
                    .iter()
                    .collect(),
                TimeUnit::Nanosecond => array
                    .as_primitive::<TimestampNanosecondType>()
                    .iter()
                    .collect(),
            };
            raw.into_iter()
                .map(|v| match v {
                    None => Ok(Cell::Missing),
                    Some(v) => convert(v)
                        .map(Cell::Timestamp)
                        .ok_or_else(timestamp_out_of_range),
                })
                .collect::<Result<Vec<_>>>()?
        }
        DataType::Date32 => array
            .as_primitive::<Date32Type>()
            .iter()
            .map(|v| match v {
                None => Ok(Cell::Missing),
                Some(v) => date32_to_datetime(v)
                    .map(Cell::Timestamp)
                    .ok_or_else(timestamp_out_of_range),
            })
            .collect::<Result<Vec<_>>>()?,
        DataType::Date64 => array
            .as_primitive::<Date64Type>()
            .iter()
            .map(|v| match v {
                None => Ok(Cell::Missing),
                Some(v) => date64_to_datetime(v)
                    .map(Cell::Timestamp)
                    .ok_or_else(timestamp_out_of_range),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(unsupported()),
    };

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{
        BinaryArray, BooleanArray, Date32Array, DictionaryArray, Float32Array, Float64Array,
        Int32Array, NullArray, StringArray, TimestampMillisecondArray, UInt64Array,
    };
    use arrow::datatypes::Int8Type;
    use std::sync::Arc;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_null_and_nan_unify_to_missing() {
        let array: ArrayRef = Arc::new(Float64Array::from(vec![
            None,
            Some(f64::NAN),
            Some(1.5),
            Some(f64::INFINITY),
        ]));
        let cells = column_cells("x", &array).unwrap();

        assert_eq!(cells[0], Cell::Missing);
        assert_eq!(cells[1], Cell::Missing);
        assert_eq!(cells[0].key(), cells[1].key());
        assert_eq!(cells[2], Cell::Float(1.5));
        assert!(cells[3].is_infinite());
        assert_eq!(cells[3].as_finite_f64(), None);
    }

    #[test]
    fn test_empty_string_is_a_value() {
        let array: ArrayRef = Arc::new(StringArray::from(vec![Some(""), None]));
        let cells = column_cells("s", &array).unwrap();
        assert_eq!(cells[0], Cell::Str(String::new()));
        assert!(!cells[0].is_missing());
        assert!(cells[1].is_missing());
    }

    #[test]
    fn test_integral_float_keys_match_integers() {
        assert_eq!(Cell::Float(2.0).key(), Cell::Int(2).key());
        assert_eq!(Cell::Float(-0.0).key(), Cell::Int(0).key());
        assert_ne!(Cell::Float(2.5).key(), Cell::Int(2).key());
        assert_ne!(Cell::Str("2".into()).key(), Cell::Int(2).key());
    }

    #[test]
    fn test_integer_columns_keep_integer_cells() {
        let array: ArrayRef = Arc::new(Int32Array::from(vec![Some(3), None]));
        let cells = column_cells("i", &array).unwrap();
        assert_eq!(cells, vec![Cell::Int(3), Cell::Missing]);
    }

    #[test]
    fn test_unsigned_values_beyond_i64_become_floats() {
        let array: ArrayRef = Arc::new(UInt64Array::from(vec![Some(u64::MAX), Some(7), None]));
        let cells = column_cells("hash", &array).unwrap();
        assert_eq!(
            cells,
            vec![Cell::Float(u64::MAX as f64), Cell::Int(7), Cell::Missing]
        );
    }

    #[test]
    fn test_float32_column() {
        let array: ArrayRef = Arc::new(Float32Array::from(vec![0.5f32, f32::NAN]));
        let cells = column_cells("f", &array).unwrap();
        assert_eq!(cells, vec![Cell::Float(0.5), Cell::Missing]);
    }

    #[test]
    fn test_boolean_and_null_columns() {
        let bools: ArrayRef = Arc::new(BooleanArray::from(vec![Some(true), None]));
        assert_eq!(
            column_cells("b", &bools).unwrap(),
            vec![Cell::Str("true".into()), Cell::Missing]
        );

        let nulls: ArrayRef = Arc::new(NullArray::new(3));
        assert_eq!(column_cells("n", &nulls).unwrap(), vec![Cell::Missing; 3]);
    }

    #[test]
    fn test_dictionary_column_decodes_values() {
        let dict: DictionaryArray<Int8Type> = vec![Some("a"), None, Some("a")].into_iter().collect();
        let array: ArrayRef = Arc::new(dict);
        assert_eq!(
            column_cells("d", &array).unwrap(),
            vec![Cell::Str("a".into()), Cell::Missing, Cell::Str("a".into())]
        );
    }

    #[test]
    fn test_timestamp_and_date_columns() {
        let millis = ts(2022, 1, 5, 13, 23).and_utc().timestamp_millis();
        let array: ArrayRef = Arc::new(TimestampMillisecondArray::from(vec![Some(millis), None]));
        let cells = column_cells("t", &array).unwrap();
        assert_eq!(cells[0], Cell::Timestamp(ts(2022, 1, 5, 13, 23)));
        assert!(cells[1].is_missing());

        let dates: ArrayRef = Arc::new(Date32Array::from(vec![1]));
        assert_eq!(
            column_cells("d", &dates).unwrap(),
            vec![Cell::Timestamp(ts(1970, 1, 2, 0, 0))]
        );
    }

    #[test]
    fn test_unsupported_column_type() {
        let array: ArrayRef = Arc::new(BinaryArray::from(vec![b"ab".as_ref()]));
        let err = column_cells("blob", &array).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidColumnData { .. }));
    }

    #[test]
    fn test_timestamp_formatting() {
        assert_eq!(format_timestamp(&ts(2012, 1, 5, 0, 0)), "2012-01-05 00:00:00");
        assert_eq!(
            Cell::Timestamp(ts(2002, 12, 5, 12, 0)).to_profile_value(),
            Some(ProfileValue::Str("2002-12-05 12:00:00".into()))
        );
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        assert_eq!(
            parse_timestamp("2022-01-05 13:23:00"),
            Some(ts(2022, 1, 5, 13, 23))
        );
        assert_eq!(
            parse_timestamp("2022-01-05T13:23:00"),
            Some(ts(2022, 1, 5, 13, 23))
        );
        assert_eq!(parse_timestamp("2012-01-05"), Some(ts(2012, 1, 5, 0, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_profile_value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&ProfileValue::Int(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&ProfileValue::Float(0.3)).unwrap(), "0.3");
        assert_eq!(
            serde_json::to_string(&ProfileValue::Str("n".into())).unwrap(),
            "\"n\""
        );
    }
}
