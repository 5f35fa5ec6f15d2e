//! In-memory tabular datasets backed by Apache Arrow.
//!
//! A [`Dataset`] is a single [`RecordBatch`] with named, typed columns. It can be
//! assembled from any number of batches sharing a schema, or collected from a
//! table registered in a DataFusion [`SessionContext`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Float64Array};
//! use arrow::record_batch::RecordBatch;
//! use term_profile::dataset::{Dataset, DtypeClass};
//!
//! let batch = RecordBatch::try_from_iter(vec![(
//!     "price",
//!     Arc::new(Float64Array::from(vec![1.0, 2.5])) as ArrayRef,
//! )])
//! .unwrap();
//! let dataset = Dataset::new(batch);
//!
//! assert_eq!(dataset.num_rows(), 2);
//! assert_eq!(dataset.dtype_class("price"), Some(DtypeClass::Numeric));
//! ```

use arrow::array::ArrayRef;
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::{CsvReadOptions, SessionContext};
use tracing::{debug, instrument};

use crate::error::{ProfileError, Result};

/// Coarse dtype class of a column, used to auto-infer feature groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DtypeClass {
    /// Integer, floating point and decimal columns
    Numeric,
    /// Timestamp and date columns
    Datetime,
    /// Strings, booleans, dictionaries and anything else
    Other,
}

impl DtypeClass {
    /// Classifies an Arrow data type.
    pub fn of(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => Self::Numeric,
            DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => Self::Datetime,
            _ => Self::Other,
        }
    }
}

/// A named, typed, in-memory table.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Wraps a single record batch.
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Concatenates batches that share `schema` into one dataset.
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let same_columns = |batch: &RecordBatch| {
            let batch_schema = batch.schema();
            batch_schema.fields().len() == schema.fields().len()
                && batch_schema
                    .fields()
                    .iter()
                    .zip(schema.fields().iter())
                    .all(|(a, b)| a.name() == b.name() && a.data_type() == b.data_type())
        };
        if let Some(batch) = batches.iter().find(|b| !same_columns(b)) {
            return Err(ProfileError::SchemaMismatch(format!(
                "batch schema {:?} does not match dataset schema {:?}",
                batch.schema(),
                schema
            )));
        }
        let batch = arrow::compute::concat_batches(&schema, batches)?;
        Ok(Self { batch })
    }

    /// Collects a table registered in `ctx` into a dataset.
    #[instrument(skip(ctx))]
    pub async fn from_table(ctx: &SessionContext, table_name: &str) -> Result<Self> {
        let df = ctx.table(table_name).await?;
        let schema: SchemaRef = df.schema().inner().clone();
        let batches = df.collect().await?;
        debug!(
            table = table_name,
            batches = batches.len(),
            "Collected table for profiling"
        );
        Self::from_batches(schema, &batches)
    }

    /// Reads a CSV file with schema inference into a dataset.
    #[instrument]
    pub async fn read_csv(path: &str) -> Result<Self> {
        let ctx = SessionContext::new();
        let df = ctx.read_csv(path, CsvReadOptions::new()).await?;
        let schema: SchemaRef = df.schema().inner().clone();
        let batches = df.collect().await?;
        Self::from_batches(schema, &batches)
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Arrow schema of the dataset.
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Whether a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    /// Column values by name.
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Dtype class of a column, if it exists.
    pub fn dtype_class(&self, name: &str) -> Option<DtypeClass> {
        self.column(name).map(|c| DtypeClass::of(c.data_type()))
    }

    /// The underlying record batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }
}

impl From<RecordBatch> for Dataset {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, StringArray, TimestampSecondArray};
    use arrow::datatypes::{Field, Schema, TimeUnit};
    use std::sync::Arc;

    fn sample_batch(values: Vec<i64>) -> RecordBatch {
        RecordBatch::try_from_iter(vec![
            ("id", Arc::new(Int64Array::from(values)) as ArrayRef),
        ])
        .unwrap()
    }

    #[test]
    fn test_dtype_classes() {
        assert_eq!(DtypeClass::of(&DataType::Int32), DtypeClass::Numeric);
        assert_eq!(DtypeClass::of(&DataType::Float64), DtypeClass::Numeric);
        assert_eq!(
            DtypeClass::of(&DataType::Timestamp(TimeUnit::Second, None)),
            DtypeClass::Datetime
        );
        assert_eq!(DtypeClass::of(&DataType::Date32), DtypeClass::Datetime);
        assert_eq!(DtypeClass::of(&DataType::Utf8), DtypeClass::Other);
        assert_eq!(DtypeClass::of(&DataType::Boolean), DtypeClass::Other);
        assert_eq!(DtypeClass::of(&DataType::Null), DtypeClass::Other);
    }

    #[test]
    fn test_column_lookup() {
        let batch = RecordBatch::try_from_iter(vec![
            ("x", Arc::new(Float64Array::from(vec![1.0])) as ArrayRef),
            ("name", Arc::new(StringArray::from(vec!["a"])) as ArrayRef),
            (
                "ts",
                Arc::new(TimestampSecondArray::from(vec![0])) as ArrayRef,
            ),
        ])
        .unwrap();
        let dataset = Dataset::new(batch);

        assert_eq!(dataset.column_names(), vec!["x", "name", "ts"]);
        assert!(dataset.contains("name"));
        assert!(!dataset.contains("missing"));
        assert!(dataset.column("missing").is_none());
        assert_eq!(dataset.dtype_class("ts"), Some(DtypeClass::Datetime));
        assert_eq!(dataset.dtype_class("name"), Some(DtypeClass::Other));
    }

    #[test]
    fn test_from_batches_concatenates() {
        let first = sample_batch(vec![1, 2]);
        let second = sample_batch(vec![3]);
        let dataset = Dataset::from_batches(first.schema(), &[first, second]).unwrap();
        assert_eq!(dataset.num_rows(), 3);
    }

    #[test]
    fn test_from_batches_rejects_mismatched_schema() {
        let batch = sample_batch(vec![1]);
        let other = Arc::new(Schema::new(vec![Field::new("id", DataType::Utf8, true)]));
        let err = Dataset::from_batches(other, &[batch]).unwrap_err();
        assert!(matches!(err, ProfileError::SchemaMismatch(_)));
    }

    #[test]
    fn test_from_batches_empty_list() {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, true)]));
        let dataset = Dataset::from_batches(schema, &[]).unwrap();
        assert_eq!(dataset.num_rows(), 0);
        assert!(dataset.contains("id"));
    }

    #[tokio::test]
    async fn test_from_registered_table() {
        let ctx = SessionContext::new();
        ctx.register_batch("events", sample_batch(vec![5, 6, 7]))
            .unwrap();

        let dataset = Dataset::from_table(&ctx, "events").await.unwrap();
        assert_eq!(dataset.num_rows(), 3);
        assert_eq!(dataset.dtype_class("id"), Some(DtypeClass::Numeric));
    }

    #[tokio::test]
    async fn test_from_unknown_table_fails() {
        let ctx = SessionContext::new();
        let err = Dataset::from_table(&ctx, "nope").await.unwrap_err();
        assert!(matches!(err, ProfileError::DataFusion(_)));
    }
}
