//! New and unused category values between a reference and a current column.
//!
//! Values are compared as distinct sets of [`CellKey`]s. The missing marker is
//! an ordinary member of a set: a column with nulls (or NaNs) contributes one
//! `Missing` element, so "missing only in current" counts as one new value.

use std::collections::HashSet;

use arrow::array::ArrayRef;
use serde::{Deserialize, Serialize};

use crate::analyzers::values::{column_cells, Cell, CellKey};
use crate::error::Result;

/// Distinct-value differences of a categorical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryDelta {
    /// Distinct values present in current but not in reference
    pub new_count: u64,
    /// Distinct values present in reference but not in current
    pub unused_count: u64,
}

impl CategoryDelta {
    /// The delta seen from the other side.
    pub fn swapped(self) -> Self {
        Self {
            new_count: self.unused_count,
            unused_count: self.new_count,
        }
    }
}

/// Computes the category delta between two Arrow columns.
pub fn category_delta(
    column: &str,
    reference: &ArrayRef,
    current: &ArrayRef,
) -> Result<CategoryDelta> {
    let reference = column_cells(column, reference)?;
    let current = column_cells(column, current)?;
    Ok(delta_from_cells(&reference, &current))
}

/// Computes the category delta between two normalized columns.
pub fn delta_from_cells(reference: &[Cell], current: &[Cell]) -> CategoryDelta {
    let reference: HashSet<CellKey> = reference.iter().map(Cell::key).collect();
    let current: HashSet<CellKey> = current.iter().map(Cell::key).collect();

    CategoryDelta {
        new_count: current.difference(&reference).count() as u64,
        unused_count: reference.difference(&current).count() as u64,
    }
}
