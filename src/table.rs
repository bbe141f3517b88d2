//! Rectangular string input and numeric output.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EncoderError;

/// One input cell: a string or a missing marker.
///
/// Every representation of "no value" (`None`, `NaN`) collapses to
/// [`Cell::Missing`], so missing cells deduplicate and cache like any
/// other value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    Missing,
    Text(Arc<str>),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Missing => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(Arc::from(value))
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(Arc::from(value))
    }
}

impl From<Arc<str>> for Cell {
    fn from(value: Arc<str>) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::Missing
        } else {
            Self::Text(Arc::from(value.to_string()))
        }
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// Column-major table of string cells with shape `(n_rows, n_columns)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable {
    n_rows: usize,
    columns: Vec<Vec<Cell>>,
}

impl StringTable {
    /// Build from rows; every row must have the same number of cells.
    pub fn from_rows<R, C>(rows: R) -> Result<Self, EncoderError>
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let mut columns: Vec<Vec<Cell>> = Vec::new();
        let mut n_rows = 0;
        for (i, row) in rows.into_iter().enumerate() {
            let cells: Vec<Cell> = row.into_iter().map(Into::into).collect();
            if i == 0 {
                columns = cells.iter().map(|_| Vec::new()).collect();
            } else if cells.len() != columns.len() {
                return Err(EncoderError::InputShape {
                    row: i,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
            for (col, cell) in columns.iter_mut().zip(cells) {
                col.push(cell);
            }
            n_rows += 1;
        }
        Ok(Self { n_rows, columns })
    }

    /// Build a single-column table.
    pub fn from_column<I, C>(values: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let column: Vec<Cell> = values.into_iter().map(Into::into).collect();
        Self {
            n_rows: column.len(),
            columns: vec![column],
        }
    }

    /// Build from columns; every column must have the same length.
    pub fn from_columns<I, V, C>(columns: I) -> Result<Self, EncoderError>
    where
        I: IntoIterator<Item = V>,
        V: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let columns: Vec<Vec<Cell>> = columns
            .into_iter()
            .map(|c| c.into_iter().map(Into::into).collect())
            .collect();
        let n_rows = columns.first().map_or(0, Vec::len);
        if let Some((column, bad)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_rows) {
            return Err(EncoderError::ColumnLength {
                column,
                expected: n_rows,
                found: bad.len(),
            });
        }
        Ok(Self { n_rows, columns })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn column(&self, index: usize) -> Option<&[Cell]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn columns(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.columns.iter().map(Vec::as_slice)
    }

    /// `(row, column)` of the first missing cell in column-major order.
    pub fn first_missing(&self) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(c, col)| {
            col.iter().position(Cell::is_missing).map(|r| (r, c))
        })
    }
}

/// Dense row-major `f32` matrix produced by the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f32>,
}

impl EncodedMatrix {
    pub(crate) fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            data: vec![0.0; n_rows * n_cols],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.n_cols..(row + 1) * self.n_cols]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [f32] {
        &mut self.data[row * self.n_cols..(row + 1) * self.n_cols]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.n_rows && col < self.n_cols {
            Some(self.data[row * self.n_cols + col])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.n_rows).map(move |r| self.row(r))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}
