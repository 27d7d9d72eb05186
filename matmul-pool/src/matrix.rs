//! Immutable dense integer matrices shared read-only by the workers.

use std::fmt;

use rand::Rng;

use crate::Error;

/// Smallest value produced by [`Matrix::random`].
pub const MIN_ELEMENT: i64 = 1;
/// Largest value produced by [`Matrix::random`].
pub const MAX_ELEMENT: i64 = 10;

/// Number of elements in a `rows × cols` matrix.
///
/// Fails if either side is zero, or if the count does not fit in a `Vec<i64>`.
pub fn element_count(rows: usize, cols: usize) -> Result<usize, Error> {
    let invalid = || Error::InvalidDimensions {
        rows: rows.try_into().unwrap_or(i64::MAX),
        cols: cols.try_into().unwrap_or(i64::MAX),
    };
    if rows == 0 || cols == 0 {
        return Err(invalid());
    }
    let max = isize::MAX as usize / std::mem::size_of::<i64>();
    match rows.checked_mul(cols) {
        Some(count) if count <= max => Ok(count),
        _ => Err(invalid()),
    }
}

/// A `rows × cols` matrix of `i64` stored row-major.
///
/// There is no mutating API: once built, a `Matrix` can be shared between
/// threads behind an `Arc` without any locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl Matrix {
    /// Builds a matrix from a vector of rows.
    ///
    /// Fails if there are no rows, the first row is empty, or any row has a
    /// different length than the first.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self, Error> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |row| row.len());
        let count = element_count(n_rows, n_cols)?;

        let mut data = Vec::with_capacity(count);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(Error::RaggedMatrix {
                    row: i,
                    expected: n_cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }

        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    /// Generates a matrix whose elements are drawn independently and
    /// uniformly from `[MIN_ELEMENT, MAX_ELEMENT]`.
    pub fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Result<Self, Error> {
        let count = element_count(rows, cols)?;
        let data = (0..count)
            .map(|_| rng.gen_range(MIN_ELEMENT..=MAX_ELEMENT))
            .collect();
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns row `i` as a slice.
    ///
    /// Panics if `i >= self.rows()`.
    pub fn row(&self, i: usize) -> &[i64] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Returns the element at `(i, j)`.
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> i64 {
        assert!(j < self.cols, "column {} out of bounds ({})", j, self.cols);
        self.data[i * self.cols + j]
    }

    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.data.chunks(self.cols).map(|row| row.to_vec()).collect()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.chunks(self.cols).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:?}", row)?;
        }
        Ok(())
    }
}
