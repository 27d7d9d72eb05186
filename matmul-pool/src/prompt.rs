//! Interactive acquisition of matrix dimensions and worker count.

use std::io::{BufRead, Write};

use crate::Error;
use crate::matrix::element_count;

/// Shapes of the two input matrices, already checked for compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub rows_a: usize,
    pub cols_a: usize,
    pub rows_b: usize,
    pub cols_b: usize,
}

impl Dimensions {
    /// Validates raw user input: every value must be positive, each matrix
    /// (and the product) must have an addressable number of elements, and
    /// `cols_a` must equal `rows_b`.
    pub fn new(rows_a: i64, cols_a: i64, rows_b: i64, cols_b: i64) -> Result<Self, Error> {
        for (rows, cols) in [(rows_a, cols_a), (rows_b, cols_b)] {
            if rows <= 0 || cols <= 0 {
                return Err(Error::InvalidDimensions { rows, cols });
            }
        }

        let dims = Self {
            rows_a: rows_a as usize,
            cols_a: cols_a as usize,
            rows_b: rows_b as usize,
            cols_b: cols_b as usize,
        };
        element_count(dims.rows_a, dims.cols_a)?;
        element_count(dims.rows_b, dims.cols_b)?;
        element_count(dims.rows_a, dims.cols_b)?;
        if dims.cols_a != dims.rows_b {
            return Err(Error::DimensionMismatch(
                dims.rows_a,
                dims.cols_a,
                dims.rows_b,
                dims.cols_b,
            ));
        }
        Ok(dims)
    }
}

/// Asks questions on `output` and reads one answer per line from `input`.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Reads the four matrix dimensions.
    ///
    /// A non-integer answer fails right away; positivity and compatibility
    /// are checked once all four are known.
    pub fn dimensions(&mut self) -> Result<Dimensions, Error> {
        let rows_a = self.ask("Enter the number of rows of matrix A: ")?;
        let cols_a = self.ask("Enter the number of columns of matrix A: ")?;
        let rows_b = self.ask("Enter the number of rows of matrix B: ")?;
        let cols_b = self.ask("Enter the number of columns of matrix B: ")?;
        Dimensions::new(rows_a, cols_a, rows_b, cols_b)
    }

    /// Reads the worker count and checks it against `1..=max`.
    pub fn worker_count(&mut self, max: usize) -> Result<usize, Error> {
        let requested = self.ask(&format!("Enter the number of workers (at most {}): ", max))?;
        if requested <= 0 || requested as u64 > max as u64 {
            return Err(Error::InvalidWorkerCount { requested, max });
        }
        Ok(requested as usize)
    }

    fn ask(&mut self, question: &str) -> Result<i64, Error> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let answer = line.trim();
        answer
            .parse()
            .map_err(|_| Error::InvalidInput(answer.to_string()))
    }
}
