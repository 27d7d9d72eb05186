//! Row workers: compute the output rows of one range and report them.

use std::sync::Arc;

use tracing::debug;

use crate::channel::{ResultBatch, ResultSender, RowResult};
use crate::matrix::Matrix;
use crate::partition::RowRange;

/// Computes every row of `A · B` whose index lies in `range`.
///
/// Uses the plain triple loop; `values[j]` is filled in ascending `j`.
pub fn multiply_range(a: &Matrix, b: &Matrix, range: RowRange) -> ResultBatch {
    let inner = b.rows();
    let cols = b.cols();

    range
        .iter()
        .map(|i| {
            let row_a = a.row(i);
            let values: Vec<i64> = (0..cols)
                .map(|j| (0..inner).map(|k| row_a[k] * b.get(k, j)).sum::<i64>())
                .collect();
            RowResult::new(i, values)
        })
        .collect()
}

/// A single unit of work bound to one row range.
pub struct RowWorker {
    id: usize,
    a: Arc<Matrix>,
    b: Arc<Matrix>,
    range: RowRange,
    results: ResultSender,
}

impl RowWorker {
    pub fn new(
        id: usize,
        a: Arc<Matrix>,
        b: Arc<Matrix>,
        range: RowRange,
        results: ResultSender,
    ) -> Self {
        Self {
            id,
            a,
            b,
            range,
            results,
        }
    }

    /// Computes the whole range and enqueues it as one batch.
    ///
    /// An empty range still sends an empty batch. If the collector has
    /// already stopped the batch is dropped and the worker still returns
    /// normally.
    pub fn run(self) {
        let batch = multiply_range(&self.a, &self.b, self.range);
        let rows = batch.len();
        if !self.results.send_batch(batch) {
            debug!(worker = self.id, range = %self.range, "collector gone, batch dropped");
            return;
        }
        debug!(worker = self.id, range = %self.range, rows, "batch sent");
    }
}
