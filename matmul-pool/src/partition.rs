//! Static division of output rows into per-worker ranges.

use std::fmt;

/// Half-open interval `[start, end)` of row indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Splits `[0, rows)` into `workers` contiguous ranges.
///
/// Every range but the last is `rows / workers` long; the last one runs to
/// `rows` and absorbs the remainder, so `partition(10, 4)` yields chunks of
/// 2, 2, 2 and 4 rows. Callers guarantee `1 <= workers <= rows`.
pub fn partition(rows: usize, workers: usize) -> Vec<RowRange> {
    let chunk = rows / workers;
    (0..workers)
        .map(|i| {
            let start = i * chunk;
            let end = if i + 1 == workers { rows } else { start + chunk };
            RowRange::new(start, end)
        })
        .collect()
}
