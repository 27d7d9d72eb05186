//! Error types for matmul-pool operations.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0:?} is not an integer")]
    InvalidInput(String),

    #[error("invalid matrix dimensions {rows}x{cols}: both must be at least 1")]
    InvalidDimensions { rows: i64, cols: i64 },

    #[error("matrix dimension mismatch: A is {0}x{1}, B is {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),

    #[error("invalid worker count {requested}: must be between 1 and {max}")]
    InvalidWorkerCount { requested: i64, max: usize },

    #[error("ragged matrix: row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("result sink {path} failed: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker {worker} terminated abnormally")]
    WorkerFailed { worker: usize },

    #[error("result collector terminated abnormally")]
    CollectorFailed,

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
