//! Row-partitioned matrix multiplication over a pool of workers.
//!
//! `matmul-pool` computes `C = A × B` by splitting the rows of `C` into
//! contiguous ranges, one per worker. Each worker computes its whole range
//! and sends it as a single batch over a shared channel. A single collector
//! drains the channel and appends every row to a result file until it
//! receives the `Done` sentinel, which the orchestrator sends only after all
//! workers have finished.
//!
//! # Result File Format
//!
//! One line per output row, in arrival order (rows from different workers
//! may interleave):
//!
//! ```text
//! Row 1: [43, 50]
//! Row 0: [19, 22]
//! ```
//!
//! # Example
//!
//! ```no_run
//! use matmul_pool::{Config, Matrix, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]])?;
//!     let b = Matrix::from_rows(vec![vec![5, 6], vec![7, 8]])?;
//!
//!     let mut orchestrator = Orchestrator::new(Config::new("results.txt", "app.log"));
//!     let report = orchestrator.run(a, b, 2).await?;
//!     assert_eq!(report.rows_persisted, 2);
//!
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod cli;
pub mod collector;
pub mod config;
mod error;
pub mod logging;
pub mod matrix;
pub mod orchestrator;
pub mod partition;
pub mod prompt;
pub mod worker;

pub use config::Config;
pub use error::Error;
pub use matrix::Matrix;
pub use orchestrator::{Orchestrator, Phase, RunReport};
pub use partition::{RowRange, partition};
