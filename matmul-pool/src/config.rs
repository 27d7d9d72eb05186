//! Run configuration: where results and logs go, and the CPU budget.

use std::path::PathBuf;

pub const DEFAULT_RESULT_PATH: &str = "results.txt";
pub const DEFAULT_LOG_PATH: &str = "app.log";
/// Share of the available hardware threads the pool may occupy.
pub const DEFAULT_CPU_FRACTION: f64 = 0.75;

#[derive(Debug, Clone)]
pub struct Config {
    /// Append-only file receiving one `Row <i>: [...]` line per output row.
    pub result_path: PathBuf,
    /// Append-only file receiving one `[LEVEL] message` line per log event.
    pub log_path: PathBuf,
    /// Hardware threads available to the process.
    pub cpu_count: usize,
    pub cpu_fraction: f64,
}

impl Config {
    pub fn new(result_path: impl Into<PathBuf>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            result_path: result_path.into(),
            log_path: log_path.into(),
            cpu_count: available_parallelism(),
            cpu_fraction: DEFAULT_CPU_FRACTION,
        }
    }

    /// Builds a config from positional arguments `[result_path] [log_path]`,
    /// falling back to the defaults for whatever is missing.
    pub fn from_args(args: &[String]) -> Self {
        let result_path = args
            .get(1)
            .cloned()
            .unwrap_or_else(|| DEFAULT_RESULT_PATH.to_string());
        let log_path = args
            .get(2)
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOG_PATH.to_string());
        Self::new(result_path, log_path)
    }

    pub fn with_cpu_count(mut self, cpu_count: usize) -> Self {
        self.cpu_count = cpu_count;
        self
    }

    /// Largest worker count allowed for a left matrix with `rows_a` rows:
    /// `min(floor(cpu_count * cpu_fraction), rows_a)`.
    pub fn max_processes(&self, rows_a: usize) -> usize {
        let budget = (self.cpu_count as f64 * self.cpu_fraction).floor() as usize;
        budget.min(rows_a)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_PATH, DEFAULT_LOG_PATH)
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
