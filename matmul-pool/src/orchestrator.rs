//! Sequencing of a single multiplication run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, error, info};

use crate::Error;
use crate::channel::result_channel;
use crate::collector::ResultCollector;
use crate::config::Config;
use crate::matrix::Matrix;
use crate::partition::{RowRange, partition};
use crate::worker::RowWorker;

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configuring,
    Partitioned,
    Running,
    Draining,
    Done,
    Failed,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub workers: usize,
    pub ranges: Vec<RowRange>,
    pub rows_persisted: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Drives one multiplication: partition, spawn, join, signal, join.
///
/// The `Done` sentinel is sent only after every worker has been joined, so
/// the collector sees every batch before it stops. Nothing is spawned when
/// the inputs fail validation.
///
/// # Worker faults
///
/// A panicking worker does not abort the run early. The remaining workers
/// are still joined, the sentinel is still sent and the collector is still
/// awaited; the run then fails with [`Error::WorkerFailed`] naming the
/// lowest-numbered faulted worker.
pub struct Orchestrator {
    config: Config,
    phase: Phase,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: Phase::Configuring,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Computes `a · b` with `workers` workers, appending every output row
    /// to the configured result file.
    pub async fn run(&mut self, a: Matrix, b: Matrix, workers: usize) -> Result<RunReport, Error> {
        let started_at = Utc::now();
        let clock = Instant::now();
        self.enter(Phase::Configuring);

        if let Err(e) = self.validate(&a, &b, workers) {
            self.enter(Phase::Failed);
            return Err(e);
        }
        info!("using {} workers", workers);

        let ranges = partition(a.rows(), workers);
        self.enter(Phase::Partitioned);
        for (id, range) in ranges.iter().enumerate() {
            debug!(worker = id, range = %range, "range assigned");
        }

        let (results, receiver) = result_channel();
        let collector = tokio::spawn(ResultCollector::new(receiver, &self.config.result_path).run());

        let a = Arc::new(a);
        let b = Arc::new(b);
        let handles: Vec<_> = ranges
            .iter()
            .enumerate()
            .map(|(id, range)| {
                let worker = RowWorker::new(id, a.clone(), b.clone(), *range, results.clone());
                tokio::task::spawn_blocking(move || worker.run())
            })
            .collect();
        self.enter(Phase::Running);

        let faulted = join_all(handles)
            .await
            .into_iter()
            .enumerate()
            .filter_map(|(id, outcome)| outcome.err().map(|e| (id, e)))
            .inspect(|(id, e)| error!(worker = id, "worker failed: {}", e))
            .map(|(id, _)| id)
            .min();
        self.enter(Phase::Draining);

        results.send_done();
        drop(results);

        let collected = match collector.await {
            Ok(collected) => collected,
            Err(e) => {
                error!("result collector failed: {}", e);
                Err(Error::CollectorFailed)
            }
        };

        if let Some(worker) = faulted {
            self.enter(Phase::Failed);
            return Err(Error::WorkerFailed { worker });
        }
        let rows_persisted = match collected {
            Ok(rows) => rows,
            Err(e) => {
                self.enter(Phase::Failed);
                return Err(e);
            }
        };

        self.enter(Phase::Done);
        Ok(RunReport {
            workers,
            ranges,
            rows_persisted,
            started_at,
            elapsed: clock.elapsed(),
        })
    }

    fn validate(&self, a: &Matrix, b: &Matrix, workers: usize) -> Result<(), Error> {
        if a.cols() != b.rows() {
            return Err(Error::DimensionMismatch(
                a.rows(),
                a.cols(),
                b.rows(),
                b.cols(),
            ));
        }

        let max = self.config.max_processes(a.rows());
        if workers == 0 || workers > max {
            return Err(Error::InvalidWorkerCount {
                requested: workers as i64,
                max,
            });
        }
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, cpus: usize) -> Config {
        let dir = std::env::temp_dir();
        let result = dir.join(format!("matmul-pool-orch-{}-{}.txt", name, std::process::id()));
        let _ = std::fs::remove_file(&result);
        Config::new(result, dir.join("matmul-pool-orch-unused.log")).with_cpu_count(cpus)
    }

    fn sample() -> (Matrix, Matrix) {
        let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let b = Matrix::from_rows(vec![vec![5, 6], vec![7, 8]]).unwrap();
        (a, b)
    }

    #[tokio::test]
    async fn completes_and_reports() {
        let config = config("report", 4);
        let path = config.result_path.clone();
        let (a, b) = sample();

        let mut orchestrator = Orchestrator::new(config);
        let report = orchestrator.run(a, b, 2).await.unwrap();

        assert_eq!(orchestrator.phase(), Phase::Done);
        assert_eq!(report.workers, 2);
        assert_eq!(report.rows_persisted, 2);
        assert_eq!(
            report.ranges,
            vec![RowRange::new(0, 1), RowRange::new(1, 2)]
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn mismatch_fails_before_spawning() {
        let config = config("mismatch", 4);
        let path = config.result_path.clone();
        let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let b = Matrix::from_rows(vec![vec![1], vec![2], vec![3]]).unwrap();

        let mut orchestrator = Orchestrator::new(config);
        let err = orchestrator.run(a, b, 1).await.unwrap_err();

        assert!(matches!(err, Error::DimensionMismatch(2, 2, 3, 1)));
        assert_eq!(orchestrator.phase(), Phase::Failed);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn worker_count_is_bounded() {
        let (a, b) = sample();
        let mut orchestrator = Orchestrator::new(config("zero", 4));
        assert!(matches!(
            orchestrator.run(a.clone(), b.clone(), 0).await,
            Err(Error::InvalidWorkerCount { requested: 0, max: 2 })
        ));

        // 0.75 * 4 = 3, but A only has two rows.
        let mut orchestrator = Orchestrator::new(config("toomany", 4));
        assert!(matches!(
            orchestrator.run(a.clone(), b.clone(), 3).await,
            Err(Error::InvalidWorkerCount { requested: 3, max: 2 })
        ));

        let mut orchestrator = Orchestrator::new(config("onecpu", 1));
        assert!(matches!(
            orchestrator.run(a, b, 1).await,
            Err(Error::InvalidWorkerCount { requested: 1, max: 0 })
        ));
    }

    #[tokio::test]
    async fn worker_count_is_logged_only_once_accepted() {
        use tracing_subscriber::Registry;
        use tracing_subscriber::prelude::*;

        use crate::logging::log_file_layer;

        let log_path = std::env::temp_dir().join(format!(
            "matmul-pool-orch-accepted-{}.log",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&log_path);
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(log_file_layer::<Registry>(&log_path).unwrap()),
        );

        let (a, b) = sample();
        let mut orchestrator = Orchestrator::new(config("rejected-log", 4));
        assert!(orchestrator.run(a.clone(), b.clone(), 3).await.is_err());
        let log = std::fs::read_to_string(&log_path).unwrap_or_default();
        assert!(!log.contains("using"), "{}", log);

        let accepted = config("accepted-log", 4);
        let path = accepted.result_path.clone();
        let mut orchestrator = Orchestrator::new(accepted);
        orchestrator.run(a, b, 2).await.unwrap();
        let log = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(log.matches("[INFO] using 2 workers\n").count(), 1, "{}", log);

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(&log_path);
    }

    #[cfg(debug_assertions)]
    #[tokio::test]
    async fn worker_fault_is_reported_after_shutdown() {
        let config = config("fault", 8);
        let path = config.result_path.clone();
        // Row 1 overflows i64 and panics in debug builds.
        let a = Matrix::from_rows(vec![vec![1, 1], vec![i64::MAX, 1], vec![2, 2]]).unwrap();
        let b = Matrix::from_rows(vec![vec![2], vec![1]]).unwrap();

        let mut orchestrator = Orchestrator::new(config);
        let err = orchestrator.run(a, b, 3).await.unwrap_err();

        assert!(matches!(err, Error::WorkerFailed { worker: 1 }));
        assert_eq!(orchestrator.phase(), Phase::Failed);

        let mut lines: Vec<String> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        lines.sort();
        assert_eq!(lines, vec!["Row 0: [3]", "Row 2: [6]"]);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn sink_failure_does_not_hang() {
        let result = std::env::temp_dir()
            .join(format!("matmul-pool-orch-missing-{}", std::process::id()))
            .join("results.txt");
        let config = Config::new(result, "unused.log").with_cpu_count(4);
        let (a, b) = sample();

        let mut orchestrator = Orchestrator::new(config);
        let err = orchestrator.run(a, b, 2).await.unwrap_err();
        assert!(matches!(err, Error::Sink { .. }));
        assert_eq!(orchestrator.phase(), Phase::Failed);
    }
}
