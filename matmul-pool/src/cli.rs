//! Interactive front end: prompt, generate, multiply, report.

use std::io::{BufRead, Write};

use tracing::{error, info};

use crate::orchestrator::{Orchestrator, RunReport};
use crate::prompt::{Dimensions, Prompt};
use crate::{Config, Error, Matrix};

/// Runs one interactive session.
///
/// Any failure is logged at ERROR before it is returned. Validation
/// failures happen before any worker starts or any row is written.
pub fn run<R: BufRead, W: Write>(
    config: Config,
    prompt: &mut Prompt<R, W>,
) -> Result<RunReport, Error> {
    let outcome = session(config, prompt);
    if let Err(e) = &outcome {
        error!("{}", e);
    }
    outcome
}

fn session<R: BufRead, W: Write>(
    config: Config,
    prompt: &mut Prompt<R, W>,
) -> Result<RunReport, Error> {
    let Dimensions {
        rows_a,
        cols_a,
        rows_b,
        cols_b,
    } = prompt.dimensions()?;

    let mut rng = rand::thread_rng();
    let a = Matrix::random(rows_a, cols_a, &mut rng)?;
    let b = Matrix::random(rows_b, cols_b, &mut rng)?;
    log_matrix("A", &a);
    log_matrix("B", &b);

    let max = config.max_processes(rows_a);
    info!(
        "{} hardware threads available, at most {} workers allowed",
        config.cpu_count, max
    );
    let workers = prompt.worker_count(max)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result_path = config.result_path.clone();
    let mut orchestrator = Orchestrator::new(config);
    let report = runtime.block_on(orchestrator.run(a, b, workers))?;

    info!(
        "multiplication started at {} finished in {:?} ({} rows), results saved to {}",
        report.started_at.to_rfc3339(),
        report.elapsed,
        report.rows_persisted,
        result_path.display()
    );
    Ok(report)
}

fn log_matrix(name: &str, matrix: &Matrix) {
    info!("matrix {}:", name);
    for line in matrix.to_string().lines() {
        info!("{}", line);
    }
}
