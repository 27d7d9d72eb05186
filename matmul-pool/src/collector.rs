//! The single consumer that persists computed rows.

use std::path::PathBuf;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use crate::Error;
use crate::channel::{Message, ResultReceiver, RowResult};

/// Formats a row the way it is stored in the result file, without the
/// trailing newline.
pub fn format_row(row: &RowResult) -> String {
    format!("Row {}: {:?}", row.index, row.values)
}

/// Drains the result channel into an append-only file.
pub struct ResultCollector {
    results: ResultReceiver,
    path: PathBuf,
}

impl ResultCollector {
    pub fn new(results: ResultReceiver, path: impl Into<PathBuf>) -> Self {
        Self {
            results,
            path: path.into(),
        }
    }

    /// Runs until the `Done` sentinel arrives (or every sender is dropped)
    /// and returns the number of rows written.
    ///
    /// Rows are written in arrival order. If the file cannot be opened or
    /// written, the error is reported and returned immediately; anything
    /// still queued is left undrained.
    pub async fn run(mut self) -> Result<usize, Error> {
        let outcome = self.drain().await;
        match outcome {
            Ok(written) => Ok(written),
            Err(source) => {
                error!(path = %self.path.display(), "failed to save results: {}", source);
                Err(Error::Sink {
                    path: self.path,
                    source,
                })
            }
        }
    }

    async fn drain(&mut self) -> Result<usize, std::io::Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut written = 0;
        while let Some(message) = self.results.recv().await {
            let batch = match message {
                Message::Done => break,
                Message::Batch(batch) => batch,
            };

            if batch.is_empty() {
                warn!("received an empty result batch");
                continue;
            }

            for row in &batch {
                write_row(&mut file, row).await?;
                written += 1;
                info!("row {} saved to {}", row.index, self.path.display());
            }
        }

        file.flush().await?;
        Ok(written)
    }
}

async fn write_row(file: &mut File, row: &RowResult) -> Result<(), std::io::Error> {
    let mut line = format_row(row);
    line.push('\n');
    file.write_all(line.as_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::result_channel;
    use crate::logging::log_file_layer;
    use tracing_subscriber::Registry;
    use tracing_subscriber::prelude::*;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "matmul-pool-collector-{}-{}.txt",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn formats_row_as_list() {
        assert_eq!(
            format_row(&RowResult::new(4, vec![19, 22])),
            "Row 4: [19, 22]"
        );
    }

    #[tokio::test]
    async fn writes_rows_until_sentinel() {
        let path = temp_path("sentinel");
        let (tx, rx) = result_channel();
        tx.send_batch(vec![RowResult::new(1, vec![43, 50])]);
        tx.send_batch(vec![RowResult::new(0, vec![19, 22])]);
        tx.send_done();
        // Anything after the sentinel is never read.
        tx.send_batch(vec![RowResult::new(9, vec![0])]);

        let written = ResultCollector::new(rx, &path).run().await.unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Row 1: [43, 50]\nRow 0: [19, 22]\n");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn skips_empty_batches_with_a_warning() {
        let path = temp_path("empty");
        let log_path = temp_path("empty-log");
        let layer = log_file_layer::<Registry>(&log_path).unwrap();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(layer));

        let (tx, rx) = result_channel();
        tx.send_batch(vec![]);
        tx.send_batch(vec![RowResult::new(2, vec![7])]);
        tx.send_done();

        let written = ResultCollector::new(rx, &path).run().await.unwrap();
        assert_eq!(written, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Row 2: [7]\n");

        let log = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2, "{}", log);
        assert_eq!(lines[0], "[WARN] received an empty result batch");
        assert!(lines[1].starts_with("[INFO] row 2 saved to "), "{}", log);
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(&log_path);
    }

    #[tokio::test]
    async fn appends_to_existing_file() {
        let path = temp_path("append");
        std::fs::write(&path, "Row 0: [1]\n").unwrap();

        let (tx, rx) = result_channel();
        tx.send_batch(vec![RowResult::new(0, vec![2])]);
        tx.send_done();
        ResultCollector::new(rx, &path).run().await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Row 0: [1]\nRow 0: [2]\n"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn stops_when_senders_are_dropped() {
        let path = temp_path("closed");
        let (tx, rx) = result_channel();
        tx.send_batch(vec![RowResult::new(0, vec![1, 2])]);
        drop(tx);

        let written = ResultCollector::new(rx, &path).run().await.unwrap();
        assert_eq!(written, 1);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn reports_unopenable_sink() {
        let path = std::env::temp_dir()
            .join(format!("matmul-pool-missing-{}", std::process::id()))
            .join("nested")
            .join("results.txt");
        let (tx, rx) = result_channel();
        tx.send_batch(vec![RowResult::new(0, vec![1])]);

        let err = ResultCollector::new(rx, &path).run().await.unwrap_err();
        assert!(matches!(err, Error::Sink { .. }));
        // The receiver is gone, so later sends fail instead of blocking.
        assert!(!tx.send_done());
    }
}
