//! Multi-producer, single-consumer channel carrying result batches.

use tokio::sync::mpsc;

/// One computed output row: its index in `C` and its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    pub index: usize,
    pub values: Vec<i64>,
}

impl RowResult {
    pub fn new(index: usize, values: Vec<i64>) -> Self {
        Self { index, values }
    }
}

/// All rows one worker produced, sent as a single message.
pub type ResultBatch = Vec<RowResult>;

/// What travels over the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Batch(ResultBatch),
    /// No further batches will be sent.
    Done,
}

/// Creates the unbounded queue between the workers and the collector and
/// returns its producer and consumer halves.
///
/// Delivery is FIFO per sender; batches from different senders interleave
/// in whatever order they arrive.
pub fn result_channel() -> (ResultSender, ResultReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ResultSender { tx }, ResultReceiver { rx })
}

/// Producer half. Cloned once per worker.
#[derive(Clone)]
pub struct ResultSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl ResultSender {
    /// Enqueues a batch. Returns `false` if the collector is gone.
    pub fn send_batch(&self, batch: ResultBatch) -> bool {
        self.tx.send(Message::Batch(batch)).is_ok()
    }

    /// Enqueues the terminal sentinel. Returns `false` if the collector is gone.
    pub fn send_done(&self) -> bool {
        self.tx.send(Message::Done).is_ok()
    }
}

/// Consumer half. There is exactly one.
pub struct ResultReceiver {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl ResultReceiver {
    /// Waits for the next message.
    ///
    /// Returns `None` once every sender has been dropped and the queue is
    /// empty.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }
}
