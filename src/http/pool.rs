use std::sync::Arc;

use reqwest::{Client, Request};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::cancel::CancelSender;
use crate::metrics::{ErrorEvent, Sample};

use super::worker::worker_loop;

/// Owns the worker tasks for one run. Every worker subscribes to the same
/// cancellation broadcast before it is spawned, so no worker starts ahead of
/// the output channels or misses the signal.
pub(crate) struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub(crate) fn spawn(
        worker_count: usize,
        client: &Client,
        template: &Arc<Request>,
        cancel_tx: &CancelSender,
        sample_tx: &mpsc::Sender<Sample>,
        error_tx: &mpsc::Sender<ErrorEvent>,
    ) -> Self {
        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let cancel_rx = cancel_tx.subscribe();
            handles.push(tokio::spawn(worker_loop(
                client.clone(),
                Arc::clone(template),
                cancel_rx,
                sample_tx.clone(),
                error_tx.clone(),
            )));
        }
        Self { handles }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    pub(crate) async fn join(self) {
        for handle in self.handles {
            if let Err(err) = handle.await {
                warn!("Worker task failed: {}", err);
            }
        }
    }
}
