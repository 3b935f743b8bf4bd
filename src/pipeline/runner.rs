//! Background pipeline runner.
//!
//! Owns the status channel and at most one in-flight run. Submitting a new
//! capture aborts the previous run; its late snapshots are suppressed and
//! its [`PipelineRun::join`] resolves to `None`.
//!
//! # Usage
//!
//! ```ignore
//! let runner = PipelineRunner::new(orchestrator);
//! let mut status = runner.subscribe();
//! let run = runner.submit();
//! while status.changed().await.is_ok() {
//!     println!("{}", status.borrow().label);
//! }
//! let view = run.join().await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

use super::orchestrator::{PipelineError, PipelineOrchestrator, ReleaseView, StatusPublisher};
use super::state::PipelineSnapshot;

/// Handle to one submitted run.
pub struct PipelineRun {
    run_id: u64,
    handle: JoinHandle<Result<ReleaseView, PipelineError>>,
}

impl PipelineRun {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Wait for the run to finish. `None` if it was superseded or aborted.
    pub async fn join(self) -> Option<Result<ReleaseView, PipelineError>> {
        match self.handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) if e.is_cancelled() => {
                tracing::debug!(run = self.run_id, "Run was superseded");
                None
            }
            Err(e) => {
                tracing::error!(run = self.run_id, "Run task failed: {}", e);
                None
            }
        }
    }
}

/// Runs one capture at a time on the tokio runtime.
pub struct PipelineRunner {
    orchestrator: Arc<PipelineOrchestrator>,
    status_tx: watch::Sender<PipelineSnapshot>,
    current_run: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl PipelineRunner {
    pub fn new(orchestrator: PipelineOrchestrator) -> Self {
        let (status_tx, _) = watch::channel(PipelineSnapshot::idle());
        Self {
            orchestrator: Arc::new(orchestrator),
            status_tx,
            current_run: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    /// Receive a snapshot for every transition of the current run.
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.status_tx.subscribe()
    }

    /// Latest published snapshot.
    pub fn status(&self) -> PipelineSnapshot {
        self.status_tx.borrow().clone()
    }

    /// True while a run is in flight.
    pub fn is_processing(&self) -> bool {
        self.in_flight
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start a run for a new capture, superseding any run in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self) -> PipelineRun {
        let mut in_flight = self.in_flight.lock();

        let run_id = self.current_run.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = in_flight.take()
            && !previous.is_finished()
        {
            tracing::info!(run = run_id, "Superseding run {}", run_id - 1);
            previous.abort();
        }

        let status = StatusPublisher::new(self.status_tx.clone(), self.current_run.clone(), run_id);
        let orchestrator = self.orchestrator.clone();
        let handle = tokio::spawn(async move { orchestrator.run(&status).await });

        *in_flight = Some(handle.abort_handle());
        PipelineRun { run_id, handle }
    }

    /// Abort the run in flight, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.in_flight.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for PipelineRunner {
    fn drop(&mut self) {
        self.cancel();
    }
}
