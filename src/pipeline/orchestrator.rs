//! Sequences one capture through every stage and builds the release view.
//!
//! Stages up to identification are fatal on failure. After that the run
//! always reaches `Ready`: a catalog failure is carried in the view and
//! enrichment failures live in the bundle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

use super::state::{PipelineSnapshot, PipelineState};
use crate::capture::{
    CaptureError, FileReadinessWaiter, ImageQualityGate, PhotoSource, QualityVerdict,
    ReadinessPolicy, ReadinessState, RejectReason,
};
use crate::enrichment::links::{self, StreamingLink};
use crate::enrichment::{
    CatalogEntry, CatalogError, CatalogQuery, CatalogResolver, EnrichmentAggregator,
    EnrichmentBundle,
};
use crate::recognition::{
    BridgeFault, CropBox, IdentificationResult, RecognitionBridge, RecognitionError,
};

/// Fatal run failures. Each one ends the run in the `Error` state.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("file not ready")]
    ReadinessTimeout { attempts: u32 },

    #[error("{reason}")]
    QualityRejected { reason: RejectReason },

    #[error(transparent)]
    Bridge(BridgeFault),

    #[error("{message}")]
    Identification { message: String },
}

impl From<RecognitionError> for PipelineError {
    fn from(err: RecognitionError) -> Self {
        match err {
            RecognitionError::Bridge(fault) => Self::Bridge(fault),
            RecognitionError::Identification { message } => Self::Identification { message },
        }
    }
}

impl PipelineError {
    /// Only call-boundary faults are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Bridge(_))
    }
}

/// Everything a finished run knows about the record.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseView {
    pub identification: IdentificationResult,
    pub catalog_results: Vec<CatalogEntry>,
    #[serde(serialize_with = "serialize_catalog_error")]
    pub catalog_error: Option<CatalogError>,
    pub enrichment: EnrichmentBundle,
    pub album_link: StreamingLink,
    pub artist_link: StreamingLink,
    /// One link per top track, in the same order
    pub track_links: Vec<StreamingLink>,
}

fn serialize_catalog_error<S>(err: &Option<CatalogError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match err {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Publishes snapshots for one run.
///
/// The publisher owns the run's current phase and refuses transitions the
/// state machine does not allow. Snapshots from a run that is no longer
/// current are dropped, so a superseded run can't overwrite its successor's
/// progress.
#[derive(Clone)]
pub struct StatusPublisher {
    tx: watch::Sender<PipelineSnapshot>,
    current_run: Arc<AtomicU64>,
    run_id: u64,
    state: Arc<Mutex<PipelineState>>,
}

impl StatusPublisher {
    pub(crate) fn new(
        tx: watch::Sender<PipelineSnapshot>,
        current_run: Arc<AtomicU64>,
        run_id: u64,
    ) -> Self {
        Self {
            tx,
            current_run,
            run_id,
            state: Arc::new(Mutex::new(PipelineState::Idle)),
        }
    }

    /// Publisher for a one-off run with its own channel.
    pub fn standalone() -> (Self, watch::Receiver<PipelineSnapshot>) {
        let (tx, rx) = watch::channel(PipelineSnapshot::idle());
        (Self::new(tx, Arc::new(AtomicU64::new(1)), 1), rx)
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Phase this run last moved into.
    pub fn state(&self) -> PipelineState {
        *self.state.lock()
    }

    /// Move to `snapshot.state` and publish it. Returns false, publishing
    /// nothing, when the transition is not legal from the current phase.
    fn advance(&self, snapshot: PipelineSnapshot) -> bool {
        {
            let mut state = self.state.lock();
            if !state.can_transition_to(snapshot.state) {
                tracing::warn!(
                    run = self.run_id,
                    "Ignoring illegal transition {:?} -> {:?}",
                    *state,
                    snapshot.state
                );
                return false;
            }
            *state = snapshot.state;
        }
        self.publish(snapshot);
        true
    }

    fn publish(&self, snapshot: PipelineSnapshot) {
        self.tx.send_if_modified(|current| {
            if self.current_run.load(Ordering::SeqCst) != self.run_id {
                return false;
            }
            *current = snapshot;
            true
        });
    }

    fn enter(&self, state: PipelineState) -> bool {
        tracing::info!(run = self.run_id, "{}", state.label());
        self.advance(PipelineSnapshot::phase(self.run_id, state))
    }

    fn ready(&self, identification: &IdentificationResult) -> bool {
        self.advance(PipelineSnapshot::ready(
            self.run_id,
            &identification.album,
            &identification.artist,
        ))
    }

    fn failed(&self, reason: impl Into<String>) -> bool {
        self.advance(PipelineSnapshot::failed(self.run_id, reason))
    }
}

/// Runs the capture-validate-identify-resolve-enrich sequence.
pub struct PipelineOrchestrator {
    source: Arc<dyn PhotoSource>,
    readiness: FileReadinessWaiter,
    quality: ImageQualityGate,
    recognition: RecognitionBridge,
    resolver: CatalogResolver,
    aggregator: EnrichmentAggregator,
    crop: CropBox,
}

impl PipelineOrchestrator {
    pub fn new(
        source: Arc<dyn PhotoSource>,
        recognition: RecognitionBridge,
        resolver: CatalogResolver,
        aggregator: EnrichmentAggregator,
    ) -> Self {
        Self {
            source,
            readiness: FileReadinessWaiter::new(ReadinessPolicy::default()),
            quality: ImageQualityGate::default(),
            recognition,
            resolver,
            aggregator,
            crop: CropBox::FULL,
        }
    }

    pub fn with_readiness(mut self, readiness: FileReadinessWaiter) -> Self {
        self.readiness = readiness;
        self
    }

    pub fn with_quality(mut self, quality: ImageQualityGate) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_crop(mut self, crop: CropBox) -> Self {
        self.crop = crop;
        self
    }

    /// Run one capture to completion, publishing every transition.
    pub async fn run(&self, status: &StatusPublisher) -> Result<ReleaseView, PipelineError> {
        match self.execute(status).await {
            Ok(view) => {
                status.ready(&view.identification);
                Ok(view)
            }
            Err(e) => {
                tracing::error!(run = status.run_id, "Pipeline failed: {}", e);
                status.failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn execute(&self, status: &StatusPublisher) -> Result<ReleaseView, PipelineError> {
        status.enter(PipelineState::Capturing);
        let photo = self.source.capture().await?;

        status.enter(PipelineState::AwaitingReadiness);
        match self.readiness.wait(&photo).await {
            ReadinessState::Stable { size } => {
                tracing::debug!("Photo {:?} stable at {} bytes", photo.path(), size);
            }
            ReadinessState::TimedOut { attempts } => {
                return Err(PipelineError::ReadinessTimeout { attempts });
            }
            ReadinessState::Pending => {
                return Err(PipelineError::ReadinessTimeout {
                    attempts: self.readiness.policy().max_attempts,
                });
            }
        }

        status.enter(PipelineState::Validating);
        match self.quality.assess_path(photo.path()).await {
            QualityVerdict::Accepted { brightness } => {
                tracing::debug!("Photo accepted with brightness {:.1}", brightness);
            }
            QualityVerdict::Rejected(reason) => {
                return Err(PipelineError::QualityRejected { reason });
            }
        }

        status.enter(PipelineState::Identifying);
        let identification = self.recognition.identify(photo.path(), self.crop).await?;
        tracing::debug!(
            run = status.run_id,
            "Identified {}ms after capture",
            (chrono::Utc::now() - photo.captured_at()).num_milliseconds()
        );
        // Identified; the capture is no longer needed
        drop(photo);
        if !identification.has_album() || !identification.has_artist() {
            tracing::info!(
                run = status.run_id,
                "Searching with placeholder identification '{} {}'",
                identification.album,
                identification.artist
            );
        }

        status.enter(PipelineState::Resolving);
        let query =
            CatalogQuery::from_album_artist(&identification.album, &identification.artist);
        let (catalog_results, catalog_error) = match self.resolver.search_default(&query).await {
            Ok(entries) => (entries, None),
            Err(e) => (Vec::new(), Some(e)),
        };

        status.enter(PipelineState::Enriching);
        let enrichment = self.aggregator.enrich(&identification.artist).await;

        let track_links = enrichment
            .top_tracks
            .iter()
            .map(|track| links::track_link(&track.name, &identification.artist))
            .collect();

        Ok(ReleaseView {
            track_links,
            album_link: links::album_link(&identification.album, &identification.artist),
            artist_link: links::artist_link(&identification.artist),
            identification,
            catalog_results,
            catalog_error,
            enrichment,
        })
    }
}
