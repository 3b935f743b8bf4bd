//! Album recognition across an opaque call boundary.
//!
//! # Architecture
//!
//! - **Domain** (`domain.rs`) - requests, results and the two error kinds
//! - **DTO** (`dto.rs`) - the JSON object every engine returns
//! - **Adapter** (`adapter.rs`) - maps DTOs to domain results
//! - **Engines** (`engine.rs`) - subprocess, remote and in-process variants
//!
//! Callers only see [`RecognitionBridge`]. Bridge faults (the call itself
//! failed) are kept apart from identification failures (the engine answered
//! with an error) so retry policy can tell them apart.

mod adapter;
pub mod domain;
pub mod dto;
pub mod engine;

use std::path::Path;
use std::sync::Arc;

pub use adapter::to_identification;
pub use domain::{
    BridgeFault, CropBox, IdentificationResult, RecognitionError, RecognitionRequest,
};
pub use engine::{InProcessEngine, RecognitionEngine, RemoteEngine, SubprocessEngine};

/// Stateless front door to a recognition engine.
///
/// Cloning shares the same engine handle.
#[derive(Clone)]
pub struct RecognitionBridge {
    engine: Arc<dyn RecognitionEngine>,
}

impl RecognitionBridge {
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self { engine }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Identify the album in `image_path`, optionally restricted to `crop`.
    pub async fn identify(
        &self,
        image_path: &Path,
        crop: CropBox,
    ) -> Result<IdentificationResult, RecognitionError> {
        let request = RecognitionRequest {
            image_path: image_path.to_path_buf(),
            crop,
        };

        let response = self.engine.identify(&request).await.inspect_err(|fault| {
            tracing::warn!("Recognition engine '{}' fault: {}", self.engine.name(), fault);
        })?;

        let result = to_identification(response)?;
        tracing::info!("Identified '{}' by '{}'", result.album, result.artist);
        Ok(result)
    }

    /// Identify using the whole image.
    pub async fn identify_full(
        &self,
        image_path: &Path,
    ) -> Result<IdentificationResult, RecognitionError> {
        self.identify(image_path, CropBox::FULL).await
    }
}
