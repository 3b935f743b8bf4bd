//! Recognition engine variants.
//!
//! The recognition model is opaque: we hand it an image path and a crop box
//! and get back the JSON object described in [`super::dto`]. How the call
//! crosses the boundary is up to the engine:
//!
//! - [`SubprocessEngine`] runs a command (typically a Python script) and reads stdout
//! - [`RemoteEngine`] POSTs the image to an HTTP endpoint
//! - [`InProcessEngine`] calls a closure in the current process
//!
//! Engines only report [`BridgeFault`]s. Business errors travel inside the
//! response and are interpreted by the adapter.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::domain::{BridgeFault, RecognitionRequest};
use super::dto::{self, EngineResponse};

/// A call boundary to the recognition model.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn identify(&self, request: &RecognitionRequest) -> Result<EngineResponse, BridgeFault>;
}

/// Limit stderr excerpts in error messages.
fn excerpt(text: &str) -> String {
    text.trim().chars().take(200).collect()
}

// ============================================================================
// Out-of-process
// ============================================================================

/// Runs `<program> <args...> <image_path> <x1> <y1> <x2> <y2>` and parses stdout.
///
/// The child is killed if the call is dropped or times out.
pub struct SubprocessEngine {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl SubprocessEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl RecognitionEngine for SubprocessEngine {
    fn name(&self) -> &'static str {
        "subprocess"
    }

    async fn identify(&self, request: &RecognitionRequest) -> Result<EngineResponse, BridgeFault> {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&request.image_path)
            .args(request.crop.as_args())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(
            "Running recognition engine {:?} on {:?}",
            self.program,
            request.image_path
        );

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| BridgeFault::Timeout(self.timeout))?
            .map_err(|e| {
                BridgeFault::Unavailable(format!("failed to run {:?}: {}", self.program, e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed = dto::parse_engine_output(&stdout);

        if !output.status.success() {
            // Scripts exit non-zero after printing a structured error
            if let Ok(response) = parsed
                && response.error.is_some()
            {
                return Ok(response);
            }
            return Err(BridgeFault::Crashed {
                status: output.status.to_string(),
                stderr: excerpt(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        parsed.map_err(|e| BridgeFault::Malformed(format!("{} in {:?}", e, excerpt(&stdout))))
    }
}

// ============================================================================
// Remote
// ============================================================================

/// POSTs the raw image bytes to `<url>?x1=..&y1=..&x2=..&y2=..`.
pub struct RemoteEngine {
    http_client: reqwest::Client,
    url: String,
}

impl RemoteEngine {
    pub fn new(http_client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }

    fn request_url(&self, request: &RecognitionRequest) -> String {
        let crop = request.crop;
        format!(
            "{}?x1={}&y1={}&x2={}&y2={}",
            self.url, crop.x1, crop.y1, crop.x2, crop.y2
        )
    }
}

#[async_trait]
impl RecognitionEngine for RemoteEngine {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn identify(&self, request: &RecognitionRequest) -> Result<EngineResponse, BridgeFault> {
        let bytes = tokio::fs::read(&request.image_path).await.map_err(|e| {
            BridgeFault::Transport(format!("could not read {:?}: {}", request.image_path, e))
        })?;

        let response = self
            .http_client
            .post(self.request_url(request))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BridgeFault::Transport(format!("request timed out: {}", e))
                } else {
                    BridgeFault::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeFault::Transport(e.to_string()))?;
        let parsed: Result<EngineResponse, _> = serde_json::from_str(&body);

        if !status.is_success() {
            if let Ok(response) = parsed
                && response.error.is_some()
            {
                return Ok(response);
            }
            return Err(BridgeFault::Transport(format!(
                "HTTP {}: {}",
                status,
                excerpt(&body)
            )));
        }

        parsed.map_err(|e| BridgeFault::Malformed(e.to_string()))
    }
}

// ============================================================================
// In-process
// ============================================================================

type Handler = dyn Fn(&RecognitionRequest) -> Result<EngineResponse, BridgeFault> + Send + Sync;

/// Calls a function in the current process.
#[derive(Clone)]
pub struct InProcessEngine {
    handler: Arc<Handler>,
}

impl InProcessEngine {
    pub fn new(
        handler: impl Fn(&RecognitionRequest) -> Result<EngineResponse, BridgeFault>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Engine that answers every request with the same response.
    pub fn fixed(response: EngineResponse) -> Self {
        Self::new(move |_| Ok(response.clone()))
    }
}

#[async_trait]
impl RecognitionEngine for InProcessEngine {
    fn name(&self) -> &'static str {
        "in-process"
    }

    async fn identify(&self, request: &RecognitionRequest) -> Result<EngineResponse, BridgeFault> {
        (self.handler)(request)
    }
}
