//! Pipeline phases and the snapshots published for each transition.

use std::fmt;

use serde::Serialize;

/// Phase of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Capturing,
    AwaitingReadiness,
    Validating,
    Identifying,
    Resolving,
    Enriching,
    Ready,
    Error,
}

impl PipelineState {
    /// Human-readable progress text for this phase.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Ready to scan",
            Self::Capturing => "Capturing image...",
            Self::AwaitingReadiness => "Saving photo...",
            Self::Validating => "Detecting vinyl...",
            Self::Identifying => "Identifying album...",
            Self::Resolving => "Searching catalog...",
            Self::Enriching => "Fetching artist info...",
            Self::Ready => "Done",
            Self::Error => "Error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }

    /// Phase that follows this one on success.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Capturing),
            Self::Capturing => Some(Self::AwaitingReadiness),
            Self::AwaitingReadiness => Some(Self::Validating),
            Self::Validating => Some(Self::Identifying),
            Self::Identifying => Some(Self::Resolving),
            Self::Resolving => Some(Self::Enriching),
            Self::Enriching => Some(Self::Ready),
            Self::Ready | Self::Error => None,
        }
    }

    /// Whether a run may move from `self` to `to`.
    ///
    /// Error is reachable from every phase that is doing work.
    pub fn can_transition_to(self, to: Self) -> bool {
        if to == Self::Error {
            return !self.is_terminal() && self != Self::Idle;
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable status published to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineSnapshot {
    /// Run that produced this snapshot; 0 before the first run
    pub run_id: u64,
    pub state: PipelineState,
    pub label: String,
    /// Human-readable reason when `state` is `Error`
    pub failure: Option<String>,
}

impl PipelineSnapshot {
    pub fn idle() -> Self {
        Self::phase(0, PipelineState::Idle)
    }

    pub fn phase(run_id: u64, state: PipelineState) -> Self {
        Self {
            run_id,
            state,
            label: state.label().to_string(),
            failure: None,
        }
    }

    pub fn ready(run_id: u64, album: &str, artist: &str) -> Self {
        Self {
            label: format!("Found: {} by {}", album, artist),
            ..Self::phase(run_id, PipelineState::Ready)
        }
    }

    pub fn failed(run_id: u64, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            run_id,
            state: PipelineState::Error,
            label: format!("Error: {}", reason),
            failure: Some(reason),
        }
    }
}
