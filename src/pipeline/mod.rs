//! Capture → readiness → quality → recognition → catalog → enrichment.
//!
//! [`PipelineOrchestrator`] runs one capture through every stage and
//! publishes a [`PipelineSnapshot`] per transition. [`PipelineRunner`]
//! drives it in the background, one run at a time.

pub mod orchestrator;
pub mod runner;
pub mod state;

pub use orchestrator::{PipelineError, PipelineOrchestrator, ReleaseView, StatusPublisher};
pub use runner::{PipelineRun, PipelineRunner};
pub use state::{PipelineSnapshot, PipelineState};
