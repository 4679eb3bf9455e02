//! vttrace-flow: orchestration for the map feature-detection flow.
//!
//! The geometric core (`vttrace-pipeline`, `vttrace-export`) is pure;
//! this crate supplies everything around it: explicit stage policies
//! with bounded retries, the collaborator interfaces for external
//! services (blob storage, the hosted image-edit service, progress
//! reporting), and the end-to-end flow that sequences the stages.
//!
//! Failure is all-or-nothing: the first stage error aborts the run,
//! a terminal failed progress update is emitted, and no partial UVTT
//! document is produced.

pub mod collab;
pub mod flow;
pub mod stage;

pub use collab::{
    BlobClient, FixtureOutlineService, MemoryBlobClient, NullProgress, OutlineService,
    ProgressSink, TracingProgress,
};
pub use flow::{FlowConfig, FlowReport, detect_map_features};
pub use stage::{PipelineStage, StagePolicy};

use vttrace_export::ExportError;
use vttrace_pipeline::PipelineError;

/// Errors surfaced by the feature-detection flow.
///
/// Each stage surfaces its own variant; no stage reinterprets a
/// sibling's failure. The retry runner consults
/// [`is_retryable`](Self::is_retryable) before re-attempting.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Fetching a resource failed.
    #[error("failed to fetch {url}: {reason}")]
    Fetch {
        /// Resource that could not be fetched.
        url: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// Storing an artifact failed.
    #[error("failed to store artifact {name}: {reason}")]
    Store {
        /// Artifact name that could not be stored.
        name: String,
        /// Failure description.
        reason: String,
    },

    /// The external image-edit service failed or returned an unusable
    /// result.
    #[error("image edit service failed: {0}")]
    UpstreamService(String),

    /// A feature-extraction stage failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Document assembly or image encoding failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// A stage overran its time budget.
    #[error("stage {stage} exceeded its {budget:?} budget")]
    Timeout {
        /// Stage that overran.
        stage: &'static str,
        /// Configured budget.
        budget: std::time::Duration,
    },
}

impl FlowError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Malformed input will not change on retry, so decode failures
    /// and rescale contract violations are terminal. Everything that
    /// touches an external collaborator stays retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Pipeline(_) | Self::Timeout { .. })
    }
}
