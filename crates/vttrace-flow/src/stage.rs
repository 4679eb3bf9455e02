//! Pipeline stages and their retry/timeout policies.
//!
//! Each flow step is described by a [`PipelineStage`]: a name plus a
//! [`StagePolicy`] with a bounded retry count and an optional time
//! budget. The runner composes these explicitly; the algorithms know
//! nothing about scheduling.

use std::time::{Duration, Instant};

use crate::FlowError;

/// Retry and timing policy for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Wall-clock budget for one run of the stage, if any.
    pub timeout: Option<Duration>,
}

impl StagePolicy {
    /// Policy with only a retry bound.
    #[must_use]
    pub const fn retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            timeout: None,
        }
    }

    /// Policy with a retry bound and a time budget.
    #[must_use]
    pub const fn with_timeout(max_retries: u32, timeout: Duration) -> Self {
        Self {
            max_retries,
            timeout: Some(timeout),
        }
    }
}

/// One named step of the feature-detection flow.
#[derive(Debug, Clone, Copy)]
pub struct PipelineStage {
    /// Stage name, used in logs and progress messages.
    pub name: &'static str,
    /// Retry/timeout policy.
    pub policy: StagePolicy,
}

/// Stage table for the feature-detection flow. Retry counts and the
/// generation budgets mirror the production scheduler's task settings.
pub mod stages {
    use super::{Duration, PipelineStage, StagePolicy};

    /// Resize the source image to a service bucket.
    pub const RESIZE_IMAGE: PipelineStage = PipelineStage {
        name: "resize_image",
        policy: StagePolicy::retries(2),
    };

    /// Ask the image-edit service to paint walls as black lines.
    pub const OUTLINE_WALLS: PipelineStage = PipelineStage {
        name: "outline_impassable_areas",
        policy: StagePolicy::with_timeout(2, Duration::from_secs(300)),
    };

    /// Ask the image-edit service to paint portals as black lines.
    pub const HIGHLIGHT_PORTALS: PipelineStage = PipelineStage {
        name: "highlight_portals",
        policy: StagePolicy::with_timeout(2, Duration::from_secs(300)),
    };

    /// Trace wall polylines from the outline image.
    pub const DETECT_WALLS: PipelineStage = PipelineStage {
        name: "detect_wall_segments",
        policy: StagePolicy::retries(2),
    };

    /// Detect portal segments from the highlight image.
    pub const DETECT_PORTALS: PipelineStage = PipelineStage {
        name: "detect_portal_segments",
        policy: StagePolicy::retries(2),
    };

    /// Assemble and serialize the UVTT document.
    pub const ASSEMBLE_UVTT: PipelineStage = PipelineStage {
        name: "create_uvtt_file",
        policy: StagePolicy::retries(2),
    };

    /// Render the diagnostic overlay.
    pub const RENDER_OVERLAY: PipelineStage = PipelineStage {
        name: "draw_features_on_image",
        policy: StagePolicy::retries(1),
    };
}

impl PipelineStage {
    /// Run an operation under this stage's policy.
    ///
    /// Retryable failures are re-attempted up to `max_retries` extra
    /// times; non-retryable failures return immediately. The time
    /// budget is checked after each attempt: this runner is
    /// synchronous and cannot interrupt a running operation, but a
    /// stage that overruns is reported as [`FlowError::Timeout`] so
    /// the caller never builds on work that blew its budget.
    ///
    /// # Errors
    ///
    /// Returns the final stage error once the policy is exhausted.
    pub fn run<T>(&self, mut op: impl FnMut() -> Result<T, FlowError>) -> Result<T, FlowError> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            match op() {
                Ok(value) => {
                    if let Some(budget) = self.policy.timeout {
                        if started.elapsed() > budget {
                            return Err(FlowError::Timeout {
                                stage: self.name,
                                budget,
                            });
                        }
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        stage = self.name,
                        attempt,
                        max_retries = self.policy.max_retries,
                        error = %err,
                        "stage failed, retrying"
                    );
                }
                Err(err) => {
                    tracing::error!(stage = self.name, error = %err, "stage failed");
                    return Err(err);
                }
            }
        }
    }
}
