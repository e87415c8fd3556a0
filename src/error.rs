// Error taxonomy for the test-plan pipeline

use thiserror::Error;

/// Errors raised while driving the pipeline.
///
/// Only `Configuration` escapes a pipeline run; the connectivity and
/// malformed-response classes are absorbed stage-locally by degrading to
/// fallback output.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Generation service unreachable, timed out, or returned a non-success
    /// status.
    #[error("Generation service unreachable: {0}")]
    Connectivity(String),

    /// Model output failed the strict structural parse after sanitization.
    /// Carries the raw text for diagnostics.
    #[error("Model returned malformed output: {raw}")]
    MalformedResponse { raw: String },

    /// A required upstream credential or setting is missing. Fatal; this is
    /// the only class propagated to the caller.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    pub fn malformed(raw: impl Into<String>) -> Self {
        PipelineError::MalformedResponse { raw: raw.into() }
    }
}
