// src/error.rs
use thiserror::Error;

/// Run-level error taxonomy. Failures local to one source or one entry are
/// recovered where they occur; only an empty aggregate or a publish-time
/// anchor failure end the run, and both exit with a diagnostic, not a panic.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network, timeout, or non-2xx status while talking to a source
    /// endpoint. The source is abandoned for this run.
    #[error("transport error from {origin}: {message}")]
    Transport { origin: String, message: String },

    /// A payload parsed, but an individual entry lacks required fields.
    /// The entry is skipped; the rest of the source survives.
    #[error("malformed entry from {origin}: {reason}")]
    MalformedSource { origin: String, reason: String },

    /// The target document is missing one of the region markers. The write
    /// is aborted and the original document preserved.
    #[error("anchor `{anchor}` not found in target document")]
    AnchorNotFound { anchor: &'static str },
}
