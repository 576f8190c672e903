//! Typed errors for the extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can
//! match on failure modes instead of inspecting strings.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while acquiring page content.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure: DNS, TLS, connection reset, browser I/O.
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The fetch exceeded its time budget.
    #[error("timed out fetching {url} after {elapsed:?}")]
    Timeout { url: String, elapsed: Duration },

    /// An anti-automation challenge page persisted past the grace re-check.
    #[error("bot challenge blocked {url} (marker: {marker:?})")]
    BotBlocked { url: String, marker: String },

    /// Terminal non-2xx response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },
}

/// Errors raised by the extraction-service round trip.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The service could not be reached or rejected the request.
    #[error("extraction service unavailable: {0}")]
    ServiceUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service responded with something other than the expected JSON
    /// object. Carries a truncated snippet of the offending text so the
    /// failure can be diagnosed from logs.
    #[error("malformed extraction response: {snippet:?}")]
    MalformedResponse { snippet: String },

    /// The service call exceeded its time budget.
    #[error("extraction service timed out")]
    Timeout,
}

/// Errors from a [`Completion`](crate::traits::Completion) implementation.
///
/// Mapped into [`ExtractError`] at the extractor boundary so the pipeline
/// taxonomy stays closed.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Transport-level failure before any response arrived.
    #[error("completion request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service answered with a non-success status.
    #[error("completion service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("completion request timed out")]
    Timeout,
}

impl From<CompletionError> for ExtractError {
    fn from(error: CompletionError) -> Self {
        match error {
            CompletionError::Timeout => ExtractError::Timeout,
            other => ExtractError::ServiceUnavailable(Box::new(other)),
        }
    }
}

/// Errors from the submission-store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Pipeline stage, used to tag failures with their origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Reducing,
    Extracting,
    Reconciling,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Reducing => "reducing",
            Stage::Extracting => "extracting",
            Stage::Reconciling => "reconciling",
        };
        f.write_str(name)
    }
}

/// Cause of a pipeline failure, one variant per failing concern.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The caller cancelled the invocation at a suspension point.
    #[error("invocation cancelled")]
    Cancelled,
}

/// A normalized pipeline failure: the originating stage plus its cause.
///
/// Every internal error surfaces through this one type; partial progress
/// before the failing stage is discarded, never persisted.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    pub fn fetch(source: FetchError) -> Self {
        Self {
            stage: Stage::Fetching,
            source: source.into(),
        }
    }

    pub fn extract(source: ExtractError) -> Self {
        Self {
            stage: Stage::Extracting,
            source: source.into(),
        }
    }

    pub fn cancelled(stage: Stage) -> Self {
        Self {
            stage,
            source: StageError::Cancelled,
        }
    }

    /// True when the failure was a cooperative cancellation rather than a
    /// component error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.source, StageError::Cancelled)
    }
}
