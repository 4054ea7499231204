use crate::backend::BackendError;
use crate::ordering::Relation;
use std::time::Duration;
use wayfind_common::protocol::ContextId;

/// Everything a check can fail with.
///
/// Variants carry what was attempted and what was observed, so a failing
/// scenario can be diagnosed from its report alone.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("No candidate matched within {}ms; tried [{}]", .elapsed.as_millis(), .candidates.join(", "))]
    NotFound {
        candidates: Vec<String>,
        elapsed: Duration,
    },

    #[error("Expected one new browsing context, found {}: [{}]", .contexts.len(), join_contexts(.contexts))]
    AmbiguousNewContext { contexts: Vec<ContextId> },

    #[error("No new context opened and address stayed '{address}' for {}ms", .elapsed.as_millis())]
    NoNavigationOccurred { address: String, elapsed: Duration },

    #[error("Address '{actual}' does not contain '{expected}'")]
    DomainMismatch { actual: String, expected: String },

    #[error("List order does not satisfy {relation}: before {before:?}, after {after:?}")]
    OrderMismatch {
        relation: Relation,
        before: Vec<String>,
        after: Vec<String>,
    },

    #[error("Stale element: {0}")]
    StaleElement(String),

    #[error("Timed out after {}ms waiting for {waiting_for}", .elapsed.as_millis())]
    TimedOut {
        waiting_for: String,
        elapsed: Duration,
    },

    #[error("Cannot read '{value}' as a number")]
    Unparseable { value: String },

    #[error("Candidate list must contain at least one selector")]
    InvalidCandidates,

    #[error("Backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for CheckError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::StaleElement(detail) => CheckError::StaleElement(detail),
            other => CheckError::Backend(other),
        }
    }
}

impl CheckError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CheckError::NotFound { .. })
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, CheckError::StaleElement(_))
    }
}

fn join_contexts(contexts: &[ContextId]) -> String {
    contexts
        .iter()
        .map(ContextId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
