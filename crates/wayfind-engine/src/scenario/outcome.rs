use crate::error::CheckError;

/// Result of one scenario.
///
/// Skipping is a value, not a swallowed error: a scenario that finds its
/// feature missing on this site variant says so with a reason.
#[derive(Debug)]
pub enum Outcome {
    Verified,
    Skipped(String),
    Failed(CheckError),
}

impl Outcome {
    pub fn from_result<T>(result: Result<T, CheckError>) -> Self {
        match result {
            Ok(_) => Outcome::Verified,
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Like [`from_result`](Self::from_result), but an unmatched locator
    /// becomes a skip with `reason`.
    pub fn skip_when_absent<T>(result: Result<T, CheckError>, reason: impl Into<String>) -> Self {
        match result {
            Ok(_) => Outcome::Verified,
            Err(e) if e.is_not_found() => Outcome::Skipped(format!("{}: {}", reason.into(), e)),
            Err(e) => Outcome::Failed(e),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Outcome::Verified)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Verified => "verified",
            Outcome::Skipped(_) => "skipped",
            Outcome::Failed(_) => "failed",
        }
    }
}

impl From<Result<(), CheckError>> for Outcome {
    fn from(result: Result<(), CheckError>) -> Self {
        Outcome::from_result(result)
    }
}
