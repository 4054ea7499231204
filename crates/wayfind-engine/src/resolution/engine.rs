//! Fallback element resolution.
//!
//! Candidates are tried strictly in list order on every poll. The first one
//! with at least one match wins, and within it the first element in document
//! order is taken. Selector specificity is never judged; callers that need a
//! different element pass a narrower selector.

use super::candidates::Candidates;
use super::result::{Resolved, ResolvedList};
use crate::backend::{Backend, BackendError};
use crate::config::Settings;
use crate::error::CheckError;
use crate::wait::Poll;
use std::time::Duration;
use tracing::{debug, info};
use wayfind_common::protocol::{ElementHandle, Selector};

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Count a match only if the backend reports it displayed.
    pub require_visible: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
            require_visible: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ResolveOptions,
}

impl Resolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(ResolveOptions {
            timeout: settings.timeouts.resolve(),
            poll_interval: settings.timeouts.poll(),
            require_visible: false,
        })
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Same resolver with a different wait budget.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut options = self.options.clone();
        options.timeout = timeout;
        Self { options }
    }

    /// Same resolver, but only visible elements count as matches.
    pub fn visible(&self) -> Self {
        let mut options = self.options.clone();
        options.require_visible = true;
        Self { options }
    }

    /// Wait for the first matching candidate and return its first element.
    pub async fn resolve<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        candidates: &Candidates,
    ) -> Result<Resolved, CheckError> {
        let list = self.resolve_all(backend, candidates).await?;
        list.first().ok_or_else(|| self.not_found(candidates, Duration::ZERO))
    }

    /// Wait for the first matching candidate and return all of its elements.
    pub async fn resolve_all<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        candidates: &Candidates,
    ) -> Result<ResolvedList, CheckError> {
        let poll = Poll::start(self.options.timeout, self.options.poll_interval);
        loop {
            if let Some(list) = self.probe_all(backend, candidates).await? {
                debug!(
                    selector = %list.selector,
                    index = list.candidate_index,
                    matches = list.elements.len(),
                    "Resolved candidates"
                );
                return Ok(list);
            }
            if !poll.next().await {
                break;
            }
        }

        info!(
            candidates = ?candidates.describe(),
            elapsed_ms = poll.elapsed().as_millis() as u64,
            "No candidate matched"
        );
        Err(self.not_found(candidates, poll.elapsed()))
    }

    /// Single pass without waiting.
    pub async fn probe<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        candidates: &Candidates,
    ) -> Result<Option<Resolved>, CheckError> {
        Ok(self
            .probe_all(backend, candidates)
            .await?
            .and_then(|list| list.first()))
    }

    /// Single pass without waiting, returning every match of the winner.
    pub async fn probe_all<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        candidates: &Candidates,
    ) -> Result<Option<ResolvedList>, CheckError> {
        for (index, selector) in candidates.iter().enumerate() {
            let matches = self.matches(backend, selector).await?;
            if !matches.is_empty() {
                return Ok(Some(ResolvedList {
                    elements: matches,
                    selector: selector.clone(),
                    candidate_index: index,
                }));
            }
        }
        Ok(None)
    }

    async fn matches<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        selector: &Selector,
    ) -> Result<Vec<ElementHandle>, CheckError> {
        let found = backend.find_all(selector).await?;
        if !self.options.require_visible {
            return Ok(found);
        }

        let mut visible = Vec::with_capacity(found.len());
        for element in found {
            match backend.is_displayed(&element).await {
                Ok(true) => visible.push(element),
                Ok(false) => {}
                // Replaced between lookup and check: not a match on this pass.
                Err(BackendError::StaleElement(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(visible)
    }

    fn not_found(&self, candidates: &Candidates, elapsed: Duration) -> CheckError {
        CheckError::NotFound {
            candidates: candidates.describe(),
            elapsed,
        }
    }
}
