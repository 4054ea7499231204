//! Sort-order verification around a user action.
//!
//! The list is captured, the action runs, and the verifier waits for an
//! observable change (the old anchor going stale, or different content)
//! before reading the list again. Comparing against a half-rendered list is
//! the failure this guards against.

use super::relation::{Collation, Relation, holds};
use super::snapshot::{OrderedSnapshot, SnapshotSource};
use crate::backend::{Backend, BackendError};
use crate::config::Settings;
use crate::error::CheckError;
use crate::wait::{Phase, Poll};
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct VerifierOptions {
    pub collation: Collation,
    /// Budget for the list to show the action's effect.
    pub settle_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            collation: Collation::Text,
            settle_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// What told the verifier the list had been updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// The anchor element of `before` went stale.
    Replaced,
    /// Content changed without the anchor going stale.
    Rerendered,
    /// Nothing changed within the settle budget.
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct Reordered {
    pub relation: Relation,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub settle: Settle,
}

#[derive(Debug, Clone, Default)]
pub struct OrderVerifier {
    options: VerifierOptions,
}

impl OrderVerifier {
    pub fn new(options: VerifierOptions) -> Self {
        Self { options }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(VerifierOptions {
            collation: Collation::Text,
            settle_timeout: settings.timeouts.settle(),
            poll_interval: settings.timeouts.poll(),
        })
    }

    pub fn with_collation(&self, collation: Collation) -> Self {
        let mut options = self.options.clone();
        options.collation = collation;
        Self { options }
    }

    pub fn options(&self) -> &VerifierOptions {
        &self.options
    }

    pub async fn verify_reorder<B, S1, S2, A>(
        &self,
        backend: &mut B,
        before: &S1,
        action: A,
        after: &S2,
        relation: Relation,
    ) -> Result<Reordered, CheckError>
    where
        B: Backend + ?Sized,
        S1: SnapshotSource<B> + ?Sized,
        S2: SnapshotSource<B> + ?Sized,
        A: for<'a> FnOnce(&'a mut B) -> BoxFuture<'a, Result<(), CheckError>>,
    {
        debug!(phase = %Phase::Idle, %relation);
        let initial = self.capture_populated(backend, before).await?;

        action(backend).await?;
        debug!(phase = %Phase::ActionTriggered, before = initial.len());

        let (updated, settle) = self.await_change(backend, &initial, after).await?;

        if holds(relation, &self.options.collation, &initial.values, &updated.values)? {
            debug!(phase = %Phase::Verified, ?settle);
            info!(%relation, items = updated.len(), "List order verified");
            Ok(Reordered {
                relation,
                before: initial.values,
                after: updated.values,
                settle,
            })
        } else {
            Err(CheckError::OrderMismatch {
                relation,
                before: initial.values,
                after: updated.values,
            })
        }
    }

    /// Read `source` until it is non-empty or the settle budget runs out.
    /// An empty list at the deadline is returned as is.
    async fn capture_populated<B, S>(
        &self,
        backend: &mut B,
        source: &S,
    ) -> Result<OrderedSnapshot, CheckError>
    where
        B: Backend + ?Sized,
        S: SnapshotSource<B> + ?Sized,
    {
        let poll = Poll::start(self.options.settle_timeout, self.options.poll_interval);
        loop {
            match source.capture(backend).await {
                Ok(snapshot) if !snapshot.is_empty() => return Ok(snapshot),
                Ok(snapshot) if poll.is_expired() => return Ok(snapshot),
                Ok(_) => {}
                Err(CheckError::StaleElement(detail)) => {
                    debug!(%detail, "List re-rendered while reading");
                }
                Err(e) => return Err(e),
            }
            if !poll.next().await {
                return source.capture(backend).await;
            }
        }
    }

    async fn await_change<B, S>(
        &self,
        backend: &mut B,
        before: &OrderedSnapshot,
        source: &S,
    ) -> Result<(OrderedSnapshot, Settle), CheckError>
    where
        B: Backend + ?Sized,
        S: SnapshotSource<B> + ?Sized,
    {
        debug!(phase = %Phase::AwaitingObservableChange);
        let poll = Poll::start(self.options.settle_timeout, self.options.poll_interval);
        let mut anchor_stale = false;
        let mut latest: Option<OrderedSnapshot> = None;

        loop {
            if !anchor_stale && let Some(anchor) = &before.anchor {
                match backend.is_stale(anchor).await {
                    Ok(stale) => anchor_stale = stale,
                    Err(BackendError::NotSupported(_)) => {}
                    Err(e) => return Err(e.into()),
                }
            }

            match source.capture(backend).await {
                Ok(snapshot) => {
                    let populated = !snapshot.is_empty() || before.is_empty();
                    if populated && anchor_stale {
                        return Ok((snapshot, Settle::Replaced));
                    }
                    if populated && snapshot.values != before.values {
                        return Ok((snapshot, Settle::Rerendered));
                    }
                    if populated {
                        latest = Some(snapshot);
                    }
                }
                Err(CheckError::StaleElement(detail)) => {
                    debug!(%detail, "List re-rendered while reading");
                }
                Err(e) => return Err(e),
            }

            if !poll.next().await {
                break;
            }
        }

        match latest {
            Some(snapshot) => {
                warn!(
                    elapsed_ms = poll.elapsed().as_millis() as u64,
                    "List showed no change after the action; comparing as is"
                );
                Ok((snapshot, Settle::Unchanged))
            }
            None => {
                debug!(phase = %Phase::TimedOut);
                Err(CheckError::TimedOut {
                    waiting_for: "a readable list after the action".into(),
                    elapsed: poll.elapsed(),
                })
            }
        }
    }
}
