//! External-link verification across windows and tabs.
//!
//! Real sites disagree on how an external link opens: some spawn a new
//! context (`target=_blank`), some navigate the current one. Both count as
//! navigation here. Whatever happens, the browser is left with the contexts
//! it had before the trigger and the origin context active.

use super::contexts::Origin;
use crate::backend::Backend;
use crate::config::Settings;
use crate::error::CheckError;
use crate::resolution::{Candidates, Resolver};
use crate::wait::{Phase, Poll};
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::{debug, info, warn};
use wayfind_common::protocol::ContextId;

#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Navigate the origin back if its address moved.
    pub restore_address: bool,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
            restore_address: true,
        }
    }
}

/// How the navigation showed up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationPath {
    NewContext { context: ContextId },
    SameContext,
}

#[derive(Debug, Clone)]
pub struct NavigationReport {
    pub path: NavigationPath,
    /// Address observed when the expected domain matched.
    pub address: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    options: NavigatorOptions,
}

impl Navigator {
    pub fn new(options: NavigatorOptions) -> Self {
        Self { options }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(NavigatorOptions {
            timeout: settings.timeouts.navigation(),
            poll_interval: settings.timeouts.poll(),
            restore_address: settings.navigation.restore_address,
        })
    }

    pub fn options(&self) -> &NavigatorOptions {
        &self.options
    }

    /// Run `trigger` and verify it led to an address containing `expected`
    /// (case-insensitive), in a new context or in the current one.
    ///
    /// Spawned contexts are closed and the origin re-selected on every exit
    /// path, including a failing trigger. A restore failure is reported only
    /// when the check itself passed.
    pub async fn with_external_navigation<B, F>(
        &self,
        backend: &mut B,
        trigger: F,
        expected: &str,
    ) -> Result<NavigationReport, CheckError>
    where
        B: Backend + ?Sized,
        F: for<'a> FnOnce(&'a mut B) -> BoxFuture<'a, Result<(), CheckError>>,
    {
        let origin = Origin::capture(backend).await?;
        debug!(phase = %Phase::Idle, origin = %origin.context, address = %origin.address);

        let outcome = match trigger(backend).await {
            Ok(()) => {
                debug!(phase = %Phase::ActionTriggered);
                self.observe(backend, &origin, expected).await
            }
            Err(e) => Err(e),
        };

        let restored = origin.restore(backend, self.options.restore_address).await;

        match (outcome, restored) {
            (Ok(report), Ok(())) => {
                info!(path = ?report.path, address = %report.address, "External navigation verified");
                Ok(report)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(restore_error)) => {
                warn!(error = %restore_error, "Restoring origin context failed after a failed check");
                Err(e)
            }
        }
    }

    /// Resolve a link, then click it as the trigger of
    /// [`with_external_navigation`](Self::with_external_navigation).
    pub async fn click_through<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        resolver: &Resolver,
        link: &Candidates,
        expected: &str,
    ) -> Result<NavigationReport, CheckError> {
        let resolved = resolver.resolve(backend, link).await?;
        let element = resolved.element;
        self.with_external_navigation(
            backend,
            move |b| {
                Box::pin(async move {
                    b.click(&element).await?;
                    Ok(())
                })
            },
            expected,
        )
        .await
    }

    /// Poll for a new context or a moved origin address.
    ///
    /// A new context wins whenever it shows up, even after the origin
    /// address already changed (a `#` link that also opens a tab). A moved
    /// origin only verifies once its address contains `expected`.
    async fn observe<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        origin: &Origin,
        expected: &str,
    ) -> Result<NavigationReport, CheckError> {
        debug!(phase = %Phase::AwaitingObservableChange);
        let poll = Poll::start(self.options.timeout, self.options.poll_interval);
        let needle = expected.to_lowercase();
        let mut moved: Option<String> = None;

        loop {
            let open = backend.contexts().await?;
            let fresh = origin.fresh(&open);
            match fresh.len() {
                0 => {}
                1 => {
                    let context = fresh[0].clone();
                    debug!(%context, "New context appeared");
                    backend.switch_to(&context).await?;
                    let address = self.await_domain(backend, expected, &poll).await?;
                    return Ok(NavigationReport {
                        path: NavigationPath::NewContext { context },
                        address,
                        elapsed: poll.elapsed(),
                    });
                }
                _ => return Err(CheckError::AmbiguousNewContext { contexts: fresh }),
            }

            let address = backend.current_url().await?;
            if address != origin.address {
                if address.to_lowercase().contains(&needle) {
                    debug!(phase = %Phase::Verified, %address, "Origin context navigated in place");
                    return Ok(NavigationReport {
                        path: NavigationPath::SameContext,
                        address,
                        elapsed: poll.elapsed(),
                    });
                }
                if moved.as_deref() != Some(address.as_str()) {
                    debug!(%address, "Origin address moved");
                }
                moved = Some(address);
            }

            if !poll.next().await {
                debug!(phase = %Phase::TimedOut);
                return Err(match moved {
                    Some(actual) => CheckError::DomainMismatch {
                        actual,
                        expected: expected.to_string(),
                    },
                    None => CheckError::NoNavigationOccurred {
                        address: origin.address.clone(),
                        elapsed: poll.elapsed(),
                    },
                });
            }
        }
    }

    /// Poll the active context's address until it contains `expected`.
    /// Redirect chains pass through other hosts first, so only the last
    /// address read before the deadline decides a mismatch.
    async fn await_domain<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        expected: &str,
        poll: &Poll,
    ) -> Result<String, CheckError> {
        let needle = expected.to_lowercase();
        loop {
            let address = backend.current_url().await?;
            if address.to_lowercase().contains(&needle) {
                debug!(phase = %Phase::Verified, %address);
                return Ok(address);
            }
            if !poll.next().await {
                return Err(CheckError::DomainMismatch {
                    actual: address,
                    expected: expected.to_string(),
                });
            }
        }
    }
}
