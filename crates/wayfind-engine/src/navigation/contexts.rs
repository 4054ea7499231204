use crate::backend::Backend;
use crate::error::CheckError;
use tracing::{debug, warn};
use wayfind_common::protocol::ContextId;

/// Browser context state recorded before a triggering action.
#[derive(Debug, Clone)]
pub struct Origin {
    pub context: ContextId,
    pub contexts: Vec<ContextId>,
    pub address: String,
}

impl Origin {
    pub async fn capture<B: Backend + ?Sized>(backend: &mut B) -> Result<Self, CheckError> {
        let context = backend.active_context().await?;
        let contexts = backend.contexts().await?;
        let address = backend.current_url().await?;
        if contexts.len() != 1 {
            debug!(open = contexts.len(), "Capturing origin with several contexts open");
        }
        Ok(Self {
            context,
            contexts,
            address,
        })
    }

    /// Contexts in `now` that were not open at capture time.
    pub fn fresh(&self, now: &[ContextId]) -> Vec<ContextId> {
        now.iter()
            .filter(|c| !self.contexts.contains(c))
            .cloned()
            .collect()
    }

    /// Close every context opened since capture and make the origin active again.
    ///
    /// Keeps going after a failed listing or close so the origin is still re-selected;
    /// the first error is returned at the end.
    pub async fn restore<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        restore_address: bool,
    ) -> Result<(), CheckError> {
        let mut first_error = None;
        let open = match backend.contexts().await {
            Ok(open) => open,
            Err(e) => {
                warn!(error = %e, "Listing contexts failed; only re-selecting the origin");
                first_error = Some(e);
                Vec::new()
            }
        };
        for context in self.fresh(&open) {
            debug!(%context, "Closing spawned context");
            if let Err(e) = backend.close_context(&context).await {
                warn!(%context, error = %e, "Failed to close spawned context");
                first_error.get_or_insert(e);
            }
        }

        backend.switch_to(&self.context).await?;

        if restore_address {
            let address = backend.current_url().await?;
            if address != self.address {
                debug!(from = %address, to = %self.address, "Restoring origin address");
                backend.navigate(&self.address).await?;
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
