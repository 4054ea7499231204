use crate::backend::{Backend, BackendError, NavigationResult};
use crate::config::Settings;
use crate::error::CheckError;
use crate::navigation::Navigator;
use crate::ordering::{Collation, OrderVerifier};
use crate::resolution::{Candidates, Resolved, Resolver};

/// One browser session shared by the scenarios of a suite.
///
/// Passed explicitly to every scenario. Fields are public so a scenario can
/// borrow a tool and the backend at the same time:
/// `session.resolver.resolve(&mut session.backend, &candidates)`.
pub struct Session<B: Backend> {
    pub backend: B,
    pub settings: Settings,
    pub resolver: Resolver,
    pub navigator: Navigator,
    pub verifier: OrderVerifier,
}

impl<B: Backend> Session<B> {
    pub fn new(backend: B, settings: Settings) -> Self {
        let resolver = Resolver::from_settings(&settings);
        let navigator = Navigator::from_settings(&settings);
        let verifier = OrderVerifier::from_settings(&settings);
        Self {
            backend,
            settings,
            resolver,
            navigator,
            verifier,
        }
    }

    /// Numeric verifier using the configured currency symbols.
    pub fn price_verifier(&self) -> OrderVerifier {
        self.verifier
            .with_collation(Collation::currency(&self.settings.ordering.currency_symbols))
    }

    pub async fn open(&mut self, url: &str) -> Result<NavigationResult, CheckError> {
        Ok(self.backend.navigate(url).await?)
    }

    pub async fn resolve(&mut self, candidates: &Candidates) -> Result<Resolved, CheckError> {
        self.resolver.resolve(&mut self.backend, candidates).await
    }

    pub async fn click(&mut self, candidates: &Candidates) -> Result<Resolved, CheckError> {
        let resolved = self.resolve(candidates).await?;
        self.backend.click(&resolved.element).await?;
        Ok(resolved)
    }

    pub async fn type_into(
        &mut self,
        candidates: &Candidates,
        text: &str,
    ) -> Result<Resolved, CheckError> {
        let resolved = self.resolve(candidates).await?;
        self.backend.send_keys(&resolved.element, text).await?;
        Ok(resolved)
    }

    pub async fn text_of(&mut self, candidates: &Candidates) -> Result<String, CheckError> {
        let resolved = self.resolve(candidates).await?;
        Ok(self.backend.text(&resolved.element).await?)
    }

    pub async fn current_url(&mut self) -> Result<String, CheckError> {
        Ok(self.backend.current_url().await?)
    }

    pub async fn close(&mut self) -> Result<(), BackendError> {
        self.backend.close().await
    }
}
