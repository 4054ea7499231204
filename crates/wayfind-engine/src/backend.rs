use async_trait::async_trait;
pub use wayfind_common::error::BackendError;
use wayfind_common::protocol::{ContextId, ElementHandle, Selector};
pub use wayfind_common::protocol::NavigationResult;

/// The Backend trait is the browser-control surface every driver must implement.
///
/// Calls are round-trips to the browser; the engine awaits them one at a time.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start or connect to a browser session).
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and release the browser session.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Check if the backend is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate the active context to a URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// Address of the active context.
    async fn current_url(&mut self) -> Result<String, BackendError>;

    /// Title of the active document.
    async fn title(&mut self) -> Result<String, BackendError> {
        Err(BackendError::NotSupported("title".into()))
    }

    /// All elements matching `selector`, in document order.
    ///
    /// Returns an empty list, not an error, when nothing matches.
    async fn find_all(&mut self, selector: &Selector) -> Result<Vec<ElementHandle>, BackendError>;

    async fn click(&mut self, element: &ElementHandle) -> Result<(), BackendError>;

    async fn text(&mut self, element: &ElementHandle) -> Result<String, BackendError>;

    async fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BackendError>;

    async fn send_keys(&mut self, element: &ElementHandle, text: &str)
    -> Result<(), BackendError>;

    /// Whether the element is rendered and visible.
    async fn is_displayed(&mut self, _element: &ElementHandle) -> Result<bool, BackendError> {
        Err(BackendError::NotSupported("is_displayed".into()))
    }

    /// Whether the node behind `element` has been removed or replaced.
    ///
    /// Backends that cannot tell return `NotSupported`; callers then fall back
    /// to comparing page content.
    async fn is_stale(&mut self, _element: &ElementHandle) -> Result<bool, BackendError> {
        Err(BackendError::NotSupported("is_stale".into()))
    }

    /// All open browsing contexts (windows and tabs).
    async fn contexts(&mut self) -> Result<Vec<ContextId>, BackendError>;

    /// The context commands are currently sent to.
    async fn active_context(&mut self) -> Result<ContextId, BackendError>;

    async fn switch_to(&mut self, context: &ContextId) -> Result<(), BackendError>;

    /// Close `context`. The active context is undefined afterwards until the
    /// caller switches explicitly.
    async fn close_context(&mut self, context: &ContextId) -> Result<(), BackendError>;

    /// Capture a screenshot of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::NotSupported("screenshot".into()))
    }
}
