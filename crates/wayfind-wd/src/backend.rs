use crate::webdriver::{self, WebDriverClient};
use async_trait::async_trait;
use fantoccini::Locator;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::wd::WindowHandle;
use std::collections::HashMap;
use tracing::{debug, info};
use wayfind_engine::backend::{Backend, BackendError, NavigationResult};
use wayfind_engine::config::Settings;
use wayfind_engine::protocol::{ContextId, ElementHandle, Selector, Strategy};

/// Backend driving a browser through a W3C WebDriver server.
///
/// Element handles are the driver's own element ids; the matching
/// `Element`s are kept while the active window stays on the same page.
pub struct WebDriverBackend {
    client: Option<WebDriverClient>,
    webdriver_url: String,
    capabilities: serde_json::Map<String, serde_json::Value>,
    elements: ElementCache<Element>,
}

/// Elements found on one page of the active window, keyed by element id.
struct ElementCache<E> {
    page: Option<String>,
    entries: HashMap<String, E>,
}

impl<E> ElementCache<E> {
    fn new() -> Self {
        Self {
            page: None,
            entries: HashMap::new(),
        }
    }

    /// Drop everything when `url` is a different document than the cached one.
    /// Fragment changes keep the entries.
    fn observe_page(&mut self, url: &str) {
        let key = page_key(url);
        if self.page.as_deref() == Some(key) {
            return;
        }
        if !self.entries.is_empty() {
            debug!(from = ?self.page, to = key, dropped = self.entries.len(), "Page changed");
        }
        self.entries.clear();
        self.page = Some(key.to_string());
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.page = None;
    }

    fn insert(&mut self, id: String, element: E) {
        self.entries.insert(id, element);
    }

    fn get(&self, id: &str) -> Option<&E> {
        self.entries.get(id)
    }

    fn forget(&mut self, id: &str) {
        self.entries.remove(id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn page_key(url: &str) -> &str {
    url.split_once('#').map_or(url, |(base, _)| base)
}

impl WebDriverBackend {
    /// Connect to an existing WebDriver server with default capabilities.
    pub fn with_url(webdriver_url: impl Into<String>) -> Self {
        Self {
            client: None,
            webdriver_url: webdriver_url.into(),
            capabilities: serde_json::Map::new(),
            elements: ElementCache::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            client: None,
            webdriver_url: settings.webdriver.url.clone(),
            capabilities: webdriver::capabilities(&settings.webdriver),
            elements: ElementCache::new(),
        }
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    fn client(&self) -> Result<&WebDriverClient, BackendError> {
        self.client.as_ref().ok_or(BackendError::NotReady)
    }

    fn element(&self, handle: &ElementHandle) -> Result<&Element, BackendError> {
        self.elements
            .get(&handle.id)
            .ok_or_else(|| BackendError::StaleElement(handle.id.clone()))
    }

    /// Map an element command result; a stale element leaves the cache.
    fn checked<T>(
        &mut self,
        handle: &ElementHandle,
        op: &str,
        result: Result<T, CmdError>,
    ) -> Result<T, BackendError> {
        result.map_err(|e| {
            let err = element_error(handle, op, e);
            if err.is_stale() {
                self.elements.forget(&handle.id);
            }
            err
        })
    }
}

/// Map a command error, keeping staleness distinguishable.
fn element_error(handle: &ElementHandle, op: &str, err: CmdError) -> BackendError {
    if webdriver::is_stale_error(&err) {
        BackendError::StaleElement(handle.id.clone())
    } else {
        BackendError::Other(format!("{} failed: {}", op, err))
    }
}

fn window_handle(context: &ContextId) -> Result<WindowHandle, BackendError> {
    WindowHandle::try_from(context.as_str().to_string())
        .map_err(|e| BackendError::NoSuchContext(format!("{}: {:?}", context, e)))
}

/// WebDriver has no native name/class/partial-link strategies; express them
/// as CSS or XPath. A whitespace separated class value matches elements
/// carrying every listed class.
fn locator_query(selector: &Selector) -> (Strategy, String) {
    let value = &selector.value;
    match selector.strategy {
        Strategy::Name => (Strategy::Css, format!("[name={}]", css_string(value))),
        Strategy::Class => (
            Strategy::Css,
            value
                .split_whitespace()
                .map(|class| format!(".{}", css_ident(class)))
                .collect(),
        ),
        Strategy::PartialLink => (
            Strategy::XPath,
            format!("//a[contains(normalize-space(.), {})]", xpath_literal(value)),
        ),
        other => (other, value.clone()),
    }
}

/// Double-quoted CSS string.
fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// CSS identifier, backslash-escaping anything outside `[A-Za-z0-9_-]` and
/// non-ASCII, plus a leading digit.
fn css_ident(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        if i == 0 && c.is_ascii_digit() {
            out.push_str(&format!("\\{:x} ", c as u32));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// XPath 1.0 has no escapes inside literals; mixed quotes need `concat()`.
fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value.split('"').map(|p| format!("\"{}\"", p)).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

#[async_trait]
impl Backend for WebDriverBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Connecting to WebDriver at {}...", self.webdriver_url);
        let client =
            WebDriverClient::connect(&self.webdriver_url, Some(self.capabilities.clone()))
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.elements.reset();
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;

        info!("Navigating to: {}", url);
        client
            .client
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;
        let title = client.client.title().await.unwrap_or_default();
        let url = client
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();

        self.elements.reset();
        self.elements.observe_page(&url);
        Ok(NavigationResult { url, title })
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        let client = self.client()?;
        client
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| BackendError::Other(format!("current_url failed: {}", e)))
    }

    async fn title(&mut self) -> Result<String, BackendError> {
        let client = self.client()?;
        client
            .client
            .title()
            .await
            .map_err(|e| BackendError::Other(format!("title failed: {}", e)))
    }

    async fn find_all(&mut self, selector: &Selector) -> Result<Vec<ElementHandle>, BackendError> {
        let client = self.client()?;
        let (strategy, query) = locator_query(selector);
        let locator = match strategy {
            Strategy::XPath => Locator::XPath(&query),
            Strategy::Id => Locator::Id(&query),
            Strategy::Link => Locator::LinkText(&query),
            _ => Locator::Css(&query),
        };

        let page = client
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| BackendError::Other(format!("current_url failed: {}", e)))?;
        let found = client
            .client
            .find_all(locator)
            .await
            .map_err(|e| BackendError::Other(format!("find_all({}) failed: {}", selector, e)))?;
        debug!(%selector, matches = found.len(), "Queried");

        self.elements.observe_page(&page);

        let mut handles = Vec::with_capacity(found.len());
        for element in found {
            let id = element.element_id().to_string();
            handles.push(ElementHandle::new(id.clone()));
            self.elements.insert(id, element);
        }
        Ok(handles)
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), BackendError> {
        let result = self.element(element)?.click().await;
        self.checked(element, "click", result)
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String, BackendError> {
        let result = self.element(element)?.text().await;
        self.checked(element, "text", result)
    }

    async fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BackendError> {
        let result = self.element(element)?.attr(name).await;
        self.checked(element, "attribute", result)
    }

    async fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<(), BackendError> {
        let result = self.element(element)?.send_keys(text).await;
        self.checked(element, "send_keys", result)
    }

    async fn is_displayed(&mut self, element: &ElementHandle) -> Result<bool, BackendError> {
        let result = self.element(element)?.is_displayed().await;
        self.checked(element, "is_displayed", result)
    }

    async fn is_stale(&mut self, element: &ElementHandle) -> Result<bool, BackendError> {
        let Some(el) = self.elements.get(&element.id) else {
            return Ok(true);
        };
        let displayed = el.is_displayed().await;
        match displayed {
            Ok(_) => Ok(false),
            Err(e) if webdriver::is_stale_error(&e) => {
                self.elements.forget(&element.id);
                Ok(true)
            }
            Err(e) => Err(BackendError::Other(format!("is_stale failed: {}", e))),
        }
    }

    async fn contexts(&mut self) -> Result<Vec<ContextId>, BackendError> {
        let client = self.client()?;
        let handles = client
            .client
            .windows()
            .await
            .map_err(|e| BackendError::Other(format!("Get windows failed: {}", e)))?;
        Ok(handles
            .into_iter()
            .map(|h| ContextId::new(String::from(h)))
            .collect())
    }

    async fn active_context(&mut self) -> Result<ContextId, BackendError> {
        let client = self.client()?;
        let handle = client
            .client
            .window()
            .await
            .map_err(|e| BackendError::NoSuchContext(format!("no active window: {}", e)))?;
        Ok(ContextId::new(String::from(handle)))
    }

    async fn switch_to(&mut self, context: &ContextId) -> Result<(), BackendError> {
        let handle = window_handle(context)?;
        let client = self.client()?;
        client
            .client
            .switch_to_window(handle)
            .await
            .map_err(|e| BackendError::NoSuchContext(format!("{}: {}", context, e)))?;
        self.elements.reset();
        Ok(())
    }

    async fn close_context(&mut self, context: &ContextId) -> Result<(), BackendError> {
        self.switch_to(context).await?;
        let client = self.client()?;
        let closed = client
            .client
            .close_window()
            .await
            .map_err(|e| BackendError::Other(format!("Closing window {} failed: {}", context, e)));
        self.elements.reset();
        closed
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        let client = self.client()?;
        let bytes = client
            .client
            .screenshot()
            .await
            .map_err(|e| BackendError::Other(format!("Screenshot failed: {}", e)))?;
        Ok(bytes)
    }
}
