//! In-memory browser used by the engine integration tests.
//!
//! Models just enough of a page for the engine: elements registered under a
//! selector string, windows with addresses, and click effects that can be
//! delayed on the (paused) tokio clock.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use wayfind_engine::backend::{Backend, BackendError, NavigationResult};
use wayfind_engine::protocol::{ContextId, ElementHandle, Selector};

#[derive(Debug, Clone)]
pub enum Effect {
    /// Open a new window at `url` without switching to it.
    OpenContext { url: String },
    /// Open a new window whose address moves from `initial` to `url` after `after`.
    OpenRedirecting {
        initial: String,
        url: String,
        after: Duration,
    },
    /// Navigate the active window.
    Navigate { url: String },
    /// Replace every element under `selector` with fresh nodes.
    ReplaceList { selector: String, texts: Vec<String> },
    /// Rewrite the texts of the existing nodes under `selector`.
    RewriteInPlace { selector: String, texts: Vec<String> },
    /// Add one element under `selector`.
    AddElement { selector: String, text: String },
    Delayed(Duration, Box<Effect>),
}

#[derive(Debug, Clone)]
struct FakeElement {
    text: String,
    attributes: HashMap<String, String>,
    displayed: bool,
    stale: bool,
}

#[derive(Debug, Clone)]
struct FakeContext {
    id: ContextId,
    url: String,
    later: Option<(Instant, String)>,
}

pub struct FakeBrowser {
    ready: bool,
    closed: Arc<AtomicBool>,
    fail_launch: bool,
    contexts: Vec<FakeContext>,
    active: Option<ContextId>,
    elements: HashMap<String, FakeElement>,
    matches: HashMap<String, Vec<String>>,
    on_click: HashMap<String, Vec<Effect>>,
    pending: Vec<(Instant, Effect)>,
    supports_staleness: bool,
    contexts_unavailable: bool,
    next_element: usize,
    next_context: usize,
    pub queries: Vec<String>,
    pub navigations: Vec<String>,
}

impl FakeBrowser {
    pub fn new(url: &str) -> Self {
        let origin = ContextId::new("ctx-0");
        Self {
            ready: true,
            closed: Arc::new(AtomicBool::new(false)),
            fail_launch: false,
            contexts: vec![FakeContext {
                id: origin.clone(),
                url: url.to_string(),
                later: None,
            }],
            active: Some(origin),
            elements: HashMap::new(),
            matches: HashMap::new(),
            on_click: HashMap::new(),
            pending: Vec::new(),
            supports_staleness: true,
            contexts_unavailable: false,
            next_element: 0,
            next_context: 1,
            queries: Vec::new(),
            navigations: Vec::new(),
        }
    }

    pub fn not_launched(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn failing_launch(mut self) -> Self {
        self.ready = false;
        self.fail_launch = true;
        self
    }

    pub fn without_staleness(mut self) -> Self {
        self.supports_staleness = false;
        self
    }

    /// Make `contexts()` fail from now on.
    pub fn break_context_listing(&mut self) {
        self.contexts_unavailable = true;
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }

    pub fn element(&mut self, selector: &str, text: &str) -> ElementHandle {
        let id = self.new_element(text);
        self.matches
            .entry(selector.to_string())
            .or_default()
            .push(id.clone());
        ElementHandle::new(id)
    }

    pub fn list(&mut self, selector: &str, texts: &[&str]) -> Vec<ElementHandle> {
        texts.iter().map(|t| self.element(selector, t)).collect()
    }

    pub fn hide(&mut self, element: &ElementHandle) {
        if let Some(el) = self.elements.get_mut(&element.id) {
            el.displayed = false;
        }
    }

    pub fn set_attribute(&mut self, element: &ElementHandle, name: &str, value: &str) {
        if let Some(el) = self.elements.get_mut(&element.id) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn on_click(&mut self, element: &ElementHandle, effect: Effect) {
        self.on_click
            .entry(element.id.clone())
            .or_default()
            .push(effect);
    }

    pub fn schedule(&mut self, after: Duration, effect: Effect) {
        self.pending.push((Instant::now() + after, effect));
    }

    pub fn context_ids(&self) -> Vec<ContextId> {
        self.contexts.iter().map(|c| c.id.clone()).collect()
    }

    pub fn active(&self) -> Option<ContextId> {
        self.active.clone()
    }

    pub fn texts(&self, selector: &str) -> Vec<String> {
        self.matches
            .get(selector)
            .map(|ids| ids.iter().map(|id| self.elements[id].text.clone()).collect())
            .unwrap_or_default()
    }

    fn new_element(&mut self, text: &str) -> String {
        self.next_element += 1;
        let id = format!("el-{}", self.next_element);
        self.elements.insert(
            id.clone(),
            FakeElement {
                text: text.to_string(),
                attributes: HashMap::new(),
                displayed: true,
                stale: false,
            },
        );
        id
    }

    fn new_context(&mut self, url: &str, later: Option<(Instant, String)>) {
        let id = ContextId::new(format!("ctx-{}", self.next_context));
        self.next_context += 1;
        self.contexts.push(FakeContext {
            id,
            url: url.to_string(),
            later,
        });
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::OpenContext { url } => self.new_context(&url, None),
            Effect::OpenRedirecting {
                initial,
                url,
                after,
            } => self.new_context(&initial, Some((Instant::now() + after, url))),
            Effect::Navigate { url } => {
                if let Some(ctx) = self.active_mut() {
                    ctx.url = url;
                }
            }
            Effect::ReplaceList { selector, texts } => {
                for id in self.matches.remove(&selector).unwrap_or_default() {
                    if let Some(el) = self.elements.get_mut(&id) {
                        el.stale = true;
                    }
                }
                let ids = texts.iter().map(|t| self.new_element(t)).collect();
                self.matches.insert(selector, ids);
            }
            Effect::RewriteInPlace { selector, texts } => {
                let ids = self.matches.get(&selector).cloned().unwrap_or_default();
                for (id, text) in ids.iter().zip(texts) {
                    if let Some(el) = self.elements.get_mut(id) {
                        el.text = text;
                    }
                }
            }
            Effect::AddElement { selector, text } => {
                self.element(&selector, &text);
            }
            Effect::Delayed(after, inner) => self.schedule(after, *inner),
        }
    }

    /// Apply everything whose time has come.
    fn tick(&mut self) {
        let now = Instant::now();
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(at, _)| *at <= now);
        self.pending = waiting;
        for (_, effect) in due {
            self.apply(effect);
        }
        for ctx in &mut self.contexts {
            let due = matches!(&ctx.later, Some((at, _)) if *at <= now);
            if due && let Some((_, url)) = ctx.later.take() {
                ctx.url = url;
            }
        }
    }

    fn active_mut(&mut self) -> Option<&mut FakeContext> {
        let active = self.active.clone()?;
        self.contexts.iter_mut().find(|c| c.id == active)
    }

    fn live(&self, element: &ElementHandle) -> Result<&FakeElement, BackendError> {
        match self.elements.get(&element.id) {
            Some(el) if !el.stale => Ok(el),
            Some(_) => Err(BackendError::StaleElement(element.id.clone())),
            None => Err(BackendError::Other(format!("unknown element {}", element.id))),
        }
    }
}

#[async_trait]
impl Backend for FakeBrowser {
    async fn launch(&mut self) -> Result<(), BackendError> {
        if self.fail_launch {
            return Err(BackendError::Other("no browser installed".into()));
        }
        self.ready = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.ready = false;
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.ready
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        self.tick();
        self.navigations.push(url.to_string());
        let ctx = self
            .active_mut()
            .ok_or_else(|| BackendError::NoSuchContext("no active context".into()))?;
        ctx.url = url.to_string();
        Ok(NavigationResult {
            url: url.to_string(),
            title: String::new(),
        })
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        self.tick();
        self.active_mut()
            .map(|c| c.url.clone())
            .ok_or_else(|| BackendError::NoSuchContext("no active context".into()))
    }

    async fn find_all(&mut self, selector: &Selector) -> Result<Vec<ElementHandle>, BackendError> {
        self.tick();
        let key = selector.to_string();
        self.queries.push(key.clone());
        Ok(self
            .matches
            .get(&key)
            .map(|ids| ids.iter().map(ElementHandle::new).collect())
            .unwrap_or_default())
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), BackendError> {
        self.tick();
        self.live(element)?;
        let effects = self.on_click.get(&element.id).cloned().unwrap_or_default();
        for effect in effects {
            self.apply(effect);
        }
        Ok(())
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String, BackendError> {
        self.tick();
        Ok(self.live(element)?.text.clone())
    }

    async fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BackendError> {
        self.tick();
        Ok(self.live(element)?.attributes.get(name).cloned())
    }

    async fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<(), BackendError> {
        self.tick();
        let id = element.id.clone();
        self.live(element)?;
        if let Some(el) = self.elements.get_mut(&id) {
            el.attributes.insert("value".into(), text.to_string());
        }
        Ok(())
    }

    async fn is_displayed(&mut self, element: &ElementHandle) -> Result<bool, BackendError> {
        self.tick();
        Ok(self.live(element)?.displayed)
    }

    async fn is_stale(&mut self, element: &ElementHandle) -> Result<bool, BackendError> {
        self.tick();
        if !self.supports_staleness {
            return Err(BackendError::NotSupported("is_stale".into()));
        }
        Ok(self.elements.get(&element.id).is_none_or(|el| el.stale))
    }

    async fn contexts(&mut self) -> Result<Vec<ContextId>, BackendError> {
        self.tick();
        if self.contexts_unavailable {
            return Err(BackendError::ConnectionLost);
        }
        Ok(self.context_ids())
    }

    async fn active_context(&mut self) -> Result<ContextId, BackendError> {
        self.active
            .clone()
            .ok_or_else(|| BackendError::NoSuchContext("no active context".into()))
    }

    async fn switch_to(&mut self, context: &ContextId) -> Result<(), BackendError> {
        self.tick();
        if self.contexts.iter().any(|c| &c.id == context) {
            self.active = Some(context.clone());
            Ok(())
        } else {
            Err(BackendError::NoSuchContext(context.to_string()))
        }
    }

    async fn close_context(&mut self, context: &ContextId) -> Result<(), BackendError> {
        let before = self.contexts.len();
        self.contexts.retain(|c| &c.id != context);
        if self.contexts.len() == before {
            return Err(BackendError::NoSuchContext(context.to_string()));
        }
        if self.active.as_ref() == Some(context) {
            self.active = None;
        }
        Ok(())
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
