use crate::backend::Backend;
use crate::error::CheckError;
use crate::resolution::{Candidates, Resolver};
use async_trait::async_trait;
use wayfind_common::protocol::ElementHandle;

/// Values read from a rendered list at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedSnapshot {
    pub values: Vec<String>,
    /// First element the values were read from, used to detect a re-render.
    pub anchor: Option<ElementHandle>,
}

impl OrderedSnapshot {
    pub fn new(values: Vec<String>, anchor: Option<ElementHandle>) -> Self {
        Self { values, anchor }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Something that can read the same logical list before and after an action.
#[async_trait]
pub trait SnapshotSource<B: Backend + ?Sized>: Send + Sync {
    async fn capture(&self, backend: &mut B) -> Result<OrderedSnapshot, CheckError>;
}

/// What to read from each list element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadMode {
    Text,
    Attribute(String),
}

/// Reads a list located through fallback candidates.
///
/// A single pass: when no candidate matches the snapshot is empty. Waiting is
/// left to the verifier's poll loop.
#[derive(Debug, Clone)]
pub struct ListProbe {
    candidates: Candidates,
    read: ReadMode,
    resolver: Resolver,
}

impl ListProbe {
    pub fn text(candidates: Candidates) -> Self {
        Self {
            candidates,
            read: ReadMode::Text,
            resolver: Resolver::default(),
        }
    }

    pub fn attribute(candidates: Candidates, name: impl Into<String>) -> Self {
        Self {
            candidates,
            read: ReadMode::Attribute(name.into()),
            resolver: Resolver::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }
}

#[async_trait]
impl<B: Backend + ?Sized> SnapshotSource<B> for ListProbe {
    async fn capture(&self, backend: &mut B) -> Result<OrderedSnapshot, CheckError> {
        let Some(list) = self.resolver.probe_all(backend, &self.candidates).await? else {
            return Ok(OrderedSnapshot::default());
        };

        let mut values = Vec::with_capacity(list.elements.len());
        for element in &list.elements {
            let value = match &self.read {
                ReadMode::Text => backend.text(element).await?,
                ReadMode::Attribute(name) => {
                    backend.attribute(element, name).await?.unwrap_or_default()
                }
            };
            values.push(value.trim().to_string());
        }

        Ok(OrderedSnapshot::new(values, list.elements.into_iter().next()))
    }
}
