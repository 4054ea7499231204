use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookup strategy understood by the browser driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Css,
    XPath,
    Id,
    Name,
    Class,
    Link,
    PartialLink,
}

impl Strategy {
    const ALL: [Strategy; 7] = [
        Strategy::Css,
        Strategy::XPath,
        Strategy::Id,
        Strategy::Name,
        Strategy::Class,
        Strategy::Link,
        Strategy::PartialLink,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::Class => "class",
            Strategy::Link => "link",
            Strategy::PartialLink => "partial-link",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.prefix() == prefix)
    }
}

/// A single selector expression.
///
/// The engine never looks inside a selector; it only hands it to the backend.
/// The textual form is `strategy=value` (`xpath=//a`, `id=login`), and a bare
/// string is treated as CSS, so `button[type=submit]` stays a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    pub strategy: Strategy,
    pub value: String,
}

impl Selector {
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(Strategy::Css, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, value)
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(Strategy::Id, value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new(Strategy::Name, value)
    }

    pub fn class(value: impl Into<String>) -> Self {
        Self::new(Strategy::Class, value)
    }

    pub fn link(value: impl Into<String>) -> Self {
        Self::new(Strategy::Link, value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Selector must not be empty")]
pub struct EmptySelector;

impl FromStr for Selector {
    type Err = EmptySelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmptySelector);
        }

        if let Some((prefix, rest)) = trimmed.split_once('=')
            && let Some(strategy) = Strategy::from_prefix(prefix.trim())
        {
            let value = rest.trim();
            if value.is_empty() {
                return Err(EmptySelector);
            }
            return Ok(Selector::new(strategy, value));
        }

        Ok(Selector::css(trimmed))
    }
}

impl TryFrom<String> for Selector {
    type Error = EmptySelector;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strategy {
            // Keep bare CSS bare unless it would be read back as another strategy.
            Strategy::Css => match self.value.split_once('=') {
                Some((prefix, _)) if Strategy::from_prefix(prefix.trim()).is_some() => {
                    write!(f, "css={}", self.value)
                }
                _ => f.write_str(&self.value),
            },
            other => write!(f, "{}={}", other.prefix(), self.value),
        }
    }
}

/// Live reference to one DOM node, as handed out by the backend.
///
/// Two handles are equal when the backend reports the same element reference,
/// i.e. they point at the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Opaque identifier of one browser window or tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub String);

impl ContextId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}
