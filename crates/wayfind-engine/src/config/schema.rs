use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub webdriver: WebDriverConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub ordering: OrderingConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub suite: SuiteConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Firefox,
    Chrome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    #[serde(default = "default_webdriver_url")]
    pub url: String,
    #[serde(default = "default_browser")]
    pub browser: BrowserKind,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            browser: default_browser(),
            headless: default_headless(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_browser() -> BrowserKind {
    BrowserKind::Firefox
}

fn default_headless() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_resolve_ms")]
    pub resolve_ms: u64,
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
    #[serde(default = "default_navigation_ms")]
    pub navigation_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            resolve_ms: default_resolve_ms(),
            poll_ms: default_poll_ms(),
            navigation_ms: default_navigation_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn resolve(&self) -> Duration {
        Duration::from_millis(self.resolve_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

fn default_resolve_ms() -> u64 {
    10000
}

fn default_poll_ms() -> u64 {
    250
}

fn default_navigation_ms() -> u64 {
    10000
}

fn default_settle_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Characters stripped before reading a value as a number.
    #[serde(default = "default_currency_symbols")]
    pub currency_symbols: String,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            currency_symbols: default_currency_symbols(),
        }
    }
}

fn default_currency_symbols() -> String {
    "$€£,".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Navigate the origin context back after a same-tab external link.
    #[serde(default = "default_restore_address")]
    pub restore_address: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            restore_address: default_restore_address(),
        }
    }
}

fn default_restore_address() -> bool {
    true
}

/// Inputs for the built-in demo-store suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_about_domain")]
    pub about_domain: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: default_username(),
            password: default_password(),
            about_domain: default_about_domain(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.saucedemo.com/".to_string()
}

fn default_username() -> String {
    "standard_user".to_string()
}

fn default_password() -> String {
    "secret_sauce".to_string()
}

fn default_about_domain() -> String {
    "saucelabs.com".to_string()
}
