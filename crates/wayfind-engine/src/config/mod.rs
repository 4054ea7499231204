pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{
    BrowserKind, NavigationConfig, OrderingConfig, Settings, SuiteConfig, TimeoutConfig,
    WebDriverConfig,
};
