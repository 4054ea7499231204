use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use wayfind_engine::config::{BrowserKind, WebDriverConfig};

pub struct WebDriverClient {
    pub client: Client,
}

impl WebDriverClient {
    pub async fn connect(
        url: &str,
        capabilities: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let caps = capabilities.unwrap_or_default();

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(url)
            .await
            .map_err(|e| format!("Failed to connect to WebDriver at {}: {}", url, e))?;

        Ok(Self { client })
    }

    pub async fn close(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.client
            .close()
            .await
            .map_err(|e| format!("Failed to close session: {}", e))?;
        Ok(())
    }
}

/// W3C capabilities for the configured browser.
pub fn capabilities(config: &WebDriverConfig) -> serde_json::Map<String, serde_json::Value> {
    let mut caps = serde_json::Map::new();
    match config.browser {
        BrowserKind::Firefox => {
            caps.insert("browserName".into(), json!("firefox"));
            if config.headless {
                caps.insert(
                    "moz:firefoxOptions".into(),
                    json!({ "args": ["-headless"] }),
                );
            }
        }
        BrowserKind::Chrome => {
            let mut args = vec!["--no-sandbox"];
            if config.headless {
                args.push("--headless=new");
                args.push("--disable-gpu");
            }
            caps.insert("browserName".into(), json!("chrome"));
            caps.insert("goog:chromeOptions".into(), json!({ "args": args }));
        }
    }
    caps
}

/// Drivers report a replaced node as "stale element reference".
pub fn is_stale_error(err: &CmdError) -> bool {
    err.to_string().to_lowercase().contains("stale element")
}
