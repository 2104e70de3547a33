use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{error::CmdError, Client, ClientBuilder, Locator};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{DocumentSource, ExtentSignal, SourceProvider};
use crate::SourceError;

const LOAD_MORE_XPATH: &str = "//button[span[contains(text(), 'Load more')]]";
const SCROLL_TO_END: &str = "window.scrollTo(0, document.body.scrollHeight);";
const SCROLL_HEIGHT: &str = "return document.body.scrollHeight";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Opens WebDriver sessions on an already running driver (chromedriver).
#[derive(Debug, Clone)]
pub struct WebDriverProvider {
    webdriver_url: String,
    headless: bool,
}

impl WebDriverProvider {
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
        }
    }

    fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            "--window-size=1920,1080".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            format!("user-agent={USER_AGENT}"),
        ];
        if self.headless {
            args.insert(0, "--headless".into());
        }
        args
    }
}

#[async_trait]
impl SourceProvider for WebDriverProvider {
    type Source = WebDriverSource;

    async fn acquire(&self) -> Result<WebDriverSource, SourceError> {
        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".into(),
            json!({ "args": self.chrome_args() }),
        );

        info!(url = %self.webdriver_url, headless = self.headless, "connecting to webdriver");
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| SourceError::Connect(e.to_string()))?;
        Ok(WebDriverSource {
            client: Some(client),
        })
    }
}

/// A live browser session.
pub struct WebDriverSource {
    client: Option<Client>,
}

impl WebDriverSource {
    fn client(&self) -> Result<&Client, SourceError> {
        self.client
            .as_ref()
            .ok_or_else(|| SourceError::Read("the browser session was already closed".into()))
    }
}

fn interaction_err(e: CmdError) -> SourceError {
    SourceError::Interaction(e.to_string())
}

fn read_err(e: CmdError) -> SourceError {
    SourceError::Read(e.to_string())
}

#[async_trait]
impl DocumentSource for WebDriverSource {
    async fn navigate(&mut self, url: &str) -> Result<(), SourceError> {
        self.client()?
            .goto(url)
            .await
            .map_err(|e| SourceError::Navigation {
                url: url.into(),
                reason: e.to_string(),
            })
    }

    async fn prime(&mut self, discovery_timeout: Duration) -> Result<bool, SourceError> {
        let client = self.client()?;
        let button = match client
            .wait()
            .at_most(discovery_timeout)
            .for_element(Locator::XPath(LOAD_MORE_XPATH))
            .await
        {
            Ok(button) => button,
            Err(e) => {
                debug!("no 'Load more' button: {e}");
                return Ok(false);
            }
        };
        button.click().await.map_err(interaction_err)?;
        Ok(true)
    }

    async fn trigger_growth(&mut self) -> Result<(), SourceError> {
        self.client()?
            .execute(SCROLL_TO_END, vec![])
            .await
            .map(|_| ())
            .map_err(interaction_err)
    }

    async fn extent_signal(&mut self) -> Result<ExtentSignal, SourceError> {
        let value = self
            .client()?
            .execute(SCROLL_HEIGHT, vec![])
            .await
            .map_err(read_err)?;
        scroll_height(&value)
    }

    async fn document(&mut self) -> Result<String, SourceError> {
        self.client()?.source().await.map_err(read_err)
    }

    async fn release(&mut self) {
        if let Some(client) = self.client.take() {
            info!("closing the browser session");
            if let Err(e) = client.close().await {
                warn!("couldn't close the browser session cleanly: {e}");
            }
        }
    }
}

/// Browsers report `scrollHeight` as an integer, some drivers as a float.
fn scroll_height(value: &Value) -> Result<ExtentSignal, SourceError> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|h| *h >= 0.0).map(|h| h as u64))
        .map(ExtentSignal)
        .ok_or_else(|| SourceError::Read(format!("unexpected scroll height: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scroll_height_values() {
        assert_eq!(scroll_height(&json!(1200)).unwrap(), ExtentSignal(1200));
        assert_eq!(scroll_height(&json!(1200.0)).unwrap(), ExtentSignal(1200));
        assert!(matches!(
            scroll_height(&Value::Null),
            Err(SourceError::Read(_))
        ));
        assert!(scroll_height(&json!("tall")).is_err());
    }

    #[test]
    fn headless_flag_controls_chrome_args() {
        let headed = WebDriverProvider::new("http://localhost:4444", false);
        assert!(!headed.chrome_args().iter().any(|a| a == "--headless"));

        let headless = WebDriverProvider::new("http://localhost:4444", true);
        let args = headless.chrome_args();
        assert_eq!(args[0], "--headless");
        assert!(args.iter().any(|a| a.starts_with("user-agent=")));
    }
}
