use async_trait::async_trait;
use reqwest::Client;

use super::{DocumentSource, ExtentSignal, SourceProvider};
use crate::SourceError;

/// Provides [`HttpSource`]s sharing one `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpProvider {
    client: Client,
}

impl HttpProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceProvider for HttpProvider {
    type Source = HttpSource;

    async fn acquire(&self) -> Result<HttpSource, SourceError> {
        // Client uses Arc so we can clone cheaply
        Ok(HttpSource::new(self.client.clone()))
    }
}

/// A source for server-rendered listings.
///
/// The page is fetched once on navigation. Growth actions don't change
/// anything, so the load loop sees an unchanged extent and stops right away.
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    body: Option<String>,
}

impl HttpSource {
    pub fn new(client: Client) -> Self {
        Self { client, body: None }
    }

    fn body(&self) -> Result<&str, SourceError> {
        self.body
            .as_deref()
            .ok_or_else(|| SourceError::Read("no page has been fetched".into()))
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn navigate(&mut self, url: &str) -> Result<(), SourceError> {
        let navigation_err = |e: reqwest::Error| SourceError::Navigation {
            url: url.into(),
            reason: e.to_string(),
        };
        let res = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(navigation_err)?;
        let html = res.text().await.map_err(navigation_err)?;
        self.body = Some(html);
        Ok(())
    }

    async fn trigger_growth(&mut self) -> Result<(), SourceError> {
        self.body().map(|_| ())
    }

    async fn extent_signal(&mut self) -> Result<ExtentSignal, SourceError> {
        Ok(ExtentSignal(self.body()?.len() as u64))
    }

    async fn document(&mut self) -> Result<String, SourceError> {
        self.body().map(String::from)
    }

    async fn release(&mut self) {
        self.body = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unfetched_source_reports_read_errors() {
        let mut source = HttpSource::new(Client::new());
        assert!(matches!(
            source.extent_signal().await,
            Err(SourceError::Read(_))
        ));
        assert!(matches!(source.document().await, Err(SourceError::Read(_))));
        source.release().await;
        source.release().await;
    }
}
