use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain GET; any transport error or non-2xx status is a failure.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let text = self.client.get(url).send().await?.error_for_status()?.text().await?;
        Ok(text)
    }
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use super::PageFetcher;

    /// Serves canned bodies by URL; unknown URLs fail like a network error.
    #[derive(Default)]
    pub struct MockFetcher {
        pages: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub fn new() -> Self { Self::default() }

        pub fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        pub fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.calls.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| anyhow!("connection refused: {}", url))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn http_fetcher_returns_body() {
        let mut server = Server::new_async().await;
        let m = server.mock("GET", "/corp1/outline.html")
            .with_status(200)
            .with_body("<html>ok</html>")
            .expect(1)
            .create_async().await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let body = fetcher.fetch(&format!("{}/corp1/outline.html", server.url())).await.unwrap();
        assert_eq!(body, "<html>ok</html>");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn http_fetcher_fails_on_error_status() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/gone").with_status(404).create_async().await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        assert!(fetcher.fetch(&format!("{}/gone", server.url())).await.is_err());
    }
}
