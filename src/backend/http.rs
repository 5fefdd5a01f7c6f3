//! Document fetch backends: reqwest for production, a static table for tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use reqwest::header::ACCEPT;
use tracing::trace;

use crate::config::Config;
use crate::{Error, Result};

const XRD_ACCEPT: &str = "application/xrd+xml, application/xml;q=0.9, text/xml;q=0.8, */*;q=0.1";

/// Fetches a document body by URL.
///
/// Any transport failure or non-success status must be reported as an error.
pub trait DocumentFetch: Send + Sync + 'static {
    /// Fetch `url` and return its body as text.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP(S) fetcher built on a shared reqwest client.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    /// Build a fetcher with the configured timeout, user agent and size cap.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            max_bytes: config.max_document_bytes,
        })
    }
}

impl DocumentFetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, XRD_ACCEPT)
            .send()
            .await?
            .error_for_status()?;

        if let Some(len) = response.content_length() {
            if len > self.max_bytes as u64 {
                return Err(Error::DocumentTooLarge {
                    size: usize::try_from(len).unwrap_or(usize::MAX),
                    limit: self.max_bytes,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(Error::DocumentTooLarge {
                    size: body.len() + chunk.len(),
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        trace!(url, bytes = body.len(), "Fetched document");
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// In-memory URL → body table.
///
/// Unknown URLs fail like an unreachable host. Fetched URLs are logged and
/// shared between clones.
#[derive(Clone, Default)]
pub struct StaticDocuments {
    documents: HashMap<String, String>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl StaticDocuments {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }

    /// URLs fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }
}

impl DocumentFetch for StaticDocuments {
    async fn fetch(&self, url: &str) -> Result<String> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(url.to_string());
        }
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| Error::lookup(format!("no document at {url}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use tokio::net::TcpListener;

    /// Serve a small document at `/ok` and a 100 kB body at `/big`.
    async fn serve_documents() -> String {
        let app = Router::new()
            .route("/ok", get(|| async { "<XRD/>" }))
            .route("/big", get(|| async { "x".repeat(100_000) }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn static_documents_serve_known_urls() {
        let docs = StaticDocuments::new().with_document("https://example.com/a", "<a/>");

        assert_eq!(docs.fetch("https://example.com/a").await.unwrap(), "<a/>");
        assert!(docs.fetch("http://example.com/a").await.is_err());
        assert_eq!(
            docs.fetched(),
            vec!["https://example.com/a", "http://example.com/a"]
        );
    }

    #[tokio::test]
    async fn http_fetcher_fetches_document() {
        let base = serve_documents().await;
        let fetcher = HttpFetcher::from_config(&Config::default()).unwrap();

        assert_eq!(fetcher.fetch(&format!("{base}/ok")).await.unwrap(), "<XRD/>");
    }

    #[tokio::test]
    async fn http_fetcher_rejects_error_status() {
        let base = serve_documents().await;
        let fetcher = HttpFetcher::from_config(&Config::default()).unwrap();

        match fetcher.fetch(&format!("{base}/missing")).await {
            Err(Error::Http(e)) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::NOT_FOUND))
            }
            other => panic!("expected HTTP status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_fetcher_rejects_oversized_document() {
        let base = serve_documents().await;
        let fetcher = HttpFetcher::from_config(&Config::default()).unwrap();

        match fetcher.fetch(&format!("{base}/big")).await {
            Err(Error::DocumentTooLarge { size, limit }) => {
                assert_eq!(size, 100_000);
                assert_eq!(limit, 64 * 1024);
            }
            other => panic!("expected size error, got {other:?}"),
        }

        let small = HttpFetcher::from_config(&Config::default().max_document_bytes(4)).unwrap();
        assert!(matches!(
            small.fetch(&format!("{base}/ok")).await,
            Err(Error::DocumentTooLarge { limit: 4, .. })
        ));
    }

    #[test]
    fn http_fetcher_builds_from_config() {
        let fetcher = HttpFetcher::from_config(&Config::default().max_document_bytes(10)).unwrap();
        assert_eq!(fetcher.max_bytes, 10);
    }
}
