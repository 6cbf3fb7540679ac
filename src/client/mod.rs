//! Client side of the docs site: the HTTP client for the fetch endpoint and
//! the view-state machines that sit on top of it.
//!
//! Configuration is via environment variables:
//! - `FOLIO_URL` - Base URL of a running server (default: `http://127.0.0.1:3000`)

mod outline;
mod search_panel;
mod subscription;
mod viewer;

pub use outline::TocController;
pub use search_panel::{KeyPress, SearchEvent, SearchPanel, SearchState};
pub use subscription::{Subscription, SubscriptionKind, Subscriptions};
pub use viewer::{
    DocumentViewer, EscapeLink, LoadTicket, NotFound, RenderedDocument, ViewState,
    REDIRECT_DELAY,
};

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::SerializedDocument;

/// Default URL for local development.
pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Invalid base URL: {0}")]
    BaseUrl(String),
}

/// HTTP client for the document endpoints.
#[derive(Debug, Clone)]
pub struct DocsClient {
    base_url: Url,
    client: Client,
}

impl DocsClient {
    /// Create client from environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("FOLIO_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self::new(&base_url)
    }

    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::BaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of `file` under `prefix`. The file name is a single segment, so
    /// any `/` inside it is percent-encoded rather than walked.
    pub fn endpoint(&self, prefix: &[&str], file: &str) -> Result<Url, ClientError> {
        // `.` and `..` would be dropped silently by the url crate.
        if file.is_empty() || file == "." || file == ".." {
            return Err(ClientError::InvalidPath(file.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(prefix)
            .push(file);
        Ok(url)
    }

    /// Build a request that bypasses every cache on the way.
    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
    }

    /// Convert non-success statuses to ClientError.
    async fn check(&self, file: &str, response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::BAD_REQUEST => Err(ClientError::InvalidPath(file.to_string())),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(file.to_string())),
            _ => Err(ClientError::Server(format!("{}: {}", status, body))),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, file: &str, url: Url) -> Result<T, ClientError> {
        let response = self.request(url).send().await?;
        let response = self.check(file, response).await?;
        Ok(response.json().await?)
    }

    // ============================================================
    // Document Operations
    // ============================================================

    /// Fetch and deserialize one document. Always asks for fresh content.
    pub async fn fetch_document(&self, file: &str) -> Result<SerializedDocument, ClientError> {
        let url = self.endpoint(&["api", "docs"], file)?;
        tracing::debug!("Fetching {}", url);
        self.get_json(file, url).await
    }

    /// Raw markdown of a document, for saving to disk.
    pub async fn download(&self, file: &str) -> Result<String, ClientError> {
        let url = self.endpoint(&["api", "raw"], file)?;
        let response = self.request(url).send().await?;
        let response = self.check(file, response).await?;
        Ok(response.text().await?)
    }
}
