//! SkinMe backend client: semantic product search, chat and skin analysis.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use url::Url;

use crate::error::ServiceError;
use crate::types::{ChatMessage, ChatReply, ChatRequest, ImageUpload, SearchResponse, SkinAnalysis};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: Url,
    client: Arc<Client>,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        // A trailing slash keeps `Url::join` from replacing the last path segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            client: Arc::new(client),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Semantic product search.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, query: &str, top_k: usize) -> Result<SearchResponse, ServiceError> {
        let mut url = self.base_url.join("api/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("top_k", &top_k.to_string());

        let response = self.client.get(url).send().await?;
        let results: SearchResponse = Self::handle_response(response, "Query").await?;
        tracing::info!("Search returned {} results", results.results.len());
        Ok(results)
    }

    /// Ask the assistant, passing the transcript so far as history.
    #[instrument(skip(self, history), fields(history_len = history.len()), level = "info")]
    pub async fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<ChatReply, ServiceError> {
        let url = self.base_url.join("api/chat/")?;

        let response = self
            .client
            .post(url)
            .json(&ChatRequest { message, history })
            .send()
            .await?;

        Self::handle_response(response, "Chat").await
    }

    /// Upload a skin photo for analysis and product recommendations.
    #[instrument(skip(self, image), fields(file = %image.file_name, bytes = image.bytes.len()), level = "info")]
    pub async fn analyze_skin(
        &self,
        image: &ImageUpload,
        additional_info: Option<&str>,
    ) -> Result<SkinAnalysis, ServiceError> {
        let url = self.base_url.join("api/analyze-skin")?;

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)?;
        let mut form = Form::new().part("image", part);
        if let Some(info) = additional_info.filter(|i| !i.trim().is_empty()) {
            form = form.text("additional_info", info.to_string());
        }

        let response = self.client.post(url).multipart(form).send().await?;
        Self::handle_response(response, "Image analysis").await
    }

    /// Map status and body to a typed result.
    async fn handle_response<T: DeserializeOwned>(
        response: Response,
        operation: &'static str,
    ) -> Result<T, ServiceError> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned status {}", operation, status);
            return Err(ServiceError::BadResponse {
                operation,
                status: status.as_u16(),
                detail: error_detail(&text),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ServiceError::Parse(format!("{} response: {}", operation, e)))
    }
}

/// FastAPI reports errors as `{"detail": "..."}`; fall back to the raw body.
fn error_detail(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));
    Some(detail.unwrap_or_else(|| body.trim().to_string()))
}
