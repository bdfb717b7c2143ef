use futures::{Stream, TryStreamExt};
use regex::Regex;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::models::{ApiConfig, DownloadResponse};

/// Download endpoint, relative to the configured server base URL.
const DOWNLOAD_PATH: &str = "api/download/";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("server returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Failed to extract CSRF token from form page")]
    TokenExtraction,
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        // The cookie jar carries the server's session/csrftoken cookies from
        // the form-page fetch into the POST, like a same-origin browser fetch.
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .expect("failed to build HTTP client");

        Self { http, config }
    }

    fn extract_csrf_token(&self, html: &str) -> Option<String> {
        // Matches the hidden input Django renders into the form
        let re = Regex::new(r#"name="csrfmiddlewaretoken"\s+value="([^"]+)""#).ok()?;
        re.captures(html).map(|caps| caps[1].to_string())
    }

    /// Fetch the form page and pull the CSRF token out of its hidden field.
    pub async fn fetch_csrf_token(&self) -> Result<String> {
        let html = self
            .http
            .get(self.config.base_url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        self.extract_csrf_token(&html)
            .ok_or(ApiError::TokenExtraction)
    }

    /// Submit the form: one POST with the field snapshot (URL plus CSRF
    /// token), the `X-CSRFToken` header, and a JSON `Accept`.
    pub async fn request_download(
        &self,
        post_url: &str,
        csrf_token: &str,
    ) -> Result<DownloadResponse> {
        let endpoint = self.endpoint()?;

        let form = reqwest::multipart::Form::new()
            .text("url", post_url.to_string())
            .text("csrfmiddlewaretoken", csrf_token.to_string());

        let response = self
            .http
            .post(endpoint)
            .header("X-CSRFToken", csrf_token)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        response
            .json::<DownloadResponse>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    /// Resolve a (possibly relative) media URL against the server base.
    pub fn resolve_media_url(&self, raw: &str) -> Result<Url> {
        self.config
            .base_url
            .join(raw)
            .map_err(|e| ApiError::InvalidResponse(format!("bad download URL {:?}: {}", raw, e)))
    }

    fn endpoint(&self) -> Result<Url> {
        self.config
            .base_url
            .join(DOWNLOAD_PATH)
            .map_err(|e| ApiError::InvalidResponse(format!("bad endpoint URL: {}", e)))
    }

    /// Fetch the media file as a byte stream for saving to disk.
    /// Returns (total_size, stream)
    pub async fn download_file_stream(
        &self,
        media_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let url = self.resolve_media_url(media_url)?;
        let response = self.http.get(url).send().await?.error_for_status()?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}
