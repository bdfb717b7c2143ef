use serde::{Deserialize, Serialize};
use url::Url;

/// Response from the download endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<DownloadData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadData {
    pub download_url: String,
}

const DEFAULT_SERVER: &str = "http://127.0.0.1:8000/";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let base_url = std::env::var("INSTAGRAM_DL_SERVER")
            .ok()
            .and_then(|raw| Url::parse(&raw).ok())
            .unwrap_or_else(|| Url::parse(DEFAULT_SERVER).expect("default server URL is valid"));

        Self { base_url }
    }
}
