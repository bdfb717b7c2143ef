use std::path::PathBuf;

use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;

use crate::{
    api::ApiClient,
    domain::{AppError, DownloadOutcome, DownloadPlan},
    utils::{suggested_filename, validate_instagram_url},
};

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Progress(f32),
    Completed(PathBuf),
    Failed(AppError),
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: ApiClient,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// One submit cycle: validate, fetch the CSRF token from the form page,
    /// POST the form, then branch on the application-level `status` field.
    pub async fn submit(&self, post_url: String) -> Result<DownloadOutcome, AppError> {
        if !validate_instagram_url(&post_url) {
            return Err(AppError::InvalidUrl);
        }
        let post_url = post_url.trim();

        let token = self
            .api_client
            .fetch_csrf_token()
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        let response = self
            .api_client
            .request_download(post_url, &token)
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        if response.status == "success" {
            let media_url = response
                .data
                .map(|data| data.download_url)
                .filter(|url| !url.is_empty())
                .ok_or_else(|| AppError::Api("response is missing the download URL".to_string()))?;

            let resolved = self
                .api_client
                .resolve_media_url(&media_url)
                .map_err(|e| AppError::Api(e.to_string()))?;

            Ok(DownloadOutcome::Ready(DownloadPlan {
                suggested_filename: suggested_filename(post_url, resolved.as_str()),
                download_url: resolved.to_string(),
            }))
        } else {
            let message = response
                .message
                .unwrap_or_else(|| "Download failed".to_string());
            Ok(DownloadOutcome::Rejected(message))
        }
    }

    pub async fn choose_save_path(&self, suggested_filename: String) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .set_file_name(&suggested_filename)
            .save_file()
            .await
            .map(|handle| handle.path().to_path_buf())
    }

    /// Stream the media file to disk, emitting progress along the way.
    pub fn download_stream(&self, url: String, path: PathBuf) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            SaveState::Start {
                client: self.api_client.clone(),
                url,
                path,
            },
            |state| async move {
                match state {
                    SaveState::Start { client, url, path } => {
                        let file = match tokio::fs::File::create(&path).await {
                            Ok(file) => file,
                            Err(e) => {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Failed to create file: {}",
                                        e
                                    ))),
                                    SaveState::Finished,
                                ));
                            }
                        };

                        match client.download_file_stream(&url).await {
                            Ok((total, stream)) => Some((
                                DownloadEvent::Progress(0.0),
                                SaveState::Saving {
                                    file,
                                    stream: stream.boxed(),
                                    written: 0,
                                    total,
                                    path,
                                },
                            )),
                            Err(e) => Some((
                                DownloadEvent::Failed(AppError::Api(e.to_string())),
                                SaveState::Finished,
                            )),
                        }
                    }
                    SaveState::Saving {
                        mut file,
                        mut stream,
                        mut written,
                        total,
                        path,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Err(e) = file.write_all(&chunk).await {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Write error: {}",
                                        e
                                    ))),
                                    SaveState::Finished,
                                ));
                            }

                            written += chunk.len() as u64;

                            let progress = match total {
                                Some(total) if total > 0 => written as f32 / total as f32,
                                _ => 0.0,
                            };

                            Some((
                                DownloadEvent::Progress(progress),
                                SaveState::Saving {
                                    file,
                                    stream,
                                    written,
                                    total,
                                    path,
                                },
                            ))
                        }
                        Some(Err(e)) => Some((
                            DownloadEvent::Failed(AppError::Api(e.to_string())),
                            SaveState::Finished,
                        )),
                        None => {
                            if let Err(e) = file.sync_all().await {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Failed to sync file: {}",
                                        e
                                    ))),
                                    SaveState::Finished,
                                ));
                            }

                            Some((DownloadEvent::Completed(path), SaveState::Finished))
                        }
                    },
                    SaveState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

enum SaveState {
    Start {
        client: ApiClient,
        url: String,
        path: PathBuf,
    },
    Saving {
        file: tokio::fs::File,
        stream: BoxStream<'static, crate::api::Result<bytes::Bytes>>,
        written: u64,
        total: Option<u64>,
        path: PathBuf,
    },
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use url::Url;

    const FORM_PAGE: &str = r#"<form id="downloadForm" method="post" action="/api/download/">
        <input type="hidden" name="csrfmiddlewaretoken" value="tok-123">
        <input type="url" id="instagramUrl" name="url">
    </form>"#;

    fn coordinator_for(server: &mockito::Server) -> DownloadCoordinator {
        let base_url = Url::parse(&server.url()).unwrap();
        DownloadCoordinator::new(ApiClient::new(ApiConfig { base_url }))
    }

    #[tokio::test]
    async fn submit_yields_ready_plan_on_success() {
        let mut server = mockito::Server::new_async().await;
        let _page = server.mock("GET", "/").with_body(FORM_PAGE).create_async().await;
        let _download = server
            .mock("POST", "/api/download/")
            .match_header("x-csrftoken", "tok-123")
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success","data":{"download_url":"https://x/y.mp4"}}"#)
            .create_async()
            .await;

        let coordinator = coordinator_for(&server);
        let outcome = coordinator
            .submit("https://www.instagram.com/p/ABC123/".to_string())
            .await
            .unwrap();

        match outcome {
            DownloadOutcome::Ready(plan) => {
                assert_eq!(plan.download_url, "https://x/y.mp4");
                assert_eq!(plan.suggested_filename, "ABC123.mp4");
            }
            other => panic!("expected ready outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn submit_surfaces_server_message_on_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _page = server.mock("GET", "/").with_body(FORM_PAGE).create_async().await;
        let _download = server
            .mock("POST", "/api/download/")
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"error","message":"Rate limited"}"#)
            .create_async()
            .await;

        let coordinator = coordinator_for(&server);
        let outcome = coordinator
            .submit("https://www.instagram.com/p/ABC123/".to_string())
            .await
            .unwrap();

        match outcome {
            DownloadOutcome::Rejected(message) => assert_eq!(message, "Rate limited"),
            other => panic!("expected rejected outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn submit_falls_back_when_message_is_absent() {
        let mut server = mockito::Server::new_async().await;
        let _page = server.mock("GET", "/").with_body(FORM_PAGE).create_async().await;
        let _download = server
            .mock("POST", "/api/download/")
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"error"}"#)
            .create_async()
            .await;

        let coordinator = coordinator_for(&server);
        let outcome = coordinator
            .submit("https://www.instagram.com/p/ABC123/".to_string())
            .await
            .unwrap();

        match outcome {
            DownloadOutcome::Rejected(message) => assert_eq!(message, "Download failed"),
            other => panic!("expected rejected outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn submit_maps_http_failure_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _page = server.mock("GET", "/").with_body(FORM_PAGE).create_async().await;
        let _download = server
            .mock("POST", "/api/download/")
            .with_status(500)
            .create_async()
            .await;

        let coordinator = coordinator_for(&server);
        let err = coordinator
            .submit("https://www.instagram.com/p/ABC123/".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Api(_)));
    }

    #[tokio::test]
    async fn submit_rejects_invalid_url_without_any_request() {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/")
            .with_body(FORM_PAGE)
            .expect(0)
            .create_async()
            .await;
        let download = server
            .mock("POST", "/api/download/")
            .expect(0)
            .create_async()
            .await;

        let coordinator = coordinator_for(&server);
        let err = coordinator
            .submit("http://evil.com/p/x".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidUrl));
        page.assert_async().await;
        download.assert_async().await;
    }

    #[tokio::test]
    async fn submit_resolves_relative_download_url() {
        let mut server = mockito::Server::new_async().await;
        let _page = server.mock("GET", "/").with_body(FORM_PAGE).create_async().await;
        let _download = server
            .mock("POST", "/api/download/")
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success","data":{"download_url":"/media/downloads/y.mp4"}}"#)
            .create_async()
            .await;

        let coordinator = coordinator_for(&server);
        let outcome = coordinator
            .submit("https://www.instagram.com/reel/xyz-9/".to_string())
            .await
            .unwrap();

        match outcome {
            DownloadOutcome::Ready(plan) => {
                assert_eq!(
                    plan.download_url,
                    format!("{}/media/downloads/y.mp4", server.url())
                );
                assert_eq!(plan.suggested_filename, "xyz-9.mp4");
            }
            other => panic!("expected ready outcome, got {:?}", other),
        }
    }
}
