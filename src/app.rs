use std::path::PathBuf;

use futures::StreamExt;
use iced::{Subscription, Task};

use crate::api::{ApiClient, ApiConfig};
use crate::application::{DownloadCoordinator, DownloadEvent};
use crate::domain::{AppError, DownloadOutcome, Phase, HIDE_DELAY, TICK_INTERVAL};
use crate::ui::{DownloadMessage, DownloadView, ResultPanel, GENERIC_ERROR_TEXT};

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
    phase: Phase,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadApp {
    pub fn new() -> Self {
        let api_client = ApiClient::new(ApiConfig::default());

        Self {
            view: DownloadView::default(),
            coordinator: DownloadCoordinator::new(api_client),
            phase: Phase::Idle,
        }
    }

    /// Re-entrancy gate: a submit while a request is in flight, or with an
    /// invalid URL, changes nothing and issues no request. Otherwise enters
    /// `Downloading` and hands back the URL to submit.
    fn begin_submit(&mut self) -> Option<String> {
        if self.phase == Phase::Downloading || !self.view.is_valid {
            return None;
        }

        self.phase = Phase::Downloading;
        self.view.result = ResultPanel::Empty;
        self.view.status_message.clear();
        self.view.progress.start();
        tracing::info!(url = %self.view.post_url.trim(), "submitting download request");

        Some(self.view.post_url.trim().to_string())
    }

    /// Back to `Idle` whatever the outcome; the ramp jumps to 100% and the
    /// result panel reflects the resolution.
    fn finish_submit(&mut self, result: Result<DownloadOutcome, AppError>) {
        self.phase = Phase::Idle;
        self.view.progress.finish();

        match result {
            Ok(DownloadOutcome::Ready(plan)) => {
                self.view.result = ResultPanel::Ready(plan);
            }
            Ok(DownloadOutcome::Rejected(message)) => {
                self.view.result = ResultPanel::Failed(message);
            }
            Err(error) => {
                // Detail goes to the log; the user sees only the generic text
                tracing::error!("download request failed: {error}");
                self.view.result = ResultPanel::Failed(GENERIC_ERROR_TEXT.to_string());
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    SubmitFinished(Result<DownloadOutcome, AppError>),
    ProgressTick,
    ProgressHidden,
    /// (Selected path, media URL)
    SavePathSelected(Option<PathBuf>, String),
    SaveEvent(DownloadEvent),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::SubmitPressed => {
                    if let Some(post_url) = app.begin_submit() {
                        let coordinator = app.coordinator.clone();
                        return Task::perform(
                            async move { coordinator.submit(post_url).await },
                            Message::SubmitFinished,
                        );
                    }
                }
                DownloadMessage::SavePressed => {
                    if let ResultPanel::Ready(plan) = &app.view.result {
                        let coordinator = app.coordinator.clone();
                        let plan = plan.clone();
                        return Task::perform(
                            async move {
                                let path = coordinator
                                    .choose_save_path(plan.suggested_filename.clone())
                                    .await;
                                (path, plan.download_url)
                            },
                            |(path, url)| Message::SavePathSelected(path, url),
                        );
                    }
                }
                DownloadMessage::UrlChanged(_) => {}
            }
        }
        Message::SubmitFinished(result) => {
            app.finish_submit(result);
            return Task::perform(tokio::time::sleep(HIDE_DELAY), |_| Message::ProgressHidden);
        }
        Message::ProgressTick => {
            if app.phase == Phase::Downloading {
                app.view.progress.tick(crate::utils::random_step());
            }
        }
        Message::ProgressHidden => {
            app.view.progress.hide();
        }
        Message::SavePathSelected(path_opt, url) => match path_opt {
            Some(path) => {
                app.view.status_message = format!("Saving to: {}", path.display());
                let stream = app.coordinator.download_stream(url, path);
                return Task::stream(stream.map(Message::SaveEvent));
            }
            None => {
                // User cancelled the dialog
                app.view.status_message = "Save cancelled".to_string();
            }
        },
        Message::SaveEvent(event) => match event {
            DownloadEvent::Progress(fraction) => {
                app.view.status_message = format!("Saving: {:.1}%", fraction * 100.0);
            }
            DownloadEvent::Completed(path) => {
                app.view.status_message = format!("Saved: {}", path.display());
            }
            DownloadEvent::Failed(error) => {
                tracing::error!("media save failed: {error}");
                app.view.status_message = format!("Save failed: {error}");
            }
        },
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view(app.phase).map(Message::UiMessage)
}

/// The ramp timer only runs while the bar is visible; once the bar hides
/// itself the subscription is dropped.
pub fn subscription(app: &DownloadApp) -> Subscription<Message> {
    if app.view.progress.is_visible() {
        iced::time::every(TICK_INTERVAL).map(|_| Message::ProgressTick)
    } else {
        Subscription::none()
    }
}
