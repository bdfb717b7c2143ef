use iced::{
    widget::{button, column, progress_bar, text, text_input, Space},
    Color, Element, Length,
};

use crate::domain::{CosmeticProgress, DownloadPlan, Phase};

pub const VALIDATION_ERROR_TEXT: &str = "Please enter a valid Instagram post or reel URL";
pub const GENERIC_ERROR_TEXT: &str = "An error occurred while downloading. Please try again.";

const ERROR_COLOR: Color = Color::from_rgb(0.8, 0.2, 0.2);

/// Main view state
pub struct DownloadView {
    pub post_url: String,
    pub is_valid: bool,
    pub url_error: Option<&'static str>,
    pub progress: CosmeticProgress,
    pub result: ResultPanel,
    pub status_message: String,
}

#[derive(Debug, Clone, Default)]
pub enum ResultPanel {
    #[default]
    Empty,
    Ready(DownloadPlan),
    Failed(String),
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            post_url: String::new(),
            is_valid: false,
            url_error: None,
            progress: CosmeticProgress::default(),
            result: ResultPanel::Empty,
            status_message: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    SubmitPressed,
    SavePressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.post_url = url;
                // Revalidated on every keystroke; the inline label tracks it
                self.is_valid = crate::utils::validate_instagram_url(&self.post_url);
                self.url_error = if self.is_valid {
                    None
                } else {
                    Some(VALIDATION_ERROR_TEXT)
                };
            }
            DownloadMessage::SubmitPressed | DownloadMessage::SavePressed => {
                // Handled by the app
            }
        }
    }

    pub fn view(&self, phase: Phase) -> Element<'_, DownloadMessage> {
        let downloading = phase == Phase::Downloading;
        let submit_label = if downloading { "Downloading..." } else { "Download" };
        let can_submit = self.is_valid && !downloading;

        let mut content = column![
            text("Instagram Downloader").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text("Post or reel URL:").size(16),
            text_input("https://www.instagram.com/p/...", &self.post_url)
                .on_input(DownloadMessage::UrlChanged)
                .padding(10),
        ]
        .padding(20)
        .spacing(10);

        if let Some(error) = self.url_error {
            content = content.push(text(error).size(14).color(ERROR_COLOR));
        }

        content = content.push(Space::new().height(Length::Fixed(10.0)));
        content = content.push(
            button(submit_label)
                .on_press_maybe(can_submit.then_some(DownloadMessage::SubmitPressed))
                .padding([10, 20]),
        );

        if self.progress.is_visible() {
            content = content.push(progress_bar(0.0..=100.0, self.progress.percent()));
        }

        content = content.push(Space::new().height(Length::Fixed(10.0)));
        content = content.push(self.result_panel());

        if !self.status_message.is_empty() {
            content = content.push(text(&self.status_message).size(14));
        }

        content.into()
    }

    fn result_panel(&self) -> Element<'_, DownloadMessage> {
        match &self.result {
            ResultPanel::Empty => Space::new().height(Length::Fixed(0.0)).into(),
            ResultPanel::Ready(plan) => column![
                text("Download ready! Click below to save the media.").size(16),
                text(&plan.download_url).size(12),
                button("Save media")
                    .on_press(DownloadMessage::SavePressed)
                    .padding([8, 16]),
            ]
            .spacing(8)
            .into(),
            ResultPanel::Failed(message) => {
                text(message.as_str()).size(14).color(ERROR_COLOR).into()
            }
        }
    }
}
