use std::time::Duration;

/// Cadence of the cosmetic progress ramp.
pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Pause between the bar reaching 100% and it being hidden.
pub const HIDE_DELAY: Duration = Duration::from_millis(300);

/// Submission controller states. At most one submit cycle is in flight;
/// a submit while `Downloading` is dropped, not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Downloading,
}

#[derive(Debug, Clone)]
pub struct DownloadPlan {
    pub download_url: String,
    pub suggested_filename: String,
}

/// Application-level branch of a successful HTTP exchange.
#[derive(Debug, Clone)]
pub enum DownloadOutcome {
    Ready(DownloadPlan),
    Rejected(String),
}

/// Visual-only progress ramp. Not derived from transfer measurement: while a
/// request is in flight the bar creeps up in random steps capped at 90%, jumps
/// to 100% when the request resolves, and resets once hidden.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosmeticProgress {
    percent: f32,
    visible: bool,
}

impl CosmeticProgress {
    pub fn start(&mut self) {
        self.visible = true;
        self.percent = 0.0;
    }

    pub fn tick(&mut self, step: f32) {
        if self.percent < 90.0 {
            self.percent = (self.percent + step).min(90.0);
        }
    }

    pub fn finish(&mut self) {
        self.percent = 100.0;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.percent = 0.0;
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_is_capped_at_ninety() {
        let mut progress = CosmeticProgress::default();
        progress.start();
        for _ in 0..30 {
            progress.tick(9.9);
        }
        assert_eq!(progress.percent(), 90.0);
        assert!(progress.is_visible());
    }

    #[test]
    fn finish_jumps_to_full() {
        let mut progress = CosmeticProgress::default();
        progress.start();
        progress.tick(4.2);
        progress.finish();
        assert_eq!(progress.percent(), 100.0);
    }

    #[test]
    fn hide_resets_the_bar() {
        let mut progress = CosmeticProgress::default();
        progress.start();
        progress.finish();
        progress.hide();
        assert_eq!(progress.percent(), 0.0);
        assert!(!progress.is_visible());
    }

    #[test]
    fn starts_hidden() {
        let progress = CosmeticProgress::default();
        assert!(!progress.is_visible());
        assert_eq!(progress.percent(), 0.0);
    }
}
