pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{CosmeticProgress, DownloadOutcome, DownloadPlan, Phase, HIDE_DELAY, TICK_INTERVAL};
