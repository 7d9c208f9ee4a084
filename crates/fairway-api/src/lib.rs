pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::CoachClient;
pub use error::ApiError;
pub use traits::SwingService;
pub use types::{AnalysisReport, Identity, UploadSource, UploadedVideo, VideoSummary};
