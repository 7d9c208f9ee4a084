use serde::Deserialize;
use tokio::io::AsyncRead;

/// Authenticated account identity, as returned by login/register.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
}

/// A stored video, as returned by upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedVideo {
    pub video_id: i64,
    pub title: String,
}

/// One row of the user's video list. Server order is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoSummary {
    pub video_id: i64,
    pub title: String,
}

/// Swing analysis for one video, with the nested wire envelope flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub video_id: i64,
    pub title: String,
    pub head_stability: f64,
    pub x_factor: f64,
    pub hand_speed: f64,
    pub suggestion: String,
}

/// Wire shape of `POST /ai/analyze/{video_id}`.
#[derive(Debug, Deserialize)]
pub struct AnalysisEnvelope {
    pub video_id: i64,
    pub title: String,
    pub analysis: AnalysisDetail,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisDetail {
    pub head_stability: f64,
    pub x_factor: f64,
    pub hand_speed: f64,
    pub suggestion: String,
}

impl AnalysisEnvelope {
    pub fn into_report(self) -> AnalysisReport {
        AnalysisReport {
            video_id: self.video_id,
            title: self.title,
            head_stability: self.analysis.head_stability,
            x_factor: self.analysis.x_factor,
            hand_speed: self.analysis.hand_speed,
            suggestion: self.analysis.suggestion,
        }
    }
}

/// Streamed file payload for upload. The reader is forwarded to the wire as
/// a chunked body; the file is never buffered in memory.
pub struct UploadSource {
    pub file_name: String,
    pub size_bytes: u64,
    pub reader: Box<dyn AsyncRead + Send + Sync + Unpin>,
}

impl std::fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSource")
            .field("file_name", &self.file_name)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}
