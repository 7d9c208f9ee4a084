//! Trait definition for the swing-coach backend.
//!
//! The HTTP client implements this trait, allowing the runtime controller
//! and its tests to be transport-agnostic.

use std::future::Future;

use crate::error::ApiError;
use crate::types::{AnalysisReport, Identity, UploadSource, UploadedVideo, VideoSummary};

/// The five remote operations of the coach backend.
///
/// Every call is single-attempt: retry policy, if any, belongs to the
/// caller, not the client.
pub trait SwingService: Send + Sync {
    /// Create an account. The server rejects an already-registered email
    /// with HTTP 400.
    fn register(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, ApiError>> + Send;

    /// Exchange credentials for the account identity.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, ApiError>> + Send;

    /// Upload one video as a streamed multipart body.
    fn upload(
        &self,
        user_id: i64,
        title: &str,
        source: UploadSource,
    ) -> impl Future<Output = Result<UploadedVideo, ApiError>> + Send;

    /// List the user's videos in the order the server returns them.
    fn list_videos(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<VideoSummary>, ApiError>> + Send;

    /// Run swing analysis for an uploaded video.
    fn analyze(
        &self,
        video_id: i64,
    ) -> impl Future<Output = Result<AnalysisReport, ApiError>> + Send;
}
