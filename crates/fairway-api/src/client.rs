use reqwest::multipart;
use reqwest::{Body, Client};
use tokio_util::io::ReaderStream;

use crate::error::ApiError;
use crate::traits::SwingService;
use crate::types::{AnalysisEnvelope, AnalysisReport, Identity, UploadSource, UploadedVideo, VideoSummary};

/// HTTP client for the coach backend.
///
/// Holds one `reqwest::Client`; transport settings (timeout, TLS) are fixed
/// at construction and read-only afterwards.
pub struct CoachClient {
    base: String,
    http: Client,
}

impl CoachClient {
    /// Create a client against `base_url` with default transport settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client with a preconfigured `reqwest::Client`.
    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        Self { base, http }
    }

    /// Configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "coach API error");
            Err(ApiError::Http { status, message })
        }
    }

    async fn auth_call(&self, path: &str, email: &str, password: &str) -> Result<Identity, ApiError> {
        let resp = self
            .http
            .post(format!("{}{path}", self.base))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .map_err(ApiError::network)?;

        let resp = Self::check_response(resp).await?;
        resp.json::<Identity>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl SwingService for CoachClient {
    async fn register(&self, email: &str, password: &str) -> Result<Identity, ApiError> {
        self.auth_call("/auth/register", email, password).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity, ApiError> {
        self.auth_call("/auth/login", email, password).await
    }

    async fn upload(
        &self,
        user_id: i64,
        title: &str,
        source: UploadSource,
    ) -> Result<UploadedVideo, ApiError> {
        let body = Body::wrap_stream(ReaderStream::new(source.reader));
        let file_part = multipart::Part::stream_with_length(body, source.size_bytes)
            .file_name(source.file_name);

        let form = multipart::Form::new()
            .text("user_id", user_id.to_string())
            .text("title", title.to_string())
            .part("file", file_part);

        tracing::debug!(user_id, title, bytes = source.size_bytes, "uploading video");

        let resp = self
            .http
            .post(format!("{}/videos/upload", self.base))
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::network)?;

        let resp = Self::check_response(resp).await?;
        resp.json::<UploadedVideo>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn list_videos(&self, user_id: i64) -> Result<Vec<VideoSummary>, ApiError> {
        let resp = self
            .http
            .get(format!("{}/videos", self.base))
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(ApiError::network)?;

        let resp = Self::check_response(resp).await?;
        // Server order is the contract; no sorting here.
        resp.json::<Vec<VideoSummary>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn analyze(&self, video_id: i64) -> Result<AnalysisReport, ApiError> {
        let resp = self
            .http
            .post(format!("{}/ai/analyze/{video_id}", self.base))
            .send()
            .await
            .map_err(ApiError::network)?;

        let resp = Self::check_response(resp).await?;
        let envelope: AnalysisEnvelope = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(envelope.into_report())
    }
}
