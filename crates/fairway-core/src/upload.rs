use fairway_api::{AnalysisReport, ApiError, Identity, UploadedVideo};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::MediaReference;

/// Which remote call an upload session failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Upload,
    Analysis,
}

/// Lifecycle of one upload session. A new selection always restarts at
/// `Selected`; clearing returns to `Idle` from anywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Idle,
    Selected,
    Uploading,
    Uploaded { video_id: i64 },
    Analyzing { video_id: i64 },
    Analyzed(AnalysisReport),
    Errored { phase: UploadPhase, message: String },
}

/// A staged upload call: everything the transport needs, tagged with the
/// session generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub generation: u64,
    pub user_id: i64,
    pub title: String,
    pub media: MediaReference,
}

/// The follow-up analysis call issued automatically after a successful
/// upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub generation: u64,
    pub video_id: i64,
}

/// Why an upload could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadStartError {
    #[error("no media selected")]
    NoSelection,
    #[error("an upload is already in progress")]
    InProgress,
    #[error("analysis already complete; select a new video")]
    AlreadyComplete,
}

/// The upload session state machine.
///
/// Drives `Idle → Selected → Uploading → Uploaded → Analyzing → Analyzed`
/// with `Errored` reachable from the two in-flight states. Each
/// select/clear bumps a generation counter; completions carry the
/// generation they were staged under and stale ones are dropped without
/// touching newer state. In-flight transport calls are never cancelled —
/// their late results simply fail the generation check.
#[derive(Debug, Default)]
pub struct UploadOrchestrator {
    state: UploadState,
    media: Option<MediaReference>,
    title: Option<String>,
    generation: u64,
}

impl Default for UploadState {
    fn default() -> Self {
        Self::Idle
    }
}

impl UploadOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Currently selected media, if any.
    pub fn media(&self) -> Option<&MediaReference> {
        self.media.as_ref()
    }

    /// Title of the current session (derived or user-supplied), once known.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Current session generation. Exposed for completion tagging.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Adopt a new selection, replacing any prior one and resetting every
    /// downstream field.
    pub fn select(&mut self, media: MediaReference) {
        debug!(name = %media.display_name, bytes = media.size_bytes, "media selected");
        self.generation += 1;
        self.media = Some(media);
        self.title = None;
        self.state = UploadState::Selected;
    }

    /// Discard the selection and all session data. Always permitted.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.media = None;
        self.title = None;
        self.state = UploadState::Idle;
    }

    /// Stage the upload call for the current selection.
    ///
    /// Requires an authenticated identity (enforced by the signature) and a
    /// selection that is not already in flight. A session that failed in
    /// the upload phase may be retried; a completed analysis requires a new
    /// selection. When `title` is `None` the media display name is used,
    /// matching what the picker showed the user.
    pub fn begin_upload(
        &mut self,
        identity: &Identity,
        title: Option<&str>,
    ) -> Result<UploadRequest, UploadStartError> {
        match &self.state {
            UploadState::Selected
            | UploadState::Errored {
                phase: UploadPhase::Upload,
                ..
            } => {}
            UploadState::Idle => return Err(UploadStartError::NoSelection),
            UploadState::Uploading | UploadState::Uploaded { .. } | UploadState::Analyzing { .. } => {
                return Err(UploadStartError::InProgress)
            }
            UploadState::Analyzed(_)
            | UploadState::Errored {
                phase: UploadPhase::Analysis,
                ..
            } => return Err(UploadStartError::AlreadyComplete),
        }

        let media = self.media.as_ref().ok_or(UploadStartError::NoSelection)?;
        let title = title
            .map(str::to_string)
            .unwrap_or_else(|| media.display_name.clone());

        self.title = Some(title.clone());
        self.state = UploadState::Uploading;
        Ok(UploadRequest {
            generation: self.generation,
            user_id: identity.user_id,
            title,
            media: media.clone(),
        })
    }

    /// Fail the in-flight upload without a server response (e.g. the media
    /// stream could not be opened). Guarded by the generation check.
    pub fn abort_upload(&mut self, generation: u64, message: impl Into<String>) {
        if generation != self.generation {
            return;
        }
        self.state = UploadState::Errored {
            phase: UploadPhase::Upload,
            message: message.into(),
        };
    }

    /// Apply the upload outcome. On success the session moves to
    /// `Uploaded` and the follow-up analysis request is returned; analysis
    /// starts with no confirmation step. A stale generation returns `None`
    /// and changes nothing.
    pub fn on_upload_result(
        &mut self,
        generation: u64,
        result: Result<UploadedVideo, ApiError>,
    ) -> Option<AnalyzeRequest> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale upload result");
            return None;
        }

        match result {
            Ok(video) => {
                info!(video_id = video.video_id, title = %video.title, "upload complete");
                self.title = Some(video.title);
                self.state = UploadState::Uploaded {
                    video_id: video.video_id,
                };
                Some(AnalyzeRequest {
                    generation,
                    video_id: video.video_id,
                })
            }
            Err(err) => {
                self.state = UploadState::Errored {
                    phase: UploadPhase::Upload,
                    message: describe_failure(UploadPhase::Upload, &err),
                };
                None
            }
        }
    }

    /// Mark the automatic analysis call as issued: `Uploaded → Analyzing`.
    pub fn on_analysis_started(&mut self, generation: u64) {
        if generation != self.generation {
            return;
        }
        if let UploadState::Uploaded { video_id } = self.state {
            self.state = UploadState::Analyzing { video_id };
        }
    }

    /// Apply the analysis outcome. Stale generations are dropped.
    pub fn on_analyze_result(&mut self, generation: u64, result: Result<AnalysisReport, ApiError>) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale analysis result");
            return;
        }

        match result {
            Ok(report) => {
                info!(video_id = report.video_id, "analysis complete");
                self.state = UploadState::Analyzed(report);
            }
            Err(err) => {
                self.state = UploadState::Errored {
                    phase: UploadPhase::Analysis,
                    message: describe_failure(UploadPhase::Analysis, &err),
                };
            }
        }
    }
}

fn describe_failure(phase: UploadPhase, err: &ApiError) -> String {
    let verb = match phase {
        UploadPhase::Upload => "upload",
        UploadPhase::Analysis => "analysis",
    };
    match err {
        ApiError::Network(detail) => format!("network error: {detail}"),
        ApiError::Http { status, .. } => format!("{verb} failed: {status}"),
        ApiError::Decode(_) => "malformed server response".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn identity() -> Identity {
        Identity {
            user_id: 7,
            email: "a@b.com".into(),
        }
    }

    fn swing_media() -> MediaReference {
        MediaReference {
            handle: Url::parse("file:///videos/swing.mp4").unwrap(),
            display_name: "swing.mp4".into(),
            size_bytes: 10 * 1024 * 1024,
        }
    }

    fn report() -> AnalysisReport {
        AnalysisReport {
            video_id: 1,
            title: "swing.mp4".into(),
            head_stability: 0.82,
            x_factor: 0.75,
            hand_speed: 0.88,
            suggestion: "Keep head still".into(),
        }
    }

    fn uploaded() -> UploadedVideo {
        UploadedVideo {
            video_id: 1,
            title: "swing.mp4".into(),
        }
    }

    #[test]
    fn test_select_enters_selected_and_bumps_generation() {
        let mut orch = UploadOrchestrator::new();
        assert_eq!(orch.state(), &UploadState::Idle);

        let g0 = orch.generation();
        orch.select(swing_media());
        assert_eq!(orch.state(), &UploadState::Selected);
        assert!(orch.generation() > g0);
    }

    #[test]
    fn test_begin_upload_requires_selection() {
        let mut orch = UploadOrchestrator::new();
        assert_eq!(
            orch.begin_upload(&identity(), None),
            Err(UploadStartError::NoSelection)
        );
    }

    #[test]
    fn test_begin_upload_derives_title_from_display_name() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());

        let request = orch.begin_upload(&identity(), None).unwrap();
        assert_eq!(request.title, "swing.mp4");
        assert_eq!(request.user_id, 7);
        assert_eq!(orch.state(), &UploadState::Uploading);
    }

    #[test]
    fn test_explicit_title_wins() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), Some("Morning swing")).unwrap();
        assert_eq!(request.title, "Morning swing");
    }

    #[test]
    fn test_begin_upload_rejected_while_in_flight() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        orch.begin_upload(&identity(), None).unwrap();
        assert_eq!(
            orch.begin_upload(&identity(), None),
            Err(UploadStartError::InProgress)
        );
    }

    #[test]
    fn test_upload_success_advances_to_analysis() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();

        let analyze = orch.on_upload_result(request.generation, Ok(uploaded()));
        assert_eq!(orch.state(), &UploadState::Uploaded { video_id: 1 });
        let analyze = analyze.expect("upload success must stage analysis");
        assert_eq!(analyze.video_id, 1);

        orch.on_analysis_started(analyze.generation);
        assert_eq!(orch.state(), &UploadState::Analyzing { video_id: 1 });

        orch.on_analyze_result(analyze.generation, Ok(report()));
        match orch.state() {
            UploadState::Analyzed(r) => assert_eq!(r.suggestion, "Keep head still"),
            other => panic!("Expected Analyzed, got {other:?}"),
        }
    }

    #[test]
    fn test_upload_http_failure_message() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();

        let next = orch.on_upload_result(
            request.generation,
            Err(ApiError::Http {
                status: 500,
                message: String::new(),
            }),
        );
        assert!(next.is_none());
        assert_eq!(
            orch.state(),
            &UploadState::Errored {
                phase: UploadPhase::Upload,
                message: "upload failed: 500".into()
            }
        );
    }

    #[test]
    fn test_upload_network_failure_message() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();

        orch.on_upload_result(
            request.generation,
            Err(ApiError::Network("connection reset".into())),
        );
        assert_eq!(
            orch.state(),
            &UploadState::Errored {
                phase: UploadPhase::Upload,
                message: "network error: connection reset".into()
            }
        );
    }

    #[test]
    fn test_upload_decode_failure_message() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();

        orch.on_upload_result(
            request.generation,
            Err(ApiError::Decode("missing field `video_id`".into())),
        );
        assert_eq!(
            orch.state(),
            &UploadState::Errored {
                phase: UploadPhase::Upload,
                message: "malformed server response".into()
            }
        );
    }

    #[test]
    fn test_analysis_failure_message() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();
        let analyze = orch.on_upload_result(request.generation, Ok(uploaded())).unwrap();
        orch.on_analysis_started(analyze.generation);

        orch.on_analyze_result(
            analyze.generation,
            Err(ApiError::Http {
                status: 404,
                message: String::new(),
            }),
        );
        assert_eq!(
            orch.state(),
            &UploadState::Errored {
                phase: UploadPhase::Analysis,
                message: "analysis failed: 404".into()
            }
        );
    }

    #[test]
    fn test_retry_allowed_after_upload_error_only() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();
        orch.on_upload_result(request.generation, Err(ApiError::Network("timeout".into())));

        // Upload-phase error: retry allowed.
        assert!(orch.begin_upload(&identity(), None).is_ok());

        let request = orch.begin_upload(&identity(), None).err();
        assert_eq!(request, Some(UploadStartError::InProgress));
    }

    #[test]
    fn test_no_retry_after_analysis_error() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();
        let analyze = orch.on_upload_result(request.generation, Ok(uploaded())).unwrap();
        orch.on_analysis_started(analyze.generation);
        orch.on_analyze_result(analyze.generation, Err(ApiError::Network("gone".into())));

        assert_eq!(
            orch.begin_upload(&identity(), None),
            Err(UploadStartError::AlreadyComplete)
        );
    }

    #[test]
    fn test_stale_upload_result_does_not_touch_new_selection() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();

        // User replaces the selection while the upload is in flight.
        let other = MediaReference {
            handle: Url::parse("file:///videos/practice.mp4").unwrap(),
            display_name: "practice.mp4".into(),
            size_bytes: 2048,
        };
        orch.select(other.clone());

        let analyze = orch.on_upload_result(request.generation, Ok(uploaded()));
        assert!(analyze.is_none());
        assert_eq!(orch.state(), &UploadState::Selected);
        assert_eq!(orch.media(), Some(&other));
        assert_eq!(orch.title(), None);
    }

    #[test]
    fn test_stale_analysis_result_dropped_after_clear() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();
        let analyze = orch.on_upload_result(request.generation, Ok(uploaded())).unwrap();
        orch.on_analysis_started(analyze.generation);

        orch.clear();
        orch.on_analyze_result(analyze.generation, Ok(report()));
        assert_eq!(orch.state(), &UploadState::Idle);
    }

    #[test]
    fn test_abort_upload_respects_generation() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();

        orch.select(swing_media());
        orch.abort_upload(request.generation, "cannot read media");
        assert_eq!(orch.state(), &UploadState::Selected);

        let request = orch.begin_upload(&identity(), None).unwrap();
        orch.abort_upload(request.generation, "cannot read media");
        assert_eq!(
            orch.state(),
            &UploadState::Errored {
                phase: UploadPhase::Upload,
                message: "cannot read media".into()
            }
        );
    }

    #[test]
    fn test_clear_resets_from_every_state() {
        // Selected.
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        orch.clear();
        assert_eq!(orch.state(), &UploadState::Idle);
        assert_eq!(orch.media(), None);

        // Uploading.
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        orch.begin_upload(&identity(), None).unwrap();
        orch.clear();
        assert_eq!(orch.state(), &UploadState::Idle);

        // Analyzed.
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();
        let analyze = orch.on_upload_result(request.generation, Ok(uploaded())).unwrap();
        orch.on_analysis_started(analyze.generation);
        orch.on_analyze_result(analyze.generation, Ok(report()));
        orch.clear();
        assert_eq!(orch.state(), &UploadState::Idle);
        assert_eq!(orch.title(), None);

        // Errored.
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();
        orch.on_upload_result(request.generation, Err(ApiError::Network("x".into())));
        orch.clear();
        assert_eq!(orch.state(), &UploadState::Idle);
    }

    #[test]
    fn test_reselect_resets_downstream_fields() {
        let mut orch = UploadOrchestrator::new();
        orch.select(swing_media());
        let request = orch.begin_upload(&identity(), None).unwrap();
        orch.on_upload_result(request.generation, Ok(uploaded()));

        orch.select(swing_media());
        assert_eq!(orch.state(), &UploadState::Selected);
        assert_eq!(orch.title(), None);
    }
}
