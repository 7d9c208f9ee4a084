//! Headless controller tying the session and upload state machines to the
//! API client and the platform media capabilities.
//!
//! The presentation layer calls the intent handlers and renders snapshots;
//! it never mutates state directly. All mutations happen under one lock,
//! and every network completion re-acquires that lock before being applied
//! through the state machines' generation checks, so a response that
//! outlived its selection is dropped instead of clobbering newer state.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use fairway_api::{ApiError, CoachClient, Identity, SwingService, VideoSummary};
use fairway_core::config::AppConfig;
use fairway_core::models::MediaReference;
use fairway_core::session::{AuthMode, SessionManager};
use fairway_core::upload::{UploadOrchestrator, UploadState};
use fairway_media::{
    Decoder, FileHandleResolver, FsMediaStore, MediaStore, PlaybackAdapter, PlaybackError,
};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Cheap copy of the current core state for rendering.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub identity: Option<Identity>,
    pub authenticating: bool,
    pub auth_error: Option<String>,
    pub upload: UploadState,
    pub media: Option<MediaReference>,
}

#[derive(Default)]
struct CoreState {
    session: SessionManager,
    upload: UploadOrchestrator,
}

/// The application core behind the presentation layer.
pub struct Controller<S, M> {
    service: S,
    store: M,
    resolver: FileHandleResolver,
    state: Arc<RwLock<CoreState>>,
}

impl Controller<CoachClient, FsMediaStore> {
    /// Production wiring: HTTP client per the configured endpoint and
    /// timeout, filesystem-backed media capabilities.
    pub fn from_config(config: &AppConfig) -> Result<Self, RuntimeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.server.timeout_secs))
            .build()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        let client = CoachClient::with_client(&config.server.base_url, http);
        let resolver = FileHandleResolver::new(Arc::new(FsMediaStore), Arc::new(FsMediaStore));
        Ok(Self::new(client, FsMediaStore, resolver))
    }
}

impl<S, M> Controller<S, M>
where
    S: SwingService,
    M: MediaStore,
{
    pub fn new(service: S, store: M, resolver: FileHandleResolver) -> Self {
        Self {
            service,
            store,
            resolver,
            state: Arc::new(RwLock::new(CoreState::default())),
        }
    }

    /// Validate and run a login/register submission. Outcomes land in the
    /// snapshot: identity on success, an error message otherwise.
    pub async fn submit_credentials(
        &self,
        mode: AuthMode,
        email: &str,
        password: &str,
        confirm_password: Option<&str>,
    ) {
        let request = {
            let mut state = self.state.write().await;
            match state
                .session
                .begin_submit(mode, email, password, confirm_password)
            {
                Ok(request) => request,
                Err(rejection) => {
                    debug!(%rejection, "credential submission rejected");
                    return;
                }
            }
        };

        let result = match request.mode {
            AuthMode::Login => self.service.login(&request.email, &request.password).await,
            AuthMode::Register => {
                self.service
                    .register(&request.email, &request.password)
                    .await
            }
        };

        self.state
            .write()
            .await
            .session
            .on_auth_result(request.mode, result);
    }

    /// Adopt a file-selection outcome. A cancelled picker (`None`) clears
    /// the current selection; a resolution failure leaves state unchanged.
    pub async fn select_media(&self, raw: Option<Url>) {
        match self.resolver.resolve(raw) {
            Ok(Some(media)) => self.state.write().await.upload.select(media),
            Ok(None) => self.state.write().await.upload.clear(),
            Err(err) => warn!(error = %err, "media selection failed"),
        }
    }

    /// Upload the current selection and, on success, run the automatic
    /// analysis call. Requires a signed-in user.
    pub async fn start_upload(&self, title: Option<&str>) {
        let request = {
            let mut state = self.state.write().await;
            let Some(identity) = state.session.identity().cloned() else {
                warn!("upload requires a signed-in user");
                return;
            };
            match state.upload.begin_upload(&identity, title) {
                Ok(request) => request,
                Err(err) => {
                    debug!(%err, "upload not started");
                    return;
                }
            }
        };

        let source = match self.store.open_read(&request.media.handle).await {
            Ok(source) => source,
            Err(err) => {
                self.state
                    .write()
                    .await
                    .upload
                    .abort_upload(request.generation, format!("cannot read media: {err}"));
                return;
            }
        };

        let result = self
            .service
            .upload(request.user_id, &request.title, source)
            .await;

        let analyze = {
            let mut state = self.state.write().await;
            let analyze = state.upload.on_upload_result(request.generation, result);
            if let Some(analyze) = analyze {
                state.upload.on_analysis_started(analyze.generation);
            }
            analyze
        };

        if let Some(analyze) = analyze {
            let result = self.service.analyze(analyze.video_id).await;
            self.state
                .write()
                .await
                .upload
                .on_analyze_result(analyze.generation, result);
        }
    }

    /// Discard the selection and all dependent session data.
    pub async fn clear_selection(&self) {
        self.state.write().await.upload.clear();
    }

    /// Drop the identity and the dependent upload session.
    pub async fn logout(&self) {
        let mut state = self.state.write().await;
        state.session.logout();
        state.upload.clear();
    }

    /// Fetch the user's videos in server order.
    pub async fn list_videos(&self) -> Result<Vec<VideoSummary>, RuntimeError> {
        let user_id = {
            let state = self.state.read().await;
            state.session.identity().map(|i| i.user_id)
        }
        .ok_or(RuntimeError::NotAuthenticated)?;

        Ok(self.service.list_videos(user_id).await?)
    }

    /// Bind a playback decoder to the current selection, if any. The caller
    /// owns the adapter; dropping it releases the decoder, and a new
    /// selection warrants a fresh bind.
    pub async fn bind_playback(
        &self,
        decoder: Box<dyn Decoder>,
    ) -> Result<Option<PlaybackAdapter>, PlaybackError> {
        let media = self.state.read().await.upload.media().cloned();
        media
            .map(|media| PlaybackAdapter::bind(decoder, &media))
            .transpose()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.session.identity().cloned()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            identity: state.session.identity().cloned(),
            authenticating: state.session.is_busy(),
            auth_error: state.session.error().map(str::to_string),
            upload: state.upload.state().clone(),
            media: state.upload.media().cloned(),
        }
    }
}
