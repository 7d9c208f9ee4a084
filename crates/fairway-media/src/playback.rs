use thiserror::Error;
use tracing::debug;
use url::Url;

use fairway_core::models::MediaReference;

/// Read-only playback status surfaced to the presentation layer. No state
/// transition elsewhere depends on playback progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Buffering,
    Ready,
    Ended,
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("decoder failed to open media: {0}")]
    Open(String),
}

/// Platform media decoder. `release` must be idempotent.
pub trait Decoder: Send {
    fn prepare(&mut self, handle: &Url) -> Result<(), PlaybackError>;
    fn status(&self) -> PlaybackStatus;
    fn release(&mut self);
}

/// Owns a decoder bound 1:1 to one media selection.
///
/// The decoder resource is released on every exit path: rebinding, explicit
/// unbind, a failed prepare, and drop.
pub struct PlaybackAdapter {
    decoder: Box<dyn Decoder>,
    media: MediaReference,
}

impl PlaybackAdapter {
    /// Bind a decoder to the selected media, preparing it for playback.
    /// On a failed prepare the decoder is released before the error is
    /// returned.
    pub fn bind(mut decoder: Box<dyn Decoder>, media: &MediaReference) -> Result<Self, PlaybackError> {
        if let Err(err) = decoder.prepare(&media.handle) {
            decoder.release();
            return Err(err);
        }
        debug!(media = %media.display_name, "playback bound");
        Ok(Self {
            decoder,
            media: media.clone(),
        })
    }

    /// The media this adapter is bound to.
    pub fn media(&self) -> &MediaReference {
        &self.media
    }

    pub fn status(&self) -> PlaybackStatus {
        self.decoder.status()
    }

    /// Release the decoder and consume the adapter. Dropping has the same
    /// effect; this form just makes the teardown explicit at call sites.
    pub fn unbind(self) {}
}

impl Drop for PlaybackAdapter {
    fn drop(&mut self) {
        self.decoder.release();
        debug!(media = %self.media.display_name, "playback released");
    }
}
