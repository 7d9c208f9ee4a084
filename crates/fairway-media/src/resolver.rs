use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use url::Url;

use fairway_core::models::{MediaReference, GENERIC_MEDIA_NAME};

/// Display name and byte size as reported by the platform content index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMetadata {
    pub display_name: String,
    pub size_bytes: u64,
}

/// Failure to acquire a persistent read grant. Best-effort: callers log
/// and continue, the handle stays readable for the current session.
#[derive(Debug, Error)]
#[error("read grant not persisted: {0}")]
pub struct GrantError(pub String);

/// Persists read access to a handle across process boundaries, on
/// platforms where access is explicit and revocable.
pub trait GrantStore: Send + Sync {
    fn persist_read_grant(&self, handle: &Url) -> Result<(), GrantError>;
}

/// Looks up display metadata for a handle.
pub trait ContentIndex: Send + Sync {
    fn metadata(&self, handle: &Url) -> Option<ContentMetadata>;
}

/// Resolution failed outright; the handle cannot address readable content.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("opaque media handle: {0}")]
    OpaqueHandle(Url),
}

/// Turns a raw file-selection outcome into a durable [`MediaReference`].
///
/// Grant acquisition and metadata lookup are side effects that can never
/// fail resolution: a missing grant only degrades later re-reads, and
/// missing metadata falls back to a generic name and zero size.
pub struct FileHandleResolver {
    grants: Arc<dyn GrantStore>,
    index: Arc<dyn ContentIndex>,
}

impl FileHandleResolver {
    pub fn new(grants: Arc<dyn GrantStore>, index: Arc<dyn ContentIndex>) -> Self {
        Self { grants, index }
    }

    /// Resolve a selection outcome. `None` means the user cancelled the
    /// picker, which yields no selection rather than an error.
    pub fn resolve(&self, raw: Option<Url>) -> Result<Option<MediaReference>, SelectionError> {
        let Some(handle) = raw else {
            return Ok(None);
        };

        if handle.cannot_be_a_base() {
            return Err(SelectionError::OpaqueHandle(handle));
        }

        if let Err(err) = self.grants.persist_read_grant(&handle) {
            // Swallowed: the handle stays usable for this session.
            debug!(handle = %handle, error = %err, "read grant not persisted");
        }

        let metadata = self.index.metadata(&handle).unwrap_or_else(|| {
            debug!(handle = %handle, "no content metadata, using fallbacks");
            ContentMetadata {
                display_name: GENERIC_MEDIA_NAME.to_string(),
                size_bytes: 0,
            }
        });

        Ok(Some(MediaReference {
            handle,
            display_name: metadata.display_name,
            size_bytes: metadata.size_bytes,
        }))
    }
}
