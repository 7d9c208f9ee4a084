use std::future::Future;
use std::io;
use std::path::PathBuf;

use tracing::debug;
use url::Url;

use fairway_api::types::UploadSource;

use crate::resolver::{ContentIndex, ContentMetadata, GrantError, GrantStore};

/// Opens a re-readable byte stream for a media handle, for upload.
pub trait MediaStore: Send + Sync {
    fn open_read(&self, handle: &Url) -> impl Future<Output = io::Result<UploadSource>> + Send;
}

/// Filesystem-backed media capabilities for `file://` handles.
///
/// Desktop platforms need no explicit read grants, so the grant store is a
/// no-op here; the content index reads name and size straight from the
/// filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMediaStore;

impl FsMediaStore {
    fn path_of(handle: &Url) -> io::Result<PathBuf> {
        handle.to_file_path().map_err(|()| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file handle: {handle}"),
            )
        })
    }
}

impl GrantStore for FsMediaStore {
    fn persist_read_grant(&self, _handle: &Url) -> Result<(), GrantError> {
        Ok(())
    }
}

impl ContentIndex for FsMediaStore {
    fn metadata(&self, handle: &Url) -> Option<ContentMetadata> {
        let path = Self::path_of(handle).ok()?;
        let meta = std::fs::metadata(&path).ok()?;
        let display_name = path.file_name()?.to_str()?.to_string();
        Some(ContentMetadata {
            display_name,
            size_bytes: meta.len(),
        })
    }
}

impl MediaStore for FsMediaStore {
    async fn open_read(&self, handle: &Url) -> io::Result<UploadSource> {
        let path = Self::path_of(handle)?;
        let file = tokio::fs::File::open(&path).await?;
        let size_bytes = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video")
            .to_string();

        debug!(path = %path.display(), size_bytes, "opened media for upload");
        Ok(UploadSource {
            file_name,
            size_bytes,
            reader: Box::new(file),
        })
    }
}
