use url::Url;

/// Fallback display name when the content index has no row for a handle.
pub const GENERIC_MEDIA_NAME: &str = "video";

/// An opaque, revocable handle to a user-selected local video plus its
/// descriptive metadata.
///
/// The handle stays valid for the current session even when the persistent
/// read grant could not be acquired; metadata is best-effort and falls back
/// to [`GENERIC_MEDIA_NAME`] / 0 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub handle: Url,
    pub display_name: String,
    pub size_bytes: u64,
}
