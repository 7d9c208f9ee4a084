pub mod playback;
pub mod resolver;
pub mod store;

pub use playback::{Decoder, PlaybackAdapter, PlaybackError, PlaybackStatus};
pub use resolver::{
    ContentIndex, ContentMetadata, FileHandleResolver, GrantError, GrantStore, SelectionError,
};
pub use store::{FsMediaStore, MediaStore};
