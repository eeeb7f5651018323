//! Wire types for the VideoHub resumable upload protocol.
//!
//! The remote endpoint follows the Google resumable-upload semantics:
//! a metadata POST opens a session and returns its URL in `Location`,
//! then the media bytes are PUT in `Content-Range` chunks until the
//! server answers 200/201 with the created video resource.
//!
//! This crate holds only data and header codecs; it performs no I/O.

pub mod constants;
pub mod metadata;
pub mod range;
pub mod resource;
pub mod types;

pub use metadata::{Privacy, VideoMetadata, category_id};
pub use range::{ContentRange, ProtocolError, parse_range_header};
pub use resource::{Thumbnail, Thumbnails, VideoResource, VideoSnippet, VideoStatus};
pub use types::{UploadEvent, UploadProgress, UploadState, progress_percentage};
