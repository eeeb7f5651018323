//! Protocol constants: endpoints, header names, status codes and
//! progress band boundaries.

/// Default session-initiation endpoint.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

/// Query parameters selecting the resumable protocol and the resource
/// parts carried by the metadata body.
pub const INITIATE_QUERY: [(&str, &str); 2] = [("uploadType", "resumable"), ("part", "snippet,status")];

/// MIME type of the media declared to the server at initiation.
pub const HEADER_UPLOAD_CONTENT_TYPE: &str = "X-Upload-Content-Type";

/// Byte length of the media declared to the server at initiation.
pub const HEADER_UPLOAD_CONTENT_LENGTH: &str = "X-Upload-Content-Length";

/// Media type used when the caller does not provide one.
pub const DEFAULT_MEDIA_TYPE: &str = "video/*";

/// "Resume Incomplete": the server stored some bytes and wants more.
pub const STATUS_RESUME_INCOMPLETE: u16 = 308;

/// Category identifier used for unknown or absent category names.
pub const DEFAULT_CATEGORY_ID: &str = "22";

/// Progress percentage reported once the session URL is known.
pub const PROGRESS_UPLOAD_START: f64 = 10.0;

/// Progress percentage reported once every byte is acknowledged.
///
/// The band above it belongs to the caller's post-upload catalog sync.
pub const PROGRESS_UPLOAD_END: f64 = 95.0;
