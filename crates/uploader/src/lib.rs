//! Resumable chunked upload client for VideoHub.
//!
//! An upload runs as:
//! 1. Initiate: POST the video metadata, receive a session URL.
//! 2. Transfer: PUT the file in `Content-Range` chunks, advancing on each
//!    308 acknowledgment.
//! 3. Complete: the server answers 200/201 with the created video resource.
//!
//! Progress is published as [`UploadEvent`](videohub_protocol::UploadEvent)s
//! on a bounded channel. Cancellation is cooperative and observed between
//! chunks.

pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;
pub mod uploader;

pub use config::{RetryConfig, UploaderConfig};
pub use error::UploadError;
pub use http::HttpTransport;
pub use response::SessionStatus;
pub use transport::{InitiateRequest, TransportFuture, TransportResponse, UploadTransport};
pub use uploader::ResumableUploader;

/// Uploader backed by the `reqwest` transport.
pub type HttpUploader = ResumableUploader<HttpTransport>;
