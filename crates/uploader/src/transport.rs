//! Transport seam between the upload loop and the network.
//!
//! [`HttpTransport`](crate::HttpTransport) implements it on top of
//! `reqwest`. Keeping the loop behind a trait lets it be driven by a
//! scripted transport in tests.

use std::future::Future;
use std::pin::Pin;

use videohub_protocol::{ContentRange, VideoMetadata};

use crate::error::UploadError;

/// Future returned by [`UploadTransport`] methods.
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, UploadError>> + Send + 'a>>;

/// Session-initiation request.
#[derive(Debug, Clone, PartialEq)]
pub struct InitiateRequest {
    pub metadata: VideoMetadata,
    /// Byte length of the media that will follow.
    pub content_length: u64,
}

/// The parts of an HTTP response the protocol looks at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// `Location` header.
    pub location: Option<String>,
    /// `Range` header.
    pub range: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract connection to a resumable-upload endpoint.
///
/// Implementations return `Err` only when no HTTP response was obtained;
/// every status code, including errors, comes back as a
/// [`TransportResponse`].
pub trait UploadTransport: Send + Sync {
    /// POSTs the session-initiation request.
    fn initiate<'a>(&'a self, request: &'a InitiateRequest) -> TransportFuture<'a>;

    /// PUTs `body` to the session URL with the given `Content-Range`.
    fn put<'a>(
        &'a self,
        session_url: &'a str,
        range: ContentRange,
        body: Vec<u8>,
    ) -> TransportFuture<'a>;
}
