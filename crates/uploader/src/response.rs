//! Interpretation of server responses.

use videohub_protocol::constants::STATUS_RESUME_INCOMPLETE;
use videohub_protocol::{ContentRange, VideoResource, parse_range_header};

use crate::error::UploadError;
use crate::transport::TransportResponse;

/// What the server reports about a session after a PUT.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// More bytes are expected; `acknowledged` bytes are stored.
    Incomplete { acknowledged: u64 },
    /// The upload is complete and the video resource was created.
    Complete(VideoResource),
}

/// Extracts the session URL from an initiation response.
pub(crate) fn session_url_from(response: &TransportResponse) -> Result<String, UploadError> {
    if !response.is_success() {
        let body = String::from_utf8_lossy(&response.body);
        return Err(UploadError::SessionInitiation(format!(
            "HTTP {}: {}",
            response.status,
            body.trim()
        )));
    }
    match response.location.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => Err(UploadError::SessionInitiation(format!(
            "HTTP {} without a Location header",
            response.status
        ))),
    }
}

/// Interprets the response to a PUT sent with `range`.
///
/// A 308 without a `Range` header counts as acceptance of every byte the
/// request carried (none, for a status query). `offset` is the session
/// offset the request was sent from and is reported in errors.
pub(crate) fn interpret_put(
    response: &TransportResponse,
    range: ContentRange,
    offset: u64,
) -> Result<SessionStatus, UploadError> {
    match response.status {
        STATUS_RESUME_INCOMPLETE => {
            let acknowledged = match response.range.as_deref() {
                Some(value) => parse_range_header(value)
                    .map_err(|e| UploadError::Protocol(e.to_string()))?
                    .checked_add(1)
                    .ok_or_else(|| {
                        UploadError::Protocol(format!("Range upper bound out of bounds: {value}"))
                    })?,
                None => range.end_exclusive().unwrap_or(0),
            };
            Ok(SessionStatus::Incomplete { acknowledged })
        }
        200 | 201 => {
            let video: VideoResource = serde_json::from_slice(&response.body)?;
            Ok(SessionStatus::Complete(video))
        }
        status => Err(UploadError::ChunkUpload {
            status: Some(status),
            offset,
        }),
    }
}
