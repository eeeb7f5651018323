//! Upload error types.

use videohub_transfer::TransferError;

/// Errors produced by the resumable upload client.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("session initiation failed: {0}")]
    SessionInitiation(String),

    #[error("chunk upload failed at offset {offset}: {}", status_text(.status))]
    ChunkUpload { status: Option<u16>, offset: u64 },

    #[error("cancelled")]
    Cancelled,

    #[error("an upload is already in progress")]
    AlreadyInProgress,

    #[error("session not active: {0}")]
    SessionNotActive(String),

    #[error("file is {actual} bytes but the session expects {expected}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),
}

fn status_text(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "no response".to_string(),
    }
}

impl UploadError {
    /// Returns `true` for failures worth retrying: transport errors,
    /// timeouts and 5xx statuses. Client errors (4xx) are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            UploadError::ChunkUpload { status: None, .. } | UploadError::Transport(_) => true,
            UploadError::ChunkUpload {
                status: Some(code), ..
            } => (500..=599).contains(code),
            _ => false,
        }
    }
}
