use serde::{Deserialize, Serialize};

use crate::constants::{PROGRESS_UPLOAD_END, PROGRESS_UPLOAD_START};

/// Lifecycle state of an upload session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadState {
    #[serde(rename = "initiating")]
    Initiating,
    #[serde(rename = "uploading")]
    Uploading,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl UploadState {
    /// Returns `true` once the session can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadState::Completed | UploadState::Failed | UploadState::Cancelled
        )
    }
}

/// Point-in-time view of an upload session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub session_id: String,
    pub state: UploadState,
    pub total_bytes: u64,
    pub uploaded_bytes: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl UploadProgress {
    /// Returns the share of acknowledged bytes as a percentage (0-100).
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.uploaded_bytes as f64 / self.total_bytes as f64 * 100.0
    }

    /// Returns the overall percentage, with the byte transfer mapped into
    /// the `[10, 95]` band.
    pub fn overall_percentage(&self) -> f64 {
        progress_percentage(self.uploaded_bytes, self.total_bytes)
    }
}

/// Maps acknowledged bytes into the `[10, 95]` overall progress band.
///
/// An empty payload counts as fully transferred.
pub fn progress_percentage(uploaded: u64, total: u64) -> f64 {
    let band = PROGRESS_UPLOAD_END - PROGRESS_UPLOAD_START;
    if total == 0 {
        return PROGRESS_UPLOAD_END;
    }
    let fraction = (uploaded.min(total)) as f64 / total as f64;
    PROGRESS_UPLOAD_START + fraction * band
}

/// Event emitted by the uploader while a transfer runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum UploadEvent {
    /// Overall progress in percent plus a human-readable status line.
    Progress { percentage: f64, message: String },
    /// The server created the video.
    #[serde(rename_all = "camelCase")]
    Completed { video_id: String },
    /// The upload ended with an error.
    Failed { error: String },
    /// The upload stopped at a chunk boundary after a cancel request.
    Cancelled,
}
