use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use videohub_protocol::{UploadProgress, UploadState};

use crate::TransferError;

/// A contiguous byte range of the source file.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Byte offset within the file.
    pub offset: u64,
    /// Raw chunk data.
    pub data: Vec<u8>,
}

impl Chunk {
    /// Size of this chunk in bytes.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Exclusive end offset.
    pub fn end(&self) -> u64 {
        self.offset + self.len()
    }
}

/// Tracks one resumable upload (thread-safe).
///
/// The session is owned by the caller and handed to the uploader by
/// reference, so progress can be observed from another task while the
/// transfer loop advances it.
pub struct UploadSession {
    inner: RwLock<SessionInner>,
}

struct SessionInner {
    id: String,
    session_url: String,
    state: UploadState,
    total_bytes: u64,
    uploaded_bytes: u64,
    started_at: Option<Instant>,
    updated_at: Instant,
    completed_at: Option<Instant>,
    error: String,
}

impl UploadSession {
    /// Creates a session for a `total_bytes` payload behind `session_url`.
    ///
    /// The session starts in [`UploadState::Initiating`] with nothing
    /// acknowledged.
    pub fn new(session_url: impl Into<String>, total_bytes: u64) -> Self {
        Self {
            inner: RwLock::new(SessionInner {
                id: uuid::Uuid::new_v4().to_string(),
                session_url: session_url.into(),
                state: UploadState::Initiating,
                total_bytes,
                uploaded_bytes: 0,
                started_at: None,
                updated_at: Instant::now(),
                completed_at: None,
                error: String::new(),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the session as uploading.
    pub fn start(&self) -> Result<(), TransferError> {
        let mut s = self.write();
        if s.state.is_terminal() {
            return Err(TransferError::SessionNotActive(s.id.clone()));
        }
        s.state = UploadState::Uploading;
        let now = Instant::now();
        s.started_at.get_or_insert(now);
        s.updated_at = now;
        Ok(())
    }

    /// Records a server acknowledgment up to `acknowledged` (exclusive).
    ///
    /// The acknowledged offset never moves backwards and never passes the
    /// total size. Re-acknowledging the current offset is a no-op.
    pub fn acknowledge(&self, acknowledged: u64) -> Result<(), TransferError> {
        let mut s = self.write();
        if acknowledged > s.total_bytes {
            return Err(TransferError::OffsetOverrun {
                acknowledged,
                total: s.total_bytes,
            });
        }
        if acknowledged < s.uploaded_bytes {
            return Err(TransferError::OffsetRegression {
                current: s.uploaded_bytes,
                acknowledged,
            });
        }
        s.uploaded_bytes = acknowledged;
        s.updated_at = Instant::now();
        Ok(())
    }

    /// Marks the session as completed with every byte acknowledged.
    pub fn complete(&self) {
        let mut s = self.write();
        s.state = UploadState::Completed;
        s.uploaded_bytes = s.total_bytes;
        let now = Instant::now();
        s.completed_at = Some(now);
        s.updated_at = now;
    }

    /// Marks the session as failed with an error message.
    pub fn fail(&self, err: &str) {
        let mut s = self.write();
        s.state = UploadState::Failed;
        s.error = err.to_string();
        let now = Instant::now();
        s.completed_at = Some(now);
        s.updated_at = now;
    }

    /// Marks the session as cancelled.
    pub fn cancel(&self) {
        let mut s = self.write();
        s.state = UploadState::Cancelled;
        let now = Instant::now();
        s.completed_at = Some(now);
        s.updated_at = now;
    }

    /// Returns a snapshot of the session.
    pub fn progress(&self) -> UploadProgress {
        let s = self.read();
        UploadProgress {
            session_id: s.id.clone(),
            state: s.state,
            total_bytes: s.total_bytes,
            uploaded_bytes: s.uploaded_bytes,
            error: s.error.clone(),
        }
    }

    /// Returns `true` until the session reaches a terminal state.
    pub fn is_active(&self) -> bool {
        !self.read().state.is_terminal()
    }

    pub fn id(&self) -> String {
        self.read().id.clone()
    }

    pub fn session_url(&self) -> String {
        self.read().session_url.clone()
    }

    pub fn state(&self) -> UploadState {
        self.read().state
    }

    pub fn total_bytes(&self) -> u64 {
        self.read().total_bytes
    }

    /// Bytes acknowledged by the server so far.
    pub fn uploaded_bytes(&self) -> u64 {
        self.read().uploaded_bytes
    }

    /// Time since the transfer started, if it has.
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        let s = self.read();
        let end = s.completed_at.unwrap_or(s.updated_at);
        s.started_at.map(|start| end.duration_since(start))
    }
}
