//! Local side of a resumable upload: chunked file reads, the upload
//! session state machine, and transfer speed estimation.

mod chunked;
mod progress;
mod types;

pub use chunked::ChunkReader;
pub use progress::{SpeedCalculator, format_bytes};
pub use types::{Chunk, UploadSession};

/// Default chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("acknowledged offset {acknowledged} is behind current offset {current}")]
    OffsetRegression { current: u64, acknowledged: u64 },

    #[error("acknowledged offset {acknowledged} exceeds total size {total}")]
    OffsetOverrun { acknowledged: u64, total: u64 },

    #[error("session not active: {0}")]
    SessionNotActive(String),
}
