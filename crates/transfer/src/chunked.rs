use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::types::Chunk;
use crate::{DEFAULT_CHUNK_SIZE, TransferError};

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads fixed-size byte ranges of a source file at arbitrary offsets.
///
/// The file is treated as immutable for the lifetime of the reader; its
/// size is captured once at open time.
pub struct ChunkReader {
    file: std::fs::File,
    chunk_size: usize,
    file_size: u64,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    ///
    /// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] (1 MiB) is used.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let file_size = file.metadata()?.len();
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Ok(Self {
            file,
            chunk_size,
            file_size,
        })
    }

    /// Reads the chunk starting at `offset`. Returns `None` at or past EOF.
    ///
    /// The chunk covers `[offset, min(offset + chunk_size, file_size))`.
    pub fn read_at(&mut self, offset: u64) -> Result<Option<Chunk>, TransferError> {
        if offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - offset;
        let len = remaining.min(self.chunk_size as u64) as usize;
        let mut data = vec![0u8; len];

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut data)?;

        Ok(Some(Chunk { offset, data }))
    }

    /// Configured chunk size in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Number of chunks needed to send the bytes from `offset` to EOF.
    pub fn chunks_from(&self, offset: u64) -> u64 {
        let remaining = self.file_size.saturating_sub(offset);
        remaining.div_ceil(self.chunk_size as u64)
    }
}
