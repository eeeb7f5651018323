//! `Content-Range` request headers and `Range` response headers.

use std::fmt;

/// Errors produced while decoding protocol headers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed Range header: {0:?}")]
    MalformedRange(String),
}

/// Value of the `Content-Range` header sent with a PUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRange {
    /// Bytes `start..=end` of a `total`-byte payload.
    Bytes { start: u64, end: u64, total: u64 },
    /// Empty-body status query: `bytes */<total>`.
    Query { total: u64 },
}

impl ContentRange {
    /// Range for a chunk of `len` bytes starting at `offset`.
    ///
    /// A zero-length chunk has no byte range and degrades to a query.
    pub fn chunk(offset: u64, len: u64, total: u64) -> Self {
        if len == 0 {
            return ContentRange::Query { total };
        }
        ContentRange::Bytes {
            start: offset,
            end: offset + len - 1,
            total,
        }
    }

    /// Range asking the server for the bytes it has stored so far.
    pub fn query(total: u64) -> Self {
        ContentRange::Query { total }
    }

    /// Exclusive upper bound of the bytes this range carries.
    pub fn end_exclusive(&self) -> Option<u64> {
        match self {
            ContentRange::Bytes { end, .. } => Some(end + 1),
            ContentRange::Query { .. } => None,
        }
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRange::Bytes { start, end, total } => write!(f, "bytes {start}-{end}/{total}"),
            ContentRange::Query { total } => write!(f, "bytes */{total}"),
        }
    }
}

/// Parses a `Range` response header such as `bytes=0-1048575`.
///
/// Returns the inclusive upper bound of the stored bytes. The server always
/// reports ranges starting at zero.
pub fn parse_range_header(value: &str) -> Result<u64, ProtocolError> {
    let malformed = || ProtocolError::MalformedRange(value.to_string());

    let bounds = value.trim().strip_prefix("bytes=").ok_or_else(malformed)?;
    let (start, end) = bounds.split_once('-').ok_or_else(malformed)?;
    let start: u64 = start.trim().parse().map_err(|_| malformed())?;
    let end: u64 = end.trim().parse().map_err(|_| malformed())?;
    if start != 0 || end < start {
        return Err(malformed());
    }
    Ok(end)
}
