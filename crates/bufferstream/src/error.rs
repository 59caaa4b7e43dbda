//! Stream error type.

use std::io;

use thiserror::Error;

use crate::SeekOrigin;

/// Result alias used throughout the crate.
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

/// Error type for cursor positioning, reads and writes.
///
/// Every variant is raised before the stream mutates its position or the
/// backing bytes, so a failed call leaves the stream exactly as it was.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("attempted to read {requested} bytes at offset {position} out of buffer bounds ({len} bytes)")]
    ReadOverflow {
        position: usize,
        requested: usize,
        len: usize,
    },
    #[error("attempted to write {requested} bytes at offset {position} out of buffer bounds ({len} bytes)")]
    WriteOverflow {
        position: usize,
        requested: usize,
        len: usize,
    },
    #[error("cannot seek {offset} bytes from {origin} in a buffer of {len} bytes")]
    OutOfRange {
        offset: i64,
        origin: SeekOrigin,
        len: u64,
    },
    #[error("cannot change endianness of composite type `{type_name}`")]
    InvalidEndiannessConversion { type_name: &'static str },
    #[error("bytes are not a valid `{type_name}`")]
    InvalidValue { type_name: &'static str },
    #[error("bytes are not aligned for a view of `{type_name}`")]
    Misaligned { type_name: &'static str },
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StreamError {
    /// Returns `true` for the bounds-class errors (read, write and seek overflow).
    pub fn is_overflow(&self) -> bool {
        matches!(
            self,
            StreamError::ReadOverflow { .. }
                | StreamError::WriteOverflow { .. }
                | StreamError::OutOfRange { .. }
        )
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(inner) => inner,
            other => {
                let kind = match &other {
                    StreamError::ReadOverflow { .. } => io::ErrorKind::UnexpectedEof,
                    StreamError::WriteOverflow { .. } => io::ErrorKind::WriteZero,
                    StreamError::OutOfRange { .. } => io::ErrorKind::InvalidInput,
                    _ => io::ErrorKind::InvalidData,
                };
                io::Error::new(kind, other)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = StreamError::ReadOverflow {
            position: 2,
            requested: 4,
            len: 4,
        };
        assert_eq!(
            err.to_string(),
            "attempted to read 4 bytes at offset 2 out of buffer bounds (4 bytes)"
        );
        let err = StreamError::InvalidEndiannessConversion { type_name: "Pod" };
        assert_eq!(err.to_string(), "cannot change endianness of composite type `Pod`");
    }

    #[test]
    fn test_io_error_kind_mapping() {
        let err: io::Error = StreamError::WriteOverflow {
            position: 0,
            requested: 1,
            len: 0,
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);

        let err: io::Error = StreamError::Io(io::Error::from(io::ErrorKind::NotFound)).into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_is_overflow() {
        assert!(StreamError::OutOfRange {
            offset: -1,
            origin: SeekOrigin::Current,
            len: 0
        }
        .is_overflow());
        assert!(!StreamError::InvalidUtf8.is_overflow());
    }
}
