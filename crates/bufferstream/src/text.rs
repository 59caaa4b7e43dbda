//! Null-terminated and fixed-width string field layout.

use crate::{Result, StreamError};

/// How a string is laid out in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldLayout {
    /// Source bytes copied verbatim.
    pub body: usize,
    /// Total bytes written; everything past `body` is zero.
    pub total: usize,
}

/// Drops a single trailing terminator so at most one is ever written.
pub(crate) fn strip_terminator(src: &[u8]) -> &[u8] {
    src.strip_suffix(&[0]).unwrap_or(src)
}

/// Lays out `src_len` bytes of text.
///
/// With `max_size == 0` the field is the text plus an optional terminator.
/// Otherwise the field is exactly `max_size` bytes, truncating or zero-padding
/// the text; a requested terminator always occupies the final byte.
pub(crate) fn field_layout(src_len: usize, add_null_terminator: bool, max_size: usize) -> FieldLayout {
    if max_size == 0 {
        return FieldLayout {
            body: src_len,
            total: src_len + usize::from(add_null_terminator),
        };
    }
    let room = max_size - usize::from(add_null_terminator);
    FieldLayout {
        body: src_len.min(room),
        total: max_size,
    }
}

/// The part of a fixed-width field before its first terminator.
pub(crate) fn cut_at_terminator(field: &[u8], stop_on_null_terminator: bool) -> &[u8] {
    if !stop_on_null_terminator {
        return field;
    }
    match field.iter().position(|&b| b == 0) {
        Some(end) => &field[..end],
        None => field,
    }
}

pub(crate) fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| StreamError::InvalidUtf8)
}
