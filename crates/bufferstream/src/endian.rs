//! Byte-order conversion for scalar values.
//!
//! Conversion is an explicit copy-and-reverse over the value's byte view. It
//! applies only to [`Pod::SCALAR`] types wider than one byte; asking for it on
//! a composite type is refused.

use std::any::type_name;
use std::mem::size_of;

use tracing::trace;

use crate::{Pod, Result, StreamError};

/// Widest scalar the stream can reverse (`u128`).
pub(crate) const MAX_SCALAR_WIDTH: usize = 16;

/// Returns `true` if the host stores multi-byte values most significant byte first.
pub const fn host_is_big_endian() -> bool {
    cfg!(target_endian = "big")
}

/// Whether values of `T` need reversing when the stream's declared order is
/// `big_endian`.
///
/// Returns `Ok(false)` when no conversion is needed, `Ok(true)` when the
/// bytes must be reversed, and fails with
/// [`StreamError::InvalidEndiannessConversion`] for composite types. With
/// `strict` unset the failure degrades to `Ok(false)`: the bytes are copied
/// unconverted.
pub(crate) fn plan<T: Pod>(big_endian: bool, strict: bool) -> Result<bool> {
    if size_of::<T>() <= 1 || big_endian == host_is_big_endian() {
        return Ok(false);
    }
    if T::SCALAR && size_of::<T>() <= MAX_SCALAR_WIDTH {
        return Ok(true);
    }
    if strict {
        return Err(StreamError::InvalidEndiannessConversion {
            type_name: type_name::<T>(),
        });
    }
    trace!(
        type_name = type_name::<T>(),
        "copying composite value without endianness conversion"
    );
    Ok(false)
}

/// Decodes a `T` from exactly `size_of::<T>()` bytes, reversing them first if asked.
pub(crate) fn decode<T: Pod>(src: &[u8], reverse: bool) -> Result<T> {
    let decoded = if reverse {
        let mut scratch = [0u8; MAX_SCALAR_WIDTH];
        let scratch = &mut scratch[..src.len()];
        scratch.copy_from_slice(src);
        scratch.reverse();
        T::try_read_from_bytes(scratch).ok()
    } else {
        T::try_read_from_bytes(src).ok()
    };
    decoded.ok_or(StreamError::InvalidValue {
        type_name: type_name::<T>(),
    })
}

/// Yields the bytes of `value` in stream order, using `scratch` for reversed scalars.
pub(crate) fn encode<'v, T: Pod>(
    value: &'v T,
    reverse: bool,
    scratch: &'v mut [u8; MAX_SCALAR_WIDTH],
) -> &'v [u8] {
    let raw = value.as_bytes();
    if !reverse {
        return raw;
    }
    let out = &mut scratch[..raw.len()];
    out.copy_from_slice(raw);
    out.reverse();
    out
}
