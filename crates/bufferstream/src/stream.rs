//! Bounds-checked binary cursor over a borrowed byte region.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::mem::size_of;

use serde::{Deserialize, Serialize};
use tracing::trace;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::backing::{Backing, GrowableBuffer};
use crate::{endian, text, Pod, PodSequence, Result, StreamError, StreamOptions};

/// Reference point for [`BufferStream::seek`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeekOrigin {
    /// Offset from the start of the buffer.
    #[default]
    Begin,
    /// Offset from the cursor; may be negative.
    Current,
    /// Offset back from the logical end.
    End,
}

impl fmt::Display for SeekOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeekOrigin::Begin => write!(f, "begin"),
            SeekOrigin::Current => write!(f, "current"),
            SeekOrigin::End => write!(f, "end"),
        }
    }
}

/// A binary cursor that reads and writes fixed-layout values from a byte region.
///
/// The stream tracks a position and a logical length over a borrowed
/// [`Backing`]. Every read, write and seek is bounds-checked; failures leave the
/// position and the bytes untouched. Multi-byte scalars are byte-reversed when
/// big-endian mode disagrees with the host's byte order.
///
/// # Example
///
/// ```
/// use bufferstream::{BufferStream, SeekOrigin};
///
/// let mut data = [0u8; 8];
/// let mut stream = BufferStream::new(&mut data[..]);
/// stream.set_big_endian(true).write(&0x0102_0304u32).unwrap();
/// stream.write_string("hi", true, 0).unwrap();
///
/// stream.seek(0, SeekOrigin::Begin).unwrap();
/// assert_eq!(stream.read::<u32>().unwrap(), 0x0102_0304);
/// assert_eq!(stream.read_string().unwrap(), "hi");
/// assert_eq!(stream.tell(), 7);
/// drop(stream);
/// assert_eq!(&data[..4], &[1, 2, 3, 4]);
/// ```
#[derive(Debug)]
pub struct BufferStream<B> {
    pub(crate) buffer: B,
    /// Logical length in bytes.
    pub(crate) len: usize,
    pub(crate) position: usize,
    pub(crate) exceptions_enabled: bool,
    pub(crate) big_endian: bool,
}

/// A stream whose writes are statically unavailable.
pub type BufferStreamReadOnly<'a, T = u8> = BufferStream<&'a [T]>;

impl<B: Backing> BufferStream<B> {
    /// Creates a stream at position 0 spanning the whole region.
    pub fn new(buffer: B) -> Self {
        Self::with_options(buffer, StreamOptions::default())
    }

    /// Creates a stream at position 0 with the given flags.
    pub fn with_options(buffer: B, options: StreamOptions) -> Self {
        let len = buffer.region().len();
        Self {
            buffer,
            len,
            position: 0,
            exceptions_enabled: options.exceptions_enabled,
            big_endian: options.big_endian,
        }
    }

    /// Enables or disables bounds and conversion checks.
    ///
    /// With checks disabled no call fails for a bounds or conversion
    /// violation: reads past the end see zero bytes, writes past the end are
    /// dropped and seeks are applied unchecked. Use only where the caller has
    /// already validated the layout.
    pub fn set_exceptions_enabled(&mut self, exceptions: bool) -> &mut Self {
        self.exceptions_enabled = exceptions;
        self
    }

    /// Selects the byte order of multi-byte scalars.
    pub fn set_big_endian(&mut self, big_endian: bool) -> &mut Self {
        self.big_endian = big_endian;
        self
    }

    /// Replaces both behavioral flags.
    pub fn set_options(&mut self, options: StreamOptions) -> &mut Self {
        self.exceptions_enabled = options.exceptions_enabled;
        self.big_endian = options.big_endian;
        self
    }

    /// Whether bounds and conversion violations are reported.
    pub fn exceptions_enabled(&self) -> bool {
        self.exceptions_enabled
    }

    /// Whether multi-byte scalars are read and written big-endian.
    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// The current flags.
    pub fn options(&self) -> StreamOptions {
        StreamOptions {
            exceptions_enabled: self.exceptions_enabled,
            big_endian: self.big_endian,
        }
    }

    /// The logical region.
    ///
    /// The slice borrows the stream, so it cannot outlive a later write that
    /// might grow and relocate the buffer.
    pub fn data(&self) -> &[u8] {
        let region = self.buffer.region();
        &region[..self.len.min(region.len())]
    }

    /// The borrowed storage.
    pub fn backing(&self) -> &B {
        &self.buffer
    }

    /// Consumes the stream, returning its storage.
    pub fn into_backing(self) -> B {
        self.buffer
    }

    /// Logical length in bytes.
    pub fn size(&self) -> usize {
        self.len
    }

    /// Current cursor offset in bytes.
    pub fn tell(&self) -> usize {
        self.position
    }

    /// Bytes between the cursor and the logical end.
    pub fn remaining(&self) -> usize {
        self.len.saturating_sub(self.position)
    }

    // ---------------------------------------------------------------- positioning

    /// Moves the cursor to `offset` relative to `origin`.
    ///
    /// For [`SeekOrigin::End`] the target is `size() - offset`. The target
    /// must lie within `0..=size()`.
    pub fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<&mut Self> {
        self.position = self.resolve(offset, origin)?;
        Ok(self)
    }

    /// [`seek`](Self::seek) with an unsigned magnitude.
    pub fn seek_unsigned(&mut self, offset: u64, origin: SeekOrigin) -> Result<&mut Self> {
        match i64::try_from(offset) {
            Ok(offset) => self.seek(offset, origin),
            Err(_) => self.seek(i64::MAX, origin),
        }
    }

    /// Moves the cursor `n` bytes; negative values move backward.
    pub fn skip(&mut self, n: i64) -> Result<&mut Self> {
        if n == 0 {
            return Ok(self);
        }
        self.seek(n, SeekOrigin::Current)
    }

    /// [`skip`](Self::skip) with an unsigned magnitude.
    pub fn skip_unsigned(&mut self, n: u64) -> Result<&mut Self> {
        if n == 0 {
            return Ok(self);
        }
        self.seek_unsigned(n, SeekOrigin::Current)
    }

    /// Moves the cursor `n` elements of `T`.
    pub fn skip_of<T>(&mut self, n: i64) -> Result<&mut Self> {
        if n == 0 {
            return Ok(self);
        }
        let step = i64::try_from(size_of::<T>())
            .ok()
            .and_then(|size| size.checked_mul(n))
            .unwrap_or(if n < 0 { i64::MIN } else { i64::MAX });
        self.skip(step)
    }

    fn resolve(&self, offset: i64, origin: SeekOrigin) -> Result<usize> {
        let len = self.len as i128;
        let target = match origin {
            SeekOrigin::Begin => i128::from(offset),
            SeekOrigin::Current => self.position as i128 + i128::from(offset),
            SeekOrigin::End => len - i128::from(offset),
        };
        if (0..=len).contains(&target) {
            return Ok(target as usize);
        }
        if self.exceptions_enabled {
            return Err(StreamError::OutOfRange {
                offset,
                origin,
                len: self.len as u64,
            });
        }
        trace!(offset, %origin, len = self.len, "unchecked seek out of bounds");
        Ok(usize::try_from(target.max(0)).unwrap_or(usize::MAX))
    }

    // ---------------------------------------------------------------- peek

    /// The byte at the cursor, without consuming it.
    pub fn peek(&self) -> Result<u8> {
        self.peek_at(0)
    }

    /// The byte `offset` bytes past the cursor, without consuming it.
    pub fn peek_at(&self, offset: usize) -> Result<u8> {
        let at = self.position.saturating_add(offset);
        let region = self.buffer.region();
        if at < self.readable_len() {
            if let Some(&byte) = region.get(at) {
                return Ok(byte);
            }
        }
        if self.exceptions_enabled {
            return Err(StreamError::ReadOverflow {
                position: at,
                requested: 1,
                len: self.len,
            });
        }
        trace!(position = at, len = self.len, "unchecked peek out of bounds");
        Ok(region.get(at).copied().unwrap_or(0))
    }

    /// Reads a `T` at the cursor without consuming it.
    pub fn peek_as<T: Pod>(&mut self) -> Result<T> {
        self.at(0, SeekOrigin::Current)
    }

    // ---------------------------------------------------------------- read path

    /// Reads one value and advances past it.
    ///
    /// ```
    /// use bufferstream::BufferStreamReadOnly;
    ///
    /// let data = 0xABCD_EF00u32.to_be_bytes();
    /// let mut stream = BufferStreamReadOnly::new(&data[..]);
    /// assert_eq!(stream.set_big_endian(true).read::<u32>().unwrap(), 0xABCD_EF00);
    /// ```
    pub fn read<T: Pod>(&mut self) -> Result<T> {
        let size = size_of::<T>();
        self.check_read(size)?;
        let reverse = endian::plan::<T>(self.big_endian, self.exceptions_enabled)?;
        let value = endian::decode::<T>(&self.fetch(size), reverse)?;
        self.advance(size);
        Ok(value)
    }

    /// Reads one value into `out`.
    pub fn read_into_value<T: Pod>(&mut self, out: &mut T) -> Result<&mut Self> {
        *out = self.read()?;
        Ok(self)
    }

    /// Reads `N` values, converting each element's byte order independently.
    pub fn read_array<T: Pod, const N: usize>(&mut self) -> Result<[T; N]> {
        let values = self.read_vec::<T>(N)?;
        values.try_into().map_err(|_| StreamError::InvalidValue {
            type_name: type_name::<[T; N]>(),
        })
    }

    /// Clears `dest` and appends `n` values read from the stream.
    ///
    /// With `n == 0` the bounds are not consulted.
    pub fn read_into<T: Pod, C: PodSequence<T>>(&mut self, dest: &mut C, n: usize) -> Result<&mut Self> {
        dest.clear();
        if n == 0 {
            return Ok(self);
        }
        let size = size_of::<T>();
        let total = self.elements_len(size, n)?;
        self.check_read(total)?;
        let reverse = endian::plan::<T>(self.big_endian, self.exceptions_enabled)?;
        {
            let bytes = self.fetch(total);
            dest.reserve(n);
            for chunk in elements(&bytes, size, n) {
                dest.push(endian::decode(chunk, reverse)?);
            }
        }
        self.advance(total);
        Ok(self)
    }

    /// Reads `n` values into a new vector.
    pub fn read_vec<T: Pod>(&mut self, n: usize) -> Result<Vec<T>> {
        let mut out = Vec::new();
        self.read_into(&mut out, n)?;
        Ok(out)
    }

    /// Fills `dest` with values read from the stream.
    pub fn read_slice_into<T: Pod>(&mut self, dest: &mut [T]) -> Result<&mut Self> {
        if dest.is_empty() {
            return Ok(self);
        }
        let size = size_of::<T>();
        let total = self.elements_len(size, dest.len())?;
        self.check_read(total)?;
        let reverse = endian::plan::<T>(self.big_endian, self.exceptions_enabled)?;
        let values = {
            let bytes = self.fetch(total);
            elements(&bytes, size, dest.len())
                .map(|chunk| endian::decode::<T>(chunk, reverse))
                .collect::<Result<Vec<T>>>()?
        };
        for (slot, value) in dest.iter_mut().zip(values) {
            *slot = value;
        }
        self.advance(total);
        Ok(self)
    }

    /// Borrows `n` values of `T` in place and advances past them.
    ///
    /// A view cannot be byte-order converted, so it fails when conversion
    /// would be needed for a multi-byte `T`. The bytes must also be aligned for
    /// `T`.
    pub fn read_span<T>(&mut self, n: usize) -> Result<&[T]>
    where
        T: Pod + FromBytes + KnownLayout,
    {
        if n == 0 {
            return Ok(&[]);
        }
        let start = self.position;
        let total = self.elements_len(size_of::<T>(), n)?;
        self.check_read(total)?;
        self.check_span::<T>()?;
        let view = span(self.buffer.region(), start, n)?;
        self.position = start.saturating_add(total);
        Ok(view)
    }

    /// Reads exactly `N` bytes.
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.check_read(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.fetch(N));
        self.advance(N);
        Ok(out)
    }

    /// Reads exactly `n` bytes.
    pub fn read_bytes_n(&mut self, n: usize) -> Result<Vec<u8>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        self.check_read(n)?;
        let out = self.fetch(n).into_owned();
        self.advance(n);
        Ok(out)
    }

    /// Reads bytes up to a `\0`, which is consumed but not returned.
    pub fn read_terminated_bytes(&mut self) -> Result<Vec<u8>> {
        let (out, next) = self.scan_terminated()?;
        self.position = next;
        Ok(out)
    }

    /// Reads an `n`-byte field.
    ///
    /// With `stop_on_null_terminator` the result ends before the first `\0`;
    /// the cursor still advances by exactly `n`.
    pub fn read_padded_bytes(&mut self, n: usize, stop_on_null_terminator: bool) -> Result<Vec<u8>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        self.check_read(n)?;
        let out = text::cut_at_terminator(&self.fetch(n), stop_on_null_terminator).to_vec();
        self.advance(n);
        Ok(out)
    }

    /// Reads a null-terminated UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let (bytes, next) = self.scan_terminated()?;
        let out = text::into_string(bytes)?;
        self.position = next;
        Ok(out)
    }

    /// Reads an `n`-byte string field.
    ///
    /// ```
    /// use bufferstream::BufferStreamReadOnly;
    ///
    /// let mut stream = BufferStreamReadOnly::new(&b"Hello\0\0\0"[..]);
    /// assert_eq!(stream.read_string_n(8, true).unwrap(), "Hello");
    /// assert_eq!(stream.tell(), 8);
    /// ```
    pub fn read_string_n(&mut self, n: usize, stop_on_null_terminator: bool) -> Result<String> {
        if n == 0 {
            return Ok(String::new());
        }
        self.check_read(n)?;
        let bytes = text::cut_at_terminator(&self.fetch(n), stop_on_null_terminator).to_vec();
        let out = text::into_string(bytes)?;
        self.advance(n);
        Ok(out)
    }

    // ---------------------------------------------------------------- at

    /// Reads a `T` at `offset` from `origin`, leaving the cursor where it was.
    pub fn at<T: Pod>(&mut self, offset: i64, origin: SeekOrigin) -> Result<T> {
        self.restoring(offset, origin, |s| s.read())
    }

    /// Reads `N` values at `offset` from `origin` without moving the cursor.
    pub fn at_array<T: Pod, const N: usize>(&mut self, offset: i64, origin: SeekOrigin) -> Result<[T; N]> {
        self.restoring(offset, origin, |s| s.read_array())
    }

    /// Reads `n` values at `offset` from `origin` without moving the cursor.
    pub fn at_vec<T: Pod>(&mut self, n: usize, offset: i64, origin: SeekOrigin) -> Result<Vec<T>> {
        self.restoring(offset, origin, |s| s.read_vec(n))
    }

    /// Borrows `n` values of `T` at `offset` from `origin`.
    pub fn at_span<T>(&self, n: usize, offset: i64, origin: SeekOrigin) -> Result<&[T]>
    where
        T: Pod + FromBytes + KnownLayout,
    {
        let start = self.resolve(offset, origin)?;
        if n == 0 {
            return Ok(&[]);
        }
        let total = self.elements_len(size_of::<T>(), n)?;
        let fits = start
            .checked_add(total)
            .is_some_and(|end| end <= self.readable_len());
        if !fits && self.exceptions_enabled {
            return Err(StreamError::ReadOverflow {
                position: start,
                requested: total,
                len: self.len,
            });
        }
        self.check_span::<T>()?;
        span(self.buffer.region(), start, n)
    }

    /// Reads a null-terminated string at `offset` from `origin` without moving the cursor.
    pub fn at_string(&mut self, offset: i64, origin: SeekOrigin) -> Result<String> {
        self.restoring(offset, origin, |s| s.read_string())
    }

    /// Reads an `n`-byte string field at `offset` from `origin` without moving the cursor.
    pub fn at_string_n(
        &mut self,
        n: usize,
        stop_on_null_terminator: bool,
        offset: i64,
        origin: SeekOrigin,
    ) -> Result<String> {
        self.restoring(offset, origin, |s| s.read_string_n(n, stop_on_null_terminator))
    }

    /// Reads `N` bytes at `offset` from `origin` without moving the cursor.
    pub fn at_bytes<const N: usize>(&mut self, offset: i64, origin: SeekOrigin) -> Result<[u8; N]> {
        self.restoring(offset, origin, |s| s.read_bytes())
    }

    /// Reads `n` bytes at `offset` from `origin` without moving the cursor.
    pub fn at_bytes_n(&mut self, n: usize, offset: i64, origin: SeekOrigin) -> Result<Vec<u8>> {
        self.restoring(offset, origin, |s| s.read_bytes_n(n))
    }

    // ---------------------------------------------------------------- helpers

    /// Runs `read` at a new position, then puts the cursor back regardless of the outcome.
    fn restoring<R>(
        &mut self,
        offset: i64,
        origin: SeekOrigin,
        read: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let saved = self.position;
        let out = self.seek(offset, origin).and_then(read);
        self.position = saved;
        out
    }

    /// Logical length, never past the end of the region.
    fn readable_len(&self) -> usize {
        self.len.min(self.buffer.region().len())
    }

    pub(crate) fn check_read(&self, requested: usize) -> Result<()> {
        let fits = self
            .position
            .checked_add(requested)
            .is_some_and(|end| end <= self.readable_len());
        if fits {
            return Ok(());
        }
        if self.exceptions_enabled {
            return Err(StreamError::ReadOverflow {
                position: self.position,
                requested,
                len: self.len,
            });
        }
        trace!(
            position = self.position,
            requested,
            len = self.len,
            "unchecked read out of bounds"
        );
        Ok(())
    }

    fn check_span<T: Pod>(&self) -> Result<()> {
        if endian::plan::<T>(self.big_endian, self.exceptions_enabled)? && self.exceptions_enabled {
            return Err(StreamError::InvalidEndiannessConversion {
                type_name: type_name::<T>(),
            });
        }
        Ok(())
    }

    pub(crate) fn elements_len(&self, size: usize, n: usize) -> Result<usize> {
        size.checked_mul(n).ok_or(StreamError::ReadOverflow {
            position: self.position,
            requested: usize::MAX,
            len: self.len,
        })
    }

    /// `len` bytes at the cursor; bytes past the end of the region read as zero.
    pub(crate) fn fetch(&self, len: usize) -> Cow<'_, [u8]> {
        let region = self.buffer.region();
        let start = self.position.min(region.len());
        let end = self.position.saturating_add(len).min(region.len());
        if end - start == len {
            return Cow::Borrowed(&region[start..end]);
        }
        let mut out = vec![0u8; len];
        out[..end - start].copy_from_slice(&region[start..end]);
        Cow::Owned(out)
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.position = self.position.saturating_add(n);
    }

    /// Bytes before the next `\0` and the position just past it.
    fn scan_terminated(&self) -> Result<(Vec<u8>, usize)> {
        let region = self.buffer.region();
        let limit = if self.exceptions_enabled {
            self.len.min(region.len())
        } else {
            region.len()
        };
        let start = self.position.min(limit);
        match region[start..limit].iter().position(|&b| b == 0) {
            Some(end) => Ok((region[start..start + end].to_vec(), start + end + 1)),
            None if self.exceptions_enabled => Err(StreamError::ReadOverflow {
                position: self.position,
                requested: limit - start + 1,
                len: self.len,
            }),
            None => {
                trace!(
                    position = self.position,
                    len = self.len,
                    "unchecked string read ran off the buffer"
                );
                Ok((
                    region[start..limit].to_vec(),
                    self.position.max(limit).saturating_add(1),
                ))
            }
        }
    }
}

impl<'a, T: FromBytes + IntoBytes + Immutable> BufferStream<GrowableBuffer<'a, T>> {
    /// A stream over `vec` that doubles the vector when a write runs past its end.
    pub fn growable(vec: &'a mut Vec<T>) -> Self {
        Self::from_vec(vec, true)
    }

    /// A stream over `vec`; with `resizable` unset writes are limited to its current size.
    pub fn from_vec(vec: &'a mut Vec<T>, resizable: bool) -> Self {
        Self::new(GrowableBuffer::new(vec, resizable))
    }
}

/// `n` chunks of `size` bytes.
fn elements(bytes: &[u8], size: usize, n: usize) -> impl Iterator<Item = &[u8]> {
    (0..n).map(move |i| &bytes[i * size..(i + 1) * size])
}

/// Views `n` values of `T` at `start`; empty when the region is too short.
fn span<T>(region: &[u8], start: usize, n: usize) -> Result<&[T]>
where
    T: Pod + FromBytes + KnownLayout,
{
    let total = size_of::<T>() * n;
    let Some(bytes) = start.checked_add(total).and_then(|end| region.get(start..end)) else {
        trace!(start, requested = total, "unchecked span out of bounds");
        return Ok(&[]);
    };
    <[T]>::ref_from_bytes_with_elems(bytes, n).map_err(|_| StreamError::Misaligned {
        type_name: type_name::<T>(),
    })
}
