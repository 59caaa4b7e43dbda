//! Write path of [`BufferStream`], available only over a [`BackingMut`].

use std::mem::size_of;

use tracing::trace;
use zerocopy::IntoBytes;

use crate::endian::{self, MAX_SCALAR_WIDTH};
use crate::{text, BackingMut, BufferStream, Pod, Result, StreamError};

impl<B: BackingMut> BufferStream<B> {
    /// The logical region, mutably.
    pub fn data_mut(&mut self) -> &mut [u8] {
        let region = self.buffer.region_mut();
        let end = self.len.min(region.len());
        &mut region[..end]
    }

    /// Writes one value and advances past it.
    ///
    /// A growable backing is enlarged when the value runs past the end; the
    /// logical length then becomes exactly the end of the write.
    pub fn write<T: Pod>(&mut self, value: &T) -> Result<&mut Self> {
        let reverse = endian::plan::<T>(self.big_endian, self.exceptions_enabled)?;
        self.reserve_write(size_of::<T>())?;
        let mut scratch = [0u8; MAX_SCALAR_WIDTH];
        self.put(endian::encode(value, reverse, &mut scratch));
        Ok(self)
    }

    /// Writes `N` values, converting each element independently.
    pub fn write_array<T: Pod, const N: usize>(&mut self, values: &[T; N]) -> Result<&mut Self> {
        self.write_slice(values.as_slice())
    }

    /// Writes every element of `values`, converting each independently.
    pub fn write_slice<T: Pod>(&mut self, values: &[T]) -> Result<&mut Self> {
        if values.is_empty() {
            return Ok(self);
        }
        let reverse = endian::plan::<T>(self.big_endian, self.exceptions_enabled)?;
        let total = self.write_len(size_of::<T>(), values.len())?;
        self.reserve_write(total)?;
        if reverse {
            let mut scratch = [0u8; MAX_SCALAR_WIDTH];
            for value in values {
                self.put(endian::encode(value, true, &mut scratch));
            }
        } else {
            self.put(values.as_bytes());
        }
        Ok(self)
    }

    /// Writes the elements of an iterator of known length.
    ///
    /// Space for `len()` elements is reserved up front; elements beyond the
    /// reported length are clipped like an unchecked write.
    pub fn write_iter<T, I>(&mut self, values: I) -> Result<&mut Self>
    where
        T: Pod,
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        if values.len() == 0 {
            return Ok(self);
        }
        let reverse = endian::plan::<T>(self.big_endian, self.exceptions_enabled)?;
        let total = self.write_len(size_of::<T>(), values.len())?;
        self.reserve_write(total)?;
        let mut scratch = [0u8; MAX_SCALAR_WIDTH];
        for value in values {
            self.put(endian::encode(&value, reverse, &mut scratch));
        }
        Ok(self)
    }

    /// Writes a string field.
    ///
    /// A single trailing `\0` in `s` is ignored. With `max_size == 0` the text
    /// is written followed by a terminator if `add_null_terminator` is set.
    /// Otherwise exactly `max_size` bytes are written: the text is truncated to
    /// fit, the remainder is zero-filled, and a requested terminator takes the
    /// final byte.
    ///
    /// ```
    /// use bufferstream::BufferStream;
    ///
    /// let mut data = [0xFFu8; 6];
    /// BufferStream::new(&mut data[..]).write_string("abcdef", true, 4).unwrap();
    /// assert_eq!(data, [b'a', b'b', b'c', 0, 0xFF, 0xFF]);
    /// ```
    pub fn write_string(&mut self, s: &str, add_null_terminator: bool, max_size: usize) -> Result<&mut Self> {
        self.write_string_bytes(s.as_bytes(), add_null_terminator, max_size)
    }

    /// [`write_string`](Self::write_string) for text that is not UTF-8.
    pub fn write_string_bytes(
        &mut self,
        s: &[u8],
        add_null_terminator: bool,
        max_size: usize,
    ) -> Result<&mut Self> {
        let src = text::strip_terminator(s);
        let layout = text::field_layout(src.len(), add_null_terminator, max_size);
        if layout.total == 0 {
            return Ok(self);
        }
        self.reserve_write(layout.total)?;
        self.put(&src[..layout.body]);
        self.fill_zero(layout.total - layout.body);
        Ok(self)
    }

    /// Writes `n` zero bytes.
    pub fn pad(&mut self, n: usize) -> Result<&mut Self> {
        if n == 0 {
            return Ok(self);
        }
        self.reserve_write(n)?;
        self.fill_zero(n);
        Ok(self)
    }

    /// Writes `n` zeroed elements of `T`.
    pub fn pad_of<T>(&mut self, n: usize) -> Result<&mut Self> {
        let total = self.write_len(size_of::<T>(), n)?;
        self.pad(total)
    }

    /// Makes `requested` bytes at the cursor writable, growing the backing if it can.
    pub(crate) fn reserve_write(&mut self, requested: usize) -> Result<()> {
        if let Some(end) = self.position.checked_add(requested) {
            if end <= self.len {
                return Ok(());
            }
            if self.buffer.grow(end) {
                self.len = end;
                return Ok(());
            }
        }
        if self.exceptions_enabled {
            return Err(StreamError::WriteOverflow {
                position: self.position,
                requested,
                len: self.len,
            });
        }
        trace!(
            position = self.position,
            requested,
            len = self.len,
            "unchecked write out of bounds"
        );
        Ok(())
    }

    fn write_len(&self, size: usize, n: usize) -> Result<usize> {
        size.checked_mul(n).ok_or(StreamError::WriteOverflow {
            position: self.position,
            requested: usize::MAX,
            len: self.len,
        })
    }

    /// Copies `bytes` at the cursor and advances past them. Bytes beyond the
    /// logical end are dropped.
    pub(crate) fn put(&mut self, bytes: &[u8]) {
        let dst = self.target(bytes.len());
        let kept = dst.len();
        dst.copy_from_slice(&bytes[..kept]);
        self.advance(bytes.len());
    }

    fn fill_zero(&mut self, n: usize) {
        self.target(n).fill(0);
        self.advance(n);
    }

    /// The writable part of the `n` bytes at the cursor.
    fn target(&mut self, n: usize) -> &mut [u8] {
        let position = self.position;
        let region = self.buffer.region_mut();
        let limit = self.len.min(region.len());
        let start = position.min(limit);
        let end = position.saturating_add(n).min(limit);
        &mut region[start..end]
    }
}

#[cfg(test)]
mod tests {
    use zerocopy::{Immutable, IntoBytes, TryFromBytes};

    use crate::{BufferStream, Pod, SeekOrigin, StreamError};

    #[derive(Debug, PartialEq, TryFromBytes, IntoBytes, Immutable)]
    #[repr(C)]
    struct Pair {
        x: u16,
        y: u16,
    }

    impl Pod for Pair {}

    #[test]
    fn test_write_fixed_overflow_leaves_bytes() {
        let mut data = [0u8; 3];
        let mut stream = BufferStream::new(&mut data[..]);
        assert!(matches!(
            stream.write(&0xFFFF_FFFFu32),
            Err(StreamError::WriteOverflow { requested: 4, len: 3, .. })
        ));
        assert_eq!(stream.tell(), 0);
        assert_eq!(data, [0, 0, 0]);
    }

    #[test]
    fn test_oversized_growth_fails_cleanly() {
        let mut vec = Vec::<u8>::new();
        let mut stream = BufferStream::growable(&mut vec);
        assert!(matches!(
            stream.pad(usize::MAX - 8),
            Err(StreamError::WriteOverflow { .. })
        ));
        assert_eq!(stream.tell(), 0);
        assert_eq!(stream.size(), 0);
        stream.write(&1u8).unwrap();
        assert_eq!(stream.size(), 1);
    }

    #[test]
    fn test_composite_refused_before_growth() {
        let mut vec = Vec::<u8>::new();
        let mut stream = BufferStream::growable(&mut vec);
        stream.set_big_endian(!crate::host_is_big_endian());
        assert!(matches!(
            stream.write(&Pair { x: 1, y: 2 }),
            Err(StreamError::InvalidEndiannessConversion { .. })
        ));
        assert_eq!(stream.size(), 0);
        drop(stream);
        assert!(vec.is_empty());
    }

    #[test]
    fn test_growth_sets_logical_length_to_write_end() {
        let mut vec = Vec::<u8>::new();
        let mut stream = BufferStream::growable(&mut vec);
        stream.write(&1u8).unwrap().write(&2u16).unwrap();
        assert_eq!(stream.size(), 3);
        assert_eq!(stream.backing().allocated_len(), 4);
        assert_eq!(stream.data().len(), 3);
    }

    #[test]
    fn test_write_string_modes() {
        let mut vec = Vec::<u8>::new();
        let mut stream = BufferStream::growable(&mut vec);
        stream.write_string("Hello\0", true, 0).unwrap();
        assert_eq!(stream.tell(), 6);
        stream.write_string("world", false, 0).unwrap();
        assert_eq!(stream.tell(), 11);
        stream.write_string("ab", true, 5).unwrap();
        assert_eq!(stream.data(), b"Hello\0worldab\0\0\0");
    }

    #[test]
    fn test_write_string_empty_is_noop() {
        let mut data = [0u8; 0];
        let mut stream = BufferStream::new(&mut data[..]);
        stream.write_string("", false, 0).unwrap();
        assert!(stream.write_string("", true, 0).is_err());
    }

    #[test]
    fn test_unchecked_write_clips() {
        let mut data = [0u8; 3];
        let mut stream = BufferStream::new(&mut data[..]);
        stream.set_exceptions_enabled(false);
        stream.seek(1, SeekOrigin::Begin).unwrap();
        stream.write(&0x0403_0201u32).unwrap();
        assert_eq!(stream.tell(), 5);
        drop(stream);
        assert_eq!(data, [0, 1, 2]);
    }

    #[test]
    fn test_pad_of() {
        let mut data = [0xFFu8; 8];
        let mut stream = BufferStream::new(&mut data[..]);
        stream.pad_of::<u16>(3).unwrap();
        assert_eq!(stream.tell(), 6);
        drop(stream);
        assert_eq!(data, [0, 0, 0, 0, 0, 0, 0xFF, 0xFF]);
    }
}
