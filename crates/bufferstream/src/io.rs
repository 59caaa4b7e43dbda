//! `std::io` adapters.
//!
//! The inherent `read`, `write` and `seek` methods shadow the trait methods of
//! the same name; call the trait versions as `io::Read::read(&mut stream, buf)`
//! or use the provided methods such as `read_exact` and `write_all`.

use std::io::{self, SeekFrom};

use crate::{Backing, BackingMut, BufferStream, SeekOrigin};

impl<B: Backing> io::Read for BufferStream<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data();
        let start = self.position.min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.advance(n);
        Ok(n)
    }
}

/// Writes as much as fits; a growable backing takes the whole buffer.
impl<B: BackingMut> io::Write for BufferStream<B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match self.position.checked_add(buf.len()) {
            Some(end) if end <= self.len || self.buffer.grow(end) => {
                self.len = self.len.max(end);
                buf.len()
            }
            _ => buf.len().min(self.remaining()),
        };
        self.put(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Seeking past the logical end is an error, unlike for files.
impl<B: Backing> io::Seek for BufferStream<B> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, origin) = match pos {
            SeekFrom::Start(offset) => (
                i64::try_from(offset).map_err(|_| invalid_offset())?,
                SeekOrigin::Begin,
            ),
            SeekFrom::Current(offset) => (offset, SeekOrigin::Current),
            SeekFrom::End(offset) => (
                offset.checked_neg().ok_or_else(invalid_offset)?,
                SeekOrigin::End,
            ),
        };
        BufferStream::seek(self, offset, origin)?;
        Ok(self.position as u64)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position as u64)
    }
}

fn invalid_offset() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "seek offset out of range")
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Seek, SeekFrom, Write};

    use crate::{BufferStream, BufferStreamReadOnly};

    #[test]
    fn test_read_exact_and_eof() {
        let data = [1u8, 2, 3];
        let mut stream = BufferStreamReadOnly::new(&data[..]);
        let mut two = [0u8; 2];
        stream.read_exact(&mut two).unwrap();
        assert_eq!(two, [1, 2]);
        let err = stream.read_exact(&mut two).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_write_all_fixed_reports_write_zero() {
        let mut data = [0u8; 2];
        let mut stream = BufferStream::new(&mut data[..]);
        let err = stream.write_all(b"abc").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::WriteZero);
        assert_eq!(stream.tell(), 2);
        drop(stream);
        assert_eq!(&data, b"ab");
    }

    #[test]
    fn test_write_all_growable() {
        let mut vec = Vec::<u8>::new();
        let mut stream = BufferStream::growable(&mut vec);
        stream.write_all(b"hello").unwrap();
        assert_eq!(stream.size(), 5);
        drop(stream);
        assert_eq!(&vec[..5], b"hello");
        assert_eq!(vec.len(), 8);
    }

    #[test]
    fn test_seek_from_end() {
        let data = [0u8; 6];
        let mut stream = BufferStreamReadOnly::new(&data[..]);
        assert_eq!(Seek::seek(&mut stream, SeekFrom::End(-2)).unwrap(), 4);
        assert_eq!(Seek::seek(&mut stream, SeekFrom::Current(-4)).unwrap(), 0);
        let err = Seek::seek(&mut stream, SeekFrom::End(1)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert_eq!(stream.tell(), 0);
    }

    #[test]
    fn test_read_to_end_from_cursor() {
        let data = *b"header:body";
        let mut stream = BufferStreamReadOnly::new(&data[..]);
        stream.skip(7).unwrap();
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"body");
    }
}
