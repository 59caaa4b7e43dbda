//! Typed reads and writes over a seekable byte source such as a file.
//!
//! [`IoStream`] shares the value layout rules of [`BufferStream`](crate::BufferStream)
//! (byte order, composite guard, string fields) but delegates storage and
//! bounds to the underlying reader or writer. Failed operations rewind to the
//! position they started from. Bytes already handed to a writer before a
//! failure are not rolled back.

use std::any::type_name;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::mem::size_of;
use std::path::Path;

use tracing::debug;

use crate::endian::{self, MAX_SCALAR_WIDTH};
use crate::{text, FileStreamOptions, Pod, PodSequence, Result, SeekOrigin, StreamError};

/// A typed cursor over any `Read`/`Write` + `Seek` value.
#[derive(Debug)]
pub struct IoStream<F> {
    inner: F,
    big_endian: bool,
}

/// An [`IoStream`] over a file on disk.
pub type FileStream = IoStream<File>;

impl FileStream {
    /// Opens `path` according to `options`.
    ///
    /// With `create` and write access, missing parent directories and the
    /// file itself are created.
    pub fn open(path: impl AsRef<Path>, options: FileStreamOptions) -> Result<Self> {
        let path = path.as_ref();
        if options.create && options.writes() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }
        let file = options.open_options().open(path)?;
        debug!(path = %path.display(), ?options, "opened file stream");
        let mut stream = Self::new(file);
        stream.set_big_endian(options.big_endian);
        Ok(stream)
    }
}

impl<F> IoStream<F> {
    /// Wraps `inner` in little-endian mode at its current position.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            big_endian: false,
        }
    }

    /// Selects the byte order of multi-byte scalars.
    pub fn set_big_endian(&mut self, big_endian: bool) -> &mut Self {
        self.big_endian = big_endian;
        self
    }

    /// Whether multi-byte scalars are big-endian.
    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// The wrapped handle.
    pub fn get_ref(&self) -> &F {
        &self.inner
    }

    /// The wrapped handle, mutably.
    pub fn get_mut(&mut self) -> &mut F {
        &mut self.inner
    }

    /// Consumes the stream, returning the handle.
    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Seek> IoStream<F> {
    /// Current offset in the underlying source.
    pub fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Total length of the underlying source in bytes.
    pub fn size(&mut self) -> Result<u64> {
        let position = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(position))?;
        Ok(end)
    }

    /// Moves to `offset` relative to `origin`; [`SeekOrigin::End`] counts back
    /// from the end. Positions past the end are allowed, positions before the
    /// start are not.
    pub fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let target = match origin {
            SeekOrigin::Begin => i128::from(offset),
            SeekOrigin::Current => i128::from(self.tell()?) + i128::from(offset),
            SeekOrigin::End => i128::from(self.size()?) - i128::from(offset),
        };
        let Ok(target) = u64::try_from(target) else {
            return Err(StreamError::OutOfRange {
                offset,
                origin,
                len: self.size()?,
            });
        };
        Ok(self.inner.seek(SeekFrom::Start(target))?)
    }

    /// Moves `n` bytes; negative values move backward.
    pub fn skip(&mut self, n: i64) -> Result<u64> {
        self.seek(n, SeekOrigin::Current)
    }

    /// Moves `n` elements of `T`.
    pub fn skip_of<T>(&mut self, n: i64) -> Result<u64> {
        let step = i64::try_from(size_of::<T>())
            .ok()
            .and_then(|size| size.checked_mul(n))
            .unwrap_or(if n < 0 { i64::MIN } else { i64::MAX });
        self.skip(step)
    }

    /// Runs `op`, rewinding to the starting position if it fails.
    fn transact<R>(&mut self, op: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let start = self.inner.stream_position()?;
        let out = op(self);
        if out.is_err() {
            self.inner.seek(SeekFrom::Start(start))?;
        }
        out
    }
}

impl<F: Read + Seek> IoStream<F> {
    /// Reads one value.
    pub fn read<T: Pod>(&mut self) -> Result<T> {
        let reverse = endian::plan::<T>(self.big_endian, true)?;
        self.transact(|s| {
            let mut buf = vec![0u8; size_of::<T>()];
            s.inner.read_exact(&mut buf)?;
            endian::decode(&buf, reverse)
        })
    }

    /// Reads `N` values, converting each element independently.
    pub fn read_array<T: Pod, const N: usize>(&mut self) -> Result<[T; N]> {
        let values = self.read_vec::<T>(N)?;
        values.try_into().map_err(|_| StreamError::InvalidValue {
            type_name: type_name::<[T; N]>(),
        })
    }

    /// Clears `dest` and appends `n` values.
    pub fn read_into<T: Pod, C: PodSequence<T>>(&mut self, dest: &mut C, n: usize) -> Result<&mut Self> {
        dest.clear();
        if n == 0 {
            return Ok(self);
        }
        let reverse = endian::plan::<T>(self.big_endian, true)?;
        let size = size_of::<T>();
        let total = size
            .checked_mul(n)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "element count overflows usize"))?;
        self.transact(|s| {
            let mut buf = vec![0u8; total];
            s.inner.read_exact(&mut buf)?;
            dest.reserve(n);
            for i in 0..n {
                dest.push(endian::decode(&buf[i * size..(i + 1) * size], reverse)?);
            }
            Ok(())
        })?;
        Ok(self)
    }

    /// Reads `n` values into a new vector.
    pub fn read_vec<T: Pod>(&mut self, n: usize) -> Result<Vec<T>> {
        let mut out = Vec::new();
        self.read_into(&mut out, n)?;
        Ok(out)
    }

    /// Reads exactly `N` bytes.
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.transact(|s| {
            let mut out = [0u8; N];
            s.inner.read_exact(&mut out)?;
            Ok(out)
        })
    }

    /// Reads exactly `n` bytes.
    pub fn read_bytes_n(&mut self, n: usize) -> Result<Vec<u8>> {
        self.transact(|s| {
            let mut out = vec![0u8; n];
            s.inner.read_exact(&mut out)?;
            Ok(out)
        })
    }

    /// Reads bytes up to and including a `\0`; the terminator is not returned.
    ///
    /// Bytes are pulled one at a time, so wrap an unbuffered handle such as a
    /// [`File`] in [`std::io::BufReader`] before scanning long strings.
    pub fn read_terminated_bytes(&mut self) -> Result<Vec<u8>> {
        self.transact(|s| {
            let mut out = Vec::new();
            let mut byte = [0u8; 1];
            loop {
                s.inner.read_exact(&mut byte)?;
                if byte[0] == 0 {
                    return Ok(out);
                }
                out.push(byte[0]);
            }
        })
    }

    /// Reads a null-terminated UTF-8 string. See
    /// [`read_terminated_bytes`](Self::read_terminated_bytes) for buffering.
    pub fn read_string(&mut self) -> Result<String> {
        self.transact(|s| text::into_string(s.read_terminated_bytes()?))
    }

    /// Reads an `n`-byte string field, advancing by exactly `n`.
    pub fn read_string_n(&mut self, n: usize, stop_on_null_terminator: bool) -> Result<String> {
        self.transact(|s| {
            let field = s.read_bytes_n(n)?;
            text::into_string(text::cut_at_terminator(&field, stop_on_null_terminator).to_vec())
        })
    }
}

impl<F: Write + Seek> IoStream<F> {
    /// Writes one value.
    pub fn write<T: Pod>(&mut self, value: &T) -> Result<&mut Self> {
        let reverse = endian::plan::<T>(self.big_endian, true)?;
        self.transact(|s| {
            let mut scratch = [0u8; MAX_SCALAR_WIDTH];
            s.inner.write_all(endian::encode(value, reverse, &mut scratch))?;
            Ok(())
        })?;
        Ok(self)
    }

    /// Writes `N` values, converting each element independently.
    pub fn write_array<T: Pod, const N: usize>(&mut self, values: &[T; N]) -> Result<&mut Self> {
        self.write_slice(values.as_slice())
    }

    /// Writes every element of `values`.
    pub fn write_slice<T: Pod>(&mut self, values: &[T]) -> Result<&mut Self> {
        let reverse = endian::plan::<T>(self.big_endian, true)?;
        self.transact(|s| {
            let mut scratch = [0u8; MAX_SCALAR_WIDTH];
            for value in values {
                s.inner.write_all(endian::encode(value, reverse, &mut scratch))?;
            }
            Ok(())
        })?;
        Ok(self)
    }

    /// Writes a string field laid out like
    /// [`BufferStream::write_string`](crate::BufferStream::write_string).
    pub fn write_string(&mut self, s: &str, add_null_terminator: bool, max_size: usize) -> Result<&mut Self> {
        let src = text::strip_terminator(s.as_bytes());
        let layout = text::field_layout(src.len(), add_null_terminator, max_size);
        let mut field = vec![0u8; layout.total];
        field[..layout.body].copy_from_slice(&src[..layout.body]);
        self.transact(|stream| Ok(stream.inner.write_all(&field)?))?;
        Ok(self)
    }

    /// Writes `n` zero bytes.
    pub fn pad(&mut self, n: usize) -> Result<&mut Self> {
        self.transact(|s| Ok(s.inner.write_all(&vec![0u8; n])?))?;
        Ok(self)
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.inner.flush()?)
    }
}
