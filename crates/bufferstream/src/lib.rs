//! Binary cursor over caller-supplied byte buffers.
//!
//! [`BufferStream`] reads and writes fixed-layout values ([`Pod`] types),
//! arrays, sequences and null-terminated or fixed-width strings at a tracked
//! position. It never owns its storage: it runs over a borrowed slice, a
//! read-only slice ([`BufferStreamReadOnly`]) or a caller-owned `Vec` that can
//! grow on demand ([`GrowableBuffer`]).
//!
//! - All accesses are bounds-checked against the logical length, and a failed
//!   call leaves position and bytes unchanged.
//! - Multi-byte scalars are byte-reversed when the stream's declared byte order
//!   differs from the host's. Composite types are never converted.
//! - `peek` and `at` read without moving the cursor.
//!
//! [`IoStream`] and [`FileStream`] offer the same typed API over any seekable
//! reader or writer.
//!
//! # Example
//!
//! ```
//! use bufferstream::{BufferStream, BufferStreamReadOnly, SeekOrigin};
//!
//! let mut out: Vec<u8> = Vec::new();
//! let mut writer = BufferStream::growable(&mut out);
//! writer.set_big_endian(true);
//! writer.write(&7u16).unwrap().write_string("name", true, 8).unwrap();
//! let size = writer.size();
//! drop(writer);
//!
//! let mut reader = BufferStreamReadOnly::new(&out[..size]);
//! reader.set_big_endian(true);
//! assert_eq!(reader.read::<u16>().unwrap(), 7);
//! assert_eq!(reader.at_string(2, SeekOrigin::Begin).unwrap(), "name");
//! assert_eq!(reader.read_string_n(8, true).unwrap(), "name");
//! assert_eq!(reader.remaining(), 0);
//! ```

mod backing;
mod endian;
mod error;
mod file;
mod io;
mod options;
mod pod;
mod sequence;
mod stream;
mod text;
mod write;

pub use backing::{Backing, BackingMut, GrowableBuffer};
pub use endian::host_is_big_endian;
pub use error::{Result, StreamError};
pub use file::{FileStream, IoStream};
pub use options::{FileStreamOptions, StreamOptions};
pub use pod::Pod;
pub use sequence::PodSequence;
pub use stream::{BufferStream, BufferStreamReadOnly, SeekOrigin};

pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, TryFromBytes};
