//! Fixed-layout value types readable from and writable to a stream.

use zerocopy::{Immutable, IntoBytes, TryFromBytes};

/// A plain fixed-layout value: no pointers, no padding, copyable byte-for-byte.
///
/// The byte-level capabilities come from `zerocopy`; derive
/// `TryFromBytes`, `IntoBytes` and `Immutable` on a `#[repr(C)]` struct or a
/// `#[repr(uN)]` enum, then implement this trait.
///
/// `SCALAR` marks types whose bytes may be reversed as a whole when the
/// stream's byte order differs from the host's. It is `true` for the builtin
/// integers, floats, `bool` and `char`, and should be set to `true` for
/// field-less enums. Composite types keep the default `false`, and the stream
/// refuses to convert them.
///
/// # Example
///
/// ```
/// use bufferstream::{BufferStream, Pod};
/// use zerocopy::{Immutable, IntoBytes, TryFromBytes};
///
/// #[derive(Debug, PartialEq, TryFromBytes, IntoBytes, Immutable)]
/// #[repr(u16)]
/// enum Kind {
///     Header = 1,
///     Payload = 2,
/// }
///
/// impl Pod for Kind {
///     const SCALAR: bool = true;
/// }
///
/// let mut data = [0x00u8, 0x02];
/// let mut stream = BufferStream::new(&mut data[..]);
/// assert_eq!(stream.set_big_endian(true).read::<Kind>().unwrap(), Kind::Payload);
/// ```
pub trait Pod: TryFromBytes + IntoBytes + Immutable + Sized {
    /// Whether the value may be endian-converted by reversing its bytes.
    const SCALAR: bool = false;
}

macro_rules! impl_scalar_pod {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Pod for $ty {
                const SCALAR: bool = true;
            }
        )*
    };
}

impl_scalar_pod!(
    u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, usize, isize, f32, f64, bool, char,
);

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::{Immutable, IntoBytes, TryFromBytes};

    #[derive(TryFromBytes, IntoBytes, Immutable)]
    #[repr(C)]
    struct Pair {
        x: i32,
        y: i32,
    }

    impl Pod for Pair {}

    #[test]
    fn test_builtin_scalars() {
        assert!(<u32 as Pod>::SCALAR);
        assert!(<f64 as Pod>::SCALAR);
        assert!(<char as Pod>::SCALAR);
    }

    #[test]
    fn test_composite_default() {
        assert!(!<Pair as Pod>::SCALAR);
        assert_eq!(Pair { x: 1, y: 2 }.as_bytes().len(), 8);
    }
}
