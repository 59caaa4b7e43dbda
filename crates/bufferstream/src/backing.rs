//! Byte regions a stream can run over.
//!
//! A stream never owns its bytes. It borrows them through a [`Backing`]
//! (read-only) or a [`BackingMut`] (writable, optionally growable). Growth is
//! an injected capability: [`BackingMut::grow`] is invoked only by the write
//! path, and any slice previously borrowed from the stream is statically
//! invalidated by the `&mut` borrow that growth requires.

use std::mem::size_of;

use tracing::debug;
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// A contiguous byte region the stream reads from.
pub trait Backing {
    /// The full region, which may extend past the stream's logical length.
    fn region(&self) -> &[u8];
}

/// A contiguous byte region the stream can also write to.
pub trait BackingMut: Backing {
    /// The full region, mutably.
    fn region_mut(&mut self) -> &mut [u8];

    /// Makes at least `requested` bytes addressable.
    ///
    /// Returns `false` if this backing cannot grow; the write then fails.
    /// Fixed regions keep the default.
    fn grow(&mut self, requested: usize) -> bool {
        let _ = requested;
        false
    }
}

impl<T: IntoBytes + Immutable> Backing for &[T] {
    fn region(&self) -> &[u8] {
        (**self).as_bytes()
    }
}

impl<T: IntoBytes + Immutable> Backing for &mut [T] {
    fn region(&self) -> &[u8] {
        (**self).as_bytes()
    }
}

impl<T: FromBytes + IntoBytes + Immutable> BackingMut for &mut [T] {
    fn region_mut(&mut self) -> &mut [u8] {
        (**self).as_mut_bytes()
    }
}

/// A caller-owned `Vec` that grows by doubling when a write runs past its end.
///
/// Growth resizes the vector, in elements, to 1 if empty and then doubles
/// until the byte size covers the requested length. New elements are zeroed.
/// Growth never reallocates to an exact fit.
#[derive(Debug)]
pub struct GrowableBuffer<'a, T = u8> {
    vec: &'a mut Vec<T>,
    resizable: bool,
}

impl<'a, T: FromBytes + IntoBytes + Immutable> GrowableBuffer<'a, T> {
    /// Wraps `vec`; with `resizable` unset writes past the end fail instead.
    pub fn new(vec: &'a mut Vec<T>, resizable: bool) -> Self {
        Self { vec, resizable }
    }

    /// Whether the buffer may grow.
    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    /// Bytes currently allocated in the vector (its length, not its capacity).
    pub fn allocated_len(&self) -> usize {
        self.vec.len() * size_of::<T>()
    }

    /// The wrapped vector.
    pub fn as_vec(&self) -> &Vec<T> {
        &*self.vec
    }
}

impl<T: IntoBytes + Immutable> Backing for GrowableBuffer<'_, T> {
    fn region(&self) -> &[u8] {
        self.vec.as_slice().as_bytes()
    }
}

impl<T: FromBytes + IntoBytes + Immutable> BackingMut for GrowableBuffer<'_, T> {
    fn region_mut(&mut self) -> &mut [u8] {
        self.vec.as_mut_slice().as_mut_bytes()
    }

    fn grow(&mut self, requested: usize) -> bool {
        let elem = size_of::<T>();
        if !self.resizable || elem == 0 {
            return false;
        }
        let before = self.vec.len();
        let Some(target) = grown_target(before, elem, requested) else {
            debug!(requested, "stream buffer cannot grow that far");
            return false;
        };
        if target == before {
            return true;
        }
        if self.vec.try_reserve_exact(target - before).is_err() {
            debug!(requested, to = target * elem, "stream buffer allocation failed");
            return false;
        }
        self.vec.resize_with(target, T::new_zeroed);
        debug!(
            from = before * elem,
            to = target * elem,
            requested,
            "grew stream buffer"
        );
        true
    }
}

/// Element count covering `requested` bytes, doubling from `len`.
///
/// `None` when the allocation would exceed `isize::MAX` bytes.
pub(crate) fn grown_target(len: usize, elem: usize, requested: usize) -> Option<usize> {
    let max = isize::MAX as usize;
    if requested > max {
        return None;
    }
    let mut target = len;
    while target.checked_mul(elem)? < requested {
        target = grown_len(target);
    }
    target.checked_mul(elem).filter(|&bytes| bytes <= max)?;
    Some(target)
}

/// Next element count in the doubling sequence.
pub(crate) fn grown_len(len: usize) -> usize {
    if len == 0 {
        1
    } else {
        len.saturating_mul(2)
    }
}
