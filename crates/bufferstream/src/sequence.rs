//! Resizable destinations for variable-length reads.

use std::collections::VecDeque;

/// A sequence a stream can clear and append decoded elements to.
pub trait PodSequence<T> {
    fn clear(&mut self);

    /// Hint that `additional` elements are about to be appended.
    fn reserve(&mut self, additional: usize) {
        let _ = additional;
    }

    fn push(&mut self, value: T);
}

impl<T> PodSequence<T> for Vec<T> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional);
    }

    fn push(&mut self, value: T) {
        Vec::push(self, value);
    }
}

impl<T> PodSequence<T> for VecDeque<T> {
    fn clear(&mut self) {
        VecDeque::clear(self);
    }

    fn reserve(&mut self, additional: usize) {
        VecDeque::reserve(self, additional);
    }

    fn push(&mut self, value: T) {
        self.push_back(value);
    }
}
