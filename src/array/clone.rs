//! Duplication of elements.

use super::DynamicArray;
use crate::util::PartialFill;

impl<T: Clone> DynamicArray<T> {
    /// Clones values of the list into exactly `list.len()` slots.
    pub fn from_slice(list: &[T]) -> Self {
        Self::from_fn(list.len(), |i| list[i].clone())
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    /// Allocates exactly `self.len()` slots.
    /// If a clone panics, already cloned elements are dropped and storage released.
    fn clone(&self) -> Self {
        Self::from_slice(self)
    }

    /// If source doesn't fit into capacity, a full copy is built and swapped in,
    /// so a panicking clone leaves self unchanged.
    ///
    /// Otherwise storage is reused: overlapping prefix is assigned with `clone_from`,
    /// the rest is either cloned into reserved slots or dropped.
    /// A panicking clone then leaves self valid with the prefix assigned so far.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut copy = source.clone();
            self.swap(&mut copy);
            return;
        }

        let common = self.len.min(source.len);
        for (target, source) in self.as_mut_slice()[..common]
            .iter_mut()
            .zip(&source[..common])
        {
            target.clone_from(source);
        }

        if source.len >= self.len {
            // This is safe since slots [self.len, source.len) are reserved and uninitialized.
            let mut fill = unsafe { PartialFill::new(self.storage.slot(self.len)) };
            for item in &source[self.len..] {
                fill.push(item.clone());
            }
            self.len += fill.finish();
        } else {
            self.truncate(source.len);
        }
    }
}
