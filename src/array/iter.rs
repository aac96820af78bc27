use super::DynamicArray;
use crate::storage::RawStorage;
use std::{fmt, iter::FusedIterator, mem::ManuallyDrop, ptr, slice};

/// Owning iterator. Takes over the storage of the array.
///
/// Slots `[start, end)` hold elements not yet yielded.
/// Unyielded elements are dropped together with the iterator.
pub struct IntoIter<T> {
    storage: RawStorage<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    /// Remaining elements.
    pub fn as_slice(&self) -> &[T] {
        // This is safe since [start, end) are initialized.
        unsafe { slice::from_raw_parts(self.storage.slot(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let at = self.start;
        self.start += 1;
        // This is safe since slot was initialized and is no longer in range.
        Some(unsafe { ptr::read(self.storage.slot(at)) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // This is safe since slot was initialized and is no longer in range.
        Some(unsafe { ptr::read(self.storage.slot(self.end)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = self.end - self.start;
        // Avoid double drop if an element drop panics.
        self.end = self.start;
        // This is safe since they were initialized and weren't yielded.
        // Storage is released after this by its own drop.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.storage.slot(self.start),
                remaining,
            ))
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        // Array must not drop its elements, they are handed over.
        let mut array = ManuallyDrop::new(self);
        IntoIter {
            storage: array.storage.take(),
            start: 0,
            end: array.len,
        }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let required = self.len.saturating_add(lower);
        if required > self.capacity() {
            self.reserve(required.max(self.grown_capacity()));
        }
        for item in iter {
            self.push(item);
        }
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}
