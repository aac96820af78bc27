//! Growable contiguous array on top of [`RawStorage`].
//!
//! Slots `[0, len)` of the storage hold live elements, slots `[len, capacity)`
//! are uninitialized. Every operation that changes capacity or shifts elements
//! invalidates previously obtained pointers and iterators.
//!
//! Relocation between blocks is always a bitwise move since in Rust moves can't fail.
//! Elements are duplicated only when a copy is explicitly requested, see [`clone`](self::clone).

pub mod clone;
pub mod edit;
pub mod iter;

use crate::{error::StorageError, storage::RawStorage, util::PartialFill};
use log::*;
use std::{
    fmt,
    ops::{Deref, DerefMut},
    ptr, slice,
};

pub use iter::IntoIter;

pub struct DynamicArray<T> {
    storage: RawStorage<T>,
    len: usize,
}

impl<T> DynamicArray<T> {
    /// Empty array, doesn't allocate.
    pub const fn new() -> Self {
        Self {
            storage: RawStorage::new(),
            len: 0,
        }
    }

    /// Empty array with exactly `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: RawStorage::with_capacity(capacity),
            len: 0,
        }
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, StorageError> {
        Ok(Self {
            storage: RawStorage::allocate(capacity)?,
            len: 0,
        })
    }

    /// Array of `len` default elements, with exactly `len` slots.
    ///
    /// If a default constructor panics, already constructed elements are dropped
    /// and storage is released.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::from_fn(len, |_| T::default())
    }

    /// Array of `len` elements constructed by `f` from their index, with exactly `len` slots.
    pub fn from_fn(len: usize, mut f: impl FnMut(usize) -> T) -> Self {
        let storage = RawStorage::with_capacity(len);
        // This is safe since storage has len slots and nothing else uses them.
        let mut fill = unsafe { PartialFill::new(storage.as_ptr()) };
        for i in 0..len {
            fill.push(f(i));
        }
        let len = fill.finish();
        Self { storage, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    pub fn as_slice(&self) -> &[T] {
        // This is safe since first len slots are initialized.
        unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // This is safe since first len slots are initialized.
        unsafe { slice::from_raw_parts_mut(self.storage.as_ptr(), self.len) }
    }

    /// Transfers content out, leaving self empty without storage.
    pub fn take(&mut self) -> Self {
        let len = std::mem::replace(&mut self.len, 0);
        Self {
            storage: self.storage.take(),
            len,
        }
    }

    pub fn swap(&mut self, other: &mut Self) {
        self.storage.swap(&mut other.storage);
        std::mem::swap(&mut self.len, &mut other.len);
    }

    /// Ensures capacity is at least `capacity` slots. Note, it's not additional to len.
    ///
    /// If growth is needed, exactly `capacity` slots are allocated and elements are
    /// relocated to them. Otherwise nothing changes, including element addresses.
    pub fn reserve(&mut self, capacity: usize) {
        if let Err(error) = self.try_reserve(capacity) {
            error.raise();
        }
    }

    /// Same as `reserve` but returns the error. On error self is unchanged.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), StorageError> {
        if capacity <= self.capacity() {
            return Ok(());
        }

        let mut storage = RawStorage::allocate(capacity).map_err(|error| {
            warn!("Failed to reserve {} slots: {}", capacity, error);
            error
        })?;
        self.relocate(&mut storage, 0..self.len, 0);
        self.adopt(storage);
        Ok(())
    }

    /// Resizes to `len`, dropping excess elements or default constructing new ones.
    pub fn resize(&mut self, len: usize)
    where
        T: Default,
    {
        self.resize_with(len, T::default)
    }

    /// Resizes to `len`, dropping excess elements or constructing new ones with `f`.
    ///
    /// When growing, capacity becomes at least `len`. If `f` panics, newly constructed
    /// elements are dropped and len stays as it was.
    pub fn resize_with(&mut self, len: usize, mut f: impl FnMut() -> T) {
        if len <= self.len {
            self.truncate(len);
            return;
        }

        self.reserve(len);
        // This is safe since slots [self.len,len) are reserved and uninitialized.
        let mut fill = unsafe { PartialFill::new(self.storage.slot(self.len)) };
        for _ in self.len..len {
            fill.push(f());
        }
        self.len += fill.finish();
    }

    /// Appends value and returns reference to it.
    pub fn push(&mut self, value: T) -> &mut T {
        self.push_with(|| value)
    }

    /// Appends value constructed by `f` and returns reference to it.
    ///
    /// Amortized O(1), capacity doubles starting from 1.
    /// If `f` panics self is unchanged.
    pub fn push_with(&mut self, f: impl FnOnce() -> T) -> &mut T {
        let len = self.len;
        if len == self.capacity() {
            let mut storage = RawStorage::with_capacity(self.grown_capacity());
            self.relocate(&mut storage, 0..len, 0);
            // Constructed as the last step, so unwinding just releases the new block.
            // This is safe since len < new capacity.
            unsafe { storage.slot(len).write(f()) };
            self.adopt(storage);
        } else {
            // This is safe since len < capacity.
            unsafe { self.storage.slot(len).write(f()) };
        }
        self.len = len + 1;

        // This is safe since it was just initialized.
        unsafe { &mut *self.storage.slot(len) }
    }

    /// Inserts value at index, shifting elements after it to the right.
    /// Returns reference to it.
    ///
    /// Panics if index > len.
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.insert_with(index, || value)
    }

    /// Inserts value constructed by `f` at index, shifting elements after it to the right.
    /// Returns reference to it.
    ///
    /// If `f` panics self is unchanged.
    ///
    /// Panics if index > len.
    pub fn insert_with(&mut self, index: usize, f: impl FnOnce() -> T) -> &mut T {
        #[cold]
        #[inline(never)]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("insertion index (is {index}) should be <= len (is {len})");
        }

        let len = self.len;
        if index > len {
            assert_failed(index, len);
        }

        if len == self.capacity() {
            let mut storage = RawStorage::<T>::with_capacity(self.grown_capacity());
            // New element is constructed first, directly at its slot. If that panics,
            // only the new block is released. Relocation after it can't fail.
            // This is safe since index <= len < new capacity.
            unsafe { storage.slot(index).write(f()) };
            self.relocate(&mut storage, 0..index, 0);
            self.relocate(&mut storage, index..len, index + 1);
            self.adopt(storage);
        } else {
            let value = f();
            // This is safe since len < capacity, so there is a free slot at the end.
            unsafe {
                let at = self.storage.slot(index);
                ptr::copy(at, at.add(1), len - index);
                at.write(value);
            }
        }
        self.len = len + 1;

        // This is safe since it was just initialized.
        unsafe { &mut *self.storage.slot(index) }
    }

    /// Removes element at index and returns it.
    /// Elements after it are shifted to the left.
    ///
    /// Panics if index >= len.
    pub fn remove(&mut self, index: usize) -> T {
        #[cold]
        #[inline(never)]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("removal index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        // This is safe since slot at index is initialized, and after the read it's
        // considered uninitialized until the tail is shifted over it.
        let removed = unsafe {
            let at = self.storage.slot(index);
            let removed = ptr::read(at);
            ptr::copy(at.add(1), at, len - index - 1);
            removed
        };
        self.len = len - 1;
        removed
    }

    /// Drops element at index, shifting elements after it to the left.
    /// Returns the element that now occupies index, if any.
    ///
    /// Panics if index >= len.
    pub fn erase(&mut self, index: usize) -> Option<&mut T> {
        // Array is consistent before the element is dropped.
        drop(self.remove(index));
        self.as_mut_slice().get_mut(index)
    }

    /// Drops last element.
    ///
    /// Panics if empty.
    pub fn pop_back(&mut self) {
        assert!(self.len > 0, "pop_back on empty array");
        drop(self.pop());
    }

    /// Removes last element and returns it, None if empty.
    pub fn pop(&mut self) -> Option<T> {
        let len = self.len.checked_sub(1)?;
        self.len = len;
        // This is safe since it was initialized according to len.
        Some(unsafe { ptr::read(self.storage.slot(len)) })
    }

    /// Drops elements from len on. Does nothing if len >= self.len().
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        let excess = self.len - len;
        // Len is set first so a panicking drop can't cause a double drop.
        self.len = len;
        // This is safe since [len, len + excess) were initialized and are now outside of len.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.storage.slot(len),
                excess,
            ))
        };
    }

    /// Drops all elements, capacity remains.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Capacity for growth by one. Doubles, starting from 1.
    fn grown_capacity(&self) -> usize {
        if self.len == 0 {
            1
        } else {
            self.len
                .checked_mul(2)
                .unwrap_or_else(|| StorageError::CapacityOverflow { capacity: self.len }.raise())
        }
    }

    /// Moves elements in range to `to..` of storage.
    /// Source slots are considered uninitialized afterwards, until the block is adopted
    /// or dropped it's the caller who decides which copy is live.
    fn relocate(&self, storage: &mut RawStorage<T>, range: std::ops::Range<usize>, to: usize) {
        debug_assert!(range.end <= self.len);
        debug_assert!(to + range.len() <= storage.capacity());
        // This is safe since blocks are distinct and ranges are within them.
        // Moves of T can't fail, so this is never a partial copy.
        unsafe {
            ptr::copy_nonoverlapping(self.storage.slot(range.start), storage.slot(to), range.len())
        };
    }

    /// Makes `storage` the new block. Elements in the old block must have been relocated.
    fn adopt(&mut self, mut storage: RawStorage<T>) {
        debug!(
            "Reallocated DynamicArray<{}> from {} to {} slots",
            std::any::type_name::<T>(),
            self.storage.capacity(),
            storage.capacity()
        );
        self.storage.swap(&mut storage);
        // Only old block is released here, its elements were moved.
        drop(storage);
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // Elements first, then storage is released by its own drop.
        // This is safe since first len slots are initialized.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.storage.as_ptr(),
                self.len,
            ))
        }
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Relocates values of the list into exactly N slots.
impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(list: [T; N]) -> Self {
        let list = std::mem::ManuallyDrop::new(list);
        let storage = RawStorage::with_capacity(N);
        // This is safe since storage has N slots and list won't be dropped.
        unsafe { ptr::copy_nonoverlapping(list.as_ptr(), storage.as_ptr(), N) };
        Self { storage, len: N }
    }
}
