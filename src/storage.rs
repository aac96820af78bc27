use crate::error::StorageError;
use getset::CopyGetters;
use log::*;
use std::{
    alloc::{self, Layout},
    fmt,
    marker::PhantomData,
    mem,
    ptr::NonNull,
};

/// Owner of one uninitialized block of memory with room for `capacity` elements of T.
///
/// Never constructs nor drops elements, that is the responsibility of the owner.
/// Dropping it only releases the block.
///
/// Zero sized T never allocates, but capacity is still recorded.
#[derive(CopyGetters)]
pub struct RawStorage<T> {
    ptr: NonNull<T>,
    /// Number of slots in the block.
    #[getset(get_copy = "pub")]
    capacity: usize,
    _data: PhantomData<T>,
}

impl<T> RawStorage<T> {
    /// Empty storage, doesn't allocate.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            _data: PhantomData,
        }
    }

    /// Allocates block for `capacity` slots.
    /// Zero capacity results in empty storage.
    pub fn allocate(capacity: usize) -> Result<Self, StorageError> {
        if capacity == 0 {
            return Ok(Self::new());
        }

        let layout = Self::layout(capacity)?;
        if layout.size() == 0 {
            // Zero sized T
            return Ok(Self {
                ptr: NonNull::dangling(),
                capacity,
                _data: PhantomData,
            });
        }

        // This is safe since layout is not zero sized.
        let ptr = NonNull::new(unsafe { alloc::alloc(layout) })
            .ok_or(StorageError::AllocFailed { layout })?;
        trace!(
            "Allocated {} slots of {} at {:p}",
            capacity,
            std::any::type_name::<T>(),
            ptr
        );

        Ok(Self {
            ptr: ptr.cast(),
            capacity,
            _data: PhantomData,
        })
    }

    /// Same as `allocate` but raises the error.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::allocate(capacity) {
            Ok(storage) => storage,
            Err(error) => error.raise(),
        }
    }

    /// Releases the block and leaves self empty.
    /// Any element still in it is forgotten.
    pub fn release(&mut self) {
        let capacity = mem::replace(&mut self.capacity, 0);
        let ptr = mem::replace(&mut self.ptr, NonNull::dangling());
        if capacity == 0 || mem::size_of::<T>() == 0 {
            return;
        }

        let layout = Self::layout(capacity).expect("Layout was valid on allocation");
        trace!(
            "Releasing {} slots of {} at {:p}",
            capacity,
            std::any::type_name::<T>(),
            ptr
        );
        // This is safe since ptr was allocated with the same layout.
        unsafe { alloc::dealloc(ptr.as_ptr().cast(), layout) };
    }

    /// Transfers the block out, leaving self empty.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }

    /// Address of slot at index.
    /// Index equal to capacity is allowed for one past the end address.
    ///
    /// Doesn't check anything besides the contract assertion, and computing the address
    /// is always safe. Dereferencing it is valid only for index < capacity.
    #[inline(always)]
    pub fn slot(&self, index: usize) -> *mut T {
        contract!(
            index <= self.capacity,
            "slot index (is {index}) should be <= capacity (is {})",
            self.capacity
        );
        self.ptr.as_ptr().wrapping_add(index)
    }

    /// Address of first slot. Dangling but aligned if there is no block.
    #[inline(always)]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    fn layout(capacity: usize) -> Result<Layout, StorageError> {
        Layout::array::<T>(capacity).map_err(|_| StorageError::CapacityOverflow { capacity })
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Default for RawStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

// This are safe since RawStorage has ownership of its block.
unsafe impl<T: Send> Send for RawStorage<T> {}
unsafe impl<T: Sync> Sync for RawStorage<T> {}

impl<T> fmt::Debug for RawStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawStorage")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}
