#[cfg(test)]
pub(crate) mod tracking;

use std::{mem, ptr};

/// Asserts a precondition whose violation is a contract violation of the caller.
/// Checked in debug builds, and in release builds with `strict` feature.
macro_rules! contract {
    ($($arg:tt)*) => {
        if cfg!(any(debug_assertions, feature = "strict")) {
            assert!($($arg)*);
        }
    };
}

/// Run of slots that are being constructed one by one.
///
/// If dropped before `finish`, drops everything constructed so far.
/// That way a panicking constructor leaves behind only uninitialized slots.
pub(crate) struct PartialFill<T> {
    start: *mut T,
    len: usize,
}

impl<T> PartialFill<T> {
    /// Caller must guarantee that `start` is valid for writes for as many
    /// slots as will be pushed, and that nothing else uses them meanwhile.
    pub unsafe fn new(start: *mut T) -> Self {
        Self { start, len: 0 }
    }

    pub fn push(&mut self, value: T) {
        // This is safe according to contract of new.
        unsafe { self.start.add(self.len).write(value) };
        self.len += 1;
    }

    /// Number of constructed slots, which now belong to the caller.
    pub fn finish(self) -> usize {
        let len = self.len;
        mem::forget(self);
        len
    }
}

impl<T> Drop for PartialFill<T> {
    fn drop(&mut self) {
        // This is safe since exactly first len slots were constructed.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start, self.len)) }
    }
}

#[cfg(test)]
mod tests {
    use super::tracking::{self, Tracked};
    use super::*;
    use std::{
        mem::MaybeUninit,
        panic::{catch_unwind, AssertUnwindSafe},
    };

    #[test]
    fn finish_keeps_elements() {
        tracking::reset();
        let mut slots: [MaybeUninit<Tracked>; 4] = std::array::from_fn(|_| MaybeUninit::uninit());

        let mut fill = unsafe { PartialFill::new(slots.as_mut_ptr() as *mut Tracked) };
        for i in 0..3 {
            fill.push(Tracked::new(i));
        }
        assert_eq!(fill.finish(), 3);
        assert_eq!(tracking::live(), 3);

        for slot in &mut slots[..3] {
            unsafe { slot.assume_init_drop() };
        }
        assert_eq!(tracking::live(), 0);
    }

    #[test]
    fn unwind_drops_constructed() {
        tracking::reset();
        let mut slots: [MaybeUninit<Tracked>; 4] = std::array::from_fn(|_| MaybeUninit::uninit());

        tracking::arm(2);
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut fill = unsafe { PartialFill::new(slots.as_mut_ptr() as *mut Tracked) };
            for i in 0..4 {
                fill.push(Tracked::new(i));
            }
            fill.finish()
        }));

        assert!(result.is_err());
        assert_eq!(tracking::live(), 0);
    }
}
