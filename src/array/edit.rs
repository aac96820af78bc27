//! Bulk edits that preserve order of remaining elements.

use super::DynamicArray;
use std::{
    ops::{Bound, RangeBounds},
    ptr,
};

impl<T> DynamicArray<T> {
    /// Removes element at index and returns it.
    /// Last element is moved to fill the gap.
    pub fn swap_remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "swap_remove index (is {index}) should be < len (is {len})");
        let last = len - 1;
        // This is safe since both are initialized according to len,
        // and last slot is considered uninitialized after this.
        unsafe {
            let removed = ptr::read(self.storage.slot(index));
            ptr::copy(self.storage.slot(last), self.storage.slot(index), 1);
            self.len = last;
            removed
        }
    }

    /// Drops elements in range and shifts the rest to the left.
    ///
    /// Panics if range is out of bounds.
    pub fn remove_range(&mut self, range: impl RangeBounds<usize>) {
        #[cold]
        #[inline(never)]
        #[track_caller]
        fn past_max() -> ! {
            panic!("range bound should be < usize::MAX");
        }

        let len = self.len;
        let start = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.checked_add(1).unwrap_or_else(|| past_max()),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&n) => n.checked_add(1).unwrap_or_else(|| past_max()),
            Bound::Excluded(&n) => n,
            Bound::Unbounded => len,
        };
        assert!(start <= end, "range start (is {start}) should be <= end (is {end})");
        assert!(end <= len, "range end (is {end}) should be <= len (is {len})");

        // If a drop panics the tail is leaked, never dropped twice.
        self.len = start;
        // This is safe since [start, end) were initialized and are now outside of len.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.storage.slot(start),
                end - start,
            ));
            ptr::copy(self.storage.slot(end), self.storage.slot(start), len - end);
        }
        self.len = len - (end - start);
    }

    /// Moves all the elements of other into self, leaving other empty.
    /// Capacity of other remains.
    pub fn append(&mut self, other: &mut Self) {
        let count = other.len;
        let len = self.len;
        let required = len
            .checked_add(count)
            .expect("Length of appended array overflows usize");
        if required > self.capacity() {
            self.reserve(required.max(self.grown_capacity()));
        }

        // This is safe since there is enough reserved space, arrays are distinct,
        // and other forgets its elements.
        unsafe {
            ptr::copy_nonoverlapping(other.storage.slot(0), self.storage.slot(len), count);
        }
        other.len = 0;
        self.len = required;
    }

    /// Retains only the elements specified by the predicate.
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        self.retain_mut(|e| f(&*e))
    }

    /// Retains only the elements specified by the predicate, passing a mutable reference to it.
    ///
    /// In other words, remove all elements `e` such that `f(&mut e)` returns `false`.
    /// This method operates in place, visiting each element exactly once in the
    /// original order, and preserves the order of the retained elements.
    pub fn retain_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        // Modified version from Vec::retain_mut

        let original_len = self.len;
        // Avoid double drop if the drop guard is not executed,
        // since we may make some holes during the process.
        self.len = 0;

        // Array: [Kept, Kept, Hole, Hole, Hole, Hole, Unchecked, Unchecked]
        //        |<-              processed len   ->| ^- next to check
        //                    |<-  deleted cnt     ->|
        //        |<-              original_len                          ->|
        // Kept: Elements which predicate returns true on.
        // Hole: Moved or dropped element slot.
        // Unchecked: Unchecked valid elements.
        //
        // This drop guard will be invoked when predicate or `drop` of element panicked.
        // It shifts unchecked elements to cover holes and sets len to the right value.
        struct Track<'a, T> {
            array: &'a mut DynamicArray<T>,
            processed_len: usize,
            deleted_cnt: usize,
            original_len: usize,
        }

        impl<T> Drop for Track<'_, T> {
            fn drop(&mut self) {
                if self.deleted_cnt > 0 {
                    // SAFETY: Trailing unchecked items must be valid since we never touch them.
                    unsafe {
                        ptr::copy(
                            self.array.storage.slot(self.processed_len),
                            self.array
                                .storage
                                .slot(self.processed_len - self.deleted_cnt),
                            self.original_len - self.processed_len,
                        );
                    }
                }
                self.array.len = self.original_len - self.deleted_cnt;
            }
        }

        let mut g = Track {
            array: self,
            processed_len: 0,
            deleted_cnt: 0,
            original_len,
        };

        fn process_loop<F, T, const DELETED: bool>(
            original_len: usize,
            f: &mut F,
            g: &mut Track<'_, T>,
        ) where
            F: FnMut(&mut T) -> bool,
        {
            while g.processed_len != original_len {
                // SAFETY: Unchecked element must be valid.
                let cur = unsafe { &mut *g.array.storage.slot(g.processed_len) };
                if !f(cur) {
                    // Advance early to avoid double drop if `drop_in_place` panicked.
                    g.processed_len += 1;
                    g.deleted_cnt += 1;
                    // SAFETY: We never touch this element again after dropped.
                    unsafe { ptr::drop_in_place(cur) };
                    // We already advanced the counter.
                    if DELETED {
                        continue;
                    } else {
                        break;
                    }
                }
                if DELETED {
                    // SAFETY: `deleted_cnt` > 0, so the hole slot must not overlap with current element.
                    // We use copy for move, and never touch this element again.
                    unsafe {
                        let hole_slot = g.array.storage.slot(g.processed_len - g.deleted_cnt);
                        ptr::copy_nonoverlapping(cur, hole_slot, 1);
                    }
                }
                g.processed_len += 1;
            }
        }

        // Stage 1: Nothing was deleted.
        process_loop::<F, T, false>(original_len, &mut f, &mut g);

        // Stage 2: Some elements were deleted.
        process_loop::<F, T, true>(original_len, &mut f, &mut g);

        // All item are processed. Guard fills the holes and sets len.
        drop(g);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::tracking::{self, Tracked};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn swap_remove() {
        let mut array = DynamicArray::from([1, 2, 3, 4]);
        assert_eq!(array.swap_remove(1), 2);
        assert_eq!(array.as_slice(), &[1, 4, 3]);
        assert_eq!(array.swap_remove(2), 3);
        assert_eq!(array.as_slice(), &[1, 4]);
    }

    #[test]
    fn remove_range() {
        let mut array = DynamicArray::from([1, 2, 3, 4, 5]);

        array.remove_range(1..3);

        assert_eq!(array.len(), 3);
        assert_eq!(array[0], 1);
        assert_eq!(array[1], 4);
        assert_eq!(array[2], 5);
        assert_eq!(array.capacity(), 5);
    }

    #[test]
    fn remove_range_drops() {
        tracking::reset();
        let mut array = DynamicArray::from_fn(6, |i| Tracked::new(i as u32));
        array.remove_range(..2);
        array.remove_range(2..=3);
        assert_eq!(tracking::values(&array), [2, 3]);
        assert_eq!(tracking::live(), 2);
        array.remove_range(..);
        assert_eq!(tracking::live(), 0);
    }

    #[test]
    #[should_panic(expected = "range end (is 4) should be <= len (is 3)")]
    fn remove_range_out_of_bounds() {
        DynamicArray::from([1, 2, 3]).remove_range(1..4);
    }

    #[test]
    #[should_panic(expected = "range bound should be < usize::MAX")]
    fn remove_range_inclusive_max() {
        DynamicArray::from([1, 2, 3]).remove_range(1..=usize::MAX);
    }

    #[test]
    #[should_panic(expected = "range bound should be < usize::MAX")]
    fn remove_range_excluded_start_max() {
        DynamicArray::from([1, 2, 3])
            .remove_range((std::ops::Bound::Excluded(usize::MAX), std::ops::Bound::Unbounded));
    }

    #[test]
    fn append() {
        let mut a = DynamicArray::from([1, 2]);
        let mut b = DynamicArray::from([3, 4, 5]);
        a.append(&mut b);
        assert_eq!(a.as_slice(), &[1, 2, 3, 4, 5]);
        assert!(b.is_empty());
        assert_eq!(b.capacity(), 3);
    }

    #[test]
    fn append_moves() {
        tracking::reset();
        let mut a = DynamicArray::from([Tracked::new(1)]);
        let mut b = DynamicArray::from([Tracked::new(2), Tracked::new(3)]);
        a.append(&mut b);
        assert_eq!(tracking::live(), 3);
        drop(b);
        assert_eq!(tracking::values(&a), [1, 2, 3]);
        drop(a);
        assert_eq!(tracking::live(), 0);
    }

    #[test]
    fn retain_mut() {
        let mut array = DynamicArray::from([1, 2, 3, 4, 5]);

        array.retain_mut(|x| {
            *x *= 10;
            *x % 20 == 0
        });

        assert_eq!(array.as_slice(), &[20, 40]);
    }

    #[test]
    fn retain_drops() {
        tracking::reset();
        let mut array = DynamicArray::from_fn(10, |i| Tracked::new(i as u32));
        array.retain(|e| e.value() % 3 == 0);
        assert_eq!(tracking::values(&array), [0, 3, 6, 9]);
        assert_eq!(tracking::live(), 4);
    }

    #[test]
    fn retain_unwinds() {
        tracking::reset();
        let mut array = DynamicArray::from_fn(6, |i| Tracked::new(i as u32));

        let result = catch_unwind(AssertUnwindSafe(|| {
            array.retain(|e| {
                assert!(e.value() != 4);
                e.value() % 2 == 0
            })
        }));

        assert!(result.is_err());
        assert_eq!(tracking::values(&array), [0, 2, 4, 5]);
        assert_eq!(tracking::live(), 4);
    }

    #[test]
    fn doppelganger() {
        use rand::*;
        let ops = 10000;

        let mut array = DynamicArray::new();
        let mut doppelganger = Vec::new();
        let mut rand = thread_rng();
        for _ in 0..ops {
            match rand.gen_range(0..10) {
                // Push
                0 | 1 | 2 | 3 | 4 | 5 => {
                    let val: u32 = rand.gen();
                    array.push(val);
                    doppelganger.push(val);
                }
                // Swap remove
                6 if array.len() > 0 => {
                    let index = rand.gen_range(0..array.len());
                    assert_eq!(array.swap_remove(index), doppelganger.swap_remove(index));
                }
                // Remove range
                7 => {
                    let end = rand.gen_range(0..=array.len());
                    let start = rand.gen_range(0..=end);
                    array.remove_range(start..end);
                    doppelganger.drain(start..end);
                }
                // Retain
                8 => {
                    let modulo = rand.gen_range(2..5);
                    array.retain(|x| x % modulo != 0);
                    doppelganger.retain(|x| x % modulo != 0);
                }
                // Append
                9 => {
                    let mut other = DynamicArray::from([rand.gen::<u32>(), rand.gen::<u32>()]);
                    doppelganger.extend_from_slice(&other);
                    array.append(&mut other);
                }
                _ => (),
            }
            assert_eq!(array.as_slice(), doppelganger.as_slice());
        }
    }
}
