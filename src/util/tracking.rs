//! Test element that counts its live instances per thread
//! and can be armed to panic on a later construction.

use std::cell::Cell;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static FUSE: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Forgets previous counts and disarms.
pub fn reset() {
    LIVE.with(|live| live.set(0));
    FUSE.with(|fuse| fuse.set(None));
}

/// Number of constructed but not yet dropped instances.
pub fn live() -> isize {
    LIVE.with(Cell::get)
}

/// Next `constructions` constructions succeed, the one after panics.
pub fn arm(constructions: usize) {
    FUSE.with(|fuse| fuse.set(Some(constructions)));
}

fn construct() {
    FUSE.with(|fuse| match fuse.get() {
        Some(0) => {
            fuse.set(None);
            panic!("fuse blown");
        }
        Some(left) => fuse.set(Some(left - 1)),
        None => (),
    });
    LIVE.with(|live| live.set(live.get() + 1));
}

/// Values of tracked elements, for comparisons that don't construct new ones.
pub fn values(items: &[Tracked]) -> Vec<u32> {
    items.iter().map(Tracked::value).collect()
}

#[derive(Debug, PartialEq, Eq)]
pub struct Tracked(u32);

impl Tracked {
    pub fn new(value: u32) -> Self {
        construct();
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Tracked {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Self::new(self.0)
    }

    fn clone_from(&mut self, source: &Self) {
        self.0 = source.0;
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        LIVE.with(|live| live.set(live.get() - 1));
    }
}

/// Movable, but neither clonable nor default constructible.
#[derive(Debug, PartialEq, Eq)]
pub struct Token(pub u32);
