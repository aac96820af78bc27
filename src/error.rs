use std::{alloc::Layout, fmt::Display};

/// Storage level errors.
/// Fatal for infallible operations, which raise them instead of returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Byte size of requested number of slots doesn't fit into `isize`.
    CapacityOverflow { capacity: usize },
    /// Global allocator couldn't satisfy the request.
    AllocFailed { layout: Layout },
}

impl StorageError {
    /// Turns the error into the behavior of infallible allocation paths.
    /// Overflow panics while allocation failure is reported through `handle_alloc_error`.
    #[cold]
    #[track_caller]
    pub fn raise(self) -> ! {
        match self {
            Self::CapacityOverflow { .. } => panic!("capacity overflow"),
            Self::AllocFailed { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityOverflow { capacity } => write!(
                f,
                "Capacity of {} slots overflows maximum allocation size.",
                capacity
            ),
            Self::AllocFailed { layout } => write!(
                f,
                "Failed to allocate {} bytes aligned to {}.",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl std::error::Error for StorageError {}
