//! # Goal
//! A growable contiguous array written from scratch on top of raw memory, with explicit
//! control over when elements are constructed, relocated, and dropped.
//!
//! # Architecture
//! There are two pieces, strictly separated:
//! - [`RawStorage`] - owns one uninitialized block of slots. Allocates and releases,
//!   transfers and swaps, computes slot addresses. Never constructs nor drops elements.
//!      - Responsible for: Does the memory for slot exist?
//! - [`DynamicArray`] - owns one `RawStorage` and the count of live elements in it.
//!      - Responsible for: Which slots hold a live element?
//!
//! Capacity is the number of slots, len is the number of live elements, and
//! `len <= capacity` always holds.
//!
//! # Relocation and duplication
//! When elements need a new block they are moved there. Moves in Rust are bitwise and
//! can't fail, so growth never leaves anything half done. Elements are cloned only on
//! explicit request (`clone`, `clone_from`, `from_slice`), and a panicking clone or
//! constructor is rolled back so nothing leaks and the array stays valid.
//!
//! # Element requirements
//! Each operation asks only for what it needs. A move only type that isn't
//! `Default` can be pushed and inserted:
//! ```
//! use advanced_vector::DynamicArray;
//!
//! struct Token(u32);
//!
//! let mut array = DynamicArray::new();
//! array.push(Token(2));
//! array.insert(0, Token(1));
//! assert_eq!(array[0].0, 1);
//! assert_eq!(array.capacity(), 2);
//! ```
//! But can't be default constructed:
//! ```compile_fail
//! use advanced_vector::DynamicArray;
//!
//! struct Token(u32);
//!
//! let array = DynamicArray::<Token>::with_len(3);
//! ```
//! Nor copy assigned:
//! ```compile_fail
//! use advanced_vector::DynamicArray;
//!
//! struct Token(u32);
//!
//! let source = DynamicArray::from([Token(1)]);
//! let mut target = DynamicArray::new();
//! target.clone_from(&source);
//! ```
//!
//! # Contracts
//! Out of range indices, `pop_back` on empty array, and similar precondition
//! violations panic. Raw slot addressing is only checked in debug builds, or with
//! `strict` feature.

//? Important decisions:
//? - No custom allocators, global allocator only.
//? - No inline storage.
//? - Capacity never shrinks.

#[macro_use]
mod util;

pub mod array;
pub mod error;
pub mod storage;

pub use array::{DynamicArray, IntoIter};
pub use error::StorageError;
pub use storage::RawStorage;
