//! This crate provides the [`Vector`] data structure,
//! a contiguous growable array built directly on top of raw memory.
//!
//! It is made of two layers:
//! - [`RawBuffer`] owns a block of uninitialized memory sized for a fixed
//!   number of values. It allocates and frees, and that is all it does:
//!   it has no idea which slots hold live values.
//! - [`Vector`] owns one `RawBuffer` plus the number of live values at its front.
//!   It creates values in place, drops them, moves them to a larger buffer
//!   when needed, and shifts them around on insertion and removal.
//!
//! ## Basic usage
//!
//! ```rust
//! use advanced_vector::Vector;
//!
//! let mut v = Vector::new();
//! v.push(1);
//! v.push(2);
//! v.push(3);
//! v.insert(1, 99);
//! assert_eq!(v.as_slice(), [1, 99, 2, 3]);
//!
//! v.erase(0);
//! v.pop_back();
//! assert_eq!(v.as_slice(), [99, 2]);
//!
//! v.resize(4);
//! assert_eq!(v.as_slice(), [99, 2, 0, 0]);
//! ```
//!
//! ## Growth
//!
//! Nothing is allocated until the first element is inserted.
//! When an insertion finds the buffer full, the capacity doubles:
//! ```rust
//! # use advanced_vector::Vector;
//! let mut v = Vector::new();
//! v.push('a');
//! assert_eq!(v.capacity(), 1);
//! v.push('b');
//! v.push('c');
//! assert_eq!(v.capacity(), 4);
//! ```
//! Use [`Vector::reserve`] to size the buffer up front. Note that its argument
//! is the total capacity wanted:
//! ```rust
//! # use advanced_vector::Vector;
//! let mut v: Vector<u32> = Vector::new();
//! v.reserve(100);
//! let buffer = v.as_ptr();
//! for i in 0..100 {
//! 	v.push(i);
//! }
//! assert_eq!(v.as_ptr(), buffer); // never reallocated.
//! ```
//!
//! ## Panic safety
//!
//! Values may panic while being built (in `Default::default`, `Clone::clone`,
//! or the closure given to [`Vector::emplace`]). The vector never leaks nor
//! double-drops in that case, and most operations go further and leave it
//! exactly as it was. See [`Vector`] for the per-operation guarantees.
//! ```rust
//! # use advanced_vector::Vector;
//! use std::panic::{catch_unwind, AssertUnwindSafe};
//!
//! let mut v: Vector<String> = Vector::new();
//! v.push("kept".to_string());
//! let result = catch_unwind(AssertUnwindSafe(|| {
//! 	v.emplace_back(|| panic!("construction failed"));
//! }));
//! assert!(result.is_err());
//! assert_eq!(v.as_slice(), ["kept"]);
//! ```

pub mod error;
pub mod raw;
pub mod vector;

pub use error::TryReserveError;
pub use raw::RawBuffer;
pub use vector::{
	Vector,
	IntoIter
};
