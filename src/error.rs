use core::alloc::Layout;
use std::{
	error::Error,
	fmt
};

/// The error type for `try_reserve` methods.
///
/// Returned by [`RawBuffer::try_with_capacity`](crate::RawBuffer::try_with_capacity)
/// and [`Vector::try_reserve`](crate::Vector::try_reserve) when the requested
/// storage cannot be obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TryReserveError {
	/// The computed capacity exceeded the maximum (usually `isize::MAX` bytes).
	CapacityOverflow,

	/// The memory allocator returned an error.
	AllocError {
		/// The layout of the allocation request that failed.
		layout: Layout
	}
}

impl fmt::Display for TryReserveError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("memory allocation failed")?;
		match self {
			Self::CapacityOverflow => f.write_str(" because the computed capacity exceeded the collection's maximum"),
			Self::AllocError { layout } => write!(f, " because the memory allocator returned an error ({} bytes, align {})", layout.size(), layout.align())
		}
	}
}

impl Error for TryReserveError {}
