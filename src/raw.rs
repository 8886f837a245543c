use core::{
	alloc::Layout,
	marker::PhantomData,
	mem,
	ptr::{
		self,
		NonNull
	}
};
use std::alloc::{
	alloc,
	dealloc,
	handle_alloc_error
};
use crate::error::TryReserveError;

/// A low-level utility for managing a block of uninitialized memory.
///
/// A `RawBuffer<T>` owns room for exactly [`capacity`](RawBuffer::capacity) values of type `T`,
/// and nothing else. It never looks at the memory it manages: it does not know
/// how many slots hold live values. When dropped it *will* free its memory,
/// but it *won't* try to drop its contents. It is up to the user of `RawBuffer`
/// to handle the actual things *stored* inside of it.
///
/// A zero capacity never allocates. Zero-sized types never allocate either,
/// but their capacity is still the one requested.
///
/// The buffer can be moved (ownership of the block moves with it) but not cloned:
/// copying possibly uninitialized memory has no meaning.
pub struct RawBuffer<T> {
	/// Start of the block, dangling when nothing is allocated.
	ptr: NonNull<T>,

	/// Number of `T`-sized slots in the block.
	capacity: usize,

	marker: PhantomData<T>
}

unsafe impl<T: Send> Send for RawBuffer<T> {}
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
	/// Creates an empty buffer without allocating.
	#[inline]
	pub const fn new() -> Self {
		RawBuffer {
			ptr: NonNull::dangling(),
			capacity: 0,
			marker: PhantomData
		}
	}

	/// Allocates room for exactly `capacity` values.
	///
	/// # Panics
	///
	/// Panics if the requested size exceeds `isize::MAX` bytes.
	/// Aborts through [`handle_alloc_error`] if the allocator fails.
	#[inline]
	pub fn with_capacity(capacity: usize) -> Self {
		handle_reserve(Self::try_with_capacity(capacity))
	}

	/// The same as `with_capacity`, but returns on errors instead of panicking or aborting.
	pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
		if capacity == 0 {
			return Ok(Self::new())
		}

		let layout = Layout::array::<T>(capacity).map_err(|_| TryReserveError::CapacityOverflow)?;
		alloc_guard(layout.size())?;

		if layout.size() == 0 {
			return Ok(RawBuffer {
				ptr: NonNull::dangling(),
				capacity,
				marker: PhantomData
			})
		}

		// SAFETY: `layout` has a non-zero size.
		let ptr = unsafe { alloc(layout) };
		match NonNull::new(ptr.cast::<T>()) {
			Some(ptr) => Ok(RawBuffer {
				ptr,
				capacity,
				marker: PhantomData
			}),
			None => Err(TryReserveError::AllocError { layout })
		}
	}

	/// Number of values the buffer has room for.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Returns a raw pointer to the first slot.
	///
	/// The pointer is dangling (but well aligned) when the buffer holds no allocation.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.ptr.as_ptr()
	}

	/// Returns a raw mutable pointer to the first slot.
	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.ptr.as_ptr()
	}

	/// Address of the slot at `index`.
	///
	/// Asking for `index == capacity` is allowed: it yields the one-past-the-end
	/// address, which may be compared against but never dereferenced.
	///
	/// # Safety
	///
	/// `index` must be at most `self.capacity()`.
	#[inline]
	pub unsafe fn slot(&self, index: usize) -> *const T {
		debug_assert!(index <= self.capacity, "slot index (is {}) should be <= capacity (is {})", index, self.capacity);
		self.ptr.as_ptr().add(index)
	}

	/// Mutable address of the slot at `index`.
	///
	/// # Safety
	///
	/// `index` must be at most `self.capacity()`.
	#[inline]
	pub unsafe fn slot_mut(&mut self, index: usize) -> *mut T {
		debug_assert!(index <= self.capacity, "slot index (is {}) should be <= capacity (is {})", index, self.capacity);
		self.ptr.as_ptr().add(index)
	}

	/// Exchanges the blocks owned by `self` and `other`.
	///
	/// No value is moved: only the pointers and capacities are swapped.
	#[inline]
	pub fn swap(&mut self, other: &mut RawBuffer<T>) {
		mem::swap(&mut self.ptr, &mut other.ptr);
		mem::swap(&mut self.capacity, &mut other.capacity);
	}

	/// Returns the current allocated memory and layout.
	///
	/// Returns `None` if nothing is allocated, either because the capacity
	/// is 0 or because the size of `T` is 0.
	fn current_memory(&self) -> Option<(NonNull<u8>, Layout)> {
		if self.capacity == 0 || mem::size_of::<T>() == 0 {
			None
		} else {
			// We have an allocated chunk of memory, so we can bypass runtime
			// checks to get our current layout.
			unsafe {
				let align = mem::align_of::<T>();
				let size = mem::size_of::<T>() * self.capacity;
				let layout = Layout::from_size_align_unchecked(size, align);
				Some((self.ptr.cast(), layout))
			}
		}
	}
}

impl<T> Default for RawBuffer<T> {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Drop for RawBuffer<T> {
	fn drop(&mut self) {
		if let Some((ptr, layout)) = self.current_memory() {
			// SAFETY: the block was allocated with this very layout.
			unsafe {
				dealloc(ptr.as_ptr(), layout)
			}
		}
	}
}

/// Moves `count` values from `src` into the uninitialized slots at `dst`.
///
/// A Rust move is a bitwise copy that cannot fail, so relocating never has to
/// fall back to cloning: after the call the values live at `dst` only and the
/// `src` slots must be treated as uninitialized.
///
/// # Safety
///
/// `src` must point to `count` live values, `dst` to `count` writable slots,
/// and the two ranges must not overlap.
#[inline]
pub(crate) unsafe fn relocate<T>(src: *const T, dst: *mut T, count: usize) {
	ptr::copy_nonoverlapping(src, dst, count)
}

// Central function for reserve error handling.
#[inline]
pub(crate) fn handle_reserve<R>(result: Result<R, TryReserveError>) -> R {
	match result {
		Err(TryReserveError::CapacityOverflow) => capacity_overflow(),
		Err(TryReserveError::AllocError { layout }) => handle_alloc_error(layout),
		Ok(r) => r
	}
}

// We need to guarantee the following:
// * We don't ever allocate `> isize::MAX` byte-size objects.
// * We don't overflow `usize::MAX` and actually allocate too little.
//
// On 64-bit we just need to check for overflow since trying to allocate
// `> isize::MAX` bytes will surely fail. On 32-bit and 16-bit we need to add
// an extra guard for this in case we're running on a platform which can use
// all 4GB in user-space, e.g., PAE or x32.
#[inline]
fn alloc_guard(alloc_size: usize) -> Result<(), TryReserveError> {
	if usize::BITS < 64 && alloc_size > isize::MAX as usize {
		Err(TryReserveError::CapacityOverflow)
	} else {
		Ok(())
	}
}

// One central function responsible for reporting capacity overflows. This'll
// ensure that the code generation related to these panics is minimal as there's
// only one location which panics rather than a bunch throughout the crate.
pub(crate) fn capacity_overflow() -> ! {
	panic!("capacity overflow");
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::{
		cell::Cell,
		rc::Rc
	};

	struct Noisy(Rc<Cell<usize>>);

	impl Drop for Noisy {
		fn drop(&mut self) {
			self.0.set(self.0.get() + 1)
		}
	}

	#[test]
	fn zero_capacity_does_not_allocate() {
		let buffer = RawBuffer::<u64>::with_capacity(0);
		assert_eq!(buffer.capacity(), 0);
		assert_eq!(buffer.as_ptr(), NonNull::<u64>::dangling().as_ptr() as *const u64);
		assert!(buffer.current_memory().is_none());
	}

	#[test]
	fn allocates_requested_capacity() {
		let buffer = RawBuffer::<u32>::with_capacity(10);
		assert_eq!(buffer.capacity(), 10);
		let (_, layout) = buffer.current_memory().unwrap();
		assert_eq!(layout.size(), 40);
		assert_eq!(layout.align(), mem::align_of::<u32>());
	}

	#[test]
	fn one_past_the_end_slot_is_addressable() {
		let mut buffer = RawBuffer::<u16>::with_capacity(3);
		unsafe {
			let first = buffer.slot_mut(0);
			let end = buffer.slot_mut(3);
			assert_eq!(end.offset_from(first), 3);
			assert_eq!(buffer.slot(0), buffer.as_ptr());
		}
	}

	#[test]
	fn slots_hold_written_values() {
		let mut buffer = RawBuffer::<String>::with_capacity(2);
		unsafe {
			ptr::write(buffer.slot_mut(0), "left".to_string());
			ptr::write(buffer.slot_mut(1), "right".to_string());
			assert_eq!(&*buffer.slot(1), "right");
			ptr::drop_in_place(buffer.slot_mut(0));
			ptr::drop_in_place(buffer.slot_mut(1));
		}
	}

	#[test]
	fn swap_exchanges_blocks() {
		let mut a = RawBuffer::<u8>::with_capacity(4);
		let mut b = RawBuffer::<u8>::new();
		let a_ptr = a.as_ptr();

		a.swap(&mut b);
		assert_eq!(a.capacity(), 0);
		assert_eq!(b.capacity(), 4);
		assert_eq!(b.as_ptr(), a_ptr);
	}

	#[test]
	fn take_leaves_empty_buffer() {
		let mut a = RawBuffer::<u8>::with_capacity(8);
		let b = mem::take(&mut a);
		assert_eq!(a.capacity(), 0);
		assert_eq!(b.capacity(), 8);
	}

	#[test]
	fn release_does_not_drop_contents() {
		let drops = Rc::new(Cell::new(0));
		let mut buffer = RawBuffer::with_capacity(1);
		unsafe {
			ptr::write(buffer.slot_mut(0), Noisy(drops.clone()));
		}
		let leaked = unsafe { ptr::read(buffer.slot(0)) };
		drop(buffer);
		assert_eq!(drops.get(), 0);
		drop(leaked);
		assert_eq!(drops.get(), 1);
	}

	#[test]
	fn zero_sized_types_track_capacity() {
		let buffer = RawBuffer::<()>::with_capacity(16);
		assert_eq!(buffer.capacity(), 16);
		assert!(buffer.current_memory().is_none());
	}

	#[test]
	fn overflowing_capacity_is_reported() {
		let result = RawBuffer::<u64>::try_with_capacity(usize::MAX);
		assert!(matches!(result, Err(TryReserveError::CapacityOverflow)));
	}

	#[test]
	#[should_panic(expected = "capacity overflow")]
	fn overflowing_capacity_panics() {
		RawBuffer::<u64>::with_capacity(usize::MAX);
	}

	#[test]
	fn relocate_moves_values() {
		let mut from = RawBuffer::<String>::with_capacity(2);
		let mut to = RawBuffer::<String>::with_capacity(4);
		unsafe {
			ptr::write(from.slot_mut(0), "a".to_string());
			ptr::write(from.slot_mut(1), "b".to_string());
			relocate(from.as_ptr(), to.slot_mut(1), 2);
			assert_eq!(&*to.slot(1), "a");
			assert_eq!(&*to.slot(2), "b");
			ptr::drop_in_place(to.slot_mut(1));
			ptr::drop_in_place(to.slot_mut(2));
		}
	}
}
