use core::{
	cmp,
	fmt,
	mem::{
		self,
		ManuallyDrop
	},
	ops::{
		Deref,
		DerefMut
	},
	ptr,
	slice
};
use crate::{
	error::TryReserveError,
	raw::{
		self,
		RawBuffer,
		capacity_overflow,
		handle_reserve
	}
};

/// Contiguous growable array type.
///
/// A `Vector<T>` pairs a [`RawBuffer<T>`], which only knows how much room it has,
/// with the number of live values stored at its front.
/// Slots `[0, len)` always hold initialized values, slots `[len, capacity)` never do.
///
/// Values are created in place (through [`emplace`](Vector::emplace) and friends),
/// moved as a block when the storage has to grow, and dropped exactly once when they
/// leave the live range.
///
/// # Growth
///
/// The capacity only changes through [`reserve`](Vector::reserve) or when an insertion
/// finds the buffer full, in which case the capacity doubles (starting from 1).
/// It never shrinks: only a fresh clone starts with a tighter buffer.
///
/// # Panic safety
///
/// Constructors (`Default`, `Clone` or the closures given to `emplace`) may panic.
/// Whatever happens, the vector stays valid: nothing leaks and nothing is dropped twice.
/// On top of this, the following operations leave the vector exactly as it was when a
/// constructor panics:
/// construction ([`with_len`](Vector::with_len), [`clone`](Clone::clone)),
/// [`reserve`](Vector::reserve), [`resize`](Vector::resize),
/// [`push`](Vector::push)/[`emplace_back`](Vector::emplace_back),
/// and any insertion that has to reallocate.
/// Insertion without reallocation and [`erase`](Vector::erase) only promise a valid vector.
///
/// # Examples
///
/// ```
/// # use advanced_vector::Vector;
/// let mut v = Vector::new();
/// v.push(1);
/// v.push(3);
/// v.insert(1, 2);
/// assert_eq!(v.as_slice(), [1, 2, 3]);
/// ```
pub struct Vector<T> {
	/// Backing storage.
	buf: RawBuffer<T>,

	/// Number of live values at the front of `buf`.
	len: usize
}

impl<T> Drop for Vector<T> {
	fn drop(&mut self) {
		unsafe {
			// drop every element, `buf` frees the memory afterwards.
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.as_mut_ptr(), self.len))
		}
	}
}

impl<T> Vector<T> {
	/// Creates a new empty `Vector`.
	///
	/// The vector will not allocate until elements are pushed onto it.
	#[inline]
	pub const fn new() -> Self {
		Vector {
			buf: RawBuffer::new(),
			len: 0
		}
	}

	/// Creates a new empty `Vector` with room for exactly `capacity` elements.
	#[inline]
	pub fn with_capacity(capacity: usize) -> Self {
		Vector {
			buf: RawBuffer::with_capacity(capacity),
			len: 0
		}
	}

	/// Creates a vector of `len` default values.
	///
	/// Both the length and the capacity of the result are `len`.
	/// If `T::default` panics, the values built so far are dropped and
	/// the storage is released.
	///
	/// ```
	/// # use advanced_vector::Vector;
	/// let v: Vector<u8> = Vector::with_len(3);
	/// assert_eq!(v.as_slice(), [0, 0, 0]);
	/// assert_eq!(v.capacity(), 3);
	/// ```
	pub fn with_len(len: usize) -> Self where T: Default {
		let mut v = Self::with_capacity(len);
		v.extend_with(len, ExtendDefault);
		v
	}

	/// Returns the number of elements in the vector.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns `true` if the vector contains no elements.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the number of elements the vector can hold without reallocating.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.buf.capacity()
	}

	/// Returns a raw pointer to the vector's buffer.
	///
	/// Modifying the vector may cause its buffer to be reallocated,
	/// which would make the pointer invalid.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.buf.as_ptr()
	}

	/// Returns an unsafe mutable pointer to the vector's buffer.
	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.buf.as_mut_ptr()
	}

	/// Extracts a slice containing the entire vector.
	///
	/// Equivalent to `&v[..]`.
	#[inline]
	pub fn as_slice(&self) -> &[T] {
		unsafe {
			slice::from_raw_parts(self.buf.as_ptr(), self.len)
		}
	}

	/// Extracts a mutable slice of the entire vector.
	///
	/// Equivalent to `&mut v[..]`.
	#[inline]
	pub fn as_mut_slice(&mut self) -> &mut [T] {
		unsafe {
			slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len)
		}
	}

	/// The same as `reserve`, but returns on errors instead of panicking or aborting.
	///
	/// On error the vector is left untouched.
	pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), TryReserveError> {
		if new_capacity <= self.capacity() {
			return Ok(())
		}

		let mut new_buf = RawBuffer::try_with_capacity(new_capacity)?;
		unsafe {
			raw::relocate(self.buf.as_ptr(), new_buf.as_mut_ptr(), self.len);
		}

		// the old block now only holds moved-out slots, it is freed without dropping anything.
		self.buf.swap(&mut new_buf);
		Ok(())
	}

	/// Makes sure the vector can hold at least `new_capacity` elements.
	///
	/// Unlike `Vec::reserve`, the argument is the total capacity wanted, not the
	/// number of additional elements.
	/// Does nothing if the capacity is already sufficient. Otherwise the elements are
	/// moved into a new buffer of exactly `new_capacity` slots.
	///
	/// # Panics
	///
	/// Panics if the new capacity exceeds `isize::MAX` bytes.
	#[inline]
	pub fn reserve(&mut self, new_capacity: usize) {
		handle_reserve(self.try_reserve(new_capacity))
	}

	/// Capacity to use when an insertion finds the buffer full.
	#[inline]
	fn grow_capacity(&self) -> usize {
		match self.capacity() {
			0 => 1,
			capacity => capacity.checked_mul(2).unwrap_or_else(|| capacity_overflow())
		}
	}

	/// Reserve room for `additional` more elements, growing geometrically.
	fn reserve_for_push(&mut self, additional: usize) {
		let required = self.len.checked_add(additional).unwrap_or_else(|| capacity_overflow());
		if required > self.capacity() {
			let doubled = self.capacity().saturating_mul(2);
			self.reserve(cmp::max(required, cmp::max(doubled, 1)))
		}
	}

	/// Shortens the vector, keeping the first `len` elements and dropping
	/// the rest.
	///
	/// If `len` is greater or equal to the vector's current length, this has no
	/// effect.
	///
	/// Note that this method has no effect on the allocated capacity
	/// of the vector.
	pub fn truncate(&mut self, len: usize) {
		if len >= self.len {
			return
		}

		unsafe {
			let remaining_len = self.len - len;
			let s = ptr::slice_from_raw_parts_mut(self.buf.slot_mut(len), remaining_len);
			// a panicking destructor must not see the tail as live anymore.
			self.len = len;
			ptr::drop_in_place(s);
		}
	}

	/// Clears the vector, removing all values.
	///
	/// Note that this method has no effect on the allocated capacity
	/// of the vector.
	#[inline]
	pub fn clear(&mut self) {
		self.truncate(0)
	}

	/// Resizes the `Vector` in-place so that `len` is equal to `new_len`.
	///
	/// If `new_len` is greater than `len`, the capacity is first raised to
	/// exactly `new_len` if needed, then each additional slot is filled with
	/// `T::default()`.
	/// If `new_len` is less than `len`, the `Vector` is simply truncated.
	///
	/// If `T::default` panics, the length is left unchanged.
	pub fn resize(&mut self, new_len: usize) where T: Default {
		self.resize_with(new_len, T::default)
	}

	/// Resizes the `Vector` in-place so that `len` is equal to `new_len`,
	/// filling new slots with values returned by `f`.
	///
	/// ```
	/// # use advanced_vector::Vector;
	/// let mut next = 0;
	/// let mut v = Vector::new();
	/// v.resize_with(3, || { next += 1; next });
	/// assert_eq!(v.as_slice(), [1, 2, 3]);
	/// ```
	pub fn resize_with<F>(&mut self, new_len: usize, f: F) where F: FnMut() -> T {
		let len = self.len;
		if new_len == len {
			return
		}

		if new_len < len {
			self.truncate(new_len)
		} else {
			self.reserve(new_len);
			self.extend_with(new_len - len, ExtendFunc(f))
		}
	}

	/// Appends an element to the back of the vector and returns a reference to it.
	///
	/// # Panics
	///
	/// Panics if the new capacity exceeds `isize::MAX` bytes.
	#[inline]
	pub fn push(&mut self, value: T) -> &mut T {
		self.emplace_back(move || value)
	}

	/// Constructs an element at the back of the vector and returns a reference to it.
	///
	/// If the buffer is full, a buffer twice as large is allocated and the new element
	/// is built into it before the existing elements are moved over.
	/// If `f` panics, the vector is left exactly as it was.
	///
	/// ```
	/// # use advanced_vector::Vector;
	/// let mut v = Vector::new();
	/// let s = v.emplace_back(|| String::from("hello"));
	/// s.push_str(", world");
	/// assert_eq!(v[0], "hello, world");
	/// ```
	pub fn emplace_back<F>(&mut self, f: F) -> &mut T where F: FnOnce() -> T {
		let len = self.len;
		if len < self.capacity() {
			unsafe {
				let end = self.buf.slot_mut(len);
				ptr::write(end, f());
				self.len = len + 1;
				&mut *end
			}
		} else {
			self.emplace_realloc(len, f)
		}
	}

	/// Drops the last element of the vector.
	///
	/// # Panics
	///
	/// Panics if the vector is empty.
	#[inline]
	pub fn pop_back(&mut self) {
		assert!(self.len > 0, "pop_back on an empty vector");
		unsafe {
			self.len -= 1;
			ptr::drop_in_place(self.buf.slot_mut(self.len))
		}
	}

	/// Removes the last element from a vector and returns it, or [`None`] if it
	/// is empty.
	#[inline]
	pub fn pop(&mut self) -> Option<T> {
		if self.len == 0 {
			None
		} else {
			unsafe {
				self.len -= 1;
				Some(ptr::read(self.buf.slot(self.len)))
			}
		}
	}

	/// Constructs an element at position `index` within the vector, shifting all
	/// elements after it to the right, and returns a reference to it.
	///
	/// Inserting at `len` is the same as [`emplace_back`](Vector::emplace_back).
	/// When the buffer is full it doubles, the new element is built first in the new
	/// buffer, and the old elements are moved around it: if `f` panics the vector is
	/// left exactly as it was.
	///
	/// # Panics
	///
	/// Panics if `index > len`.
	pub fn emplace<F>(&mut self, index: usize, f: F) -> &mut T where F: FnOnce() -> T {
		let len = self.len;
		if index > len {
			panic!("insertion index (is {}) should be <= len (is {})", index, len);
		}

		if index == len {
			return self.emplace_back(f)
		}

		if len < self.capacity() {
			let value = f();
			unsafe {
				// The spot to put the new value
				let p = self.buf.slot_mut(index);
				// Shift everything over to make space. (Duplicating the
				// `index`th element into two consecutive places.)
				ptr::copy(p, p.add(1), len - index);
				// Write it in, overwriting the first copy of the `index`th
				// element.
				ptr::write(p, value);
				self.len = len + 1;
				&mut *p
			}
		} else {
			self.emplace_realloc(index, f)
		}
	}

	/// Slow path of `emplace`: the buffer is full.
	fn emplace_realloc<F>(&mut self, index: usize, f: F) -> &mut T where F: FnOnce() -> T {
		let len = self.len;
		debug_assert!(index <= len && len == self.capacity());

		let mut new_buf = RawBuffer::with_capacity(self.grow_capacity());
		unsafe {
			let slot = new_buf.slot_mut(index);
			// if `f` panics, `new_buf` is freed and `self` was never touched.
			ptr::write(slot, f());

			let src = self.buf.as_ptr();
			let dst = new_buf.as_mut_ptr();
			raw::relocate(src, dst, index);
			raw::relocate(src.add(index), dst.add(index + 1), len - index);
		}

		self.buf.swap(&mut new_buf);
		self.len = len + 1;
		unsafe {
			&mut *self.buf.slot_mut(index)
		}
	}

	/// Inserts an element at position `index` within the vector, shifting all
	/// elements after it to the right.
	///
	/// # Panics
	///
	/// Panics if `index > len`.
	#[inline]
	pub fn insert(&mut self, index: usize, element: T) -> &mut T {
		self.emplace(index, move || element)
	}

	/// Removes and returns the element at position `index` within the vector,
	/// shifting all elements after it to the left.
	///
	/// # Panics
	///
	/// Panics if `index` is out of bounds.
	pub fn remove(&mut self, index: usize) -> T {
		let len = self.len;
		if index >= len {
			panic!("removal index (is {}) should be < len (is {})", index, len);
		}

		unsafe {
			// the place we are taking from.
			let p = self.buf.slot_mut(index);
			// copy it out, unsafely having a copy of the value on
			// the stack and in the vector at the same time.
			let ret = ptr::read(p);

			// Shift everything down to fill in that spot.
			ptr::copy(p.add(1), p, len - index - 1);
			self.len = len - 1;
			ret
		}
	}

	/// Drops the element at position `index`, shifting all elements after it
	/// to the left.
	///
	/// Returns `index`, which is now the position of the element that followed
	/// the erased one (or `len` if the last element was erased).
	///
	/// # Panics
	///
	/// Panics if `index` is out of bounds.
	#[inline]
	pub fn erase(&mut self, index: usize) -> usize {
		if self.len.checked_sub(1) == Some(index) {
			self.pop_back()
		} else {
			drop(self.remove(index))
		}

		index
	}

	/// Swaps the contents of two vectors in constant time.
	///
	/// This is how a vector is move-assigned: `a.swap(&mut b)` gives `a` the
	/// storage of `b` and `b` the former storage of `a`, without touching any element.
	#[inline]
	pub fn swap(&mut self, other: &mut Vector<T>) {
		self.buf.swap(&mut other.buf);
		mem::swap(&mut self.len, &mut other.len);
	}

	/// Builds `n` new elements at the back, all or nothing.
	///
	/// The capacity must already be sufficient. If the generator panics,
	/// the elements built so far are dropped and the length is left unchanged.
	fn extend_with<E: ExtendWith<T>>(&mut self, n: usize, mut value: E) {
		debug_assert!(self.capacity() - self.len >= n);

		let mut guard = InitGuard {
			dst: unsafe { self.buf.slot_mut(self.len) },
			initialized: 0
		};

		while guard.initialized < n {
			unsafe {
				ptr::write(guard.dst.add(guard.initialized), value.next());
			}
			guard.initialized += 1;
		}

		mem::forget(guard);
		self.len += n;
	}
}

impl<T: Clone> Vector<T> {
	/// Clones and appends all elements in a slice to the `Vector`.
	///
	/// Either every element of `other` is appended, or, if a clone panics,
	/// none is.
	pub fn extend_from_slice(&mut self, other: &[T]) {
		self.reserve_for_push(other.len());
		self.extend_with(other.len(), ExtendClone { src: other, next: 0 })
	}
}

/// Drops the first `initialized` values at `dst` unless forgotten.
///
/// Used while filling uninitialized slots, so that a panicking constructor
/// does not leak what was already built.
struct InitGuard<T> {
	dst: *mut T,
	initialized: usize
}

impl<T> Drop for InitGuard<T> {
	#[inline]
	fn drop(&mut self) {
		// SAFETY: the first `initialized` slots were written and not yet handed over.
		unsafe {
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.dst, self.initialized))
		}
	}
}

// This code generalizes `with_len`, `resize_with` and `extend_from_slice`.
trait ExtendWith<T> {
	fn next(&mut self) -> T;
}

struct ExtendDefault;
impl<T: Default> ExtendWith<T> for ExtendDefault {
	fn next(&mut self) -> T {
		Default::default()
	}
}

struct ExtendFunc<F>(F);
impl<T, F: FnMut() -> T> ExtendWith<T> for ExtendFunc<F> {
	fn next(&mut self) -> T {
		(self.0)()
	}
}

struct ExtendClone<'s, T> {
	src: &'s [T],
	next: usize
}

impl<'s, T: Clone> ExtendWith<T> for ExtendClone<'s, T> {
	fn next(&mut self) -> T {
		let value = self.src[self.next].clone();
		self.next += 1;
		value
	}
}

impl<T: Clone> Clone for Vector<T> {
	/// Clones the live elements into a buffer of exactly `len` slots.
	///
	/// If a clone panics, the partial copy is dropped and `self` is untouched.
	fn clone(&self) -> Vector<T> {
		let mut copy = Vector::with_capacity(self.len);
		copy.extend_with(self.len, ExtendClone { src: self.as_slice(), next: 0 });
		copy
	}

	/// Overwrites `self` with a copy of `source`.
	///
	/// If `source` does not fit in the current buffer, a full clone is built and
	/// swapped in, so a panicking clone leaves `self` unchanged. Otherwise the buffer
	/// is reused: common elements are assigned with `clone_from`, the surplus is
	/// dropped or the missing elements are cloned at the back.
	fn clone_from(&mut self, source: &Vector<T>) {
		if source.len > self.capacity() {
			let mut copy = source.clone();
			self.swap(&mut copy);
			return
		}

		let common = cmp::min(self.len, source.len);
		let (head, tail) = source.split_at(common);
		self[..common].clone_from_slice(head);

		if source.len <= self.len {
			self.truncate(source.len)
		} else {
			self.extend_with(tail.len(), ExtendClone { src: tail, next: 0 })
		}
	}
}

impl<T> Default for Vector<T> {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Deref for Vector<T> {
	type Target = [T];

	#[inline]
	fn deref(&self) -> &[T] {
		self.as_slice()
	}
}

impl<T> DerefMut for Vector<T> {
	#[inline]
	fn deref_mut(&mut self) -> &mut [T] {
		self.as_mut_slice()
	}
}

impl<T> AsRef<[T]> for Vector<T> {
	#[inline]
	fn as_ref(&self) -> &[T] {
		self
	}
}

impl<T> AsMut<[T]> for Vector<T> {
	#[inline]
	fn as_mut(&mut self) -> &mut [T] {
		self
	}
}

impl<T: fmt::Debug> fmt::Debug for Vector<T> {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

impl<'v, T> IntoIterator for &'v Vector<T> {
	type Item = &'v T;
	type IntoIter = slice::Iter<'v, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.as_slice().iter()
	}
}

impl<'v, T> IntoIterator for &'v mut Vector<T> {
	type Item = &'v mut T;
	type IntoIter = slice::IterMut<'v, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.as_mut_slice().iter_mut()
	}
}

/// An iterator that moves out of a vector.
///
/// Created by the `into_iter` method on [`Vector`].
/// Elements not consumed are dropped along with the iterator.
pub struct IntoIter<T> {
	buf: RawBuffer<T>,

	/// Slots `[start, end)` still hold live values.
	start: usize,
	end: usize
}

impl<T> IntoIter<T> {
	/// Returns the remaining items of this iterator as a slice.
	pub fn as_slice(&self) -> &[T] {
		unsafe {
			slice::from_raw_parts(self.buf.slot(self.start), self.end - self.start)
		}
	}
}

impl<T> Iterator for IntoIter<T> {
	type Item = T;

	fn next(&mut self) -> Option<T> {
		if self.start == self.end {
			None
		} else {
			unsafe {
				let item = ptr::read(self.buf.slot(self.start));
				self.start += 1;
				Some(item)
			}
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let len = self.end - self.start;
		(len, Some(len))
	}
}

impl<T> DoubleEndedIterator for IntoIter<T> {
	fn next_back(&mut self) -> Option<T> {
		if self.start == self.end {
			None
		} else {
			unsafe {
				self.end -= 1;
				Some(ptr::read(self.buf.slot(self.end)))
			}
		}
	}
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
	}
}

impl<T> Drop for IntoIter<T> {
	fn drop(&mut self) {
		unsafe {
			// only drop remaining elements.
			let remaining = ptr::slice_from_raw_parts_mut(self.buf.slot_mut(self.start), self.end - self.start);
			ptr::drop_in_place(remaining)
		}
	}
}

impl<T> IntoIterator for Vector<T> {
	type Item = T;
	type IntoIter = IntoIter<T>;

	fn into_iter(self) -> Self::IntoIter {
		let mut this = ManuallyDrop::new(self);
		// the emptied vector is never dropped, the iterator takes over its elements.
		let buf = mem::take(&mut this.buf);

		IntoIter {
			buf,
			start: 0,
			end: this.len
		}
	}
}

impl<T> Extend<T> for Vector<T> {
	#[inline]
	fn extend<I: IntoIterator<Item = T>>(&mut self, iterator: I) {
		let mut iterator = iterator.into_iter();
		while let Some(element) = iterator.next() {
			if self.len == self.capacity() {
				let (lower, _) = iterator.size_hint();
				self.reserve_for_push(lower.saturating_add(1));
			}
			self.push(element);
		}
	}
}

impl<T> FromIterator<T> for Vector<T> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Vector<T> {
		let mut v = Vector::new();
		v.extend(iter);
		v
	}
}

impl<T: Clone> From<&[T]> for Vector<T> {
	fn from(s: &[T]) -> Vector<T> {
		let mut v = Vector::with_capacity(s.len());
		v.extend_with(s.len(), ExtendClone { src: s, next: 0 });
		v
	}
}
