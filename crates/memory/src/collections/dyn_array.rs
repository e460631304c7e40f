//! Growable array over an [`ElementAllocator`]
//!
//! # Safety
//!
//! `DynArray` splits its buffer into a live prefix and raw storage:
//! - slots `[0, len)` hold initialised values owned by the array
//! - slots `[len, capacity)` are uninitialised and never read or dropped
//!
//! ## Invariants
//!
//! - `len <= capacity` after every operation
//! - growth doubles the capacity, shrinking reduces it to `ceil(1.5 * len)`;
//!   both move exactly `len` values into the new buffer
//! - `len` is lowered before values are dropped or moved out, so a panicking
//!   destructor never leads to a double drop
//! - element destructors are skipped when `T` does not need drop

use core::fmt;
use core::hash::{Hash, Hasher};
use core::mem::needs_drop;
use core::ops::{Deref, DerefMut};
use core::ptr;
use core::slice;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use super::raw_buffer::{RawBuffer, capacity_overflow};
use crate::allocator::{ElementAllocator, HeapAllocator, PoolAllocator};
use crate::error::{MemoryError, MemoryResult};
use crate::utils::{grown_capacity, shrink_target};

/// Capacity of a freshly constructed or cleared array
pub const DEFAULT_CAPACITY: usize = 32;

/// A contiguous growable array with a pluggable storage strategy
///
/// `A` decides where the buffer comes from: [`HeapAllocator`] (the default)
/// or [`PoolAllocator`], which serves single-slot buffers from a block pool.
///
/// # Examples
/// ```
/// use tessera_memory::collections::DynArray;
///
/// let mut numbers = DynArray::new();
/// numbers.push(1);
/// numbers.push(2);
/// numbers.push(3);
///
/// assert_eq!(numbers.len(), 3);
/// assert_eq!(numbers.capacity(), 32);
/// assert_eq!(*numbers.at(-1)?, 3);
/// assert_eq!(numbers.to_string(), "[1, 2, 3]");
/// # Ok::<(), tessera_memory::MemoryError>(())
/// ```
pub struct DynArray<T, A: ElementAllocator<T> = HeapAllocator> {
    buf: RawBuffer<T, A>,
    len: usize,
}

/// Array whose single-slot buffers come from a shared block pool
pub type PooledArray<T> = DynArray<T, PoolAllocator<T>>;

impl<T> DynArray<T> {
    /// Creates an empty array with [`DEFAULT_CAPACITY`] slots on the heap
    pub fn new() -> Self {
        Self::new_in(HeapAllocator)
    }

    /// Creates an empty array with room for `capacity` values on the heap
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, HeapAllocator)
    }

    /// Creates an array of `len` clones of `value`
    pub fn filled(len: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::filled_in(len, value, HeapAllocator)
    }

    /// Creates an array of `len` values produced by `generator(index)`
    pub fn from_fn(len: usize, generator: impl FnMut(usize) -> T) -> Self {
        Self::from_fn_in(len, generator, HeapAllocator)
    }

    /// Creates an array holding clones of every value in `values`
    pub fn from_slice(values: &[T]) -> Self
    where
        T: Clone,
    {
        Self::from_slice_in(values, HeapAllocator)
    }
}

impl<T, A: ElementAllocator<T>> DynArray<T, A> {
    /// Creates an empty array with [`DEFAULT_CAPACITY`] slots from `alloc`
    pub fn new_in(alloc: A) -> Self {
        Self::with_capacity_in(DEFAULT_CAPACITY, alloc)
    }

    /// Creates an empty array with room for `capacity` values from `alloc`
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self {
            buf: RawBuffer::with_capacity_in(capacity, alloc),
            len: 0,
        }
    }

    /// Creates an array of `len` clones of `value` with capacity `len`
    pub fn filled_in(len: usize, value: T, alloc: A) -> Self
    where
        T: Clone,
    {
        let mut array = Self::with_capacity_in(len, alloc);
        if len > 0 {
            for _ in 1..len {
                array.push_within_capacity(value.clone());
            }
            array.push_within_capacity(value);
        }
        array
    }

    /// Creates an array of `len` values produced by `generator(index)`
    pub fn from_fn_in(len: usize, mut generator: impl FnMut(usize) -> T, alloc: A) -> Self {
        let mut array = Self::with_capacity_in(len, alloc);
        for index in 0..len {
            array.push_within_capacity(generator(index));
        }
        array
    }

    /// Creates an array holding clones of `values` with capacity `values.len()`
    pub fn from_slice_in(values: &[T], alloc: A) -> Self
    where
        T: Clone,
    {
        let mut array = Self::with_capacity_in(values.len(), alloc);
        for value in values {
            array.push_within_capacity(value.clone());
        }
        array
    }

    /// Returns the number of live values
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no values
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots available without reallocating
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the allocator backing the buffer
    #[inline]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Returns a raw pointer to the buffer
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    /// Returns a mutable raw pointer to the buffer
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
    }

    /// Views the live values as a slice
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [0, len) is initialised (struct invariant).
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    /// Views the live values as a mutable slice
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: [0, len) is initialised and &mut self is exclusive.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Appends a value, doubling the capacity first when the array is full
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow();
        }
        self.push_within_capacity(value);
    }

    /// Appends the value built by `make` and returns a reference to it
    ///
    /// The capacity check happens before `make` runs, so the value is written
    /// straight into its final slot.
    pub fn emplace(&mut self, make: impl FnOnce() -> T) -> &mut T {
        if self.len == self.capacity() {
            self.grow();
        }
        let index = self.len;
        self.push_within_capacity(make());
        // SAFETY: the slot at `index` was just initialised.
        unsafe { &mut *self.buf.ptr().add(index) }
    }

    /// Removes and returns the last value, or `None` if the array is empty
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old last index is initialised and, with len
        // lowered, no longer part of the live range.
        Some(unsafe { ptr::read(self.buf.ptr().add(self.len)) })
    }

    /// Checked access; negative indices count from the end (`-1` is the last value)
    pub fn at(&self, index: isize) -> MemoryResult<&T> {
        let resolved = self.resolve_index(index)?;
        // SAFETY: resolve_index guarantees resolved < len.
        Ok(unsafe { &*self.buf.ptr().add(resolved) })
    }

    /// Checked mutable access; negative indices count from the end
    pub fn at_mut(&mut self, index: isize) -> MemoryResult<&mut T> {
        let resolved = self.resolve_index(index)?;
        // SAFETY: resolve_index guarantees resolved < len.
        Ok(unsafe { &mut *self.buf.ptr().add(resolved) })
    }

    /// Removes the value at `index`, shifting later values one slot left
    pub fn remove_at(&mut self, index: usize) -> MemoryResult<T> {
        if index >= self.len {
            return Err(MemoryError::index_out_of_bounds(index as isize, self.len));
        }

        // SAFETY: index < len, so the slot is initialised; the tail
        // [index + 1, len) is moved down by one and len shrinks by one, which
        // leaves exactly the remaining values live.
        unsafe {
            let slot = self.buf.ptr().add(index);
            let removed = ptr::read(slot);
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            self.len -= 1;
            Ok(removed)
        }
    }

    /// Removes the first value equal to `value`; no-op if none matches
    pub fn remove(&mut self, value: &T) -> Option<T>
    where
        T: PartialEq,
    {
        let index = self.as_slice().iter().position(|candidate| candidate == value)?;
        self.remove_at(index).ok()
    }

    /// Drops every value and resets the buffer to [`DEFAULT_CAPACITY`] slots
    ///
    /// Calling it on an already cleared array is a no-op.
    pub fn clear(&mut self) {
        self.drop_live();
        if self.capacity() != DEFAULT_CAPACITY {
            // SAFETY: the live range is empty.
            unsafe { self.buf.reallocate(DEFAULT_CAPACITY, 0) };
        }
    }

    /// Reduces the capacity to `ceil(1.5 * len)` when it is larger than that
    pub fn shrink_to_fit(&mut self) {
        let target = shrink_target(self.len);
        if self.capacity() <= target {
            #[cfg(feature = "logging")]
            debug!(
                len = self.len,
                capacity = self.capacity(),
                "shrink_to_fit skipped: capacity already within 1.5x of length"
            );
            return;
        }

        #[cfg(feature = "logging")]
        trace!(from = self.capacity(), to = target, len = self.len, "shrinking array buffer");

        // SAFETY: [0, len) is initialised and len <= target.
        unsafe { self.buf.reallocate(target, self.len) };
    }

    /// Makes room for at least `additional` more values, doubling as needed
    pub fn reserve(&mut self, additional: usize) {
        let Some(required) = self.len.checked_add(additional) else {
            capacity_overflow();
        };
        if required <= self.capacity() {
            return;
        }

        let mut new_capacity = self.capacity();
        while new_capacity < required {
            new_capacity = match grown_capacity(new_capacity) {
                Some(capacity) => capacity,
                None => capacity_overflow(),
            };
        }

        #[cfg(feature = "logging")]
        trace!(from = self.capacity(), to = new_capacity, len = self.len, "reserving array buffer");

        // SAFETY: [0, len) is initialised and len < required <= new_capacity.
        unsafe { self.buf.reallocate(new_capacity, self.len) };
    }

    fn grow(&mut self) {
        let Some(new_capacity) = grown_capacity(self.capacity()) else {
            capacity_overflow();
        };

        #[cfg(feature = "logging")]
        trace!(from = self.capacity(), to = new_capacity, "growing array buffer");

        // SAFETY: [0, len) is initialised and len <= capacity < new_capacity.
        unsafe { self.buf.reallocate(new_capacity, self.len) };
    }

    /// Writes `value` into the first raw slot; the caller made room for it
    #[inline]
    fn push_within_capacity(&mut self, value: T) {
        debug_assert!(self.len < self.capacity(), "push without a free slot");
        // SAFETY: len < capacity, so the slot is inside the buffer and raw.
        unsafe { self.buf.ptr().add(self.len).write(value) };
        self.len += 1;
    }

    fn resolve_index(&self, index: isize) -> MemoryResult<usize> {
        let resolved = if index < 0 {
            self.len as isize + index
        } else {
            index
        };
        if resolved < 0 || resolved as usize >= self.len {
            return Err(MemoryError::index_out_of_bounds(index, self.len));
        }
        Ok(resolved as usize)
    }

    /// Drops the live range and empties it
    fn drop_live(&mut self) {
        let live = ptr::slice_from_raw_parts_mut(self.buf.ptr(), self.len);
        self.len = 0;
        if needs_drop::<T>() {
            // SAFETY: `live` was the initialised range; len is already 0, so
            // the values are dropped exactly once even if a destructor panics.
            unsafe { ptr::drop_in_place(live) };
        }
    }

    /// Splits the array into its buffer and length without dropping values
    pub(crate) fn into_raw_parts(self) -> (RawBuffer<T, A>, usize) {
        let this = core::mem::ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the buffer is moved out once.
        let buf = unsafe { ptr::read(&this.buf) };
        (buf, this.len)
    }
}

impl<T, A: ElementAllocator<T>> Drop for DynArray<T, A> {
    fn drop(&mut self) {
        self.drop_live();
        // The buffer releases itself.
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: ElementAllocator<T>> Deref for DynArray<T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: ElementAllocator<T>> DerefMut for DynArray<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: ElementAllocator<T>> AsRef<[T]> for DynArray<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: ElementAllocator<T>> AsMut<[T]> for DynArray<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Clone, A: ElementAllocator<T> + Clone> Clone for DynArray<T, A> {
    /// Copies every live value into a new buffer of the same capacity
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity_in(self.capacity(), self.allocator().clone());
        for value in self.as_slice() {
            copy.push_within_capacity(value.clone());
        }
        copy
    }

    /// Drops the current values, matches `source`'s capacity and copies its
    /// values; the receiving array keeps its own allocator
    fn clone_from(&mut self, source: &Self) {
        self.drop_live();
        if self.capacity() != source.capacity() {
            // SAFETY: the live range is empty.
            unsafe { self.buf.reallocate(source.capacity(), 0) };
        }
        for value in source.as_slice() {
            self.push_within_capacity(value.clone());
        }
    }
}

impl<T: fmt::Debug, A: ElementAllocator<T>> fmt::Debug for DynArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: fmt::Display, A: ElementAllocator<T>> fmt::Display for DynArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, value) in self.as_slice().iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(value, f)?;
        }
        f.write_str("]")
    }
}

impl<T, U, A, B> PartialEq<DynArray<U, B>> for DynArray<T, A>
where
    T: PartialEq<U>,
    A: ElementAllocator<T>,
    B: ElementAllocator<U>,
{
    fn eq(&self, other: &DynArray<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U, A: ElementAllocator<T>> PartialEq<[U]> for DynArray<T, A> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, A: ElementAllocator<T>, const N: usize> PartialEq<[U; N]>
    for DynArray<T, A>
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Eq, A: ElementAllocator<T>> Eq for DynArray<T, A> {}

impl<T: Hash, A: ElementAllocator<T>> Hash for DynArray<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, A: ElementAllocator<T>> Extend<T> for DynArray<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T: Copy + 'a, A: ElementAllocator<T>> Extend<&'a T> for DynArray<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T, const N: usize> From<[T; N]> for DynArray<T> {
    fn from(values: [T; N]) -> Self {
        let mut array = Self::with_capacity(N);
        for value in values {
            array.push_within_capacity(value);
        }
        array
    }
}

impl<T> From<Vec<T>> for DynArray<T> {
    fn from(values: Vec<T>) -> Self {
        let mut array = Self::with_capacity(values.len());
        for value in values {
            array.push_within_capacity(value);
        }
        array
    }
}

impl<T: Clone> From<&[T]> for DynArray<T> {
    fn from(values: &[T]) -> Self {
        Self::from_slice(values)
    }
}

impl<'a, T, A: ElementAllocator<T>> IntoIterator for &'a DynArray<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, A: ElementAllocator<T>> IntoIterator for &'a mut DynArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}
