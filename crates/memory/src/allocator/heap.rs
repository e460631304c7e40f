//! General-purpose heap allocator
//!
//! Wraps the global allocator behind [`ElementAllocator`]. This is the default
//! storage strategy of [`DynArray`](crate::collections::DynArray) and the bulk
//! path of [`PoolAllocator`](super::PoolAllocator).

use core::ptr::NonNull;
use std::alloc::{alloc, dealloc};

use super::traits::array_layout;
use super::{AllocError, AllocResult, AllocationRoute, ElementAllocator};

/// Stateless allocator backed by the global heap
///
/// Every instance can free memory produced by any other instance, so the type
/// is always-equal and cloning it is free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HeapAllocator;

impl HeapAllocator {
    /// Creates a new `HeapAllocator`
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// Allocates an array of `n` values of `T` regardless of `n`
    ///
    /// Used by allocators that route only part of their traffic to the heap.
    pub(crate) fn allocate_array<T>(n: usize) -> AllocResult<NonNull<T>> {
        let layout = array_layout::<T>(n)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }

        // SAFETY: layout has non-zero size (checked above).
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr.cast::<T>())
            .ok_or_else(|| AllocError::allocation_failed_with_layout(layout))
    }

    /// Releases an array produced by [`allocate_array`](Self::allocate_array)
    ///
    /// # Safety
    /// `ptr` must come from `allocate_array::<T>(n)` with the same `n`.
    pub(crate) unsafe fn deallocate_array<T>(ptr: NonNull<T>, n: usize) {
        // The layout was valid at allocation time with the same `n`.
        let Ok(layout) = array_layout::<T>(n) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }

        // SAFETY: caller contract: ptr was allocated with this exact layout.
        unsafe { dealloc(ptr.as_ptr().cast::<u8>(), layout) };
    }
}

// SAFETY: delegates to the global allocator with `Layout::array::<T>(n)`,
// which is aligned for T and sized for n values; zero-sized requests return a
// dangling pointer and are never passed to `dealloc`.
unsafe impl<T> ElementAllocator<T> for HeapAllocator {
    const ALWAYS_EQUAL: bool = true;

    #[inline]
    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        match AllocationRoute::for_request::<T>(n) {
            AllocationRoute::Empty => Ok(NonNull::dangling()),
            AllocationRoute::Slot | AllocationRoute::Bulk => Self::allocate_array(n),
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        if AllocationRoute::for_request::<T>(n) == AllocationRoute::Empty {
            return;
        }
        // SAFETY: forwarded caller contract.
        unsafe { Self::deallocate_array(ptr, n) };
    }
}
