//! Allocator traits for typed, count-based storage
//!
//! The containers in this crate never talk to the global allocator directly.
//! They ask an [`ElementAllocator`] for room for `n` values of `T` and hand the
//! same `n` back when the storage is released, mirroring the
//! `allocate(n)` / `deallocate(ptr, n)` shape of a standard allocator.
//!
//! # Safety
//!
//! `ElementAllocator` is an unsafe trait. Implementors promise that:
//! - a pointer returned for `n` values is aligned for `T` and valid for reads
//!   and writes of `n * size_of::<T>()` bytes until it is deallocated
//! - the storage does not overlap any other live allocation of the allocator
//! - `deallocate(ptr, n)` accepts exactly the pointers produced by
//!   `allocate(n)` with the same `n`
//!
//! Zero-sized requests (`n == 0` or a zero-sized `T`) never touch memory and
//! are answered with a dangling, well-aligned pointer.

use core::alloc::Layout;
use core::ptr::NonNull;

use super::{AllocError, AllocResult};

/// Storage source selected for a request of `n` values of `T`
///
/// Keeping the decision in one place lets every allocator apply the same rule
/// on the way in and on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationRoute {
    /// Nothing to allocate: zero elements or a zero-sized type
    Empty,
    /// Exactly one value: a fixed-size slot
    Slot,
    /// More than one value: a contiguous array from the general heap
    Bulk,
}

impl AllocationRoute {
    /// Selects the route for `n` values of `T`
    #[inline]
    pub const fn for_request<T>(n: usize) -> Self {
        if n == 0 || size_of::<T>() == 0 {
            Self::Empty
        } else if n == 1 {
            Self::Slot
        } else {
            Self::Bulk
        }
    }
}

/// Layout of a contiguous array of `n` values of `T`
#[inline]
pub fn array_layout<T>(n: usize) -> AllocResult<Layout> {
    Layout::array::<T>(n).map_err(|_| AllocError::size_overflow("array layout"))
}

/// Count-based allocator for values of `T`
///
/// # Safety
/// See the module documentation for the contract implementors must uphold.
pub unsafe trait ElementAllocator<T> {
    /// Whether any two instances can free each other's allocations
    ///
    /// Stateless allocators set this to `true`. Allocators that own their
    /// memory source (a pool) set it to `false`; containers then keep each
    /// buffer paired with the instance that produced it.
    const ALWAYS_EQUAL: bool;

    /// Allocates uninitialised storage for `n` values of `T`
    ///
    /// # Errors
    /// - `SizeOverflow` if `n * size_of::<T>()` does not fit a `Layout`
    /// - `AllocationFailed` if the memory source is exhausted
    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>>;

    /// Releases storage obtained from [`allocate`](Self::allocate)
    ///
    /// Only the storage is released; live values must already be dropped or
    /// moved out.
    ///
    /// # Safety
    /// - `ptr` must come from `self.allocate(n)` (or an equal allocator)
    /// - `n` must be the count passed to that call
    /// - `ptr` must not be used afterwards
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize);
}

/// Memory usage reporting
pub trait MemoryUsage {
    /// Get currently used memory in bytes
    fn used_memory(&self) -> usize;

    /// Get available memory in bytes (if known)
    fn available_memory(&self) -> Option<usize>;

    /// Get total memory capacity in bytes (if known)
    fn total_memory(&self) -> Option<usize> {
        self.available_memory()
            .map(|available| self.used_memory() + available)
    }

    /// Returns memory usage as a percentage (0.0 to 100.0)
    ///
    /// Returns `None` if total memory is unknown.
    fn memory_usage_percent(&self) -> Option<f32> {
        self.total_memory().map(|total| {
            if total == 0 {
                0.0
            } else {
                (self.used_memory() as f32 / total as f32) * 100.0
            }
        })
    }
}
