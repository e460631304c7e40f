//! Tracked allocator implementation
//!
//! Provides an allocator that records allocation statistics by wrapping
//! another [`ElementAllocator`].
//!
//! # Safety
//!
//! All unsafe operations are forwarded to the inner allocator with the same
//! contract; statistics are a side effect only.
//!
//! ## Invariants
//!
//! - Every successful allocation is recorded with its byte size
//! - Every deallocation subtracts the same byte size
//! - Failed allocations only bump the failure counter
//! - Zero-byte requests are not counted (they never touch memory)

use core::ptr::NonNull;
use std::sync::Arc;

use super::traits::array_layout;
use super::{AllocResult, AllocatorStats, AtomicAllocatorStats, ElementAllocator};

/// A wrapper allocator that tracks memory usage statistics
///
/// The counters live behind an `Arc`: clones of the allocator (and the
/// handle returned by [`stats_handle`](Self::stats_handle)) observe the same
/// numbers, so a test can keep a handle after the container owning the
/// allocator has been dropped and check for leaks.
#[derive(Debug, Clone, Default)]
pub struct TrackedAllocator<A> {
    inner: A,
    stats: Arc<AtomicAllocatorStats>,
}

impl<A> TrackedAllocator<A> {
    /// Creates a new `TrackedAllocator` wrapping the provided allocator
    pub fn new(allocator: A) -> Self {
        Self {
            inner: allocator,
            stats: Arc::new(AtomicAllocatorStats::new()),
        }
    }

    /// Gets a reference to the underlying allocator
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Returns a shared handle to the counters
    pub fn stats_handle(&self) -> Arc<AtomicAllocatorStats> {
        Arc::clone(&self.stats)
    }

    /// Returns the total bytes currently allocated
    pub fn allocated_bytes(&self) -> usize {
        self.stats.current_allocated()
    }

    /// Returns the peak bytes allocated
    pub fn peak_allocated_bytes(&self) -> usize {
        self.stats.peak_allocated()
    }

    /// Returns the total number of allocations performed
    pub fn allocation_count(&self) -> usize {
        self.stats.allocation_count()
    }

    /// Get detailed statistics snapshot
    pub fn detailed_stats(&self) -> AllocatorStats {
        self.stats.snapshot()
    }

    /// Check if there are any memory leaks (allocations > deallocations)
    pub fn has_leaks(&self) -> bool {
        self.stats.snapshot().has_active_allocations()
    }
}

fn request_bytes<T>(n: usize) -> usize {
    array_layout::<T>(n).map_or(0, |layout| layout.size())
}

// SAFETY: forwards to A's implementation with the same arguments; statistics
// recording does not touch the allocated memory.
unsafe impl<T, A: ElementAllocator<T>> ElementAllocator<T> for TrackedAllocator<A> {
    const ALWAYS_EQUAL: bool = A::ALWAYS_EQUAL;

    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        match self.inner.allocate(n) {
            Ok(ptr) => {
                let bytes = request_bytes::<T>(n);
                if bytes > 0 {
                    self.stats.record_allocation(bytes);
                }
                Ok(ptr)
            }
            Err(err) => {
                self.stats.record_allocation_failure();
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.deallocate(ptr, n) };

        let bytes = request_bytes::<T>(n);
        if bytes > 0 {
            self.stats.record_deallocation(bytes);
        }
    }
}

impl<A: PartialEq> PartialEq for TrackedAllocator<A> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}
