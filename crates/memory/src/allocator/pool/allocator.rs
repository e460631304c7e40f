//! Typed pool allocator
//!
//! # Safety
//!
//! `PoolAllocator<T>` routes requests by count:
//! - one value goes to a slot of the shared [`Pool`], whose slots are sized
//!   and aligned for `T`
//! - more than one value goes to the general heap as an array
//! - zero values (or a zero-sized `T`) get a dangling pointer
//!
//! Deallocation applies the same [`AllocationRoute`] to the count it is given,
//! so a pointer must always come back with the count it was allocated with.
//!
//! ## Invariants
//!
//! - The pool's `slot_stride >= size_of::<T>()` and `element_align >= align_of::<T>()`
//! - The pool stays alive while any allocator handle or [`PoolBox`](super::PoolBox)
//!   refers to it (`Rc`)
//! - Slot pointers and bulk pointers come from disjoint memory sources

use core::cell::RefCell;
use core::marker::PhantomData;
use core::ptr::NonNull;
use std::rc::Rc;

use super::{Pool, PoolConfig, PoolStats};
use crate::allocator::{
    AllocError, AllocResult, AllocationRoute, ElementAllocator, HeapAllocator, MemoryUsage,
};

/// Allocator for values of `T` backed by a block pool
///
/// Cloning the allocator shares the pool: every clone hands out and reclaims
/// slots from the same free list, and the pool's blocks are released when the
/// last handle is dropped. Two allocators compare equal only when they share
/// a pool.
///
/// The handle is single-threaded (`!Send`, `!Sync`).
pub struct PoolAllocator<T> {
    pool: Rc<RefCell<Pool>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PoolAllocator<T> {
    /// Creates an allocator with a fresh pool using the default configuration
    pub fn new() -> AllocResult<Self> {
        Self::with_config(PoolConfig::default())
    }

    /// Creates an allocator with a fresh pool using custom configuration
    pub fn with_config(config: PoolConfig) -> AllocResult<Self> {
        Ok(Self::from_pool_unchecked(Pool::for_type::<T>(config)?))
    }

    /// Creates an allocator over an existing pool
    ///
    /// # Errors
    /// Returns `InvalidLayout` if the pool's slots cannot hold a `T`.
    pub fn from_pool(pool: Pool) -> AllocResult<Self> {
        if pool.slot_stride() < size_of::<T>() {
            return Err(AllocError::invalid_layout("pool slots are smaller than the value type"));
        }
        if pool.element_align() < align_of::<T>() {
            return Err(AllocError::invalid_layout(
                "pool slots are less aligned than the value type",
            ));
        }
        Ok(Self::from_pool_unchecked(pool))
    }

    fn from_pool_unchecked(pool: Pool) -> Self {
        Self {
            pool: Rc::new(RefCell::new(pool)),
            _marker: PhantomData,
        }
    }

    /// Runs `f` with shared access to the underlying pool
    pub fn with_pool<R>(&self, f: impl FnOnce(&Pool) -> R) -> R {
        f(&self.pool.borrow())
    }

    /// Returns the number of blocks owned by the pool
    pub fn block_count(&self) -> usize {
        self.pool.borrow().block_count()
    }

    /// Returns the number of slots on the pool's free list
    pub fn free_slots(&self) -> usize {
        self.pool.borrow().free_slots()
    }

    /// Returns the number of pool slots currently checked out
    pub fn outstanding(&self) -> usize {
        self.pool.borrow().outstanding()
    }

    /// Get pool statistics (if tracking is enabled)
    pub fn stats(&self) -> Option<PoolStats> {
        self.pool.borrow().stats()
    }

    /// Checks whether two allocators hand out slots from the same pool
    pub fn shares_pool_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.pool, &other.pool)
    }

    /// Checks if a pointer is a slot of the underlying pool
    pub fn owns_slot(&self, ptr: NonNull<T>) -> bool {
        self.pool.borrow().contains(ptr.as_ptr().cast::<u8>())
    }
}

// SAFETY: slot requests are served by a pool whose slots are at least
// size_of::<T>() bytes and aligned to align_of::<T>() (checked on
// construction); bulk requests use the heap array layout for n values.
// Deallocation mirrors the route of the count it receives.
unsafe impl<T> ElementAllocator<T> for PoolAllocator<T> {
    const ALWAYS_EQUAL: bool = false;

    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        match AllocationRoute::for_request::<T>(n) {
            AllocationRoute::Empty => Ok(NonNull::dangling()),
            AllocationRoute::Slot => Ok(self.pool.borrow_mut().allocate().cast::<T>()),
            AllocationRoute::Bulk => HeapAllocator::allocate_array(n),
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        match AllocationRoute::for_request::<T>(n) {
            AllocationRoute::Empty => {}
            // SAFETY: caller contract: ptr came from allocate(1) on this pool.
            AllocationRoute::Slot => unsafe {
                self.pool.borrow_mut().deallocate(ptr.cast::<u8>());
            },
            // SAFETY: caller contract: ptr came from allocate(n) with n > 1.
            AllocationRoute::Bulk => unsafe { HeapAllocator::deallocate_array(ptr, n) },
        }
    }
}

impl<T> Clone for PoolAllocator<T> {
    fn clone(&self) -> Self {
        Self {
            pool: Rc::clone(&self.pool),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for PoolAllocator<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shares_pool_with(other)
    }
}

impl<T> Eq for PoolAllocator<T> {}

impl<T> MemoryUsage for PoolAllocator<T> {
    fn used_memory(&self) -> usize {
        self.pool.borrow().used_memory()
    }

    fn available_memory(&self) -> Option<usize> {
        self.pool.borrow().available_memory()
    }

    fn total_memory(&self) -> Option<usize> {
        self.pool.borrow().total_memory()
    }
}

impl<T> core::fmt::Debug for PoolAllocator<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("value_type", &core::any::type_name::<T>())
            .field("pool", &*self.pool.borrow())
            .field("handles", &Rc::strong_count(&self.pool))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_pool<T>() -> PoolAllocator<T> {
        PoolAllocator::with_config(PoolConfig::debug().with_block_size(64)).unwrap()
    }

    #[test]
    fn single_values_come_from_the_pool() {
        let alloc = tiny_pool::<u64>();
        let ptr = alloc.allocate(1).unwrap();
        assert!(alloc.owns_slot(ptr));
        assert_eq!(alloc.outstanding(), 1);
        unsafe { alloc.deallocate(ptr, 1) };
        assert_eq!(alloc.outstanding(), 0);
    }

    #[test]
    fn arrays_bypass_the_pool() {
        let alloc = tiny_pool::<u64>();
        let ptr = alloc.allocate(4).unwrap();
        assert!(!alloc.owns_slot(ptr));
        assert_eq!(alloc.block_count(), 0);
        unsafe { alloc.deallocate(ptr, 4) };
    }

    #[test]
    fn clones_share_one_pool() {
        let a = tiny_pool::<u32>();
        let b = a.clone();
        assert_eq!(a, b);

        let ptr = a.allocate(1).unwrap();
        assert!(b.owns_slot(ptr));
        unsafe { b.deallocate(ptr, 1) };
        assert_eq!(a.free_slots(), b.free_slots());
    }

    #[test]
    fn independent_allocators_are_not_equal() {
        let a = tiny_pool::<u32>();
        let b = tiny_pool::<u32>();
        assert_ne!(a, b);
        assert!(!<PoolAllocator<u32> as ElementAllocator<u32>>::ALWAYS_EQUAL);
    }

    #[test]
    fn from_pool_checks_slot_layout() {
        let small = Pool::new(2, 2).unwrap();
        assert!(PoolAllocator::<u64>::from_pool(small).is_err());

        let loose = Pool::new(8, 1).unwrap();
        assert!(PoolAllocator::<u64>::from_pool(loose).is_err());

        let fitting = Pool::new(16, 8).unwrap();
        assert!(PoolAllocator::<u64>::from_pool(fitting).is_ok());
    }

    #[test]
    fn zero_sized_values_never_touch_the_pool() {
        let alloc = tiny_pool::<()>();
        let ptr = alloc.allocate(1).unwrap();
        assert_eq!(ptr, NonNull::dangling());
        unsafe { alloc.deallocate(ptr, 1) };
        assert_eq!(alloc.block_count(), 0);
    }
}
