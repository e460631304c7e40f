//! Smart pointer for pool-allocated values

use core::fmt;
use core::ptr::{self, NonNull};

use super::PoolAllocator;
use crate::allocator::{AllocResult, ElementAllocator};

/// RAII smart pointer for a value stored in a pool slot
///
/// Returns the slot to the pool when dropped. Similar to `Box` but backed by
/// a [`PoolAllocator`]; the box keeps its own handle to the pool, so the pool
/// outlives every box allocated from it.
pub struct PoolBox<T> {
    ptr: NonNull<T>,
    allocator: PoolAllocator<T>,
}

impl<T> PoolBox<T> {
    /// Creates a new `PoolBox` by allocating one slot from the given pool
    #[must_use = "allocated value must be used"]
    pub fn new_in(value: T, allocator: &PoolAllocator<T>) -> AllocResult<Self> {
        let ptr = allocator.allocate(1)?;

        // SAFETY: ptr is a fresh slot (or dangling for a ZST) valid for one T.
        unsafe { ptr.as_ptr().write(value) };

        Ok(Self {
            ptr,
            allocator: allocator.clone(),
        })
    }

    /// Returns the allocator the value lives in
    pub fn allocator(&self) -> &PoolAllocator<T> {
        &self.allocator
    }

    /// Returns the address of the slot holding the value
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Consumes the `PoolBox` and returns the contained value
    #[must_use]
    pub fn into_inner(self) -> T {
        let this = core::mem::ManuallyDrop::new(self);

        // SAFETY: ptr holds an initialised T that this box owns; the box is
        // never dropped, so the value is read exactly once.
        let value = unsafe { ptr::read(this.ptr.as_ptr()) };

        // SAFETY: the allocator handle is moved out of the never-dropped box
        // exactly once.
        let allocator = unsafe { ptr::read(&this.allocator) };

        // SAFETY: the slot came from allocate(1) on this allocator and the
        // value has been moved out.
        unsafe { allocator.deallocate(this.ptr, 1) };

        value
    }
}

impl<T> core::ops::Deref for PoolBox<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: ptr holds an initialised T owned by this box.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> core::ops::DerefMut for PoolBox<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: ptr holds an initialised T; &mut self gives exclusive access.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T: fmt::Debug> fmt::Debug for PoolBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T> Drop for PoolBox<T> {
    fn drop(&mut self) {
        // SAFETY: the value is initialised and owned by this box; after it is
        // dropped the slot goes back to the pool it came from.
        unsafe {
            ptr::drop_in_place(self.ptr.as_ptr());
            self.allocator.deallocate(self.ptr, 1);
        }
    }
}
