//! Owning storage for the growable containers
//!
//! # Safety
//!
//! `RawBuffer` owns `cap` uninitialised slots of `T` obtained from its
//! allocator and gives them back on drop. It never reads, writes or drops
//! values; which prefix of the buffer is live is the container's business.
//!
//! ## Invariants
//!
//! - `ptr` was returned by `alloc.allocate(cap)`
//! - the buffer is released exactly once, with the same `cap`

use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use std::alloc::handle_alloc_error;

use crate::allocator::{ElementAllocator, array_layout};

#[cold]
#[inline(never)]
pub(crate) fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

/// Allocates room for `cap` values or diverges
///
/// Exhaustion is fatal (`handle_alloc_error`); any other allocator error
/// means the request could not be expressed and panics.
fn allocate_or_abort<T, A: ElementAllocator<T>>(alloc: &A, cap: usize) -> NonNull<T> {
    match alloc.allocate(cap) {
        Ok(ptr) => ptr,
        Err(err) => match array_layout::<T>(cap) {
            Ok(layout) if err.is_exhaustion() => handle_alloc_error(layout),
            Ok(_) => panic!("buffer allocation failed: {err}"),
            Err(_) => capacity_overflow(),
        },
    }
}

/// Pointer, capacity and the allocator that produced them
pub(crate) struct RawBuffer<T, A: ElementAllocator<T>> {
    ptr: NonNull<T>,
    cap: usize,
    alloc: A,
    _owns: PhantomData<T>,
}

impl<T, A: ElementAllocator<T>> RawBuffer<T, A> {
    /// Allocates an uninitialised buffer of `cap` slots
    pub(crate) fn with_capacity_in(cap: usize, alloc: A) -> Self {
        let ptr = allocate_or_abort(&alloc, cap);
        Self {
            ptr,
            cap,
            alloc,
            _owns: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Moves the first `live` values into a fresh buffer of `new_cap` slots
    /// and releases the old one
    ///
    /// # Safety
    /// - slots `[0, live)` hold initialised values; nothing past `live` does
    /// - `live <= new_cap` and `live <= self.capacity()`
    pub(crate) unsafe fn reallocate(&mut self, new_cap: usize, live: usize) {
        debug_assert!(live <= new_cap, "live range does not fit the new buffer");
        debug_assert!(live <= self.cap, "live range exceeds the old buffer");

        let new_ptr = allocate_or_abort(&self.alloc, new_cap);

        // SAFETY: both buffers hold at least `live` slots and are distinct
        // allocations; the bitwise copy is a move, so the old slots are left
        // logically uninitialised and must not be dropped.
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), live) };

        // SAFETY: ptr/cap came from this allocator (struct invariant).
        unsafe { self.alloc.deallocate(self.ptr, self.cap) };

        self.ptr = new_ptr;
        self.cap = new_cap;
    }
}

impl<T, A: ElementAllocator<T>> Drop for RawBuffer<T, A> {
    fn drop(&mut self) {
        // SAFETY: ptr/cap came from this allocator and are released once.
        unsafe { self.alloc.deallocate(self.ptr, self.cap) };
    }
}

// SAFETY: RawBuffer uniquely owns its slots, like Box<[MaybeUninit<T>]>;
// sending it sends the values and the allocator handle.
unsafe impl<T: Send, A: ElementAllocator<T> + Send> Send for RawBuffer<T, A> {}

// SAFETY: &RawBuffer only exposes the pointer value and &A.
unsafe impl<T: Sync, A: ElementAllocator<T> + Sync> Sync for RawBuffer<T, A> {}
