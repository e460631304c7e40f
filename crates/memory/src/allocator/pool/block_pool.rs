//! Block pool: fixed-size slots carved from lazily allocated blocks
//!
//! # Safety
//!
//! The pool owns every block it allocates and releases them only on drop:
//! - Blocks come from the global allocator with `block_layout`
//! - Each block is cut into `slots_per_block` slots, `slot_stride` bytes apart,
//!   every slot aligned to `element_align`
//! - Free slots live on a LIFO stack of addresses; a slot is either on the
//!   stack exactly once or checked out by a caller
//!
//! ## Invariants
//!
//! - `slot_stride` is a non-zero multiple of `element_align`
//! - `block_layout.size() == slot_stride * slots_per_block`, `slots_per_block >= 1`
//! - `free.len() + outstanding == blocks.len() * slots_per_block`
//! - Blocks are never resized; the pool never shrinks
//!
//! Returning a foreign or already-freed address is a caller contract
//! violation. Debug builds assert slot ownership; release builds do not check.

use core::alloc::Layout;
use core::ptr::{self, NonNull};
use std::alloc::{alloc, dealloc, handle_alloc_error};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use super::{PoolConfig, PoolStats};
use crate::allocator::MemoryUsage;
use crate::error::{MemoryError, MemoryResult};
use crate::utils::{align_up, is_power_of_two};

/// Pool of fixed-size memory slots
///
/// # Memory Layout
/// ```text
/// blocks: [Block0]              [Block1]              ...
///          ↓                     ↓
///         [s0][s1][s2]..[sN]    [s0][s1][s2]..[sN]
///
/// free:   [.. s2 s1 s0]  ← top of the stack is handed out next
/// ```
///
/// A new block is allocated only when the free stack is empty.
pub struct Pool {
    /// Size requested for one element
    element_size: usize,

    /// Alignment of every slot
    element_align: usize,

    /// Distance between consecutive slots in a block
    slot_stride: usize,

    /// Number of slots in one block
    slots_per_block: usize,

    /// Layout used for every block allocation
    block_layout: Layout,

    /// Owned blocks, released on drop
    blocks: Vec<NonNull<u8>>,

    /// Free slot addresses (LIFO)
    free: Vec<NonNull<u8>>,

    /// Configuration
    config: PoolConfig,

    /// Statistics (only tracked if enabled)
    total_allocs: usize,
    total_deallocs: usize,
    peak_outstanding: usize,
}

impl Pool {
    /// Creates a pool for slots of `element_size` bytes with the default config
    pub fn new(element_size: usize, element_align: usize) -> MemoryResult<Self> {
        Self::with_config(element_size, element_align, PoolConfig::default())
    }

    /// Creates a pool with custom configuration
    ///
    /// # Errors
    /// Returns an error if:
    /// - `element_size` is zero
    /// - `element_align` is not a power of two
    /// - the slot or block layout cannot be represented
    /// - `config` does not validate
    pub fn with_config(
        element_size: usize,
        element_align: usize,
        config: PoolConfig,
    ) -> MemoryResult<Self> {
        if element_size == 0 {
            return Err(MemoryError::invalid_layout("pool slot size must be non-zero"));
        }

        if !is_power_of_two(element_align) {
            return Err(MemoryError::invalid_alignment(element_align));
        }

        config.validate()?;

        let slot_layout = Layout::from_size_align(element_size, element_align)
            .map_err(|_| MemoryError::invalid_layout("slot layout exceeds isize::MAX"))?;
        let slot_stride = align_up(slot_layout.size(), element_align);

        // Round the requested block size down to whole slots, at least one.
        let slots_per_block = (config.block_size / slot_stride).max(1);
        let block_bytes = slot_stride
            .checked_mul(slots_per_block)
            .ok_or_else(|| MemoryError::size_overflow("pool block size"))?;
        let block_layout = Layout::from_size_align(block_bytes, element_align)
            .map_err(|_| MemoryError::invalid_layout("block layout exceeds isize::MAX"))?;

        let mut pool = Self {
            element_size,
            element_align,
            slot_stride,
            slots_per_block,
            block_layout,
            blocks: Vec::new(),
            free: Vec::new(),
            config,
            total_allocs: 0,
            total_deallocs: 0,
            peak_outstanding: 0,
        };

        pool.reserve_blocks(config.reserved_blocks);

        Ok(pool)
    }

    /// Creates a pool whose slots fit one `T`
    ///
    /// Zero-sized types get one-byte slots.
    pub fn for_type<T>(config: PoolConfig) -> MemoryResult<Self> {
        Self::with_config(size_of::<T>().max(1), align_of::<T>(), config)
    }

    /// Returns the element size the pool was created for
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Returns the alignment of every slot
    pub fn element_align(&self) -> usize {
        self.element_align
    }

    /// Returns the distance in bytes between consecutive slots
    pub fn slot_stride(&self) -> usize {
        self.slot_stride
    }

    /// Returns the number of slots carved from each block
    pub fn slots_per_block(&self) -> usize {
        self.slots_per_block
    }

    /// Returns the size in bytes of each block
    pub fn block_size(&self) -> usize {
        self.block_layout.size()
    }

    /// Returns the number of blocks owned by the pool
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the total number of slots across all blocks
    pub fn capacity(&self) -> usize {
        self.blocks.len() * self.slots_per_block
    }

    /// Returns the number of slots on the free list
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Returns the number of slots currently checked out
    pub fn outstanding(&self) -> usize {
        self.capacity() - self.free.len()
    }

    /// Returns the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Checks if a pointer is a slot boundary inside one of the pool's blocks
    pub fn contains(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        self.blocks.iter().any(|block| {
            let start = block.as_ptr() as usize;
            addr >= start
                && addr < start + self.block_layout.size()
                && (addr - start).is_multiple_of(self.slot_stride)
        })
    }

    /// Hands out one slot
    ///
    /// Pops the most recently returned slot; allocates and carves a new block
    /// when the free list is empty. The slot is uninitialised.
    ///
    /// Never returns null: block allocation failure aborts through
    /// [`handle_alloc_error`].
    pub fn allocate(&mut self) -> NonNull<u8> {
        loop {
            if let Some(slot) = self.free.pop() {
                self.on_allocate(slot);
                return slot;
            }
            self.grow();
        }
    }

    /// Returns a slot to the free list
    ///
    /// # Safety
    /// - `ptr` must have been returned by [`allocate`](Self::allocate) on this pool
    /// - `ptr` must not already be on the free list (no double free)
    /// - the caller must not use `ptr` afterwards
    pub unsafe fn deallocate(&mut self, ptr: NonNull<u8>) {
        debug_assert!(
            self.contains(ptr.as_ptr()),
            "pointer {ptr:p} does not belong to this pool"
        );

        if let Some(pattern) = self.config.dealloc_pattern {
            // SAFETY: caller contract: ptr is a checked-out slot of this pool,
            // valid for slot_stride bytes.
            unsafe { ptr::write_bytes(ptr.as_ptr(), pattern, self.slot_stride) };
        }

        self.free.push(ptr);

        if self.config.track_stats {
            self.total_deallocs += 1;
        }
    }

    /// Allocates `count` additional blocks ahead of demand
    pub fn reserve_blocks(&mut self, count: usize) {
        for _ in 0..count {
            self.grow();
        }
    }

    /// Get statistics (if tracking is enabled)
    pub fn stats(&self) -> Option<PoolStats> {
        if !self.config.track_stats {
            return None;
        }

        Some(PoolStats {
            total_allocs: self.total_allocs,
            total_deallocs: self.total_deallocs,
            peak_outstanding: self.peak_outstanding,
            outstanding: self.outstanding(),
            slot_stride: self.slot_stride,
            slots_per_block: self.slots_per_block,
            block_count: self.blocks.len(),
            free_slots: self.free.len(),
        })
    }

    fn on_allocate(&mut self, slot: NonNull<u8>) {
        if let Some(pattern) = self.config.alloc_pattern {
            // SAFETY: slot was just taken off the free list, so it is an
            // unused slot of one of our blocks, valid for slot_stride bytes.
            unsafe { ptr::write_bytes(slot.as_ptr(), pattern, self.slot_stride) };
        }

        if self.config.track_stats {
            self.total_allocs += 1;
            self.peak_outstanding = self.peak_outstanding.max(self.outstanding());
        }
    }

    /// Allocates one block and pushes its slots onto the free list
    fn grow(&mut self) {
        // SAFETY: block_layout has non-zero size (slot_stride > 0, slots >= 1).
        let raw = unsafe { alloc(self.block_layout) };
        let Some(block) = NonNull::new(raw) else {
            handle_alloc_error(self.block_layout);
        };

        self.blocks.push(block);
        self.free.reserve(self.slots_per_block);

        // Push in reverse so the lowest address is handed out first.
        for index in (0..self.slots_per_block).rev() {
            // SAFETY: index * slot_stride < block_layout.size(), so the offset
            // stays inside the block just allocated.
            let slot = unsafe { block.add(index * self.slot_stride) };
            self.free.push(slot);
        }

        #[cfg(feature = "logging")]
        debug!(
            blocks = self.blocks.len(),
            block_size = self.block_layout.size(),
            slots_per_block = self.slots_per_block,
            "pool grew by one block"
        );
    }
}

impl MemoryUsage for Pool {
    fn used_memory(&self) -> usize {
        self.outstanding() * self.slot_stride
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.free.len() * self.slot_stride)
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.blocks.len() * self.block_layout.size())
    }
}

impl core::fmt::Debug for Pool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pool")
            .field("element_size", &self.element_size)
            .field("element_align", &self.element_align)
            .field("slot_stride", &self.slot_stride)
            .field("slots_per_block", &self.slots_per_block)
            .field("block_count", &self.blocks.len())
            .field("free_slots", &self.free.len())
            .finish()
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        #[cfg(feature = "logging")]
        trace!(
            blocks = self.blocks.len(),
            outstanding = self.outstanding(),
            "releasing pool blocks"
        );

        for block in self.blocks.drain(..) {
            // SAFETY: every block was allocated in `grow` with block_layout
            // and is released exactly once here.
            unsafe { dealloc(block.as_ptr(), self.block_layout) };
        }
    }
}

// SAFETY: Pool exclusively owns its blocks; the raw addresses it stores point
// into memory nobody else frees, so moving the pool to another thread moves
// that ownership with it. Pool is not Sync: every mutation needs &mut.
unsafe impl Send for Pool {}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(block_size: usize) -> PoolConfig {
        PoolConfig::debug().with_block_size(block_size)
    }

    #[test]
    fn test_pool_is_lazy() {
        let pool = Pool::with_config(16, 8, small_config(64)).unwrap();
        assert_eq!(pool.block_count(), 0);
        assert_eq!(pool.free_slots(), 0);
        assert_eq!(pool.slots_per_block(), 4);
    }

    #[test]
    fn test_first_allocation_carves_one_block() {
        let mut pool = Pool::with_config(16, 8, small_config(64)).unwrap();
        let slot = pool.allocate();

        assert_eq!(pool.block_count(), 1);
        assert_eq!(pool.free_slots(), 3);
        assert_eq!(pool.outstanding(), 1);
        assert!(pool.contains(slot.as_ptr()));

        unsafe { pool.deallocate(slot) };
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_slots_are_aligned_and_distinct() {
        let mut pool = Pool::with_config(12, 16, small_config(256)).unwrap();
        assert_eq!(pool.slot_stride(), 16);

        let slots: Vec<_> = (0..40).map(|_| pool.allocate()).collect();
        for slot in &slots {
            assert_eq!(slot.as_ptr() as usize % 16, 0);
        }
        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                assert_ne!(a, b);
            }
        }

        for slot in slots {
            unsafe { pool.deallocate(slot) };
        }
        assert_eq!(pool.free_slots(), pool.capacity());
    }

    #[test]
    fn test_lifo_reuse() {
        let mut pool = Pool::new(32, 8).unwrap();
        let a = pool.allocate();
        let b = pool.allocate();
        unsafe {
            pool.deallocate(a);
            pool.deallocate(b);
        }
        assert_eq!(pool.allocate(), b);
        assert_eq!(pool.allocate(), a);
    }

    #[test]
    fn test_slot_larger_than_block_gets_its_own_block() {
        let mut pool = Pool::with_config(100, 4, small_config(64)).unwrap();
        assert_eq!(pool.slots_per_block(), 1);
        assert_eq!(pool.block_size(), 100);

        let _a = pool.allocate();
        let _b = pool.allocate();
        assert_eq!(pool.block_count(), 2);
    }

    #[test]
    fn test_reserved_blocks_are_allocated_up_front() {
        let config = small_config(64).with_reserved_blocks(3);
        let pool = Pool::with_config(8, 8, config).unwrap();
        assert_eq!(pool.block_count(), 3);
        assert_eq!(pool.free_slots(), 24);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        assert_eq!(Pool::new(0, 8).unwrap_err().code(), "MEM:ALLOC:LAYOUT");
        assert_eq!(Pool::new(8, 3).unwrap_err().code(), "MEM:ALLOC:ALIGN");
        assert_eq!(
            Pool::with_config(8, 8, PoolConfig::default().with_block_size(0))
                .unwrap_err()
                .code(),
            "MEM:CONFIG:INVALID"
        );
    }

    #[test]
    fn test_debug_patterns_are_written() {
        let mut pool = Pool::with_config(8, 8, small_config(64)).unwrap();
        let slot = pool.allocate();
        unsafe {
            assert_eq!(*slot.as_ptr(), 0xBB);
            pool.deallocate(slot);
            assert_eq!(*slot.as_ptr(), 0xDD);
        }
    }

    #[test]
    fn test_stats_track_peak() {
        let mut pool = Pool::with_config(8, 8, small_config(64)).unwrap();
        let slots: Vec<_> = (0..5).map(|_| pool.allocate()).collect();
        for slot in slots {
            unsafe { pool.deallocate(slot) };
        }
        let _again = pool.allocate();

        let stats = pool.stats().unwrap();
        assert_eq!(stats.total_allocs, 6);
        assert_eq!(stats.total_deallocs, 5);
        assert_eq!(stats.peak_outstanding, 5);
        assert_eq!(stats.outstanding, 1);
        assert_eq!(stats.block_count, 1);
        assert_eq!(stats.total_slots(), 8);
    }

    #[test]
    fn test_stats_disabled() {
        let pool = Pool::with_config(8, 8, PoolConfig::performance()).unwrap();
        assert!(pool.stats().is_none());
    }

    #[test]
    fn test_memory_usage() {
        let mut pool = Pool::with_config(16, 8, small_config(64)).unwrap();
        let _slot = pool.allocate();
        assert_eq!(pool.used_memory(), 16);
        assert_eq!(pool.available_memory(), Some(48));
        assert_eq!(pool.total_memory(), Some(64));
        assert_eq!(pool.memory_usage_percent(), Some(25.0));
    }
}
