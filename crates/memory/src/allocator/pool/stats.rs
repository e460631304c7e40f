//! Pool statistics

/// Statistics for a block pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total slot allocations performed
    pub total_allocs: usize,
    /// Total slot deallocations performed
    pub total_deallocs: usize,
    /// Highest number of slots checked out at once
    pub peak_outstanding: usize,
    /// Slots currently checked out
    pub outstanding: usize,
    /// Distance in bytes between consecutive slots
    pub slot_stride: usize,
    /// Slots carved from each block
    pub slots_per_block: usize,
    /// Blocks owned by the pool
    pub block_count: usize,
    /// Slots currently on the free list
    pub free_slots: usize,
}

impl PoolStats {
    /// Total number of slots across all blocks
    pub fn total_slots(&self) -> usize {
        self.block_count * self.slots_per_block
    }

    /// Bytes currently handed out to callers
    pub fn current_usage(&self) -> usize {
        self.outstanding * self.slot_stride
    }

    /// Bytes at the high-water mark
    pub fn peak_usage(&self) -> usize {
        self.peak_outstanding * self.slot_stride
    }
}
