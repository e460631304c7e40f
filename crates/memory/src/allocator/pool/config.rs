//! Pool configuration

use crate::error::{MemoryError, MemoryResult};

/// Default size in bytes of one pool block
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Configuration for a block pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Requested size of each block in bytes
    ///
    /// Rounded down to a whole number of slots; a block always holds at least
    /// one slot, so slots larger than this get one block each.
    pub block_size: usize,

    /// Number of blocks allocated up front
    pub reserved_blocks: usize,

    /// Enable statistics tracking
    pub track_stats: bool,

    /// Fill pattern byte for newly allocated slots (for debugging)
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte for returned slots (for debugging)
    pub dealloc_pattern: Option<u8>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            reserved_blocks: 0,
            track_stats: cfg!(any(debug_assertions, feature = "stats")),
            alloc_pattern: if cfg!(debug_assertions) {
                Some(0xBB)
            } else {
                None
            },
            dealloc_pattern: if cfg!(debug_assertions) {
                Some(0xDD)
            } else {
                None
            },
        }
    }
}

impl PoolConfig {
    /// Production configuration - optimized for performance
    #[must_use]
    pub fn production() -> Self {
        Self {
            block_size: 16 * DEFAULT_BLOCK_SIZE,
            reserved_blocks: 1,
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
        }
    }

    /// Debug configuration - optimized for debugging
    #[must_use]
    pub fn debug() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            reserved_blocks: 0,
            track_stats: true,
            alloc_pattern: Some(0xBB),
            dealloc_pattern: Some(0xDD),
        }
    }

    /// Performance configuration - minimal overhead, small blocks
    #[must_use]
    pub fn performance() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            reserved_blocks: 0,
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
        }
    }

    /// Sets the block size in bytes
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the number of blocks reserved at construction
    #[must_use]
    pub fn with_reserved_blocks(mut self, reserved_blocks: usize) -> Self {
        self.reserved_blocks = reserved_blocks;
        self
    }

    /// Checks the configuration for values no pool can honour
    pub fn validate(&self) -> MemoryResult<()> {
        if self.block_size == 0 {
            return Err(MemoryError::invalid_pool_config("block size is zero"));
        }
        Ok(())
    }
}
