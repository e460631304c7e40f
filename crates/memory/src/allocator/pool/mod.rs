//! Pool allocator implementation
//!
//! A block pool for fixed-size slots with a LIFO free list, and a typed
//! allocator that routes single values to the pool and arrays to the heap.
//!
//! ## Modules
//! - `block_pool` - `Pool`: block ownership, slot carving, free list
//! - `allocator` - `PoolAllocator<T>`: count-based routing over a shared pool
//! - `config` - Configuration variants (production, debug, performance)
//! - `pool_box` - RAII smart pointer for pool-allocated values
//! - `stats` - Statistics tracking types

pub mod allocator;
pub mod block_pool;
pub mod config;
pub mod pool_box;
pub mod stats;

pub use allocator::PoolAllocator;
pub use block_pool::Pool;
pub use config::{DEFAULT_BLOCK_SIZE, PoolConfig};
pub use pool_box::PoolBox;
pub use stats::PoolStats;
