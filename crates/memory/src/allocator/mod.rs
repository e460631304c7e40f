//!
//! Allocators for typed, count-based storage
//!
//! This module provides the storage strategies the containers are generic
//! over: the general heap, a block pool for single values, and a tracking
//! wrapper for leak checks.

mod heap;
mod stats;
mod tracked;
mod traits;

pub mod pool;

// Re-exports for convenience
pub use heap::HeapAllocator;
pub use pool::{Pool, PoolAllocator, PoolBox, PoolConfig, PoolStats};

pub use crate::error::{AllocError, AllocResult};
pub use stats::{AllocatorStats, AtomicAllocatorStats};
pub use tracked::TrackedAllocator;
pub use traits::{AllocationRoute, ElementAllocator, MemoryUsage, array_layout};
