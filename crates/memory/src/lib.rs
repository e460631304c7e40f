//! # tessera-memory
//!
//! Pool-backed element allocation and a growable array generic over its
//! storage strategy.
//!
//! This crate provides:
//! - [`Pool`](allocator::Pool): fixed-size slots carved out of lazily
//!   allocated blocks, recycled through a LIFO free list
//! - [`PoolAllocator`](allocator::PoolAllocator): single-value requests go to
//!   a shared pool, multi-value requests go straight to the heap
//! - [`DynArray`](collections::DynArray): a contiguous growable array that
//!   doubles on growth and shrinks to one and a half times its length
//! - [`TrackedAllocator`](allocator::TrackedAllocator): allocation counters
//!   for leak checks
//!
//! ## Quick Start
//!
//! ```rust
//! use tessera_memory::prelude::*;
//!
//! let mut numbers = DynArray::new();
//! numbers.extend([3, 1, 4]);
//! assert_eq!(numbers.to_string(), "[3, 1, 4]");
//!
//! // One-slot buffers come from the pool
//! let alloc = PoolAllocator::<u64>::new()?;
//! let mut pooled = DynArray::with_capacity_in(1, alloc.clone());
//! pooled.push(42);
//! assert_eq!(alloc.outstanding(), 1);
//! # Ok::<(), MemoryError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): Structured diagnostics through `tracing`
//! - `stats`: Pool statistics in release builds

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::perf)]
#![warn(clippy::pedantic)]
#![warn(rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
// Precision loss in usize -> f64 casts is acceptable for stats
#![allow(clippy::cast_precision_loss)]
// Index arithmetic casts between usize and isize are checked per site
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::inline_always)]
// Slots are handed out as *mut u8 and cast to the element type
#![allow(clippy::cast_ptr_alignment)]
#![allow(clippy::return_self_not_must_use)]

// Error types
pub mod error;

// Core modules
pub mod allocator;
pub mod collections;
pub mod utils;

mod macros;

// Re-export core types for convenience
pub use crate::error::{MemoryError, MemoryResult, Result};

// Re-export allocator types at crate root for convenience
pub use crate::allocator::{AllocError, AllocResult};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Error types
    pub use crate::error::{MemoryError, MemoryResult, Result};

    // Allocator types
    pub use crate::allocator::{
        AllocError, AllocResult, ElementAllocator, HeapAllocator, MemoryUsage, Pool,
        PoolAllocator, PoolBox, PoolConfig, TrackedAllocator,
    };

    // Containers
    pub use crate::collections::{DynArray, PooledArray};

    pub use crate::{dyn_array, pool_config};
}
