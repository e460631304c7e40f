//! Growable containers generic over an element allocator

mod dyn_array;
mod iter;
pub(crate) mod raw_buffer;

pub use dyn_array::{DEFAULT_CAPACITY, DynArray, PooledArray};
pub use iter::IntoIter;
