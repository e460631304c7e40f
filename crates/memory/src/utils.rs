//! Utility functions and helpers for tessera-memory
//!
//! - Memory alignment helpers
//! - Capacity arithmetic shared by the growable containers

/// Aligns a value up to the nearest multiple of alignment
///
/// # Examples
/// ```
/// use tessera_memory::utils::align_up;
///
/// assert_eq!(align_up(7, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// ```
#[inline(always)]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Checks if a value is a power of two
#[inline(always)]
pub const fn is_power_of_two(value: usize) -> bool {
    value != 0 && (value & (value - 1)) == 0
}

/// Capacity after one growth step: exactly double, starting from one slot
///
/// Returns `None` when doubling overflows `usize`.
///
/// ```
/// use tessera_memory::utils::grown_capacity;
///
/// assert_eq!(grown_capacity(32), Some(64));
/// assert_eq!(grown_capacity(0), Some(1));
/// assert_eq!(grown_capacity(usize::MAX), None);
/// ```
#[inline]
pub const fn grown_capacity(capacity: usize) -> Option<usize> {
    if capacity == 0 {
        Some(1)
    } else {
        capacity.checked_mul(2)
    }
}

/// Shrink target for a container holding `len` live elements: `ceil(len * 1.5)`
///
/// ```
/// use tessera_memory::utils::shrink_target;
///
/// assert_eq!(shrink_target(0), 0);
/// assert_eq!(shrink_target(3), 5);
/// assert_eq!(shrink_target(4), 6);
/// ```
#[inline]
pub const fn shrink_target(len: usize) -> usize {
    len.saturating_add(len.div_ceil(2))
}
