//! Public macros for tessera-memory

/// Create a [`DynArray`](crate::collections::DynArray) on the heap
///
/// # Examples
/// ```
/// use tessera_memory::dyn_array;
///
/// let empty: tessera_memory::collections::DynArray<u8> = dyn_array![];
/// assert_eq!(empty.capacity(), 32);
///
/// let zeros = dyn_array![0u8; 4];
/// assert_eq!(zeros, [0, 0, 0, 0]);
///
/// let words = dyn_array!["a", "b"];
/// assert_eq!(words.to_string(), "[a, b]");
/// ```
#[macro_export]
macro_rules! dyn_array {
    () => {
        $crate::collections::DynArray::new()
    };

    ($elem:expr; $n:expr) => {
        $crate::collections::DynArray::filled($n, $elem)
    };

    ($($x:expr),+ $(,)?) => {
        $crate::collections::DynArray::from([$($x),+])
    };
}

/// Create a pool configuration, filling unnamed fields from `Default`
///
/// # Examples
/// ```
/// use tessera_memory::pool_config;
///
/// let config = pool_config! {
///     block_size: 256,
///     reserved_blocks: 2,
/// };
/// assert_eq!(config.block_size, 256);
/// assert!(config.validate().is_ok());
/// ```
#[macro_export]
macro_rules! pool_config {
    ($($field:ident: $value:expr),* $(,)?) => {{
        $crate::allocator::PoolConfig {
            $($field: $value,)*
            ..::core::default::Default::default()
        }
    }};
}
