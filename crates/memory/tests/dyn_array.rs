//! DynArray behaviour over both storage strategies

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tessera_memory::allocator::{HeapAllocator, PoolAllocator, PoolConfig, TrackedAllocator};
use tessera_memory::collections::{DEFAULT_CAPACITY, DynArray, PooledArray};
use tessera_memory::{MemoryError, dyn_array};

#[rstest]
#[case(0, 1)]
#[case(1, 2)]
#[case(5, 10)]
#[case(32, 64)]
fn push_past_capacity_doubles(#[case] initial: usize, #[case] expected: usize) {
    let mut array = DynArray::with_capacity(initial);
    for value in 0..=initial {
        array.push(value);
    }
    assert_eq!(array.capacity(), expected);
    assert_eq!(array.len(), initial + 1);
}

#[rstest]
#[case(0, 0)]
#[case(1, 2)]
#[case(2, 3)]
#[case(7, 11)]
#[case(20, 30)]
fn shrink_to_fit_targets_one_and_a_half(#[case] len: usize, #[case] expected: usize) {
    let mut array = DynArray::with_capacity(128);
    array.extend(0..len);
    array.shrink_to_fit();
    assert_eq!(array.capacity(), expected);
    assert_eq!(array.as_slice(), (0..len).collect::<Vec<_>>().as_slice());
}

#[rstest]
#[case(-1, Some('d'))]
#[case(-4, Some('a'))]
#[case(-5, None)]
#[case(0, Some('a'))]
#[case(3, Some('d'))]
#[case(4, None)]
fn at_accepts_negative_indices(#[case] index: isize, #[case] expected: Option<char>) {
    let array = dyn_array!['a', 'b', 'c', 'd'];
    assert_eq!(array.at(index).ok().copied(), expected);
}

#[test]
fn out_of_bounds_error_reports_index_and_length() {
    let array = dyn_array![1, 2];
    let err = array.at(-3).unwrap_err();
    assert_eq!(err, MemoryError::IndexOutOfBounds { index: -3, len: 2 });
    assert_eq!(err.code(), "MEM:ARRAY:INDEX");
    assert_eq!(err.to_string(), "Index -3 out of bounds for length 2");
}

#[test]
fn slice_indexing_and_iteration() {
    let mut array = dyn_array![1, 2, 3];
    array[0] = 10;
    for value in &mut array {
        *value += 1;
    }
    let doubled: Vec<i32> = array.iter().map(|v| v * 2).collect();
    assert_eq!(doubled, vec![22, 6, 8]);

    let owned: Vec<i32> = array.into_iter().rev().collect();
    assert_eq!(owned, vec![4, 3, 11]);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn slice_indexing_past_len_panics() {
    let array = DynArray::<u8>::new();
    let _ = array[0];
}

#[test]
fn conversions_keep_order() {
    let from_vec = DynArray::from(vec!["x", "y"]);
    let from_slice = DynArray::from(&["x", "y"][..]);
    let collected: DynArray<&str> = ["x", "y"].into_iter().collect();

    assert_eq!(from_vec, from_slice);
    assert_eq!(from_vec, collected);
    assert_eq!(from_vec.capacity(), 2);
    assert_eq!(collected.capacity(), DEFAULT_CAPACITY);
}

#[test]
fn equal_arrays_hash_alike() {
    let mut seen = HashSet::new();
    seen.insert(dyn_array![1u8, 2, 3]);
    assert!(seen.contains(&DynArray::from_slice(&[1u8, 2, 3])));
    assert!(!seen.contains(&dyn_array![3u8, 2, 1]));
}

#[test]
fn display_matches_bracket_list() {
    assert_eq!(dyn_array!["alpha", "beta"].to_string(), "[alpha, beta]");
    assert_eq!(format!("{:?}", dyn_array!["alpha"]), r#"["alpha"]"#);
}

#[test]
fn clone_round_trip_on_pooled_array() {
    let alloc = PoolAllocator::<String>::with_config(PoolConfig::debug()).unwrap();
    let mut original: PooledArray<String> = DynArray::with_capacity_in(1, alloc.clone());
    original.push("only".to_string());

    let copy = original.clone();
    assert_eq!(copy, original);
    assert_eq!(copy.allocator(), original.allocator());
    // Both single-slot buffers come from the shared pool.
    assert_eq!(alloc.outstanding(), 2);

    drop(original);
    drop(copy);
    assert_eq!(alloc.outstanding(), 0);
}

#[test]
fn pooled_array_moves_between_pool_and_heap() {
    let alloc = PoolAllocator::<u64>::new().unwrap();
    let mut array = DynArray::with_capacity_in(1, alloc.clone());
    array.push(1);
    assert_eq!(alloc.outstanding(), 1);

    array.extend([2, 3, 4]);
    assert_eq!(alloc.outstanding(), 0);
    assert_eq!(array.capacity(), 4);

    // One live value shrinks to two slots, which is still a heap buffer.
    while array.len() > 1 {
        array.pop();
    }
    array.shrink_to_fit();
    assert_eq!(array.capacity(), 2);
    assert_eq!(alloc.outstanding(), 0);
}

#[test]
fn tracked_heap_array_releases_everything() {
    let tracked = TrackedAllocator::new(HeapAllocator);
    let stats = tracked.stats_handle();
    {
        let mut array = DynArray::new_in(tracked);
        array.extend((0..100u64).map(|v| v.to_string()));
        array.shrink_to_fit();
        array.clear();
    }
    let snapshot = stats.snapshot();
    assert!(!snapshot.has_active_allocations());
    assert_eq!(snapshot.allocated_bytes, 0);
    assert_eq!(snapshot.allocation_count, snapshot.deallocation_count);
}

#[test]
fn filled_in_and_from_fn_in_use_the_given_allocator() {
    let alloc = PoolAllocator::<u8>::new().unwrap();
    let single = DynArray::filled_in(1, 5u8, alloc.clone());
    assert_eq!(single, [5]);
    assert_eq!(alloc.outstanding(), 1);

    let many = DynArray::from_fn_in(3, |i| i as u8, alloc.clone());
    assert_eq!(many, [0, 1, 2]);
    assert_eq!(alloc.outstanding(), 1);
}
