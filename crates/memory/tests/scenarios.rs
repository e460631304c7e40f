//! End-to-end scenarios over the pool allocator and DynArray

use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tessera_memory::allocator::{ElementAllocator, HeapAllocator, PoolAllocator, TrackedAllocator};
use tessera_memory::collections::{DEFAULT_CAPACITY, DynArray};
use tessera_memory::pool_config;

/// String that counts its destructor runs
#[derive(Debug)]
struct Counted {
    text: String,
    drops: Rc<Cell<usize>>,
}

impl Counted {
    fn new(text: &str, drops: &Rc<Cell<usize>>) -> Self {
        Self {
            text: text.to_owned(),
            drops: Rc::clone(drops),
        }
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[test]
fn million_pushes_then_pops_leave_no_leaks() {
    const COUNT: usize = 1_000_000;

    let tracked = TrackedAllocator::new(HeapAllocator);
    let stats = tracked.stats_handle();
    {
        let mut array = DynArray::new_in(tracked);
        assert_eq!(array.capacity(), DEFAULT_CAPACITY);

        for value in 0..COUNT as i32 {
            array.push(value);
        }
        assert_eq!(array.len(), COUNT);
        assert_eq!(array.capacity(), 1 << 20);

        let mut expected = COUNT as i32;
        while let Some(value) = array.pop() {
            expected -= 1;
            assert_eq!(value, expected);
        }
        assert_eq!(array.len(), 0);
        assert_eq!(expected, 0);
    }

    let snapshot = stats.snapshot();
    assert!(!snapshot.has_active_allocations());
    assert_eq!(snapshot.allocated_bytes, 0);
    // Initial buffer plus one reallocation per doubling from 32 to 2^20.
    assert_eq!(snapshot.allocation_count, 16);
    assert_eq!(snapshot.peak_allocated_bytes, ((1 << 19) + (1 << 20)) * 4);
}

#[test]
fn reverse_release_refills_the_free_list() {
    // 64-byte blocks hold 16 i32 slots: 50 values need 4 blocks.
    let alloc = PoolAllocator::<i32>::with_config(pool_config! { block_size: 64 }).unwrap();

    let first: Vec<NonNull<i32>> = (0..50).map(|_| alloc.allocate(1).unwrap()).collect();
    assert_eq!(alloc.block_count(), 4);
    assert_eq!(alloc.outstanding(), 50);

    for ptr in first.iter().rev() {
        unsafe { alloc.deallocate(*ptr, 1) };
    }
    assert_eq!(alloc.outstanding(), 0);

    let second: Vec<NonNull<i32>> = (0..50).map(|_| alloc.allocate(1).unwrap()).collect();
    assert_eq!(alloc.block_count(), 4);
    assert!(second.iter().all(|ptr| first.contains(ptr)));

    for ptr in second {
        unsafe { alloc.deallocate(ptr, 1) };
    }
}

#[test]
fn removed_value_is_dropped_exactly_once() {
    let drops = Rc::new(Cell::new(0));
    let mut array = DynArray::new();
    array.push(Counted::new("a", &drops));
    array.push(Counted::new("b", &drops));

    let removed = array.remove_at(0).unwrap();
    assert_eq!(removed.text, "a");
    assert_eq!(drops.get(), 0);
    drop(removed);
    assert_eq!(drops.get(), 1);

    assert_eq!(array.len(), 1);
    assert_eq!(array[0].text, "b");

    drop(array);
    assert_eq!(drops.get(), 2);
}

#[test]
fn clear_twice_is_safe() {
    let mut array = DynArray::<String>::new();
    array.clear();
    assert_eq!(array.len(), 0);
    assert_eq!(array.capacity(), DEFAULT_CAPACITY);

    array.clear();
    assert_eq!(array.len(), 0);
    assert_eq!(array.capacity(), DEFAULT_CAPACITY);
}

#[test]
fn moved_from_array_behaves_as_fresh() {
    let drops = Rc::new(Cell::new(0));
    let mut source = DynArray::new();
    for text in ["x", "y", "z"] {
        source.push(Counted::new(text, &drops));
    }

    let moved = std::mem::take(&mut source);
    assert_eq!(moved.len(), 3);
    assert!(source.is_empty());

    source.clear();
    drop(source);
    assert_eq!(drops.get(), 0);

    drop(moved);
    assert_eq!(drops.get(), 3);
}

#[test]
fn clone_never_aliases_the_source() {
    let original = DynArray::from_fn(10, |i| i.to_string());
    let copy = original.clone();

    assert_eq!(copy.len(), original.len());
    assert_eq!(copy, original);
    assert_ne!(copy.as_ptr(), original.as_ptr());
    for (a, b) in original.iter().zip(copy.iter()) {
        assert_ne!(a.as_ptr(), b.as_ptr());
    }
}
