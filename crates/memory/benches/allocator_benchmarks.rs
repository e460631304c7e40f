//! Allocator and array benchmarks
//!
//! Compares pool-backed and heap-backed storage for single values and
//! growing arrays

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tessera_memory::allocator::{
    ElementAllocator, HeapAllocator, PoolAllocator, PoolConfig, TrackedAllocator,
};
use tessera_memory::collections::DynArray;

/// Benchmark single allocation/deallocation cycle
fn bench_single_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_allocation");

    group.bench_function("pool_u64", |b| {
        let allocator = PoolAllocator::<u64>::with_config(PoolConfig::production()).unwrap();

        b.iter(|| unsafe {
            let ptr = allocator.allocate(1).unwrap();
            allocator.deallocate(ptr, 1);
            black_box(ptr);
        });
    });

    // Heap (baseline)
    group.bench_function("heap_u64", |b| {
        let allocator = HeapAllocator;

        b.iter(|| unsafe {
            let ptr = ElementAllocator::<u64>::allocate(&allocator, 1).unwrap();
            allocator.deallocate(ptr, 1);
            black_box(ptr);
        });
    });

    group.finish();
}

/// Benchmark many live slots, released in reverse
fn bench_batch_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_allocation");

    for count in [16usize, 256, 4096] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("pool", count), &count, |b, &count| {
            let allocator = PoolAllocator::<u64>::with_config(PoolConfig::performance()).unwrap();
            let mut ptrs = Vec::with_capacity(count);

            b.iter(|| unsafe {
                for _ in 0..count {
                    ptrs.push(allocator.allocate(1).unwrap());
                }
                while let Some(ptr) = ptrs.pop() {
                    allocator.deallocate(ptr, 1);
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("heap", count), &count, |b, &count| {
            let allocator = HeapAllocator;
            let mut ptrs = Vec::with_capacity(count);

            b.iter(|| unsafe {
                for _ in 0..count {
                    ptrs.push(ElementAllocator::<u64>::allocate(&allocator, 1).unwrap());
                }
                while let Some(ptr) = ptrs.pop() {
                    allocator.deallocate(ptr, 1);
                }
            });
        });
    }

    group.finish();
}

/// Benchmark pushing into a growing array
fn bench_array_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_push");

    for count in [100usize, 10_000, 1_000_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("dyn_array", count), &count, |b, &count| {
            b.iter(|| {
                let mut array = DynArray::new();
                for value in 0..count {
                    array.push(black_box(value));
                }
                black_box(array.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("tracked", count), &count, |b, &count| {
            b.iter(|| {
                let mut array = DynArray::new_in(TrackedAllocator::new(HeapAllocator));
                for value in 0..count {
                    array.push(black_box(value));
                }
                black_box(array.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("std_vec", count), &count, |b, &count| {
            b.iter(|| {
                let mut vec = Vec::with_capacity(32);
                for value in 0..count {
                    vec.push(black_box(value));
                }
                black_box(vec.len())
            });
        });
    }

    group.finish();
}

/// Benchmark single-slot arrays, the case the pool is built for
fn bench_small_arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("small_arrays");

    group.bench_function("pooled_capacity_1", |b| {
        let allocator = PoolAllocator::<u64>::new().unwrap();
        b.iter(|| {
            let mut array = DynArray::with_capacity_in(1, allocator.clone());
            array.push(black_box(7));
            black_box(array.pop())
        });
    });

    group.bench_function("heap_capacity_1", |b| {
        b.iter(|| {
            let mut array = DynArray::with_capacity(1);
            array.push(black_box(7u64));
            black_box(array.pop())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_allocation,
    bench_batch_allocation,
    bench_array_push,
    bench_small_arrays
);
criterion_main!(benches);
