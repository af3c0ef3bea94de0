// benches/append.rs

use count_array::CountArray;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};

const SEGMENT_BITS: u64 = 64 * 8192;

fn suffixes(width: u32, count: usize) -> Vec<u64> {
    let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
    let mut rng = StdRng::seed_from_u64(0x6D65_7279);
    (0..count).map(|_| rng.random::<u64>() & mask).collect()
}

fn create_array(width: u32, values: &[u64]) -> CountArray {
    let mut array = CountArray::new();
    array.initialize(0, width, SEGMENT_BITS).unwrap();
    for &v in values {
        array.add(v).unwrap();
    }
    array
}

fn bench_add(c: &mut Criterion) {
    let widths = vec![7, 17, 31, 64];

    let mut group = c.benchmark_group("add");
    for width in widths {
        let values = suffixes(width, 100_000);

        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| {
                let mut array = CountArray::new();
                let mut budget = array.initialize(0, width, SEGMENT_BITS).unwrap();
                for &v in &values {
                    budget += array.add(black_box(v)).unwrap();
                }
                budget
            });
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let widths = vec![7, 17, 31, 64];

    let mut group = c.benchmark_group("get");
    for width in widths {
        let values = suffixes(width, 100_000);
        let array = create_array(width, &values);

        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| {
                let mut sum = 0u64;
                for i in 0..array.len() {
                    sum = sum.wrapping_add(black_box(array.get(i).unwrap()));
                }
                sum
            });
        });
    }
    group.finish();
}

fn bench_linearize(c: &mut Criterion) {
    let values = suffixes(31, 100_000);

    c.bench_function("linearize_31", |b| {
        b.iter_batched(
            || create_array(31, &values),
            |mut array| array.linearize().unwrap(),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_add, bench_get, bench_linearize);
criterion_main!(benches);
