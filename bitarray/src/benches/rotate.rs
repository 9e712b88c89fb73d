use bitarray::BitArray;
use criterion::{criterion_group, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_rotate(c: &mut Criterion) {
    for size in [64, 1 << 10, 1 << 14] {
        let mut rng = StdRng::seed_from_u64(size as u64);
        let bools: Vec<bool> = (0..size).map(|_| rng.gen()).collect();
        let array = BitArray::from_bools(&bools).unwrap();
        for n in [1, -3, (size / 2) as isize] {
            c.bench_function(&format!("{}/size={size} n={n}", module_path!()), |b| {
                b.iter_batched(
                    || array.clone(),
                    |mut array| array.rotate(n),
                    BatchSize::SmallInput,
                );
            });
        }
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_rotate,
}
