use bitarray::BitArray;
use criterion::{criterion_group, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

fn bench_marshal(c: &mut Criterion) {
    for size in [64, 1 << 10, 1 << 14, 1 << 18] {
        let mut rng = StdRng::seed_from_u64(size as u64);
        let bools: Vec<bool> = (0..size).map(|_| rng.gen()).collect();
        let array = BitArray::from_bools(&bools).unwrap();
        c.bench_function(&format!("{}/fn=marshal size={size}", module_path!()), |b| {
            b.iter(|| black_box(&array).marshal());
        });

        let encoded = array.marshal();
        c.bench_function(&format!("{}/fn=unmarshal size={size}", module_path!()), |b| {
            b.iter(|| BitArray::unmarshal(black_box(&encoded)).unwrap());
        });
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_marshal,
}
