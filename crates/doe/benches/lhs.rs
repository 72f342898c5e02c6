use criterion::{criterion_group, criterion_main, Criterion};
use ndarray_rand::rand::SeedableRng;
use polychaos_doe::{Lhs, LhsKind};
use rand_xoshiro::Xoshiro256Plus;

fn criterion_lhs(c: &mut Criterion) {
    let dims = [3, 10];
    let sizes = [20, 100];

    let mut group = c.benchmark_group("doe");
    group.sample_size(10);
    let rng = Xoshiro256Plus::seed_from_u64(42);
    for dim in dims {
        for size in sizes {
            group.bench_function(format!("lhs-ese-{dim}-dim-{size}-size"), |b| {
                b.iter(|| {
                    std::hint::black_box(
                        Lhs::<f64, _>::new(dim)
                            .unwrap()
                            .kind(LhsKind::Optimized)
                            .with_rng(rng.clone())
                            .sample(size),
                    )
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, criterion_lhs);
criterion_main!(benches);
