use ndarray_rand::rand::SeedableRng;
use polychaos_doe::{corr_score, phip, DistanceNorm, Lhs, LhsKind};
use rand_xoshiro::Xoshiro256Plus;

fn main() {
    let dim = 2;
    let n = 30;
    let rng = Xoshiro256Plus::seed_from_u64(42);

    println!("Take {n} samples in {dim} dimensions\n");
    for (label, kind) in [
        ("classic", LhsKind::Classic),
        ("correlation-optimized", LhsKind::Correlation),
        ("maximin", LhsKind::Maximin),
        ("ese-optimized", LhsKind::Optimized),
    ] {
        let design = Lhs::<f64, _>::new(dim)
            .unwrap()
            .kind(kind)
            .with_rng(rng.clone())
            .sample(n);
        println!(
            "*** {label} LHS: corr = {:.4}, phip = {:.4}",
            corr_score(&design),
            phip(&design, DistanceNorm::L2, 10)
        );
    }
}
