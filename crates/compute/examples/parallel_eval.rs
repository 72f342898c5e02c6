//! Runs the Ishigami benchmark over the same design in all three execution
//! modes and reports wall-clock time plus a cross-mode consistency check.

use std::time::Instant;

use ndarray_rand::rand::SeedableRng;
use polychaos_compute::{EvalMode, Evaluator, Ishigami};
use polychaos_doe::LhsKind;
use rand_xoshiro::Xoshiro256Plus;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let space = Ishigami::space();
    let rng = Xoshiro256Plus::seed_from_u64(42);
    let design = space.lhs_design(2000, LhsKind::Maximin, rng)?;

    let modes = [
        ("vectorized", Evaluator::new(EvalMode::Vectorized)),
        ("serial", Evaluator::new(EvalMode::Serial)),
        ("parallel(4)", Evaluator::new(EvalMode::Parallel).workers(4)?),
    ];

    let mut reference = None;
    for (name, evaluator) in modes {
        let start = Instant::now();
        let res = evaluator.evaluate(&Ishigami, &space, &design)?;
        let elapsed = start.elapsed();
        let drift = match &reference {
            None => 0.,
            Some(y0) => (&res.y - y0).iter().fold(0f64, |m, d| m.max(d.abs())),
        };
        println!("{name:12} {elapsed:>10.2?}  max drift vs vectorized: {drift:e}");
        reference.get_or_insert(res.y);
    }
    Ok(())
}
