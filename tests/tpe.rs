//! End-to-end runs of the TPE optimizer.

use std::cell::Cell;
use std::ops::ControlFlow;

use quickopt::prelude::*;


fn quiet(min: Vec<f64>, max: Vec<f64>, seed: u64) -> TpeOptimizerBuilder {
    TpeOptimizer::builder(min, max).verbose(false).rng_seed(seed)
}

// =============================================================================
// Small 1D run: terminates, stays in bounds, improves on the worst seed draw
// =============================================================================

#[test]
fn test_small_run_beats_worst_seed() {
    let optimizer = quiet(vec![0.0], vec![10.0], 2024)
        .samples(5)
        .iterations(5)
        .acquisition_samples(50)
        .build()
        .unwrap();

    let mut values = Vec::new();
    let optimum = optimizer
        .optimize(|x: &[f64]| {
            let v = test_functions::shifted_parabola(x);
            values.push(v);
            Ok::<_, Error>(v)
        })
        .unwrap();

    assert_eq!(values.len(), 5 + 4);
    assert!((0.0..=10.0).contains(&optimum.params[0]));

    let worst_seed = values[..5].iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert!(
        optimum.value < worst_seed,
        "best {} should beat the worst seed value {worst_seed}",
        optimum.value
    );

    let lowest = values.iter().copied().fold(f64::INFINITY, f64::min);
    assert!((optimum.value - lowest).abs() < f64::EPSILON);
}

#[test]
fn test_tpe_finds_parabola_minimum() {
    let optimizer = quiet(vec![-10.0], vec![10.0], 42).iterations(60).build().unwrap();

    let optimum = optimizer
        .optimize(|x: &[f64]| Ok::<_, Error>((x[0] - 3.0).powi(2)))
        .unwrap();

    assert!(
        optimum.value < 1.0,
        "TPE should find near-optimal: best value {} should be < 1.0",
        optimum.value
    );
    assert!((optimum.params[0] - 3.0).abs() < 1.0);
}

#[test]
fn test_tpe_multivariate_sphere() {
    let optimizer = quiet(vec![-5.0, -5.0], vec![5.0, 5.0], 123)
        .iterations(100)
        .build()
        .unwrap();

    let optimum = optimizer
        .optimize(|x: &[f64]| Ok::<_, Error>(test_functions::sphere(x)))
        .unwrap();

    assert!(
        optimum.value < 5.0,
        "best value {} should be < 5.0",
        optimum.value
    );
    assert_eq!(optimum.evaluations, 10 + 99);
}

#[test]
fn test_free_function_uses_defaults() {
    let calls = Cell::new(0);
    let optimum = quickopt::optimize(
        |x: &[f64]| {
            calls.set(calls.get() + 1);
            Ok::<_, Error>(x[0].abs())
        },
        vec![-1.0],
        vec![1.0],
    )
    .unwrap();

    // 10 seed draws, then 99 adaptive iterations
    assert_eq!(calls.get(), 109);
    assert_eq!(optimum.evaluations, 109);
}

#[test]
fn test_fixed_bandwidth_and_split() {
    let optimizer = quiet(vec![0.0, 0.0], vec![1.0, 1.0], 5)
        .bandwidth(vec![0.05, 0.05])
        .split(0.25)
        .iterations(40)
        .build()
        .unwrap();

    let optimum = optimizer
        .optimize(|x: &[f64]| Ok::<_, Error>((x[0] - 0.2).powi(2) + (x[1] - 0.8).powi(2)))
        .unwrap();
    assert!(optimizer.space().contains(&optimum.params));
    assert!(optimum.value < 0.5);
}

#[test]
fn test_zero_prior_weight_still_runs() {
    let optimizer = quiet(vec![0.0], vec![10.0], 8)
        .prior_weight(0.0)
        .iterations(20)
        .build()
        .unwrap();
    let optimum = optimizer
        .optimize(|x: &[f64]| Ok::<_, Error>(test_functions::shifted_parabola(x)))
        .unwrap();
    assert_eq!(optimum.evaluations, 29);
}

// =============================================================================
// Seed points
// =============================================================================

#[test]
fn test_seed_points_fill_the_dataset_first() {
    let seeds = vec![(vec![1.0], 36.0), (vec![9.0], 4.0), (vec![6.5], 0.25)];
    let optimizer = quiet(vec![0.0], vec![10.0], 1)
        .samples(5)
        .iterations(3)
        .seed_points(seeds)
        .build()
        .unwrap();

    let calls = Cell::new(0);
    let optimum = optimizer
        .optimize(|x: &[f64]| {
            calls.set(calls.get() + 1);
            Ok::<_, Error>(test_functions::shifted_parabola(x))
        })
        .unwrap();

    // 2 random draws complete the seeding, then 2 adaptive iterations
    assert_eq!(calls.get(), 4);
    assert_eq!(optimum.evaluations, 7);
    assert!(optimum.value <= 0.25);
    // The seed values head the best-value history
    assert_eq!(&optimum.best_history[..3], &[36.0, 4.0, 0.25]);
}

#[test]
fn test_samples_entirely_from_seed_points() {
    let seeds = vec![(vec![2.0], 25.0), (vec![8.0], 1.0)];
    let optimizer = quiet(vec![0.0], vec![10.0], 1)
        .samples(2)
        .threshold(1.0)
        .iterations(4)
        .seed_points(seeds)
        .build()
        .unwrap();

    let calls = Cell::new(0);
    optimizer
        .optimize(|x: &[f64]| {
            calls.set(calls.get() + 1);
            Ok::<_, Error>(test_functions::shifted_parabola(x))
        })
        .unwrap();
    assert_eq!(calls.get(), 3);
}

// =============================================================================
// Errors and cancellation
// =============================================================================

#[derive(Debug, PartialEq)]
enum SimError {
    Diverged(usize),
    Optimizer(String),
}

impl From<Error> for SimError {
    fn from(e: Error) -> Self {
        SimError::Optimizer(e.to_string())
    }
}

#[test]
fn test_objective_error_propagates_unchanged() {
    let optimizer = quiet(vec![0.0], vec![1.0], 3).iterations(20).build().unwrap();

    let mut calls = 0;
    let result = optimizer.optimize(|x: &[f64]| {
        calls += 1;
        if calls == 12 {
            Err(SimError::Diverged(calls))
        } else {
            Ok(x[0])
        }
    });

    assert_eq!(result, Err(SimError::Diverged(12)));
    assert_eq!(calls, 12);
}

#[test]
fn test_objective_error_during_seeding() {
    let optimizer = quiet(vec![0.0], vec![1.0], 3).build().unwrap();
    let result = optimizer.optimize(|_: &[f64]| Err::<f64, _>(SimError::Diverged(0)));
    assert_eq!(result, Err(SimError::Diverged(0)));
}

#[test]
fn test_model_collapse_is_reported() {
    let optimizer = quiet(vec![0.0], vec![1.0], 3).iterations(5).build().unwrap();
    let result = optimizer.optimize(|_: &[f64]| Ok::<_, SimError>(3.0));
    match result {
        Err(SimError::Optimizer(msg)) => assert!(msg.contains("degenerate"), "{msg}"),
        other => panic!("expected a degenerate group error, got {other:?}"),
    }
}

struct Budget<'a> {
    remaining: usize,
    seen: &'a mut Vec<Progress>,
}

impl Objective for Budget<'_> {
    type Error = Error;

    fn evaluate(&mut self, x: &[f64]) -> Result<f64> {
        Ok(test_functions::sphere(x))
    }

    fn before_iteration(&mut self, progress: &Progress) -> ControlFlow<()> {
        self.seen.push(progress.clone());
        if self.remaining == 0 {
            return ControlFlow::Break(());
        }
        self.remaining -= 1;
        ControlFlow::Continue(())
    }
}

#[test]
fn test_before_iteration_stops_the_run() {
    let optimizer = quiet(vec![-1.0; 3], vec![1.0; 3], 17).iterations(50).build().unwrap();

    let mut seen = Vec::new();
    let budget = Budget {
        remaining: 4,
        seen: &mut seen,
    };
    let optimum = optimizer.optimize(budget).unwrap();

    assert_eq!(optimum.evaluations, 10 + 4);
    assert_eq!(seen.len(), 5);
    for (i, progress) in seen.iter().enumerate() {
        assert_eq!(progress.iteration, i + 1);
        assert_eq!(progress.evaluations, 10 + i);
        assert!(progress.best_value <= progress.last_value);
    }
}

#[test]
fn test_nested_run_from_objective() {
    let optimizer = quiet(vec![0.0], vec![1.0], 9)
        .samples(3)
        .threshold(1.0)
        .iterations(3)
        .build()
        .unwrap();

    let optimum = optimizer
        .optimize(|x: &[f64]| {
            let inner = optimizer.optimize(|y: &[f64]| Ok::<_, Error>((y[0] - x[0]).abs()))?;
            Ok::<_, Error>(x[0] + inner.value)
        })
        .unwrap();
    assert_eq!(optimum.evaluations, 5);
}

#[test]
fn test_random_search_baseline() {
    let search = RandomSearch::new(vec![0.0], vec![10.0], 30).unwrap().with_seed(4);
    let optimum = search
        .optimize(|x: &[f64]| Ok::<_, Error>(test_functions::shifted_parabola(x)))
        .unwrap();
    assert_eq!(optimum.evaluations, 30);
    assert!(search.space().contains(&optimum.params));
}
