//! The search strategy contract plus the two sampling-only strategies.

use od_types::{
    config_error, OdResult, OptimizerEvaluationResult, RawOptimizerOutcome, StrategyError,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::space::{sample_point, ParameterSpec};

/// Per-candidate cost function a strategy drives. Smaller errors are better.
pub type CostFunction<'a> = dyn Fn(&[f64]) -> OdResult<OptimizerEvaluationResult> + 'a;

/// Upper bound on the number of points a grid may enumerate.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Common trait for all search strategies.
pub trait SearchStrategy: Send + Sync {
    /// Run to completion and return every evaluation performed, in order.
    fn optimize(&self, cost: &CostFunction<'_>) -> OdResult<Vec<OptimizerEvaluationResult>>;

    /// Human-readable strategy name.
    fn name(&self) -> &str;

    /// Run to completion and return the lowest finite error found.
    fn optimize_best(&self, cost: &CostFunction<'_>) -> OdResult<RawOptimizerOutcome> {
        let results = self.optimize(cost)?;
        best_of(self.name(), results)
    }
}

/// Pick the evaluation with the lowest finite error. Ties keep the earliest.
pub fn best_of(
    strategy: &str,
    results: Vec<OptimizerEvaluationResult>,
) -> OdResult<RawOptimizerOutcome> {
    let evaluations = results.len();
    let non_finite = results.iter().filter(|r| !r.error.is_finite()).count();
    if non_finite > 0 {
        warn!(
            "{} discarded {} of {} evaluations with non-finite error",
            strategy, non_finite, evaluations
        );
    }

    let best = results
        .into_iter()
        .filter(|r| r.error.is_finite())
        .min_by(|a, b| a.error.total_cmp(&b.error))
        .ok_or_else(|| StrategyError::NoResults {
            strategy: strategy.to_string(),
        })?;

    Ok(RawOptimizerOutcome {
        parameter_set: best.parameter_set,
        error: best.error,
        evaluations,
    })
}

pub(crate) fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

// ---- Random search ----

/// Independent uniform sampling across the parameter space.
#[derive(Debug, Clone)]
pub struct RandomSearch {
    space: Vec<ParameterSpec>,
    iterations: usize,
    seed: u64,
}

impl RandomSearch {
    pub fn new(space: Vec<ParameterSpec>, iterations: usize, seed: u64) -> Self {
        Self {
            space,
            iterations,
            seed,
        }
    }
}

impl SearchStrategy for RandomSearch {
    fn optimize(&self, cost: &CostFunction<'_>) -> OdResult<Vec<OptimizerEvaluationResult>> {
        let mut rng = seeded_rng(self.seed);
        let mut results = Vec::with_capacity(self.iterations);
        for _ in 0..self.iterations {
            let point = sample_point(&self.space, &mut rng);
            results.push(cost(&point)?);
        }
        debug!("RandomSearch evaluated {} points", results.len());
        Ok(results)
    }

    fn name(&self) -> &str {
        "RandomSearch"
    }
}

// ---- Grid search ----

/// Exhaustive grid search over the parameter space.
#[derive(Debug, Clone)]
pub struct GridSearch {
    points: Vec<Vec<f64>>,
}

impl GridSearch {
    pub fn new(space: &[ParameterSpec], float_steps: usize) -> OdResult<Self> {
        let mut total: usize = 1;
        for spec in space {
            total = total
                .checked_mul(spec.grid_len(float_steps))
                .filter(|n| *n <= MAX_GRID_POINTS)
                .ok_or_else(|| {
                    config_error!("grid exceeds {} points for this parameter space", MAX_GRID_POINTS)
                })?;
        }

        let axes: Vec<Vec<f64>> = space.iter().map(|p| p.grid_values(float_steps)).collect();

        // Cartesian product, first dimension varying slowest.
        let mut points: Vec<Vec<f64>> = vec![Vec::with_capacity(axes.len())];
        for axis in &axes {
            let mut next = Vec::with_capacity(points.len() * axis.len());
            for existing in &points {
                for value in axis {
                    let mut point = existing.clone();
                    point.push(*value);
                    next.push(point);
                }
            }
            points = next;
        }

        Ok(Self { points })
    }

    pub fn grid_size(&self) -> usize {
        self.points.len()
    }
}

impl SearchStrategy for GridSearch {
    fn optimize(&self, cost: &CostFunction<'_>) -> OdResult<Vec<OptimizerEvaluationResult>> {
        self.points.iter().map(|point| cost(point)).collect()
    }

    fn name(&self) -> &str {
        "GridSearch"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::space::ParameterType;
    use od_types::{objective_error, ErrorCategory};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) fn sum_cost(point: &[f64]) -> OdResult<OptimizerEvaluationResult> {
        Ok(OptimizerEvaluationResult::new(point.to_vec(), point.iter().sum()))
    }

    pub(crate) fn sphere_cost(point: &[f64]) -> OdResult<OptimizerEvaluationResult> {
        Ok(OptimizerEvaluationResult::new(point.to_vec(), point.iter().map(|x| x * x).sum()))
    }

    pub(crate) fn in_bounds(space: &[ParameterSpec], point: &[f64]) -> bool {
        space.len() == point.len()
            && space
                .iter()
                .zip(point)
                .all(|(spec, v)| *v >= spec.min && *v <= spec.max)
    }

    fn sample_space() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::new("a", 0.0, 1.0, ParameterType::Continuous),
            ParameterSpec::new("b", 0.0, 10.0, ParameterType::Continuous),
        ]
    }

    #[test]
    fn random_search_evaluates_requested_count() {
        let calls = AtomicUsize::new(0);
        let cost = |p: &[f64]| {
            calls.fetch_add(1, Ordering::SeqCst);
            sum_cost(p)
        };

        let results = RandomSearch::new(sample_space(), 50, 42).optimize(&cost).unwrap();
        assert_eq!(results.len(), 50);
        assert_eq!(calls.load(Ordering::SeqCst), 50);
        assert!(results.iter().all(|r| in_bounds(&sample_space(), &r.parameter_set)));
    }

    #[test]
    fn random_search_is_deterministic() {
        let search = RandomSearch::new(sample_space(), 20, 42);
        let first = search.optimize_best(&sum_cost).unwrap();
        let second = search.optimize_best(&sum_cost).unwrap();
        assert_eq!(first, second);

        let other_seed = RandomSearch::new(sample_space(), 20, 7).optimize_best(&sum_cost).unwrap();
        assert_ne!(first.parameter_set, other_seed.parameter_set);
    }

    #[test]
    fn grid_search_produces_correct_count() {
        let space = vec![
            ParameterSpec::new("a", 1.0, 3.0, ParameterType::Discrete),
            ParameterSpec::new("b", 10.0, 11.0, ParameterType::Discrete),
        ];
        let grid = GridSearch::new(&space, 5).unwrap();
        assert_eq!(grid.grid_size(), 6);

        let results = grid.optimize(&sum_cost).unwrap();
        assert_eq!(results[0].parameter_set, vec![1.0, 10.0]);
        assert_eq!(results[1].parameter_set, vec![1.0, 11.0]);
        assert_eq!(results[5].parameter_set, vec![3.0, 11.0]);
    }

    #[test]
    fn grid_search_finds_corner_minimum() {
        let best = GridSearch::new(&sample_space(), 5)
            .unwrap()
            .optimize_best(&sum_cost)
            .unwrap();
        assert_eq!(best.parameter_set, vec![0.0, 0.0]);
        assert_eq!(best.error, 0.0);
        assert_eq!(best.evaluations, 25);
    }

    #[test]
    fn grid_search_rejects_huge_grids() {
        let space = vec![
            ParameterSpec::new("a", 0.0, 10_000.0, ParameterType::Discrete),
            ParameterSpec::new("b", 0.0, 10_000.0, ParameterType::Discrete),
        ];
        let err = GridSearch::new(&space, 5).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn grid_search_rejects_single_wide_axis() {
        for max in [2_000_000.0, (1i64 << 62) as f64] {
            let space = vec![ParameterSpec::new("a", 0.0, max, ParameterType::Discrete)];
            let err = GridSearch::new(&space, 5).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Configuration);
        }

        let space = vec![ParameterSpec::new("a", 1.0, 1_000_000.0, ParameterType::Discrete)];
        assert_eq!(GridSearch::new(&space, 5).unwrap().grid_size(), MAX_GRID_POINTS);
    }

    #[test]
    fn best_of_skips_non_finite() {
        let results = vec![
            OptimizerEvaluationResult::new(vec![1.0], f64::NAN),
            OptimizerEvaluationResult::new(vec![2.0], 3.0),
            OptimizerEvaluationResult::new(vec![3.0], f64::NEG_INFINITY),
            OptimizerEvaluationResult::new(vec![4.0], 1.5),
            OptimizerEvaluationResult::new(vec![5.0], 1.5),
        ];
        let best = best_of("test", results).unwrap();
        assert_eq!(best.parameter_set, vec![4.0]);
        assert_eq!(best.error, 1.5);
        assert_eq!(best.evaluations, 5);
    }

    #[test]
    fn best_of_without_finite_results_fails() {
        let err = best_of("test", vec![OptimizerEvaluationResult::new(vec![1.0], f64::NAN)])
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::StrategyExecution);

        let err = best_of("test", Vec::new()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::StrategyExecution);
    }

    #[test]
    fn objective_errors_stop_the_run() {
        let calls = AtomicUsize::new(0);
        let cost = |p: &[f64]| {
            if calls.fetch_add(1, Ordering::SeqCst) == 3 {
                return Err(objective_error!("backtest crashed"));
            }
            sum_cost(p)
        };

        let err = RandomSearch::new(sample_space(), 10, 42).optimize(&cost).unwrap_err();
        assert_eq!(err.to_string(), "Objective error: backtest crashed");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
