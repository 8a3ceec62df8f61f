//! Globalized bounded Nelder-Mead: restarted simplex search with box constraints.

use od_types::{OdResult, OptimizerEvaluationResult};
use tracing::debug;

use crate::search::{seeded_rng, CostFunction, SearchStrategy};
use crate::space::{bound_point, sample_point, ParameterSpec};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;
/// Initial simplex edge as a fraction of each dimension's range.
const INITIAL_STEP: f64 = 0.05;
const TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone)]
pub struct GlobalizedBoundedNelderMead {
    space: Vec<ParameterSpec>,
    max_restarts: usize,
    max_iterations_per_restart: usize,
    seed: u64,
}

#[derive(Debug, Clone)]
struct Vertex {
    point: Vec<f64>,
    error: f64,
}

impl Vertex {
    /// Ordering key that ranks non-finite errors last.
    fn rank(&self) -> f64 {
        if self.error.is_nan() {
            f64::INFINITY
        } else {
            self.error
        }
    }
}

impl GlobalizedBoundedNelderMead {
    pub fn new(
        space: Vec<ParameterSpec>,
        max_restarts: usize,
        max_iterations_per_restart: usize,
        seed: u64,
    ) -> Self {
        Self {
            space,
            max_restarts,
            max_iterations_per_restart,
            seed,
        }
    }

    fn evaluate(
        &self,
        cost: &CostFunction<'_>,
        results: &mut Vec<OptimizerEvaluationResult>,
        point: &[f64],
    ) -> OdResult<Vertex> {
        let point = bound_point(&self.space, point);
        let result = cost(&point)?;
        let vertex = Vertex {
            point,
            error: result.error,
        };
        results.push(result);
        Ok(vertex)
    }

    fn initial_simplex(
        &self,
        cost: &CostFunction<'_>,
        results: &mut Vec<OptimizerEvaluationResult>,
        start: Vec<f64>,
    ) -> OdResult<Vec<Vertex>> {
        let mut simplex = Vec::with_capacity(self.space.len() + 1);
        simplex.push(self.evaluate(cost, results, &start)?);
        for (d, spec) in self.space.iter().enumerate() {
            let mut point = start.clone();
            let step = INITIAL_STEP * spec.span();
            point[d] = if point[d] + step <= spec.max {
                point[d] + step
            } else {
                point[d] - step
            };
            simplex.push(self.evaluate(cost, results, &point)?);
        }
        Ok(simplex)
    }

    fn run_restart(
        &self,
        cost: &CostFunction<'_>,
        results: &mut Vec<OptimizerEvaluationResult>,
        start: Vec<f64>,
    ) -> OdResult<f64> {
        let mut simplex = self.initial_simplex(cost, results, start)?;
        let n = self.space.len();

        for _ in 0..self.max_iterations_per_restart {
            simplex.sort_by(|a, b| a.rank().total_cmp(&b.rank()));
            let best = simplex[0].rank();
            let worst = simplex[n].rank();
            if n == 0 || (worst.is_finite() && (worst - best).abs() < TOLERANCE) {
                break;
            }

            let centroid: Vec<f64> = (0..n)
                .map(|d| simplex[..n].iter().map(|v| v.point[d]).sum::<f64>() / n as f64)
                .collect();
            let towards = |from: &[f64], coefficient: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(from)
                    .map(|(c, x)| c + coefficient * (x - c))
                    .collect()
            };

            let reflected =
                self.evaluate(cost, results, &towards(&simplex[n].point[..], -REFLECTION))?;

            if reflected.rank() < best {
                let expanded =
                    self.evaluate(cost, results, &towards(&reflected.point[..], EXPANSION))?;
                simplex[n] = if expanded.rank() < reflected.rank() {
                    expanded
                } else {
                    reflected
                };
                continue;
            }

            if reflected.rank() < simplex[n - 1].rank() {
                simplex[n] = reflected;
                continue;
            }

            let (anchor, threshold) = if reflected.rank() < worst {
                (reflected.point.clone(), reflected.rank())
            } else {
                (simplex[n].point.clone(), worst)
            };
            let contracted = self.evaluate(cost, results, &towards(&anchor[..], CONTRACTION))?;
            if contracted.rank() < threshold {
                simplex[n] = contracted;
                continue;
            }

            let best_point = simplex[0].point.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let shrunk: Vec<f64> = best_point
                    .iter()
                    .zip(&vertex.point)
                    .map(|(b, x)| b + SHRINK * (x - b))
                    .collect();
                *vertex = self.evaluate(cost, results, &shrunk)?;
            }
        }

        Ok(simplex
            .iter()
            .map(Vertex::rank)
            .fold(f64::INFINITY, f64::min))
    }
}

impl SearchStrategy for GlobalizedBoundedNelderMead {
    fn optimize(&self, cost: &CostFunction<'_>) -> OdResult<Vec<OptimizerEvaluationResult>> {
        let mut rng = seeded_rng(self.seed);
        let mut results = Vec::new();

        for restart in 0..self.max_restarts {
            let start = sample_point(&self.space, &mut rng);
            let best = self.run_restart(cost, &mut results, start)?;
            debug!(
                "GlobalizedBoundedNelderMead restart {}/{} best error {}",
                restart + 1,
                self.max_restarts,
                best
            );
        }

        Ok(results)
    }

    fn name(&self) -> &str {
        "GlobalizedBoundedNelderMead"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tests::{in_bounds, sphere_cost};
    use crate::space::ParameterType;

    fn space() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::new("x", -5.0, 5.0, ParameterType::Continuous),
            ParameterSpec::new("y", -5.0, 5.0, ParameterType::Continuous),
        ]
    }

    #[test]
    fn converges_on_sphere() {
        let best = GlobalizedBoundedNelderMead::new(space(), 3, 200, 42)
            .optimize_best(&sphere_cost)
            .unwrap();
        assert!(best.error < 1e-4, "nelder-mead error {} too large", best.error);
    }

    #[test]
    fn respects_bounds_when_optimum_is_outside() {
        let space = vec![ParameterSpec::new("x", 1.0, 4.0, ParameterType::Continuous)];
        let results = GlobalizedBoundedNelderMead::new(space.clone(), 2, 50, 42)
            .optimize(&sphere_cost)
            .unwrap();
        assert!(results.iter().all(|r| in_bounds(&space, &r.parameter_set)));

        let best = GlobalizedBoundedNelderMead::new(space, 2, 50, 42)
            .optimize_best(&sphere_cost)
            .unwrap();
        assert!((best.parameter_set[0] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn zero_iterations_still_evaluates_initial_simplex() {
        let results = GlobalizedBoundedNelderMead::new(space(), 4, 0, 42)
            .optimize(&sphere_cost)
            .unwrap();
        assert_eq!(results.len(), 4 * 3);
    }

    #[test]
    fn deterministic() {
        let nm = GlobalizedBoundedNelderMead::new(space(), 2, 30, 42);
        assert_eq!(
            nm.optimize_best(&sphere_cost).unwrap(),
            nm.optimize_best(&sphere_cost).unwrap()
        );
    }
}
