//! Bayesian optimization with a Gaussian-process surrogate and expected improvement.

use od_types::{OdResult, OptimizerEvaluationResult, StrategyError};
use tracing::debug;

use crate::search::{seeded_rng, CostFunction, SearchStrategy};
use crate::space::{bound_point, sample_point, ParameterSpec};

/// Random candidates scored by the acquisition function each iteration.
const CANDIDATE_POOL: usize = 500;
/// The surrogate is fitted on at most this many of the best observations.
const MAX_SURROGATE_POINTS: usize = 200;
const LENGTH_SCALE: f64 = 0.3;
const NOISE: f64 = 1e-6;
const EXPLORATION: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct BayesianOptimizer {
    space: Vec<ParameterSpec>,
    iterations: usize,
    random_starts: usize,
    evaluations_per_iteration: usize,
    seed: u64,
}

impl BayesianOptimizer {
    pub fn new(
        space: Vec<ParameterSpec>,
        iterations: usize,
        random_starts: usize,
        evaluations_per_iteration: usize,
        seed: u64,
    ) -> Self {
        Self {
            space,
            iterations,
            random_starts,
            evaluations_per_iteration,
            seed,
        }
    }

    fn normalize(&self, point: &[f64]) -> Vec<f64> {
        self.space
            .iter()
            .zip(point)
            .map(|(spec, v)| {
                if spec.span() > 0.0 {
                    (v - spec.min) / spec.span()
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn fit(&self, results: &[OptimizerEvaluationResult]) -> OdResult<Option<Surrogate>> {
        let mut observed: Vec<(Vec<f64>, f64)> = Vec::new();
        for r in results.iter().filter(|r| r.error.is_finite()) {
            let x = self.normalize(&r.parameter_set);
            match observed.iter_mut().find(|(seen, _)| *seen == x) {
                Some((_, y)) => *y = y.min(r.error),
                None => observed.push((x, r.error)),
            }
        }
        if observed.len() < 2 {
            return Ok(None);
        }
        if observed.len() > MAX_SURROGATE_POINTS {
            observed.sort_by(|a, b| a.1.total_cmp(&b.1));
            observed.truncate(MAX_SURROGATE_POINTS);
        }

        Surrogate::fit(observed)
            .map(Some)
            .map_err(|message| {
                StrategyError::NumericalFailure {
                    strategy: self.name().to_string(),
                    message,
                }
                .into()
            })
    }
}

impl SearchStrategy for BayesianOptimizer {
    fn optimize(&self, cost: &CostFunction<'_>) -> OdResult<Vec<OptimizerEvaluationResult>> {
        let mut rng = seeded_rng(self.seed);
        let mut results = Vec::with_capacity(
            self.random_starts + self.iterations * self.evaluations_per_iteration,
        );

        for _ in 0..self.random_starts {
            let point = sample_point(&self.space, &mut rng);
            results.push(cost(&point)?);
        }

        for iteration in 0..self.iterations {
            let candidates: Vec<Vec<f64>> = (0..CANDIDATE_POOL)
                .map(|_| sample_point(&self.space, &mut rng))
                .collect();

            let proposals: Vec<Vec<f64>> = match self.fit(&results)? {
                Some(surrogate) => {
                    let mut scored: Vec<(f64, Vec<f64>)> = candidates
                        .into_iter()
                        .map(|c| (surrogate.expected_improvement(&self.normalize(&c)), c))
                        .collect();
                    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
                    scored
                        .into_iter()
                        .take(self.evaluations_per_iteration)
                        .map(|(_, c)| c)
                        .collect()
                }
                None => candidates
                    .into_iter()
                    .take(self.evaluations_per_iteration)
                    .collect(),
            };

            for point in proposals {
                results.push(cost(&bound_point(&self.space, &point))?);
            }

            debug!(
                "Bayesian iteration {}/{} with {} observations",
                iteration + 1,
                self.iterations,
                results.len()
            );
        }

        Ok(results)
    }

    fn name(&self) -> &str {
        "Bayesian"
    }
}

/// Gaussian process on unit-normalized inputs with standardized targets.
struct Surrogate {
    inputs: Vec<Vec<f64>>,
    chol: Vec<Vec<f64>>,
    alpha: Vec<f64>,
    best: f64,
}

impl Surrogate {
    fn fit(observed: Vec<(Vec<f64>, f64)>) -> Result<Self, String> {
        let n = observed.len();
        let mean = observed.iter().map(|(_, y)| y).sum::<f64>() / n as f64;
        let var = observed.iter().map(|(_, y)| (y - mean).powi(2)).sum::<f64>() / n as f64;
        let std = if var.sqrt() > 1e-12 { var.sqrt() } else { 1.0 };

        let (inputs, targets): (Vec<Vec<f64>>, Vec<f64>) = observed
            .into_iter()
            .map(|(x, y)| (x, (y - mean) / std))
            .unzip();

        let mut gram = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..=i {
                let k = kernel(&inputs[i], &inputs[j]);
                gram[i][j] = k;
                gram[j][i] = k;
            }
            gram[i][i] += NOISE;
        }

        let chol = cholesky(&gram)?;
        let z = forward_substitute(&chol, &targets);
        let alpha = backward_substitute(&chol, &z);
        let best = targets.iter().copied().fold(f64::INFINITY, f64::min);

        Ok(Self {
            inputs,
            chol,
            alpha,
            best,
        })
    }

    fn predict(&self, x: &[f64]) -> (f64, f64) {
        let k: Vec<f64> = self.inputs.iter().map(|xi| kernel(xi, x)).collect();
        let mean: f64 = k.iter().zip(&self.alpha).map(|(a, b)| a * b).sum();
        let v = forward_substitute(&self.chol, &k);
        let var = (1.0 + NOISE - v.iter().map(|vi| vi * vi).sum::<f64>()).max(1e-12);
        (mean, var.sqrt())
    }

    fn expected_improvement(&self, x: &[f64]) -> f64 {
        let (mean, std) = self.predict(x);
        let improvement = self.best - mean - EXPLORATION;
        let z = improvement / std;
        improvement * normal_cdf(z) + std * normal_pdf(z)
    }
}

fn kernel(a: &[f64], b: &[f64]) -> f64 {
    let dist2: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
    (-0.5 * dist2 / (LENGTH_SCALE * LENGTH_SCALE)).exp()
}

/// Lower-triangular factor of a symmetric positive-definite matrix.
fn cholesky(a: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, String> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let d = a[i][i] - sum;
                if d <= 0.0 || !d.is_finite() {
                    return Err(format!("kernel matrix not positive definite at row {i}"));
                }
                l[i][j] = d.sqrt();
            } else {
                l[i][j] = (a[i][j] - sum) / l[j][j];
            }
        }
    }
    Ok(l)
}

/// Solve `L x = b`.
fn forward_substitute(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut x = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|k| l[i][k] * x[k]).sum();
        x[i] = (b[i] - sum) / l[i][i];
    }
    x
}

/// Solve `L^T x = b`.
fn backward_substitute(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|k| l[k][i] * x[k]).sum();
        x[i] = (b[i] - sum) / l[i][i];
    }
    x
}

/// Abramowitz and Stegun 7.1.26, accurate to about 1.5e-7.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    if x > 6.0 {
        return sign;
    }

    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592 + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    sign * (1.0 - poly * (-x * x).exp())
}

fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}
