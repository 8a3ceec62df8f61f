//! Particle swarm optimization.

use od_types::{OdResult, OptimizerEvaluationResult};
use rand::Rng;
use tracing::debug;

use crate::search::{seeded_rng, CostFunction, SearchStrategy};
use crate::space::{bound_point, sample_point, ParameterSpec};

const INERTIA: f64 = 0.729;
const COGNITIVE: f64 = 1.49445;
const SOCIAL: f64 = 1.49445;

/// Inertia-weight particle swarm. Every particle is evaluated once per iteration.
#[derive(Debug, Clone)]
pub struct ParticleSwarm {
    space: Vec<ParameterSpec>,
    max_iterations: usize,
    particles: usize,
    seed: u64,
}

impl ParticleSwarm {
    pub fn new(
        space: Vec<ParameterSpec>,
        max_iterations: usize,
        particles: usize,
        seed: u64,
    ) -> Self {
        Self {
            space,
            max_iterations,
            particles,
            seed,
        }
    }
}

impl SearchStrategy for ParticleSwarm {
    fn optimize(&self, cost: &CostFunction<'_>) -> OdResult<Vec<OptimizerEvaluationResult>> {
        let mut rng = seeded_rng(self.seed);
        let mut results = Vec::with_capacity(self.max_iterations * self.particles);

        let mut positions: Vec<Vec<f64>> = (0..self.particles)
            .map(|_| sample_point(&self.space, &mut rng))
            .collect();
        let mut velocities: Vec<Vec<f64>> = (0..self.particles)
            .map(|_| {
                self.space
                    .iter()
                    .map(|p| 0.1 * p.span() * rng.gen_range(-1.0_f64..=1.0))
                    .collect()
            })
            .collect();

        let mut personal_best = positions.clone();
        let mut personal_error = vec![f64::INFINITY; self.particles];
        let mut global_best = positions.first().cloned().unwrap_or_default();
        let mut global_error = f64::INFINITY;

        for iteration in 0..self.max_iterations {
            for i in 0..self.particles {
                let point = bound_point(&self.space, &positions[i]);
                let result = cost(&point)?;
                if result.error < personal_error[i] {
                    personal_error[i] = result.error;
                    personal_best[i] = point.clone();
                }
                if result.error < global_error {
                    global_error = result.error;
                    global_best = point;
                }
                results.push(result);
            }

            for i in 0..self.particles {
                for (d, spec) in self.space.iter().enumerate() {
                    let r1: f64 = rng.gen();
                    let r2: f64 = rng.gen();
                    let x = positions[i][d];
                    let v = INERTIA * velocities[i][d]
                        + COGNITIVE * r1 * (personal_best[i][d] - x)
                        + SOCIAL * r2 * (global_best[d] - x);
                    let limit = spec.span();
                    velocities[i][d] = v.clamp(-limit, limit);
                    positions[i][d] = (x + velocities[i][d]).clamp(spec.min, spec.max);
                }
            }

            debug!(
                "ParticleSwarm iteration {}/{} best error {}",
                iteration + 1,
                self.max_iterations,
                global_error
            );
        }

        Ok(results)
    }

    fn name(&self) -> &str {
        "ParticleSwarm"
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
        let best = ParticleSwarm::new(space(), 60, 20, 42)
            .optimize_best(&sphere_cost)
            .unwrap();
        assert!(best.error < 0.1, "sphere error {} too large", best.error);
        assert_eq!(best.evaluations, 60 * 20);
    }

    #[test]
    fn evaluations_stay_in_bounds() {
        let space = vec![
            ParameterSpec::new("x", -2.0, 2.0, ParameterType::Continuous),
            ParameterSpec::new("n", 1.0, 9.0, ParameterType::Discrete),
        ];
        let results = ParticleSwarm::new(space.clone(), 20, 10, 42)
            .optimize(&sphere_cost)
            .unwrap();
        for r in &results {
            assert!(in_bounds(&space, &r.parameter_set));
            assert_eq!(r.parameter_set[1].fract(), 0.0);
        }
    }

    #[test]
    fn same_seed_same_result() {
        let swarm = ParticleSwarm::new(space(), 10, 8, 42);
        assert_eq!(
            swarm.optimize_best(&sphere_cost).unwrap(),
            swarm.optimize_best(&sphere_cost).unwrap()
        );
    }
}
