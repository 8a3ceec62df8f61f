//! End-to-end optimization runs: parameter space, strategy, background execution
//! and cost normalization.

use std::sync::Arc;

use chrono::Utc;
use od_types::{
    config_error, IterationResult, ObjectiveDirection, OdResult, OptimizerConfiguration,
    StrategyError,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::activity::ActivityLogger;
use crate::objective::ObjectiveAdapter;
use crate::registry::{StrategyRegistry, StrategySettings};
use crate::space::build_parameter_space;

/// Report strategy errors in "lower is better" form regardless of the goal.
pub fn normalize_cost(error: f64, goal: ObjectiveDirection) -> f64 {
    match goal {
        ObjectiveDirection::Maximize => -error,
        ObjectiveDirection::Minimize => error,
    }
}

/// Runs one optimization per `start` call. Nothing is shared between runs.
#[derive(Debug, Clone, Default)]
pub struct OptimizationDriver {
    registry: StrategyRegistry,
}

impl OptimizationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    /// Build the parameter space, resolve the configured strategy and run it to
    /// completion on a blocking worker thread.
    ///
    /// The run cannot be cancelled once started. Errors raised by the strategy
    /// or by `objective` are returned unchanged.
    pub async fn start(
        &self,
        config: &OptimizerConfiguration,
        objective: Arc<dyn ObjectiveAdapter>,
        logger: Arc<dyn ActivityLogger>,
    ) -> OdResult<IterationResult> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        if config.genes.is_empty() {
            return Err(config_error!("no parameters to optimize"));
        }

        let space = build_parameter_space(&config.genes)?;
        let settings = StrategySettings {
            generations: config.generations,
            population_size: config.population_size,
            seed: config.seed,
        };
        let strategy = self
            .registry
            .resolve_token(config.strategy_token(), space, settings)?;
        let strategy_name = strategy.name().to_string();

        info!(
            "Starting run {} of {} for {} over {} genes",
            run_id,
            strategy_name,
            config.fitness.name,
            config.genes.len()
        );
        logger.add(&format!(
            "Optimizing {} with {} ({} genes, generations {}, population {})",
            config.fitness.name,
            strategy_name,
            config.genes.len(),
            config.generations,
            config.population_size
        ));

        let joined = tokio::task::spawn_blocking(move || {
            strategy.optimize_best(&|parameters: &[f64]| objective.evaluate(parameters))
        })
        .await;

        let outcome = match joined {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!("Run {} failed: {}", run_id, e);
                logger.add(&format!("{} failed: {}", strategy_name, e));
                return Err(e);
            }
            Err(join_error) => {
                error!("Run {} aborted: {}", run_id, join_error);
                logger.add(&format!("{} aborted: {}", strategy_name, join_error));
                return Err(StrategyError::ExecutionFailed {
                    strategy: strategy_name,
                    message: join_error.to_string(),
                }
                .into());
            }
        };

        let cost = normalize_cost(outcome.error, config.fitness.goal);
        let finished_at = Utc::now();

        info!(
            "Run {} finished after {} evaluations with cost {}",
            run_id, outcome.evaluations, cost
        );
        logger.add(&format!(
            "{} finished: cost {} at {:?} after {} evaluations",
            strategy_name, cost, outcome.parameter_set, outcome.evaluations
        ));

        Ok(IterationResult {
            run_id,
            strategy: strategy_name,
            parameter_set: outcome.parameter_set,
            cost,
            evaluations: outcome.evaluations,
            started_at,
            finished_at,
        })
    }
}
