use std::sync::Arc;

use od_optimizer::{
    GeneBound, GeneSpec, ObjectiveDirection, OdResult, OptimizationDriver, OptimizerConfiguration,
    StrategyKind, TracingActivityLogger,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Continuous gene with whole-number bounds.
fn continuous(key: &str, min: i64, max: i64) -> GeneSpec {
    GeneSpec {
        key: key.to_string(),
        min: Some(GeneBound::Int(min)),
        max: Some(GeneBound::Int(max)),
        precision: 2,
    }
}

/// Shifted sphere with its minimum at (3, -1, 7).
fn shifted_sphere(p: &[f64]) -> OdResult<f64> {
    let target = [3.0, -1.0, 7.0];
    Ok(p.iter().zip(target).map(|(x, t)| (x - t).powi(2)).sum())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let strategies: Vec<StrategyKind> = match std::env::args().nth(1) {
        Some(token) => vec![token.parse()?],
        None => StrategyKind::ALL.to_vec(),
    };

    let genes = vec![
        GeneSpec::int("x", -10, 10),
        continuous("y", -5, 5),
        continuous("z", 0, 10),
    ];
    let driver = OptimizationDriver::new();

    for kind in strategies {
        let config = OptimizerConfiguration::new(genes.clone())
            .with_strategy(kind.as_str())
            .with_fitness_name("shifted_sphere")
            .with_generations(40)
            .with_population_size(10)
            .with_goal(ObjectiveDirection::Minimize);

        let result = driver
            .start(
                &config,
                Arc::new(shifted_sphere),
                Arc::new(TracingActivityLogger),
            )
            .await?;

        info!(
            "{}: cost {:.6} at {:?} ({} evaluations)",
            result.strategy, result.cost, result.parameter_set, result.evaluations
        );
    }

    Ok(())
}
