//! Evaluation and run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique optimization run identifier.
pub type RunId = Uuid;

/// Cost of one candidate parameter vector, as returned by an objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerEvaluationResult {
    pub parameter_set: Vec<f64>,
    /// Smaller is better.
    pub error: f64,
}

impl OptimizerEvaluationResult {
    pub fn new(parameter_set: Vec<f64>, error: f64) -> Self {
        Self {
            parameter_set,
            error,
        }
    }
}

/// Best evaluation a strategy found, before any sign normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOptimizerOutcome {
    pub parameter_set: Vec<f64>,
    pub error: f64,
    /// Number of objective evaluations the strategy performed.
    pub evaluations: usize,
}

/// Public result of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationResult {
    pub run_id: RunId,
    pub strategy: String,
    /// Winning parameters, index-aligned with the configured genes.
    pub parameter_set: Vec<f64>,
    /// Best cost, negated when the fitness goal is maximization.
    pub cost: f64,
    pub evaluations: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_result_serializes() {
        let now = Utc::now();
        let result = IterationResult {
            run_id: Uuid::new_v4(),
            strategy: "GridSearch".to_string(),
            parameter_set: vec![1.0, 0.25],
            cost: -3.5,
            evaluations: 25,
            started_at: now,
            finished_at: now,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["strategy"], "GridSearch");
        assert_eq!(json["cost"], -3.5);
        assert_eq!(json["parameter_set"][1], 0.25);
    }
}
