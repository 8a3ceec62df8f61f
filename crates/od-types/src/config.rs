//! Run configuration for an optimization.

use serde::{Deserialize, Serialize};

use crate::gene::GeneSpec;

/// Seed every strategy uses unless the configuration overrides it.
pub const DEFAULT_SEED: u64 = 42;

/// Whether we are maximizing or minimizing the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveDirection {
    Maximize,
    Minimize,
}

impl ObjectiveDirection {
    pub fn is_maximizing(&self) -> bool {
        matches!(self, Self::Maximize)
    }
}

impl Default for ObjectiveDirection {
    fn default() -> Self {
        Self::Minimize
    }
}

/// Describes the fitness being optimized and the search strategy to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessConfiguration {
    pub name: String,

    /// Strategy token: "RandomSearch", "ParticleSwarm", "Bayesian",
    /// "GlobalizedBoundedNelderMead" or "GridSearch". Matched exactly.
    #[serde(default)]
    pub optimizer_type_name: Option<String>,

    #[serde(default)]
    pub goal: ObjectiveDirection,
}

impl Default for FitnessConfiguration {
    fn default() -> Self {
        Self {
            name: "fitness".to_string(),
            optimizer_type_name: None,
            goal: ObjectiveDirection::Minimize,
        }
    }
}

/// Top-level configuration for an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfiguration {
    /// Ordered genes; index `i` of every parameter vector maps to `genes[i]`.
    pub genes: Vec<GeneSpec>,

    /// Iterations, restarts or generations depending on the strategy.
    #[serde(default = "default_generations")]
    pub generations: usize,

    /// Particles, random starts or iterations per restart depending on the strategy.
    #[serde(default = "default_population_size")]
    pub population_size: usize,

    #[serde(default)]
    pub fitness: FitnessConfiguration,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_generations() -> usize {
    1000
}

fn default_population_size() -> usize {
    12
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl OptimizerConfiguration {
    pub fn new(genes: Vec<GeneSpec>) -> Self {
        Self {
            genes,
            generations: default_generations(),
            population_size: default_population_size(),
            fitness: FitnessConfiguration::default(),
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_strategy(mut self, token: &str) -> Self {
        self.fitness.optimizer_type_name = Some(token.to_string());
        self
    }

    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_goal(mut self, goal: ObjectiveDirection) -> Self {
        self.fitness.goal = goal;
        self
    }

    pub fn with_fitness_name(mut self, name: &str) -> Self {
        self.fitness.name = name.to_string();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn strategy_token(&self) -> Option<&str> {
        self.fitness.optimizer_type_name.as_deref()
    }

    pub fn is_maximizing(&self) -> bool {
        self.fitness.goal.is_maximizing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::GeneBound;

    #[test]
    fn builder_chain() {
        let config = OptimizerConfiguration::new(vec![GeneSpec::int("a", 1, 10)])
            .with_strategy("ParticleSwarm")
            .with_generations(50)
            .with_population_size(8)
            .with_goal(ObjectiveDirection::Maximize)
            .with_seed(7);

        assert_eq!(config.strategy_token(), Some("ParticleSwarm"));
        assert_eq!(config.generations, 50);
        assert_eq!(config.population_size, 8);
        assert!(config.is_maximizing());
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn defaults() {
        let config = OptimizerConfiguration::new(Vec::new());
        assert_eq!(config.generations, 1000);
        assert_eq!(config.population_size, 12);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.strategy_token(), None);
        assert!(!config.is_maximizing());
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "genes": [{"key": "period", "min": 2, "max": 30}],
            "fitness": {"name": "sharpe", "optimizer_type_name": "Bayesian", "goal": "Maximize"}
        }"#;
        let config: OptimizerConfiguration = serde_json::from_str(json).unwrap();

        assert_eq!(config.genes.len(), 1);
        assert_eq!(config.genes[0].max, Some(GeneBound::Int(30)));
        assert_eq!(config.strategy_token(), Some("Bayesian"));
        assert_eq!(config.fitness.goal, ObjectiveDirection::Maximize);
        assert_eq!(config.generations, 1000);
        assert_eq!(config.seed, DEFAULT_SEED);
    }
}
