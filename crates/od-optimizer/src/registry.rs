//! Maps strategy tokens to constructed, ready-to-run search strategies.

use std::fmt;
use std::str::FromStr;

use od_types::{config_error, OdResult, StrategyError, DEFAULT_SEED};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bayesian::BayesianOptimizer;
use crate::nelder_mead::GlobalizedBoundedNelderMead;
use crate::search::{GridSearch, RandomSearch, SearchStrategy};
use crate::space::ParameterSpec;
use crate::swarm::ParticleSwarm;

/// Steps per continuous dimension when enumerating a grid.
pub const DEFAULT_GRID_STEPS: usize = 5;

/// The known search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    RandomSearch,
    ParticleSwarm,
    Bayesian,
    GlobalizedBoundedNelderMead,
    GridSearch,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::RandomSearch,
        StrategyKind::ParticleSwarm,
        StrategyKind::Bayesian,
        StrategyKind::GlobalizedBoundedNelderMead,
        StrategyKind::GridSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RandomSearch => "RandomSearch",
            Self::ParticleSwarm => "ParticleSwarm",
            Self::Bayesian => "Bayesian",
            Self::GlobalizedBoundedNelderMead => "GlobalizedBoundedNelderMead",
            Self::GridSearch => "GridSearch",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    /// Exact, case-sensitive token match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StrategyError::NotFound {
                name: s.to_string(),
            })
    }
}

/// Tuning knobs shared by every strategy constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySettings {
    pub generations: usize,
    pub population_size: usize,
    pub seed: u64,
}

impl StrategySettings {
    pub fn new(generations: usize, population_size: usize) -> Self {
        Self {
            generations,
            population_size,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Builds a fresh strategy instance per request. Every strategy evaluates
/// sequentially; the driver owns the only asynchronous boundary.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    grid_steps: usize,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self {
            grid_steps: DEFAULT_GRID_STEPS,
        }
    }
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an optional strategy token. Absent and unknown tokens are
    /// `StrategyError::NotFound`; there is no default strategy.
    pub fn resolve_token(
        &self,
        token: Option<&str>,
        space: Vec<ParameterSpec>,
        settings: StrategySettings,
    ) -> OdResult<Box<dyn SearchStrategy>> {
        let token = token.ok_or_else(|| StrategyError::NotFound {
            name: "<none>".to_string(),
        })?;
        let kind: StrategyKind = token.parse()?;
        self.resolve(kind, space, settings)
    }

    pub fn resolve(
        &self,
        kind: StrategyKind,
        space: Vec<ParameterSpec>,
        settings: StrategySettings,
    ) -> OdResult<Box<dyn SearchStrategy>> {
        let StrategySettings {
            generations,
            population_size,
            seed,
        } = settings;

        debug!(
            "Resolving {} with generations={} population_size={} seed={}",
            kind, generations, population_size, seed
        );

        let strategy: Box<dyn SearchStrategy> = match kind {
            StrategyKind::RandomSearch => {
                require_positive(kind, "generations", generations)?;
                Box::new(RandomSearch::new(space, generations, seed))
            }
            StrategyKind::ParticleSwarm => {
                require_positive(kind, "generations", generations)?;
                require_positive(kind, "population_size", population_size)?;
                Box::new(ParticleSwarm::new(space, generations, population_size, seed))
            }
            StrategyKind::Bayesian => {
                require_positive(kind, "generations", generations)?;
                require_positive(kind, "population_size", population_size)?;
                Box::new(BayesianOptimizer::new(
                    space,
                    generations,
                    population_size,
                    population_size,
                    seed,
                ))
            }
            StrategyKind::GlobalizedBoundedNelderMead => {
                require_positive(kind, "generations", generations)?;
                require_positive(kind, "population_size", population_size)?;
                Box::new(GlobalizedBoundedNelderMead::new(
                    space,
                    generations,
                    population_size,
                    seed,
                ))
            }
            StrategyKind::GridSearch => Box::new(GridSearch::new(&space, self.grid_steps)?),
        };

        Ok(strategy)
    }
}

fn require_positive(kind: StrategyKind, knob: &str, value: usize) -> OdResult<()> {
    if value == 0 {
        return Err(config_error!("{} requires {} > 0", kind, knob));
    }
    Ok(())
}
