//! # od-optimizer
//!
//! Strategy dispatch and optimization driver for optidrive.
//!
//! Turns gene descriptors into a bounded parameter space, resolves a named
//! search strategy (random, particle swarm, Bayesian, globalized bounded
//! Nelder-Mead, grid), runs it against a caller-supplied objective on a
//! blocking worker, and reports the best parameters with the cost normalized
//! to "lower is better".

mod activity;
mod bayesian;
mod driver;
mod nelder_mead;
mod objective;
mod registry;
mod search;
mod space;
mod swarm;

pub use activity::{ActivityLogger, MemoryActivityLogger, TracingActivityLogger};
pub use bayesian::BayesianOptimizer;
pub use driver::{normalize_cost, OptimizationDriver};
pub use nelder_mead::GlobalizedBoundedNelderMead;
pub use objective::ObjectiveAdapter;
pub use registry::{StrategyKind, StrategyRegistry, StrategySettings, DEFAULT_GRID_STEPS};
pub use search::{
    best_of, CostFunction, GridSearch, RandomSearch, SearchStrategy, MAX_GRID_POINTS,
};
pub use space::{
    bound_point, build_parameter_space, sample_point, ParameterSpec, ParameterType, Transform,
};
pub use swarm::ParticleSwarm;

pub use od_types::{
    ErrorCategory, GeneBound, GeneSpec, IterationResult, ObjectiveDirection, OdError, OdResult,
    OptimizerConfiguration, OptimizerEvaluationResult, RawOptimizerOutcome, StrategyError,
};
