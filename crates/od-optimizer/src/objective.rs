//! The caller-implemented cost function.

use od_types::{OdResult, OptimizerEvaluationResult};

/// Supplies the cost of a candidate parameter vector.
///
/// Strategies may call `evaluate` any number of times, in any order, from a
/// background thread. Implementations that keep state across calls are
/// responsible for their own synchronization.
///
/// `evaluate` is synchronous and runs on a blocking thread, so an adapter that
/// has to await async work can do so with `tokio::runtime::Handle::block_on`.
///
/// Plain closures returning a cost implement this trait:
///
/// ```
/// use od_optimizer::ObjectiveAdapter;
///
/// let sum = |p: &[f64]| -> od_optimizer::OdResult<f64> { Ok(p.iter().sum()) };
/// assert_eq!(sum.evaluate(&[1.0, 2.0]).unwrap().error, 3.0);
/// ```
pub trait ObjectiveAdapter: Send + Sync {
    /// `parameters[i]` corresponds to the i-th configured gene.
    fn evaluate(&self, parameters: &[f64]) -> OdResult<OptimizerEvaluationResult>;
}

impl<F> ObjectiveAdapter for F
where
    F: Fn(&[f64]) -> OdResult<f64> + Send + Sync,
{
    fn evaluate(&self, parameters: &[f64]) -> OdResult<OptimizerEvaluationResult> {
        let error = self(parameters)?;
        Ok(OptimizerEvaluationResult::new(parameters.to_vec(), error))
    }
}
