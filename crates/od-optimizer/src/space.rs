//! Parameter space construction from gene descriptors.

use od_types::{config_error, GeneBound, GeneSpec, OdResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Scaling applied when sampling a dimension. Only linear scaling is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    Linear,
}

/// Whether a dimension takes any real value or only whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Continuous,
    Discrete,
}

/// Algorithm-facing view of one gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub transform: Transform,
    pub parameter_type: ParameterType,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, min: f64, max: f64, parameter_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            transform: Transform::Linear,
            parameter_type,
        }
    }

    pub fn from_gene(gene: &GeneSpec) -> OdResult<Self> {
        let min = resolve_bound(&gene.key, "minimum", gene.min.as_ref())?;
        let max = resolve_bound(&gene.key, "maximum", gene.max.as_ref())?;
        if min > max {
            return Err(config_error!(
                "gene {} has inverted bounds: min {} > max {}",
                gene.key,
                min,
                max
            ));
        }

        let parameter_type = if gene.is_continuous() {
            ParameterType::Continuous
        } else {
            ParameterType::Discrete
        };

        let spec = Self::new(gene.key.clone(), min, max, parameter_type);
        if spec.is_discrete() && spec.whole_range().is_none() {
            return Err(config_error!(
                "gene {} is discrete but no whole number lies in [{}, {}]",
                gene.key,
                min,
                max
            ));
        }

        Ok(spec)
    }

    pub fn is_discrete(&self) -> bool {
        self.parameter_type == ParameterType::Discrete
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Clamp `value` into the bounds, rounding first for discrete dimensions.
    pub fn bound(&self, value: f64) -> f64 {
        let value = if self.is_discrete() {
            value.round()
        } else {
            value
        };
        value.clamp(self.min, self.max)
    }

    /// Smallest and largest whole numbers inside the bounds, if any.
    fn whole_range(&self) -> Option<(i64, i64)> {
        let low = self.min.ceil() as i64;
        let high = self.max.floor() as i64;
        (low <= high).then_some((low, high))
    }

    /// Draw a uniform sample from the dimension.
    ///
    /// A discrete spec built by hand with no whole number in range yields its
    /// clamped minimum. `from_gene` never produces such a spec.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.is_discrete() {
            return match self.whole_range() {
                Some((low, high)) => rng.gen_range(low..=high) as f64,
                None => self.bound(self.min),
            };
        }

        match self.transform {
            Transform::Linear => rng.gen_range(self.min..=self.max),
        }
    }

    /// Values visited by an exhaustive grid. Discrete dimensions enumerate every
    /// whole number in range; continuous ones use `float_steps` evenly spaced points.
    /// Callers should check `grid_len` first; a wide discrete range is enumerated in full.
    pub fn grid_values(&self, float_steps: usize) -> Vec<f64> {
        if self.is_discrete() {
            return match self.whole_range() {
                Some((low, high)) => (low..=high).map(|v| v as f64).collect(),
                None => vec![self.bound(self.min)],
            };
        }

        if self.span() == 0.0 {
            return vec![self.min];
        }

        let steps = float_steps.max(2);
        (0..steps)
            .map(|i| {
                let t = i as f64 / (steps - 1) as f64;
                self.min + t * self.span()
            })
            .collect()
    }

    /// Number of values `grid_values` would return, computed from the bounds
    /// alone. Saturates at `usize::MAX`.
    pub fn grid_len(&self, float_steps: usize) -> usize {
        if self.is_discrete() {
            return match self.whole_range() {
                Some((low, high)) => {
                    let count = (i128::from(high) - i128::from(low) + 1) as u128;
                    usize::try_from(count).unwrap_or(usize::MAX)
                }
                None => 1,
            };
        }

        if self.span() == 0.0 {
            1
        } else {
            float_steps.max(2)
        }
    }
}

fn resolve_bound(key: &str, which: &str, bound: Option<&GeneBound>) -> OdResult<f64> {
    let bound = bound.ok_or_else(|| config_error!("gene {} has no {} bound", key, which))?;
    bound
        .to_f64()
        .ok_or_else(|| config_error!("gene {} {} bound {} is not representable", key, which, bound))
}

/// Convert genes into parameter specs, preserving order one-to-one.
pub fn build_parameter_space(genes: &[GeneSpec]) -> OdResult<Vec<ParameterSpec>> {
    genes.iter().map(ParameterSpec::from_gene).collect()
}

/// Bound every coordinate of `point` against its parameter spec.
pub fn bound_point(space: &[ParameterSpec], point: &[f64]) -> Vec<f64> {
    space
        .iter()
        .zip(point)
        .map(|(spec, value)| spec.bound(*value))
        .collect()
}

/// Draw one uniform point from the whole space.
pub fn sample_point<R: Rng>(space: &[ParameterSpec], rng: &mut R) -> Vec<f64> {
    space.iter().map(|spec| spec.sample(rng)).collect()
}
