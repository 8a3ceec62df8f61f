//! Gene descriptors: one optimizable dimension each.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single bound of a gene. Integer genes and decimal genes are kept apart so
/// the parameter-space builder never has to guess which field is populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneBound {
    Int(i64),
    Decimal(Decimal),
}

impl GeneBound {
    /// Numeric value of the bound, `None` if a decimal does not fit an `f64`.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Decimal(v) => v.to_f64(),
        }
    }
}

impl std::fmt::Display for GeneBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for GeneBound {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<Decimal> for GeneBound {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

/// One optimizable dimension of the search problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSpec {
    /// Human-readable gene name (e.g. "fast_period").
    pub key: String,
    pub min: Option<GeneBound>,
    pub max: Option<GeneBound>,
    /// Number of decimal places; 0 makes the gene integer-valued.
    #[serde(default)]
    pub precision: u32,
}

impl GeneSpec {
    /// Integer-valued gene.
    pub fn int(key: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            key: key.into(),
            min: Some(GeneBound::Int(min)),
            max: Some(GeneBound::Int(max)),
            precision: 0,
        }
    }

    /// Decimal gene. A precision of 0 still yields a discrete parameter.
    pub fn decimal(key: impl Into<String>, min: Decimal, max: Decimal, precision: u32) -> Self {
        Self {
            key: key.into(),
            min: Some(GeneBound::Decimal(min)),
            max: Some(GeneBound::Decimal(max)),
            precision,
        }
    }

    pub fn is_continuous(&self) -> bool {
        self.precision > 0
    }
}
