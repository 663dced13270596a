//! Reduction operations over the merged column values.

use std::fmt;
use std::str::FromStr;

use crate::error::StatsError;

/// Built-in reductions over a sequence of numbers.
///
/// This is a closed set: unknown operation tokens are rejected at parse time,
/// never defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Arithmetic total.
    Sum,
    /// Arithmetic mean.
    Avg,
}

impl Operation {
    /// Apply the reduction to a sequence of values.
    ///
    /// Both reductions are commutative and associative over the input, so the
    /// result does not depend on merge order.
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Self::Sum => sum(values),
            Self::Avg => avg(values),
        }
    }
}

impl FromStr for Operation {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Self::Sum),
            "avg" => Ok(Self::Avg),
            other => Err(StatsError::InvalidOperation(other.to_owned())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => f.write_str("sum"),
            Self::Avg => f.write_str("avg"),
        }
    }
}

/// Arithmetic total of `values`; 0 for an empty sequence.
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean of `values`.
///
/// An empty sequence divides zero by zero and yields NaN. Callers must ensure
/// at least one value flows through, or accept the NaN result.
pub fn avg(values: &[f64]) -> f64 {
    sum(values) / values.len() as f64
}
