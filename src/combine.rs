//! # Combiners
//!
//! A combiner is the associative, commutative reduction applied to every
//! value whose key falls inside a bin's tolerance window. Reduction is
//! incremental: the store feeds matched values one at a time into an
//! [`Accumulator`] and asks for the result once the column pass is done, so
//! no per-bin match list is ever materialized.
//!
//! An accumulator that saw no values finishes as `None` — the empty
//! sentinel, distinguishable from a legitimate zero aggregate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reduction applied to the values matched by one bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combiner {
    /// Sum of matched values
    Sum,
    /// Arithmetic mean of matched values
    Mean,
    /// Minimum matched value (IEEE `f64::min` semantics)
    Min,
    /// Maximum matched value (IEEE `f64::max` semantics)
    Max,
    /// Number of matched values, as `f64`
    Count,
}

impl Default for Combiner {
    fn default() -> Self {
        Self::Sum
    }
}

impl Combiner {
    /// Start an empty accumulator for this combiner
    pub fn accumulator(self) -> Accumulator {
        Accumulator {
            combiner: self,
            state: State::Empty,
        }
    }

    /// Reduce a slice of values in one call
    ///
    /// Convenience around [`accumulator`](Self::accumulator); returns `None`
    /// for an empty slice.
    pub fn reduce(self, values: &[f64]) -> Option<f64> {
        let mut acc = self.accumulator();
        for &value in values {
            acc.push(value);
        }
        acc.finish()
    }
}

impl fmt::Display for Combiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Combiner::Sum => "sum",
            Combiner::Mean => "mean",
            Combiner::Min => "min",
            Combiner::Max => "max",
            Combiner::Count => "count",
        };
        write!(f, "{}", name)
    }
}

/// Error from parsing a combiner identifier
#[derive(Debug, thiserror::Error)]
#[error("unknown combiner {name:?}, expected one of: sum, mean, min, max, count")]
pub struct UnknownCombiner {
    /// The unrecognized identifier
    pub name: String,
}

impl FromStr for Combiner {
    type Err = UnknownCombiner;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Combiner::Sum),
            "mean" => Ok(Combiner::Mean),
            "min" => Ok(Combiner::Min),
            "max" => Ok(Combiner::Max),
            "count" => Ok(Combiner::Count),
            other => Err(UnknownCombiner {
                name: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Empty,
    Running {
        // Sum for Sum/Mean, extremum for Min/Max, unused for Count.
        value: f64,
        count: u64,
    },
}

/// Incremental reduction state for one bin
#[derive(Debug, Clone, Copy)]
pub struct Accumulator {
    combiner: Combiner,
    state: State,
}

impl Accumulator {
    /// Fold one matched value into the accumulator
    pub fn push(&mut self, value: f64) {
        self.state = match self.state {
            State::Empty => State::Running { value, count: 1 },
            State::Running {
                value: current,
                count,
            } => {
                let value = match self.combiner {
                    Combiner::Sum | Combiner::Mean => current + value,
                    Combiner::Min => current.min(value),
                    Combiner::Max => current.max(value),
                    Combiner::Count => current,
                };
                State::Running {
                    value,
                    count: count + 1,
                }
            }
        };
    }

    /// `true` when no value has been pushed
    pub fn is_empty(&self) -> bool {
        matches!(self.state, State::Empty)
    }

    /// Finish the reduction; `None` is the empty sentinel
    pub fn finish(self) -> Option<f64> {
        match self.state {
            State::Empty => None,
            State::Running { value, count } => Some(match self.combiner {
                Combiner::Sum | Combiner::Min | Combiner::Max => value,
                Combiner::Mean => value / count as f64,
                Combiner::Count => count as f64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulator_is_sentinel() {
        for combiner in [
            Combiner::Sum,
            Combiner::Mean,
            Combiner::Min,
            Combiner::Max,
            Combiner::Count,
        ] {
            assert_eq!(combiner.accumulator().finish(), None);
        }
    }

    #[test]
    fn reductions_over_small_slice() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(Combiner::Sum.reduce(&values), Some(6.0));
        assert_eq!(Combiner::Mean.reduce(&values), Some(2.0));
        assert_eq!(Combiner::Min.reduce(&values), Some(1.0));
        assert_eq!(Combiner::Max.reduce(&values), Some(3.0));
        assert_eq!(Combiner::Count.reduce(&values), Some(3.0));
    }

    #[test]
    fn single_value_reductions() {
        assert_eq!(Combiner::Mean.reduce(&[7.0]), Some(7.0));
        assert_eq!(Combiner::Count.reduce(&[7.0]), Some(1.0));
    }

    #[test]
    fn incremental_matches_batch() {
        let values = [0.5, -2.0, 9.5, 9.5];
        for combiner in [Combiner::Sum, Combiner::Mean, Combiner::Min, Combiner::Max] {
            let mut acc = combiner.accumulator();
            for &v in &values {
                acc.push(v);
            }
            assert_eq!(acc.finish(), combiner.reduce(&values));
        }
    }

    #[test]
    fn identifier_round_trip() {
        for combiner in [
            Combiner::Sum,
            Combiner::Mean,
            Combiner::Min,
            Combiner::Max,
            Combiner::Count,
        ] {
            let back: Combiner = combiner.to_string().parse().unwrap();
            assert_eq!(back, combiner);
        }
        assert!("median".parse::<Combiner>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_identifiers() {
        assert_eq!(serde_json::to_string(&Combiner::Mean).unwrap(), "\"mean\"");
        let back: Combiner = serde_json::from_str("\"max\"").unwrap();
        assert_eq!(back, Combiner::Max);
    }
}
