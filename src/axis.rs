//! # Bin Axis
//!
//! The bin axis is the dense row dimension of a [`PeakMatrix`](crate::store::PeakMatrix):
//! a strictly increasing sequence of bin centers, either supplied explicitly or
//! derived as an evenly spaced range. It is validated once at construction and
//! immutable afterwards.
//!
//! Evenly spaced axes carry their `(origin, step)` so the store can bin a key
//! directly to a small window of candidate bin indices instead of scanning the
//! whole axis per key. Explicit axes are probed for even spacing at
//! construction, so `BinAxis::from_centers(vec![1.0, 2.0, 3.0])` gets the fast
//! path too.

use serde::{Deserialize, Serialize};

/// Relative epsilon used when probing an explicit axis for even spacing.
const EVEN_SPACING_EPSILON: f64 = 1e-9;

/// Slack, in index space, applied when computing the candidate bin window.
/// Keys exactly on a tolerance boundary must not be lost to rounding; the
/// store re-checks true distance before including a value.
const INDEX_EPSILON: f64 = 1e-9;

/// Errors raised when constructing a bin axis
#[derive(Debug, thiserror::Error)]
pub enum AxisError {
    /// The axis has no bin centers
    #[error("bin axis is empty")]
    Empty,

    /// Centers are not strictly increasing
    #[error("bin axis is not strictly increasing at index {index}: {previous} >= {center}")]
    NotIncreasing {
        /// Index of the offending center
        index: usize,
        /// Center at `index - 1`
        previous: f64,
        /// Center at `index`
        center: f64,
    },

    /// A center, bound, or step is NaN or infinite
    #[error("bin axis contains a non-finite value: {value}")]
    NonFinite {
        /// The offending value
        value: f64,
    },

    /// Range derivation was given a non-positive step
    #[error("bin axis step must be positive, got {step}")]
    BadStep {
        /// The offending step
        step: f64,
    },

    /// Range derivation was given `stop < start`
    #[error("bin axis range is inverted: start {start} > stop {stop}")]
    BadRange {
        /// Lower bound
        start: f64,
        /// Upper bound
        stop: f64,
    },
}

/// Even spacing parameters for the single-pass binning path
#[derive(Debug, Clone, Copy, PartialEq)]
struct EvenSpacing {
    origin: f64,
    step: f64,
}

/// A strictly increasing, immutable sequence of bin centers
///
/// # Example
///
/// ```rust
/// use peakbin::axis::BinAxis;
///
/// let axis = BinAxis::from_range(100.0, 101.0, 0.25)?;
/// assert_eq!(axis.len(), 5);
/// assert_eq!(axis.center(2), Some(100.5));
/// # Ok::<(), peakbin::axis::AxisError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BinAxis {
    centers: Vec<f64>,
    spacing: Option<EvenSpacing>,
}

impl BinAxis {
    /// Build an axis from explicit bin centers
    ///
    /// Fails if the centers are empty, contain a non-finite value, or are not
    /// strictly increasing. Evenly spaced centers are detected and enable the
    /// single-pass binning path in the store.
    pub fn from_centers(centers: Vec<f64>) -> Result<Self, AxisError> {
        if centers.is_empty() {
            return Err(AxisError::Empty);
        }
        for (index, &center) in centers.iter().enumerate() {
            if !center.is_finite() {
                return Err(AxisError::NonFinite { value: center });
            }
            if index > 0 {
                let previous = centers[index - 1];
                if previous >= center {
                    return Err(AxisError::NotIncreasing {
                        index,
                        previous,
                        center,
                    });
                }
            }
        }

        let spacing = Self::detect_even_spacing(&centers);
        Ok(Self { centers, spacing })
    }

    /// Derive an evenly spaced axis covering `[start, stop]` with the given step
    ///
    /// Centers are `start, start + step, ...` up to and including the last
    /// center `<= stop` (within a relative epsilon, so `stop` itself is a
    /// center when the range is an exact multiple of `step`).
    pub fn from_range(start: f64, stop: f64, step: f64) -> Result<Self, AxisError> {
        for value in [start, stop, step] {
            if !value.is_finite() {
                return Err(AxisError::NonFinite { value });
            }
        }
        if step <= 0.0 {
            return Err(AxisError::BadStep { step });
        }
        if stop < start {
            return Err(AxisError::BadRange { start, stop });
        }

        // Multiply rather than accumulate so long axes do not drift.
        let span = ((stop - start) / step + INDEX_EPSILON).floor() as usize;
        let centers: Vec<f64> = (0..=span).map(|i| start + i as f64 * step).collect();
        Ok(Self {
            centers,
            spacing: Some(EvenSpacing {
                origin: start,
                step,
            }),
        })
    }

    /// Derive an evenly spaced axis spanning the global min/max of `keys`
    ///
    /// Non-finite keys are ignored; fails with [`AxisError::Empty`] if no
    /// finite key remains.
    pub fn spanning<I>(keys: I, step: f64) -> Result<Self, AxisError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for key in keys {
            if key.is_finite() {
                min = min.min(key);
                max = max.max(key);
            }
        }
        if min > max {
            return Err(AxisError::Empty);
        }
        Self::from_range(min, max, step)
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// `true` when the axis has no bins (never constructible; kept for API symmetry)
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Center of bin `r`, or `None` when out of range
    pub fn center(&self, r: usize) -> Option<f64> {
        self.centers.get(r).copied()
    }

    /// All bin centers, in increasing order
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// `true` when the axis is evenly spaced and eligible for the single-pass path
    pub fn is_even(&self) -> bool {
        self.spacing.is_some()
    }

    /// Candidate bin indices whose center may lie within `tolerance` of `key`
    ///
    /// Only available for evenly spaced axes; returns `None` for uneven axes,
    /// non-finite keys, or when the window misses the axis entirely. The
    /// window is inclusive and deliberately one epsilon wide: callers must
    /// re-check true distance `|key - center| <= tolerance` before including
    /// a value.
    pub fn candidate_bins(
        &self,
        key: f64,
        tolerance: f64,
    ) -> Option<std::ops::RangeInclusive<usize>> {
        let spacing = self.spacing?;
        if !key.is_finite() {
            return None;
        }

        let lo = ((key - tolerance - spacing.origin) / spacing.step - INDEX_EPSILON).ceil();
        let hi = ((key + tolerance - spacing.origin) / spacing.step + INDEX_EPSILON).floor();
        if !lo.is_finite() || !hi.is_finite() {
            return None;
        }

        let last = (self.centers.len() - 1) as f64;
        if hi < 0.0 || lo > last {
            return None;
        }
        let lo = lo.max(0.0) as usize;
        let hi = hi.min(last) as usize;
        if lo > hi {
            return None;
        }
        Some(lo..=hi)
    }

    /// Indices of centers within `tolerance` of `key` on an arbitrary axis
    ///
    /// Binary-searches the sorted centers for the inclusive window
    /// `[key - tolerance, key + tolerance]`. Used by the store when the axis
    /// is not evenly spaced; unlike [`candidate_bins`](Self::candidate_bins)
    /// the returned range is exact.
    pub fn window_bins(
        &self,
        key: f64,
        tolerance: f64,
    ) -> Option<std::ops::RangeInclusive<usize>> {
        if !key.is_finite() {
            return None;
        }
        let lower = key - tolerance;
        let upper = key + tolerance;

        let lo = self.centers.partition_point(|&c| c < lower);
        if lo == self.centers.len() {
            return None;
        }
        let hi = self.centers.partition_point(|&c| c <= upper);
        if hi == 0 || hi <= lo {
            return None;
        }
        Some(lo..=hi - 1)
    }

    fn detect_even_spacing(centers: &[f64]) -> Option<EvenSpacing> {
        let first = *centers.first()?;
        if centers.len() == 1 {
            return Some(EvenSpacing {
                origin: first,
                step: 1.0,
            });
        }
        let last = centers[centers.len() - 1];
        let step = (last - first) / (centers.len() - 1) as f64;
        if step <= 0.0 {
            return None;
        }
        for (i, &center) in centers.iter().enumerate() {
            let expected = first + i as f64 * step;
            let scale = center.abs().max(1.0);
            if (center - expected).abs() > EVEN_SPACING_EPSILON * scale {
                return None;
            }
        }
        Some(EvenSpacing {
            origin: first,
            step,
        })
    }
}

/// Serializable recipe for rebuilding a [`BinAxis`]
///
/// Persisting the recipe rather than the materialized centers keeps store
/// configuration files small for long derived axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSpec {
    /// Explicit bin centers
    Centers(Vec<f64>),
    /// Evenly spaced range, inclusive of `start` and of the last center `<= stop`
    Range {
        /// First bin center
        start: f64,
        /// Upper bound for the last bin center
        stop: f64,
        /// Distance between adjacent centers
        step: f64,
    },
}

impl AxisSpec {
    /// Materialize the axis this spec describes
    pub fn build(&self) -> Result<BinAxis, AxisError> {
        match self {
            AxisSpec::Centers(centers) => BinAxis::from_centers(centers.clone()),
            AxisSpec::Range { start, stop, step } => BinAxis::from_range(*start, *stop, *step),
        }
    }
}

impl From<&BinAxis> for AxisSpec {
    fn from(axis: &BinAxis) -> Self {
        match axis.spacing {
            Some(spacing) if axis.len() > 1 => AxisSpec::Range {
                start: spacing.origin,
                stop: axis.centers[axis.centers.len() - 1],
                step: spacing.step,
            },
            _ => AxisSpec::Centers(axis.centers.clone()),
        }
    }
}
