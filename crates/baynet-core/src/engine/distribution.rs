//! Discrete distributions over a variable's domain.

use std::fmt;
use std::sync::Arc;

/// Absolute tolerance used when checking that probabilities sum to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// A probability distribution over an ordered domain.
///
/// Used both for rows of a probability table and for posterior marginals.
/// Values keep the domain order of the variable they describe.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    values: Arc<[Arc<str>]>,
    probs: Vec<f64>,
}

impl Distribution {
    pub(crate) fn from_parts(values: Arc<[Arc<str>]>, probs: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), probs.len());
        Self { values, probs }
    }

    /// Probability of `value`, or `None` if it is not in the domain.
    pub fn get(&self, value: &str) -> Option<f64> {
        self.values
            .iter()
            .position(|v| v.as_ref() == value)
            .map(|idx| self.probs[idx])
    }

    /// `(value, probability)` pairs in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values
            .iter()
            .map(|v| v.as_ref())
            .zip(self.probs.iter().copied())
    }

    pub fn values(&self) -> &[Arc<str>] {
        &self.values
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probs
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// Most probable value. Ties go to the value declared first.
    pub fn mode(&self) -> Option<(&str, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &p) in self.probs.iter().enumerate() {
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((idx, p)),
            }
        }
        best.map(|(idx, p)| (self.values[idx].as_ref(), p))
    }

    /// True when all mass sits on `value` within `tolerance`.
    pub fn is_degenerate_on(&self, value: &str, tolerance: f64) -> bool {
        self.iter().all(|(v, p)| {
            let expected = if v == value { 1.0 } else { 0.0 };
            (p - expected).abs() <= tolerance
        })
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (value, p)) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:.6}", value, p)?;
        }
        write!(f, "}}")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Distribution {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.probs.len()))?;
        for (value, p) in self.iter() {
            map.serialize_entry(value, &p)?;
        }
        map.end()
    }
}

/// Checks that `probs` form a distribution: finite, in `[0, 1]`, summing to one.
///
/// Returns a human-readable reason on failure; callers wrap it with context.
pub(crate) fn check_normalized(probs: &[f64], tolerance: f64) -> Result<(), String> {
    for &p in probs {
        if !p.is_finite() {
            return Err(format!("probability {} is not finite", p));
        }
        if p < 0.0 {
            return Err(format!("probability {} is negative", p));
        }
        if p > 1.0 + tolerance {
            return Err(format!("probability {} exceeds 1", p));
        }
    }
    let total: f64 = probs.iter().sum();
    if (total - 1.0).abs() > tolerance {
        return Err(format!("probabilities sum to {} instead of 1", total));
    }
    Ok(())
}
