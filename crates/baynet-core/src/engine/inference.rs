//! # Exact Inference
//!
//! Posterior marginals by exhaustive enumeration of the joint distribution.
//!
//! For evidence `e`, every full assignment consistent with `e` is visited once.
//! Its joint probability is the product of one table entry per variable, taken
//! in topological order. Summing these products per `(variable, value)` gives
//! the unnormalized marginals; dividing by the total mass `P(e)` conditions on
//! the evidence.
//!
//! Cost is `O(prod |domain| * n)`. This is meant for small networks where an
//! exact, auditable answer matters more than speed; the number of enumerated
//! assignments is capped by [`InferenceConfig::max_assignments`].

use std::sync::Arc;

use crate::engine::distribution::{Distribution, PROBABILITY_TOLERANCE};
use crate::engine::errors::{BayesError, BayesResult};
use crate::engine::evidence::Evidence;
use crate::engine::network::{BayesianNetwork, NodeId};

/// Configuration for exact enumeration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceConfig {
    /// Absolute tolerance for "sums to one" and "is degenerate" checks.
    pub tolerance: f64,
    /// Upper bound on the number of full assignments a query may enumerate.
    pub max_assignments: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            tolerance: PROBABILITY_TOLERANCE,
            max_assignments: 1 << 24,
        }
    }
}

impl InferenceConfig {
    fn validate(self) -> BayesResult<Self> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 || self.tolerance > 1e-3 {
            return Err(BayesError::ValidationError(
                "inference: tolerance must be finite and in (0, 1e-3]".into(),
            ));
        }
        if self.max_assignments == 0 {
            return Err(BayesError::ValidationError(
                "inference: max_assignments must be > 0".into(),
            ));
        }
        Ok(self)
    }
}

/// Posterior marginals of every variable given some evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    marginals: Vec<(Arc<str>, Distribution)>,
    evidence_probability: f64,
    assignments: u64,
}

impl Posterior {
    /// Marginal of `variable`, if it is in the network.
    pub fn get(&self, variable: &str) -> Option<&Distribution> {
        self.marginals
            .iter()
            .find(|(name, _)| name.as_ref() == variable)
            .map(|(_, dist)| dist)
    }

    /// Shorthand for `get(variable)?.get(value)`.
    pub fn probability(&self, variable: &str, value: &str) -> Option<f64> {
        self.get(variable).and_then(|dist| dist.get(value))
    }

    /// `(variable, marginal)` pairs in network insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Distribution)> + '_ {
        self.marginals.iter().map(|(name, dist)| (name.as_ref(), dist))
    }

    pub fn len(&self) -> usize {
        self.marginals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marginals.is_empty()
    }

    /// `P(evidence)` under the model (about `1.0` for empty evidence).
    pub fn evidence_probability(&self) -> f64 {
        self.evidence_probability
    }

    /// Number of full assignments enumerated to answer the query.
    pub fn assignments(&self) -> u64 {
        self.assignments
    }
}

impl<'a> IntoIterator for &'a Posterior {
    type Item = (&'a str, &'a Distribution);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Distribution)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Posterior {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.marginals.len()))?;
        for (name, dist) in self.iter() {
            map.serialize_entry(name, dist)?;
        }
        map.end()
    }
}

/// Raw sums produced by one enumeration pass.
struct Enumeration {
    /// Unnormalized marginals, indexed `[node][value]`.
    sums: Vec<Vec<f64>>,
    total: f64,
    assignments: u64,
}

impl BayesianNetwork {
    /// Posterior marginal of every variable given `evidence`.
    ///
    /// Fails with `StructureError` if the network is not baked,
    /// `ValidationError` for unknown variables or values in the evidence, and
    /// `ArithmeticError` if the evidence has probability zero.
    ///
    /// The zero test is exact (`P(e) <= 0.0`). Impossible evidence always
    /// multiplies in a literal `0.0` table entry, while possible evidence in a
    /// deep network can legitimately have mass below any fixed tolerance.
    /// The absolute tolerance applies to the "sums to one" and degenerate
    /// evidence checks instead.
    pub fn posterior(&self, evidence: &Evidence) -> BayesResult<Posterior> {
        self.posterior_with_config(evidence, InferenceConfig::default())
    }

    /// [`posterior`](Self::posterior) with explicit configuration.
    pub fn posterior_with_config(
        &self,
        evidence: &Evidence,
        config: InferenceConfig,
    ) -> BayesResult<Posterior> {
        let config = config.validate()?;
        self.baked_structure("posterior")?;
        let fixed = evidence.resolve(self, "posterior")?;
        let enumeration = self.enumerate(&fixed, config, "posterior")?;

        if enumeration.total <= 0.0 {
            return Err(BayesError::ArithmeticError(format!(
                "posterior: evidence {} has probability zero in network '{}'",
                describe(evidence),
                self.name()
            )));
        }

        let mut marginals = Vec::with_capacity(self.len());
        for (node, sums) in self.nodes().iter().zip(enumeration.sums) {
            let variable = node.variable();
            let probs: Vec<f64> = sums.into_iter().map(|s| s / enumeration.total).collect();
            let dist = Distribution::from_parts(variable.shared_domain(), probs);

            let total = dist.total();
            if (total - 1.0).abs() > config.tolerance {
                return Err(BayesError::Internal(format!(
                    "posterior: marginal of '{}' sums to {} after normalization",
                    variable.name(),
                    total
                )));
            }
            if let Some(observed) = evidence.get(variable.name()) {
                if !dist.is_degenerate_on(observed, config.tolerance) {
                    return Err(BayesError::Internal(format!(
                        "posterior: observed '{}' = '{}' but marginal is {}",
                        variable.name(),
                        observed,
                        dist
                    )));
                }
            }
            marginals.push((variable.shared_name(), dist));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            network = %self.name(),
            evidence = %describe(evidence),
            assignments = enumeration.assignments,
            evidence_probability = enumeration.total,
            "computed posterior"
        );

        Ok(Posterior {
            marginals,
            evidence_probability: enumeration.total,
            assignments: enumeration.assignments,
        })
    }

    /// Unconditional marginals, i.e. `posterior` with empty evidence.
    pub fn marginals(&self) -> BayesResult<Posterior> {
        self.posterior(&Evidence::new())
    }

    /// `P(evidence)`: total probability of all assignments consistent with it.
    ///
    /// Unlike [`posterior`](Self::posterior), impossible evidence is not an
    /// error here; it yields `0.0`.
    pub fn evidence_probability(&self, evidence: &Evidence) -> BayesResult<f64> {
        self.baked_structure("evidence_probability")?;
        let fixed = evidence.resolve(self, "evidence_probability")?;
        let enumeration =
            self.enumerate(&fixed, InferenceConfig::default(), "evidence_probability")?;
        Ok(enumeration.total)
    }

    /// Joint probability of a full assignment of every variable.
    pub fn joint_probability(&self, assignment: &Evidence) -> BayesResult<f64> {
        let baked = self.baked_structure("joint_probability")?;
        let fixed = assignment.resolve(self, "joint_probability")?;
        let mut values = Vec::with_capacity(fixed.len());
        for (node, value) in self.nodes().iter().zip(&fixed) {
            match value {
                Some(idx) => values.push(*idx),
                None => {
                    return Err(BayesError::ValidationError(format!(
                        "joint_probability: assignment has no value for '{}'",
                        node.variable().name()
                    )))
                }
            }
        }
        Ok(self.joint(&baked.order, &values))
    }

    /// Natural log of [`joint_probability`](Self::joint_probability);
    /// `-inf` for impossible assignments.
    pub fn log_probability(&self, assignment: &Evidence) -> BayesResult<f64> {
        self.joint_probability(assignment).map(f64::ln)
    }

    /// Completes `evidence` with the most probable value of every unobserved
    /// variable under its posterior marginal. Ties go to the value declared
    /// first in the domain.
    pub fn predict(&self, evidence: &Evidence) -> BayesResult<Evidence> {
        let posterior = self.posterior(evidence)?;
        let mut completed = evidence.clone();
        for (name, dist) in posterior.iter() {
            if evidence.get(name).is_some() {
                continue;
            }
            let (value, _) = dist.mode().ok_or_else(|| {
                BayesError::Internal(format!("predict: '{}' has an empty marginal", name))
            })?;
            completed.insert(name, value);
        }
        Ok(completed)
    }

    /// Visits every assignment consistent with `fixed`, free variables
    /// advancing like an odometer (last inserted variable fastest).
    fn enumerate(
        &self,
        fixed: &[Option<usize>],
        config: InferenceConfig,
        operation: &str,
    ) -> BayesResult<Enumeration> {
        let baked = self.baked_structure(operation)?;
        let nodes = self.nodes();

        let free: Vec<usize> = (0..nodes.len()).filter(|&idx| fixed[idx].is_none()).collect();
        let mut space: u64 = 1;
        for &idx in &free {
            space = space
                .checked_mul(nodes[idx].variable().cardinality() as u64)
                .filter(|&n| n <= config.max_assignments)
                .ok_or_else(|| {
                    BayesError::Execution(format!(
                        "{}: more than {} assignments to enumerate in network '{}'",
                        operation,
                        config.max_assignments,
                        self.name()
                    ))
                })?;
        }

        let mut values: Vec<usize> = fixed.iter().map(|v| v.unwrap_or(0)).collect();
        let mut sums: Vec<Vec<f64>> = nodes
            .iter()
            .map(|node| vec![0.0; node.variable().cardinality()])
            .collect();
        let mut total = 0.0;

        for _ in 0..space {
            let p = self.joint(&baked.order, &values);
            if p > 0.0 {
                total += p;
                for (node_sums, &value) in sums.iter_mut().zip(&values) {
                    node_sums[value] += p;
                }
            }

            for &idx in free.iter().rev() {
                values[idx] += 1;
                if values[idx] < nodes[idx].variable().cardinality() {
                    break;
                }
                values[idx] = 0;
            }
        }

        Ok(Enumeration {
            sums,
            total,
            assignments: space,
        })
    }

    /// Product of table entries for one full assignment, in topological order.
    fn joint(&self, order: &[NodeId], values: &[usize]) -> f64 {
        let nodes = self.nodes();
        let mut p = 1.0;
        for &id in order {
            let node = &nodes[id.index()];
            let row = node
                .model
                .row_index(node.parents.iter().map(|parent| values[parent.index()]));
            p *= node.model.entry(row, values[id.index()]);
            if p == 0.0 {
                break;
            }
        }
        p
    }
}

fn describe(evidence: &Evidence) -> String {
    let pairs: Vec<String> = evidence
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}
