//! Observed evidence: a partial assignment of variables to values.

use std::collections::{BTreeMap, HashMap};

use crate::engine::errors::{BayesError, BayesResult};
use crate::engine::network::BayesianNetwork;

/// A partial assignment `variable name -> observed value`.
///
/// Evidence is not tied to a network; it is checked against one each time it
/// is used in a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    observed: BTreeMap<String, String>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(variable, value);
        self
    }

    /// Observes `variable = value`, returning the previous observation if any.
    pub fn insert(
        &mut self,
        variable: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.observed.insert(variable.into(), value.into())
    }

    pub fn remove(&mut self, variable: &str) -> Option<String> {
        self.observed.remove(variable)
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.observed.get(variable).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Observations sorted by variable name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.observed
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Maps each network variable (by insertion index) to its observed domain
    /// index, or `None` when unobserved.
    pub(crate) fn resolve(
        &self,
        network: &BayesianNetwork,
        operation: &str,
    ) -> BayesResult<Vec<Option<usize>>> {
        let mut fixed = vec![None; network.len()];
        for (name, value) in self.iter() {
            let id = network.node_id(name).ok_or_else(|| {
                BayesError::ValidationError(format!(
                    "{}: evidence names unknown variable '{}'",
                    operation, name
                ))
            })?;
            let variable = network.nodes()[id.index()].variable();
            let value_idx = variable.index_of(value).ok_or_else(|| {
                BayesError::ValidationError(format!(
                    "{}: evidence value '{}' is not in the domain of '{}'",
                    operation, value, name
                ))
            })?;
            fixed[id.index()] = Some(value_idx);
        }
        Ok(fixed)
    }
}

impl<K, V> FromIterator<(K, V)> for Evidence
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut evidence = Evidence::new();
        for (variable, value) in iter {
            evidence.insert(variable, value);
        }
        evidence
    }
}

impl From<HashMap<String, String>> for Evidence {
    fn from(observed: HashMap<String, String>) -> Self {
        observed.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for Evidence {
    fn from(observed: BTreeMap<String, String>) -> Self {
        Self { observed }
    }
}
