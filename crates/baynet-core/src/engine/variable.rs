//! Discrete random variables.

use std::fmt;
use std::sync::Arc;

use crate::engine::errors::{BayesError, BayesResult};

/// A discrete random variable with a finite, ordered domain.
///
/// Cloning is cheap: the name and domain are reference counted and never
/// change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: Arc<str>,
    domain: Arc<[Arc<str>]>,
}

impl Variable {
    /// Creates a variable from a name and its ordered domain labels.
    ///
    /// Fails with `ValidationError` if the name is empty, the domain is empty,
    /// or a label appears more than once.
    pub fn new<N, I, S>(name: N, domain: I) -> BayesResult<Self>
    where
        N: AsRef<str>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(BayesError::ValidationError(
                "variable name must not be empty".into(),
            ));
        }

        let mut labels: Vec<Arc<str>> = Vec::new();
        for value in domain {
            let value = value.as_ref();
            if labels.iter().any(|existing| existing.as_ref() == value) {
                return Err(BayesError::ValidationError(format!(
                    "variable '{}': domain value '{}' appears more than once",
                    name, value
                )));
            }
            labels.push(Arc::from(value));
        }
        if labels.is_empty() {
            return Err(BayesError::ValidationError(format!(
                "variable '{}': domain must not be empty",
                name
            )));
        }

        Ok(Self {
            name: Arc::from(name),
            domain: labels.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    pub(crate) fn shared_domain(&self) -> Arc<[Arc<str>]> {
        self.domain.clone()
    }

    /// Domain labels in declaration order.
    pub fn domain(&self) -> &[Arc<str>] {
        &self.domain
    }

    /// Number of values in the domain.
    pub fn cardinality(&self) -> usize {
        self.domain.len()
    }

    /// Position of `value` in the domain, if present.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.domain.iter().position(|v| v.as_ref() == value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.index_of(value).is_some()
    }

    /// Label at `index`, if in range.
    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.domain.get(index).map(|v| v.as_ref())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (idx, value) in self.domain.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "}}")
    }
}
