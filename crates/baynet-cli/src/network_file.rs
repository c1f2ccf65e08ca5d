//! JSON network descriptions.
//!
//! ```json
//! {
//!   "name": "lawn",
//!   "variables": [
//!     { "name": "rain", "domain": ["yes", "no"], "prior": { "yes": 0.2, "no": 0.8 } },
//!     { "name": "wet", "domain": ["yes", "no"], "parents": ["rain"],
//!       "table": [
//!         { "given": ["yes"], "probs": { "yes": 0.9, "no": 0.1 } },
//!         { "given": ["no"],  "probs": { "yes": 0.1, "no": 0.9 } }
//!       ] }
//!   ]
//! }
//! ```
//!
//! Edges follow each variable's `parents` list, in order. The resulting
//! network is baked before it is returned.

use std::collections::BTreeMap;
use std::path::Path;

use baynet_core::{BayesError, BayesianNetwork, ProbabilityModel, Variable};
use serde::Deserialize;
use thiserror::Error;

/// Errors from reading or building a network description.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read network file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed network description: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Network(#[from] BayesError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkFile {
    pub name: String,
    pub variables: Vec<VariableSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableSpec {
    pub name: String,
    pub domain: Vec<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub prior: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub table: Option<Vec<RowSpec>>,
}

/// One CPT row: the parent values and the distribution they select.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowSpec {
    pub given: Vec<String>,
    pub probs: BTreeMap<String, f64>,
}

/// Reads and builds the network stored at `path`.
pub fn load_network(path: impl AsRef<Path>) -> Result<BayesianNetwork, LoadError> {
    let source = std::fs::read_to_string(path)?;
    parse_network(&source)
}

/// Parses a JSON description and builds the baked network.
pub fn parse_network(source: &str) -> Result<BayesianNetwork, LoadError> {
    let file: NetworkFile = serde_json::from_str(source)?;
    Ok(file.build()?)
}

impl NetworkFile {
    /// Builds and bakes the described network.
    pub fn build(&self) -> Result<BayesianNetwork, BayesError> {
        let mut variables: BTreeMap<&str, Variable> = BTreeMap::new();
        for spec in &self.variables {
            let variable = Variable::new(&spec.name, &spec.domain)?;
            if variables.insert(spec.name.as_str(), variable).is_some() {
                return Err(BayesError::DuplicateError(format!(
                    "network file: variable '{}' is declared more than once",
                    spec.name
                )));
            }
        }

        let mut network = BayesianNetwork::new(&self.name);
        for spec in &self.variables {
            let model = spec.model(&variables)?;
            network.add_model(model)?;
        }
        for spec in &self.variables {
            for parent in &spec.parents {
                network.add_edge(parent, &spec.name)?;
            }
        }
        network.bake()?;
        Ok(network)
    }
}

impl VariableSpec {
    fn model(&self, variables: &BTreeMap<&str, Variable>) -> Result<ProbabilityModel, BayesError> {
        let subject = variables[self.name.as_str()].clone();
        match (&self.prior, &self.table) {
            (Some(prior), None) if self.parents.is_empty() => {
                ProbabilityModel::create_prior(subject, prior.iter().map(|(k, p)| (k, *p)))
            }
            (None, Some(table)) if !self.parents.is_empty() => {
                let parents = self
                    .parents
                    .iter()
                    .map(|name| {
                        variables.get(name.as_str()).cloned().ok_or_else(|| {
                            BayesError::LookupError(format!(
                                "network file: '{}' names unknown parent '{}'",
                                self.name, name
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let rows = table.iter().map(|row| {
                    (
                        row.given.iter(),
                        row.probs.iter().map(|(k, p)| (k, *p)),
                    )
                });
                ProbabilityModel::create_conditional(subject, parents, rows)
            }
            _ => Err(BayesError::ValidationError(format!(
                "network file: '{}' needs a prior without parents, or a table with parents",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAWN: &str = r#"{
        "name": "lawn",
        "variables": [
            { "name": "rain", "domain": ["yes", "no"], "prior": { "yes": 0.2, "no": 0.8 } },
            { "name": "wet", "domain": ["yes", "no"], "parents": ["rain"],
              "table": [
                { "given": ["yes"], "probs": { "yes": 0.9, "no": 0.1 } },
                { "given": ["no"], "probs": { "yes": 0.1, "no": 0.9 } }
              ] }
        ]
    }"#;

    #[test]
    fn parses_and_bakes() {
        let network = parse_network(LAWN).unwrap();
        assert_eq!(network.name(), "lawn");
        assert!(network.is_baked());
        assert_eq!(network.parents("wet").unwrap(), vec!["rain"]);
    }

    #[test]
    fn unknown_parent_is_a_lookup_error() {
        let source = LAWN.replace(r#""parents": ["rain"]"#, r#""parents": ["snow"]"#);
        let err = parse_network(&source).unwrap_err();
        assert!(matches!(err, LoadError::Network(BayesError::LookupError(_))));
    }

    #[test]
    fn prior_and_parents_together_are_rejected() {
        let source = r#"{ "name": "bad", "variables": [
            { "name": "x", "domain": ["a"], "parents": ["x"], "prior": { "a": 1.0 } }
        ] }"#;
        let err = parse_network(source).unwrap_err();
        assert!(matches!(err, LoadError::Network(BayesError::ValidationError(_))));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(parse_network("{"), Err(LoadError::Json(_))));
    }
}
