//! Shared fixtures for the integration tests.

use baynet_core::{BayesResult, BayesianNetwork, Distribution, ProbabilityModel, Variable};

pub fn assert_close(actual: f64, expected: f64, tol: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{} mismatch: expected {:.15}, got {:.15}, diff={:.3e}",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

/// Asserts `dist` matches `expected` (value, probability) pairs in order.
pub fn assert_distribution(dist: &Distribution, expected: &[(&str, f64)], tol: f64, label: &str) {
    assert_eq!(dist.len(), expected.len(), "{} has wrong domain size", label);
    for ((value, p), (exp_value, exp_p)) in dist.iter().zip(expected) {
        assert_eq!(value, *exp_value, "{} domain order", label);
        assert_close(p, *exp_p, tol, &format!("{}[{}]", label, value));
    }
}

/// Random-ish chain `x0 -> x1 -> ...` with binary variables.
///
/// `priors[0]` is `P(x0 = t)`; `priors[k]` for `k > 0` is used for
/// `P(xk = t | x{k-1} = t)` and `1 - priors[k]` for `P(xk = t | x{k-1} = f)`.
pub fn binary_chain(priors: &[f64]) -> BayesResult<BayesianNetwork> {
    let mut network = BayesianNetwork::new("chain");
    let mut previous: Option<Variable> = None;
    for (idx, &p) in priors.iter().enumerate() {
        let var = Variable::new(format!("x{}", idx), ["t", "f"])?;
        let model = match &previous {
            None => ProbabilityModel::create_prior(var.clone(), [("t", p), ("f", 1.0 - p)])?,
            Some(parent) => ProbabilityModel::create_conditional(
                var.clone(),
                [parent.clone()],
                [
                    (["t"], [("t", p), ("f", 1.0 - p)]),
                    (["f"], [("t", 1.0 - p), ("f", p)]),
                ],
            )?,
        };
        network.add_model(model)?;
        if let Some(parent) = &previous {
            network.add_edge(parent.name(), var.name())?;
        }
        previous = Some(var);
    }
    network.bake()?;
    Ok(network)
}
