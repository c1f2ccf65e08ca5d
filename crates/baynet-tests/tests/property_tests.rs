//! Property tests for table and posterior invariants.

use baynet_core::{Evidence, ProbabilityModel, Variable};
use baynet_tests::binary_chain;
use proptest::prelude::*;

const TOL: f64 = 1e-9;

fn chain_params() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.05f64..0.95, 1..6)
}

/// Per-parent domain sizes plus the subject's, then one weight vector per row.
fn random_table() -> impl Strategy<Value = (Vec<usize>, usize, Vec<Vec<f64>>)> {
    (prop::collection::vec(1usize..4, 1..4), 2usize..5).prop_flat_map(|(parents, width)| {
        let rows: usize = parents.iter().product();
        let weights = prop::collection::vec(prop::collection::vec(0.0f64..1.0, width), rows);
        (Just(parents), Just(width), weights)
    })
}

fn values(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{}", prefix, i)).collect()
}

proptest! {
    #[test]
    fn every_row_of_a_valid_table_sums_to_one((parent_sizes, width, weights) in random_table()) {
        let subject = Variable::new("s", values("v", width)).unwrap();
        let parents: Vec<Variable> = parent_sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| Variable::new(format!("p{}", i), values("d", size)).unwrap())
            .collect();

        let mut table = Vec::with_capacity(weights.len());
        for (row, raw) in weights.iter().enumerate() {
            // Row `row` in mixed radix, first parent most significant.
            let mut given = vec![String::new(); parent_sizes.len()];
            let mut rest = row;
            for (slot, &size) in parent_sizes.iter().enumerate().rev() {
                given[slot] = format!("d{}", rest % size);
                rest /= size;
            }
            let total: f64 = raw.iter().map(|w| w + 0.01).sum();
            let dist: Vec<(String, f64)> = raw
                .iter()
                .enumerate()
                .map(|(i, w)| (format!("v{}", i), (w + 0.01) / total))
                .collect();
            table.push((given, dist));
        }

        let model = ProbabilityModel::create_conditional(subject, parents, table.clone()).unwrap();
        prop_assert_eq!(model.rows(), weights.len());
        for (given, dist) in &table {
            let row = model.row(given.as_slice()).unwrap();
            prop_assert!((row.total() - 1.0).abs() <= TOL, "{:?} sums to {}", given, row.total());
            for (value, p) in dist {
                prop_assert_eq!(model.probability(value, given.as_slice()).unwrap(), *p);
            }
        }
    }

    #[test]
    fn marginals_are_normalized_under_any_single_observation(
        params in chain_params(),
        observed in any::<prop::sample::Index>(),
        value_is_true in any::<bool>(),
    ) {
        let net = binary_chain(&params).unwrap();
        let node = observed.index(params.len());
        let value = if value_is_true { "t" } else { "f" };
        let name = format!("x{}", node);
        let posterior = net.posterior(&Evidence::new().with(name.clone(), value)).unwrap();

        prop_assert_eq!(posterior.len(), params.len());
        for (var, dist) in &posterior {
            prop_assert!((dist.total() - 1.0).abs() <= TOL, "{} sums to {}", var, dist.total());
            for (_, p) in dist.iter() {
                prop_assert!((0.0..=1.0 + TOL).contains(&p));
            }
        }
        prop_assert!(posterior.get(&name).unwrap().is_degenerate_on(value, TOL));
    }

    #[test]
    fn empty_evidence_matches_forward_propagation(params in chain_params()) {
        let net = binary_chain(&params).unwrap();
        let marginals = net.marginals().unwrap();

        // P(x_k = t) = P(x_{k-1} = t) * q + (1 - P(x_{k-1} = t)) * (1 - q)
        let mut p_true = params[0];
        for (k, &q) in params.iter().enumerate() {
            if k > 0 {
                p_true = p_true * q + (1.0 - p_true) * (1.0 - q);
            }
            let actual = marginals.probability(&format!("x{}", k), "t").unwrap();
            prop_assert!((actual - p_true).abs() <= TOL, "x{}: {} vs {}", k, actual, p_true);
        }
    }

    #[test]
    fn failed_queries_do_not_change_answers(params in chain_params()) {
        let net = binary_chain(&params).unwrap();
        let before = net.marginals().unwrap();
        prop_assert!(net.posterior(&Evidence::new().with("x0", "maybe")).is_err());
        prop_assert!(net.posterior(&Evidence::new().with("nope", "t")).is_err());
        prop_assert_eq!(net.marginals().unwrap(), before);
    }
}
