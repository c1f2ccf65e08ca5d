//! Network construction and bake validation.

use baynet_core::{BayesError, BayesianNetwork, ProbabilityModel, Variable};

fn binary(name: &str) -> Variable {
    Variable::new(name, ["0", "1"]).expect("variable")
}

fn prior(name: &str) -> ProbabilityModel {
    ProbabilityModel::create_prior(binary(name), [("0", 0.5), ("1", 0.5)]).expect("prior")
}

/// Noisy copy of the first parent; other parents are ignored.
fn depends_on(name: &str, parents: &[&str]) -> ProbabilityModel {
    let parent_vars: Vec<Variable> = parents.iter().map(|p| binary(p)).collect();
    let mut rows = Vec::new();
    for combo in 0..(1u32 << parents.len()) {
        let given: Vec<String> = (0..parents.len())
            .map(|bit| ((combo >> (parents.len() - 1 - bit)) & 1).to_string())
            .collect();
        let one = if given[0] == "1" { 0.9 } else { 0.1 };
        rows.push((given, vec![("0", 1.0 - one), ("1", one)]));
    }
    ProbabilityModel::create_conditional(binary(name), parent_vars, rows).expect("cpt")
}

#[test]
fn two_node_cycle_fails_with_cycle_error() {
    let mut net = BayesianNetwork::new("cycle");
    net.add_model(depends_on("a", &["b"])).unwrap();
    net.add_model(depends_on("b", &["a"])).unwrap();
    net.add_edge("a", "b").unwrap();
    net.add_edge("b", "a").unwrap();

    assert!(matches!(net.bake(), Err(BayesError::CycleError(_))));
    assert!(!net.is_baked());
    assert!(net.topological_order().is_none());
}

#[test]
fn cycle_is_reported_even_when_tables_disagree() {
    let mut net = BayesianNetwork::new("cycle");
    net.add_model(prior("a")).unwrap();
    net.add_model(prior("b")).unwrap();
    net.add_edge("a", "b").unwrap();
    net.add_edge("b", "a").unwrap();

    assert!(matches!(net.bake(), Err(BayesError::CycleError(_))));
}

#[test]
fn long_cycle_behind_a_root_is_found() {
    let mut net = BayesianNetwork::new("cycle");
    net.add_model(prior("root")).unwrap();
    net.add_model(depends_on("x", &["root", "z"])).unwrap();
    net.add_model(depends_on("y", &["x"])).unwrap();
    net.add_model(depends_on("z", &["y"])).unwrap();
    net.add_edge("root", "x").unwrap();
    net.add_edge("z", "x").unwrap();
    net.add_edge("x", "y").unwrap();
    net.add_edge("y", "z").unwrap();

    match net.bake() {
        Err(BayesError::CycleError(msg)) => {
            assert!(msg.contains("x -> y -> z -> x"), "{}", msg)
        }
        other => panic!("expected cycle error, got {:?}", other),
    }
}

#[test]
fn same_parents_in_other_order_is_a_structure_error() {
    let mut net = BayesianNetwork::new("order");
    net.add_model(prior("a")).unwrap();
    net.add_model(prior("b")).unwrap();
    net.add_model(depends_on("c", &["a", "b"])).unwrap();
    net.add_edge("b", "c").unwrap();
    net.add_edge("a", "c").unwrap();

    assert!(matches!(net.bake(), Err(BayesError::StructureError(_))));
    assert!(!net.is_baked());
}

#[test]
fn extra_graph_parent_is_a_structure_error() {
    let mut net = BayesianNetwork::new("extra");
    net.add_model(prior("a")).unwrap();
    net.add_model(prior("b")).unwrap();
    net.add_model(depends_on("c", &["a"])).unwrap();
    net.add_edge("a", "c").unwrap();
    net.add_edge("b", "c").unwrap();

    assert!(matches!(net.bake(), Err(BayesError::StructureError(_))));
}

#[test]
fn parent_with_different_domain_is_a_structure_error() {
    let mut net = BayesianNetwork::new("domains");
    let wide = Variable::new("a", ["0", "1", "2"]).unwrap();
    net.add_model(
        ProbabilityModel::create_prior(wide, [("0", 0.2), ("1", 0.3), ("2", 0.5)]).unwrap(),
    )
    .unwrap();
    net.add_model(depends_on("c", &["a"])).unwrap();
    net.add_edge("a", "c").unwrap();

    assert!(matches!(net.bake(), Err(BayesError::StructureError(_))));
}

#[test]
fn bake_is_idempotent_and_freezes_structure() {
    let mut net = BayesianNetwork::new("frozen");
    net.add_model(prior("a")).unwrap();
    net.add_model(depends_on("b", &["a"])).unwrap();
    net.add_edge("a", "b").unwrap();

    net.bake().unwrap();
    let order: Vec<String> = net
        .topological_order()
        .unwrap()
        .into_iter()
        .map(String::from)
        .collect();
    net.bake().unwrap();
    assert_eq!(net.topological_order().unwrap(), order);

    assert!(matches!(
        net.add_model(prior("c")),
        Err(BayesError::StructureError(_))
    ));
    assert!(matches!(
        net.add_edge("b", "a"),
        Err(BayesError::StructureError(_))
    ));
    assert_eq!(net.len(), 2);
    assert_eq!(net.edge_count(), 1);
}

#[test]
fn failed_bake_can_be_repaired() {
    let mut net = BayesianNetwork::new("repair");
    net.add_model(prior("a")).unwrap();
    net.add_model(depends_on("b", &["a"])).unwrap();

    assert!(matches!(net.bake(), Err(BayesError::StructureError(_))));
    net.add_edge("a", "b").unwrap();
    net.bake().unwrap();
    assert_eq!(net.topological_order().unwrap(), vec!["a", "b"]);
}

#[test]
fn registration_errors_use_the_documented_kinds() {
    let mut net = BayesianNetwork::new("errors");
    net.add_model(prior("a")).unwrap();

    assert!(matches!(
        net.add_model(prior("a")),
        Err(BayesError::DuplicateError(_))
    ));
    assert!(matches!(
        net.add_edge("a", "nope"),
        Err(BayesError::LookupError(_))
    ));
    assert!(matches!(
        net.add_edge("nope", "a"),
        Err(BayesError::LookupError(_))
    ));
    assert!(matches!(
        net.parents("nope"),
        Err(BayesError::LookupError(_))
    ));
    assert!(net.variable("a").is_some());
    assert!(net.model("a").map(ProbabilityModel::is_prior).unwrap_or(false));
}

#[test]
fn diamond_orders_every_node_after_its_parents() {
    let mut net = BayesianNetwork::new("diamond");
    net.add_model(depends_on("d", &["b", "c"])).unwrap();
    net.add_model(depends_on("c", &["a"])).unwrap();
    net.add_model(depends_on("b", &["a"])).unwrap();
    net.add_model(prior("a")).unwrap();
    net.add_edge("b", "d").unwrap();
    net.add_edge("c", "d").unwrap();
    net.add_edge("a", "c").unwrap();
    net.add_edge("a", "b").unwrap();
    net.bake().unwrap();

    let order = net.topological_order().unwrap();
    let position = |name: &str| order.iter().position(|n| *n == name).unwrap();
    for child in ["b", "c", "d"] {
        for parent in net.parents(child).unwrap() {
            assert!(position(parent) < position(child), "{} before {}", parent, child);
        }
    }
    assert_eq!(net.children("a").unwrap(), vec!["c", "b"]);
}
