//! The Monty Hall network end to end.
//!
//! Uniform guest and prize doors; Monty opens a goat door the guest did not
//! pick. Conditioning on the guest's pick and Monty's door must reproduce the
//! classic 1/3 vs 2/3 answer.

use baynet_cli::monty_hall::{classic_queries, monty_hall_network, DOORS};
use baynet_core::{BayesError, Evidence};
use baynet_tests::{assert_close, assert_distribution};

const TOL: f64 = 1e-9;

#[test]
fn switching_doors_wins_two_thirds_of_the_time() {
    let network = monty_hall_network().expect("network");
    let evidence = Evidence::new().with("guest", "A").with("monty", "B");
    let posterior = network.posterior(&evidence).expect("posterior");

    let prize = posterior.get("prize").expect("prize marginal");
    assert_distribution(
        prize,
        &[("A", 1.0 / 3.0), ("B", 0.0), ("C", 2.0 / 3.0)],
        TOL,
        "prize",
    );
    assert_distribution(
        posterior.get("guest").expect("guest"),
        &[("A", 1.0), ("B", 0.0), ("C", 0.0)],
        TOL,
        "guest",
    );
    assert_distribution(
        posterior.get("monty").expect("monty"),
        &[("A", 0.0), ("B", 1.0), ("C", 0.0)],
        TOL,
        "monty",
    );
    // P(guest = A, monty = B) = 1/3 * 1/2
    assert_close(posterior.evidence_probability(), 1.0 / 6.0, TOL, "P(evidence)");
}

#[test]
fn guest_pick_alone_leaves_prize_uniform() {
    let network = monty_hall_network().expect("network");
    let posterior = network
        .posterior(&Evidence::new().with("guest", "A"))
        .expect("posterior");

    assert_distribution(
        posterior.get("prize").expect("prize"),
        &[("A", 1.0 / 3.0), ("B", 1.0 / 3.0), ("C", 1.0 / 3.0)],
        TOL,
        "prize",
    );
    assert_distribution(
        posterior.get("monty").expect("monty"),
        &[("A", 0.0), ("B", 0.5), ("C", 0.5)],
        TOL,
        "monty",
    );
}

#[test]
fn result_is_symmetric_in_door_labels() {
    let network = monty_hall_network().expect("network");
    for guest in DOORS {
        for monty in DOORS {
            if guest == monty {
                continue;
            }
            let other = DOORS
                .iter()
                .find(|d| **d != guest && **d != monty)
                .expect("third door");
            let posterior = network
                .posterior(&Evidence::new().with("guest", guest).with("monty", monty))
                .expect("posterior");
            let label = format!("guest={} monty={}", guest, monty);
            assert_close(posterior.probability("prize", guest).unwrap(), 1.0 / 3.0, TOL, &label);
            assert_close(posterior.probability("prize", monty).unwrap(), 0.0, TOL, &label);
            assert_close(posterior.probability("prize", other).unwrap(), 2.0 / 3.0, TOL, &label);
        }
    }
}

#[test]
fn monty_never_opens_the_guests_door() {
    let network = monty_hall_network().expect("network");
    let err = network
        .posterior(&Evidence::new().with("guest", "A").with("monty", "A"))
        .unwrap_err();
    assert!(matches!(err, BayesError::ArithmeticError(_)), "{:?}", err);
}

#[test]
fn out_of_domain_evidence_is_rejected_without_side_effects() {
    let network = monty_hall_network().expect("network");
    let before = network.marginals().expect("marginals");

    let err = network
        .posterior(&Evidence::new().with("guest", "Z"))
        .unwrap_err();
    assert!(matches!(err, BayesError::ValidationError(_)), "{:?}", err);

    let err = network
        .posterior(&Evidence::new().with("host", "A"))
        .unwrap_err();
    assert!(matches!(err, BayesError::ValidationError(_)), "{:?}", err);

    assert!(network.is_baked());
    assert_eq!(network.marginals().expect("marginals"), before);
}

#[test]
fn prediction_recommends_switching() {
    let network = monty_hall_network().expect("network");
    let completed = network
        .predict(&Evidence::new().with("guest", "A").with("monty", "B"))
        .expect("predict");
    assert_eq!(completed.get("prize"), Some("C"));
    assert_eq!(completed.get("guest"), Some("A"));
    assert_eq!(completed.get("monty"), Some("B"));
}

#[test]
fn classic_queries_run_and_normalize() {
    let network = monty_hall_network().expect("network");
    for evidence in classic_queries() {
        let posterior = network.posterior(&evidence).expect("posterior");
        assert_eq!(posterior.len(), 3);
        for (name, dist) in &posterior {
            assert_close(dist.total(), 1.0, TOL, name);
        }
    }
}

#[test]
fn baked_network_is_shared_across_threads() {
    let network = monty_hall_network().expect("network");
    let evidence = Evidence::new().with("guest", "A").with("monty", "B");
    let expected = network.posterior(&evidence).expect("posterior");

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| network.posterior(&evidence).expect("posterior")))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("thread"), expected);
        }
    });
}
