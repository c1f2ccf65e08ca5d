//! The Monty Hall problem as a three-node network.
//!
//! Doors A, B, C hide one prize. The guest picks a door, then Monty opens one
//! of the other doors that does not hide the prize:
//!
//! ```text
//! guest   prize
//!     \   /
//!      v v
//!     monty
//! ```

use baynet_core::{BayesResult, BayesianNetwork, Evidence, ProbabilityModel, Variable};

pub const DOORS: [&str; 3] = ["A", "B", "C"];

/// P(monty = m | guest = g, prize = p).
///
/// Monty never opens the guest's door or the prize door. If those coincide he
/// picks one of the two remaining doors uniformly; otherwise exactly one door
/// is left.
pub fn monty_choice(guest: &str, prize: &str, monty: &str) -> f64 {
    if monty == guest || monty == prize {
        0.0
    } else if guest == prize {
        0.5
    } else {
        1.0
    }
}

/// Builds and bakes the guest/prize/monty network.
pub fn monty_hall_network() -> BayesResult<BayesianNetwork> {
    let guest = Variable::new("guest", DOORS)?;
    let prize = Variable::new("prize", DOORS)?;
    let monty = Variable::new("monty", DOORS)?;

    let uniform = DOORS.map(|door| (door, 1.0 / 3.0));
    let guest_model = ProbabilityModel::create_prior(guest.clone(), uniform)?;
    let prize_model = ProbabilityModel::create_prior(prize.clone(), uniform)?;

    let mut rows = Vec::with_capacity(DOORS.len().pow(3));
    for g in DOORS {
        for p in DOORS {
            for m in DOORS {
                rows.push(([g, p, m], monty_choice(g, p, m)));
            }
        }
    }
    let monty_model =
        ProbabilityModel::create_conditional_from_rows(monty.clone(), [guest, prize], rows)?;

    let mut network = BayesianNetwork::new("Solving the Monty Hall Problem With Bayesian Networks");
    network.add_model(guest_model)?;
    network.add_model(prize_model)?;
    network.add_model(monty_model)?;
    network.add_edge("guest", "monty")?;
    network.add_edge("prize", "monty")?;
    network.bake()?;
    Ok(network)
}

/// The two classic queries: the guest picked A; then Monty opened B.
pub fn classic_queries() -> Vec<Evidence> {
    vec![
        Evidence::new().with("guest", "A"),
        Evidence::new().with("guest", "A").with("monty", "B"),
    ]
}
