//! # baynet core
//!
//! Exact inference over small discrete Bayesian networks.
//!
//! A network is built from [`Variable`]s, each carrying a [`ProbabilityModel`]
//! (a prior or a conditional probability table). After [`BayesianNetwork::bake`]
//! validates and freezes the DAG, [`BayesianNetwork::posterior`] returns the
//! marginal of every variable conditioned on an [`Evidence`] set.
//!
//! ## Usage
//!
//! ```rust
//! use baynet_core::{BayesianNetwork, Evidence, ProbabilityModel, Variable};
//!
//! let rain = Variable::new("rain", ["yes", "no"])?;
//! let wet = Variable::new("wet", ["yes", "no"])?;
//!
//! let mut net = BayesianNetwork::new("lawn");
//! net.add_model(ProbabilityModel::create_prior(rain.clone(), [("yes", 0.2), ("no", 0.8)])?)?;
//! net.add_model(ProbabilityModel::create_conditional(
//!     wet,
//!     [rain],
//!     [
//!         (["yes"], [("yes", 0.9), ("no", 0.1)]),
//!         (["no"], [("yes", 0.1), ("no", 0.9)]),
//!     ],
//! )?)?;
//! net.add_edge("rain", "wet")?;
//! net.bake()?;
//!
//! let posterior = net.posterior(&Evidence::new().with("wet", "yes"))?;
//! let p_rain = posterior.probability("rain", "yes").unwrap_or_default();
//! assert!((p_rain - 0.18 / 0.26).abs() < 1e-9);
//! # Ok::<(), baynet_core::BayesError>(())
//! ```

#![forbid(unsafe_code)]

pub mod engine;

// Re-export commonly used types
pub use engine::distribution::{Distribution, PROBABILITY_TOLERANCE};
pub use engine::errors::{BayesError, BayesResult};
pub use engine::evidence::Evidence;
pub use engine::inference::{InferenceConfig, Posterior};
pub use engine::model::{ProbabilityModel, MAX_TABLE_ENTRIES};
pub use engine::network::BayesianNetwork;
pub use engine::variable::Variable;
