//! The inference engine for discrete Bayesian networks.
//!
//! This module provides:
//! - **errors**: Error taxonomy shared by every operation
//! - **variable**: Discrete random variables with ordered domains
//! - **distribution**: Distributions over a domain (table rows, marginals)
//! - **model**: Priors and conditional probability tables
//! - **network**: DAG construction, baking, structural queries
//! - **evidence**: Partial assignments used to condition queries
//! - **inference**: Exact posterior marginals by enumeration

pub mod distribution;
pub mod errors;
pub mod evidence;
pub mod inference;
pub mod model;
pub mod network;
pub mod variable;
