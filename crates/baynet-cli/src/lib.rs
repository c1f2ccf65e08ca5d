//! Front-end helpers for the `baynet` binary: the built-in Monty Hall network
//! and JSON network descriptions.

pub mod monty_hall;
pub mod network_file;

pub use network_file::{load_network, parse_network, LoadError, NetworkFile};
