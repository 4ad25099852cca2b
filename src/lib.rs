//! Exact and approximate inference over discrete Bayesian networks.
//!
//! A [`Network`] is built node by node from textual CPT rows, then queried
//! with strings such as `"FIRE=T | SMOKE=T"` through either
//! [`VariableElimination`] or [`GibbsSampler`], both of which implement
//! [`Inference`].
//!
//! ```
//! use bayes_net::{Inference, Network, VariableElimination};
//!
//! let mut net = Network::new();
//! net.add_node("FIRE", &[], &["T", "F"], &["FIRE=T: 0.01", "FIRE=F: 0.99"])?;
//! net.add_node(
//!     "SMOKE",
//!     &["FIRE"],
//!     &["T", "F"],
//!     &[
//!         "SMOKE=T, FIRE=T: 0.9",
//!         "SMOKE=F, FIRE=T: 0.1",
//!         "SMOKE=T, FIRE=F: 0.01",
//!         "SMOKE=F, FIRE=F: 0.99",
//!     ],
//! )?;
//! let mut ve = VariableElimination::new(&net);
//! assert_eq!(ve.answer("FIRE=T | SMOKE=T")?, "0.476190");
//! # Ok::<(), bayes_net::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod inference;
pub mod logging;

pub use config::{Algorithm, InferenceConfig};
pub use error::{ConfigError, Error, InvariantViolation, QueryError, Result};
pub use inference::samples::SampleNetwork;
pub use inference::{
    Engine, GibbsSampler, Inference, Network, Query, SampleStats, VariableElimination,
};
