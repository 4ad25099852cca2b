pub mod elimination;
pub mod factor;
pub mod gibbs;
pub mod network;
pub mod observation;
pub mod query;
pub mod samples;

pub use elimination::VariableElimination;
pub use factor::Factor;
pub use gibbs::{GibbsSampler, SampleStats};
pub use network::{DomainValue, Network, RandomVariable};
pub use observation::{Observation, ObservationCondition, ValueId, VariableId};
pub use query::{expand_shorthand, format_probability, is_shorthand, Query};

use crate::config::{Algorithm, InferenceConfig};
use crate::error::Result;

/// Answers `P(target | evidence)` against a network
pub trait Inference {
    fn network(&self) -> &Network;

    fn probability(&mut self, query: &Query) -> Result<f64>;

    /// Parse `query`, answer it and format the result with six decimals
    fn answer(&mut self, query: &str) -> Result<String> {
        let query = Query::parse(self.network(), query)?;
        self.probability(&query).map(format_probability)
    }
}

/// Either inference engine, chosen at runtime
pub enum Engine<'a> {
    Elimination(VariableElimination<'a>),
    Gibbs(GibbsSampler<'a>),
}

impl<'a> Engine<'a> {
    pub fn from_config(network: &'a Network, config: &InferenceConfig) -> Result<Self> {
        match config.algorithm {
            Algorithm::Elimination => Ok(Engine::Elimination(VariableElimination::new(network))),
            Algorithm::Gibbs => Ok(Engine::Gibbs(GibbsSampler::from_config(network, config)?)),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Engine::Elimination(_) => Algorithm::Elimination,
            Engine::Gibbs(_) => Algorithm::Gibbs,
        }
    }
}

impl<'a> Inference for Engine<'a> {
    fn network(&self) -> &Network {
        match self {
            Engine::Elimination(ve) => ve.network(),
            Engine::Gibbs(gibbs) => gibbs.network(),
        }
    }

    fn probability(&mut self, query: &Query) -> Result<f64> {
        match self {
            Engine::Elimination(ve) => ve.probability(query),
            Engine::Gibbs(gibbs) => gibbs.probability(query),
        }
    }
}
