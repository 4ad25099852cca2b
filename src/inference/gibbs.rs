// Run gibbs sampling on a bayesian network
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::config::InferenceConfig;
use crate::error::{ConfigError, InvariantViolation, Result};
use crate::inference::network::Network;
use crate::inference::observation::{Observation, ObservationCondition, ValueId, VariableId};
use crate::inference::query::Query;
use crate::inference::Inference;

/// One value per variable, indexed by `VariableId`
pub struct GraphAssignment<'a> {
    pub network: &'a Network,
    pub assignments: Vec<ValueId>,
}

impl<'a> GraphAssignment<'a> {
    pub fn new(network: &'a Network, assignments: Vec<ValueId>) -> Self {
        GraphAssignment {
            network,
            assignments,
        }
    }

    /// P(v = its current value | current values of v's parents)
    fn local_probability(&self, values: &[ValueId], v: VariableId) -> f64 {
        let node = self.network.variable(v);
        let row: ObservationCondition = node
            .scope()
            .into_iter()
            .map(|u| Observation::new(u, values[u.index()]))
            .collect();
        node.probability(&row).unwrap_or(0.0)
    }

    /// Joint probability of the whole current assignment
    pub fn joint_probability(&self) -> f64 {
        self.network
            .variables()
            .map(|node| self.local_probability(&self.assignments, node.id()))
            .product()
    }

    /// Unnormalized P(v = x | Markov blanket of v) for every x, in domain order
    pub fn blanket_weights(&self, v: VariableId) -> Vec<f64> {
        let node = self.network.variable(v);
        let mut values = self.assignments.clone();
        node.values()
            .map(|x| {
                values[v.index()] = x;
                node.children()
                    .iter()
                    .fold(self.local_probability(&values, v), |weight, &child| {
                        weight * self.local_probability(&values, child)
                    })
            })
            .collect()
    }

    /// Draw a new value for `v` given everything else. Keeps the current value
    /// when no candidate has positive weight.
    pub fn resample_node<R: Rng + ?Sized>(&self, v: VariableId, rng: &mut R) -> ValueId {
        let weights = self.blanket_weights(v);
        match sample(&weights, rng) {
            Some(i) => ValueId(i),
            None => {
                trace!(variable = self.network.variable(v).name(), "blanket has zero mass");
                self.assignments[v.index()]
            }
        }
    }

    pub fn resample_node_in_place<R: Rng + ?Sized>(&mut self, v: VariableId, rng: &mut R) {
        self.assignments[v.index()] = self.resample_node(v, rng);
    }
}

/// Roulette-wheel draw: weights become percentages, a uniform number in
/// [0, 100) is drawn and the first index whose running total reaches it wins.
/// `None` if no weight is positive.
pub fn sample<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }
    let u: f64 = rng.gen_range(0.0, 100.0);
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, w) in weights.iter().enumerate() {
        if *w <= 0.0 {
            continue;
        }
        cumulative += 100.0 * w / total;
        last_positive = Some(i);
        if cumulative >= u {
            return Some(i);
        }
    }
    // rounding left the total a hair under u
    last_positive
}

/// Outcome of one sampling run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleStats {
    pub iterations: usize,
    /// iterations that ended with the target at its queried value
    pub hits: usize,
}

impl SampleStats {
    pub fn estimate(&self) -> f64 {
        self.hits as f64 / self.iterations as f64
    }
}

pub struct GibbsSampler<'a, R: Rng = StdRng> {
    network: &'a Network,
    rng: R,
    iterations: usize,
    last_run: Option<SampleStats>,
}

impl<'a> GibbsSampler<'a, StdRng> {
    /// Sampler seeded from OS entropy
    pub fn new(network: &'a Network) -> Self {
        GibbsSampler::with_rng(network, StdRng::from_entropy())
    }

    pub fn seeded(network: &'a Network, seed: u64) -> Self {
        GibbsSampler::with_rng(network, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(network: &'a Network, config: &InferenceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sampler = match config.seed {
            Some(seed) => GibbsSampler::seeded(network, seed),
            None => GibbsSampler::new(network),
        };
        Ok(sampler.with_iterations(config.iterations))
    }
}

impl<'a, R: Rng> GibbsSampler<'a, R> {
    pub fn with_rng(network: &'a Network, rng: R) -> Self {
        GibbsSampler {
            network,
            rng,
            iterations: crate::config::DEFAULT_ITERATIONS,
            last_run: None,
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Statistics of the most recent query; `None` if it never sampled
    pub fn last_run(&self) -> Option<SampleStats> {
        self.last_run
    }

    /// Run the chain for `query`, ignoring the direct CPT lookup.
    ///
    /// Evidence stays pinned; every other variable, the target included,
    /// starts uniformly at random. Each iteration resamples one randomly
    /// chosen free variable and tallies whether the target holds its queried
    /// value. There is no burn-in. Fails with `ImpossibleEvidence` if the
    /// chain never visits a state of positive probability.
    pub fn sample(&mut self, query: &Query) -> Result<SampleStats> {
        if self.iterations == 0 {
            return Err(ConfigError::InvalidIterations.into());
        }
        let network = self.network;
        let target = query.target;
        let mut free = Vec::new();
        let mut state = GraphAssignment::new(network, vec![ValueId(0); network.len()]);
        for node in network.variables() {
            let id = node.id();
            state.assignments[id.index()] = match query.evidence.value_of(id) {
                Some(value) => value,
                None => {
                    free.push(id);
                    ValueId(self.rng.gen_range(0, node.n_values()))
                }
            };
        }
        debug!(
            free = ?free
                .iter()
                .map(|id| network.variable(*id).name())
                .collect::<Vec<_>>(),
            "starting gibbs chain"
        );

        let mut reached_support = state.joint_probability() > 0.0;
        let mut hits = 0;
        for i in 0..self.iterations {
            let v = match free.choose(&mut self.rng) {
                Some(v) => *v,
                None => break,
            };
            state.resample_node_in_place(v, &mut self.rng);
            if !reached_support {
                reached_support = state.joint_probability() > 0.0;
            }
            if state.assignments[target.variable.index()] == target.value {
                hits += 1;
            }
            trace!(
                iteration = i,
                variable = network.variable(v).name(),
                value = network.variable(v).value_name(state.assignments[v.index()]),
                hits,
                "resampled"
            );
        }
        if !reached_support {
            return Err(InvariantViolation::ImpossibleEvidence.into());
        }
        Ok(SampleStats {
            iterations: self.iterations,
            hits,
        })
    }
}

impl<'a, R: Rng> Inference for GibbsSampler<'a, R> {
    fn network(&self) -> &Network {
        self.network
    }

    fn probability(&mut self, query: &Query) -> Result<f64> {
        let network = self.network;
        self.last_run = None;
        if let Some(p) = network.lookup(query.target.variable, &query.joint_condition()) {
            debug!(probability = p, "answered from the CPT directly");
            return Ok(p);
        }
        let stats = self.sample(query)?;
        self.last_run = Some(stats);
        info!(
            query = %network.describe_observation(query.target),
            given = %network.describe(&query.evidence),
            iterations = stats.iterations,
            hits = stats.hits,
            "gibbs sampling answered query"
        );
        Ok(stats.estimate())
    }
}
