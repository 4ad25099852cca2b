//! Engine selection and sampler settings.

use clap::ValueEnum;

use crate::error::ConfigError;

/// Single-variable updates per Gibbs query
pub const DEFAULT_ITERATIONS: usize = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    /// Exact inference by variable elimination
    #[value(name = "ve", alias = "elimination")]
    Elimination,
    /// Approximate inference by Gibbs sampling
    #[value(name = "mc", alias = "gibbs")]
    Gibbs,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Elimination
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    pub algorithm: Algorithm,
    /// Gibbs iterations; ignored by variable elimination
    pub iterations: usize,
    /// Gibbs seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        InferenceConfig {
            algorithm: Algorithm::default(),
            iterations: DEFAULT_ITERATIONS,
            seed: None,
        }
    }
}

impl InferenceConfig {
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::InvalidIterations);
        }
        Ok(())
    }
}
