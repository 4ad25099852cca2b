use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use bayes_net::inference::{expand_shorthand, is_shorthand};
use bayes_net::logging::{init_logging, LogConfig, LogFormat};
use bayes_net::{Algorithm, Engine, Inference, InferenceConfig, Network, SampleNetwork};

#[derive(Parser)]
#[command(name = "bn-query")]
#[command(version)]
#[command(about = "Answer P(target | evidence) on a bundled Bayesian network")]
struct Cli {
    /// Network to query
    #[arg(value_enum, value_name = "NETWORK")]
    network: SampleNetwork,

    /// Inference algorithm
    #[arg(value_enum, value_name = "ALGORITHM", env = "BN_ALGORITHM")]
    algorithm: Algorithm,

    /// "TARGET=value | EVIDENCE=value, ..." or the shorthand "P(target|-evidence)"
    #[arg(value_name = "QUERY")]
    query: String,

    /// Single-variable updates for Gibbs sampling
    #[arg(long, default_value_t = bayes_net::config::DEFAULT_ITERATIONS, env = "BN_ITERATIONS")]
    iterations: usize,

    /// Seed for Gibbs sampling (random if omitted)
    #[arg(long, env = "BN_SEED")]
    seed: Option<u64>,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact", env = "BN_LOG_FORMAT")]
    log_format: LogFormat,

    /// Log filter directives, e.g. "bayes_net=debug" (overrides RUST_LOG)
    #[arg(long)]
    log_filter: Option<String>,
}

fn log_network(network: &Network) {
    for node in network.variables() {
        let mut rows: Vec<(String, f64)> = node
            .cpt()
            .map(|(condition, p)| (network.describe(condition), p))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        for (condition, p) in rows {
            debug!(node = node.name(), row = %condition, probability = p, "cpt");
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let network = cli
        .network
        .build()
        .context("failed to build the sample network")?;
    log_network(&network);

    let config = InferenceConfig {
        algorithm: cli.algorithm,
        iterations: cli.iterations,
        seed: cli.seed,
    };
    let mut engine = Engine::from_config(&network, &config)?;

    let query = if is_shorthand(&cli.query) {
        expand_shorthand(&cli.query)?
    } else {
        cli.query
    };
    let answer = engine
        .answer(&query)
        .with_context(|| format!("query '{}' failed", query))?;
    Ok(answer)
}

pub fn main() {
    let cli = Cli::parse();
    let log_config = LogConfig {
        format: cli.log_format,
        log_spans: false,
        filter: cli.log_filter.clone(),
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    match run(cli) {
        Ok(answer) => println!("{}", answer),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
