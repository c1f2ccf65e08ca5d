//! baynet CLI - exact inference over discrete Bayesian networks
//!
//! Usage:
//!   baynet                                  # Monty Hall demo, two classic queries
//!   baynet -e guest=A -e monty=B            # Monty Hall with custom evidence
//!   baynet <file.json>                      # Marginals of a network description
//!   baynet <file.json> -e x=1 -o json       # Posterior as JSON

use std::path::PathBuf;
use std::process;

use baynet_cli::monty_hall::{classic_queries, monty_hall_network};
use baynet_cli::load_network;
use baynet_core::{BayesianNetwork, Evidence, InferenceConfig, Posterior, PROBABILITY_TOLERANCE};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "baynet")]
#[command(version)]
#[command(about = "baynet - exact inference over discrete Bayesian networks")]
#[command(
    long_about = "Compute posterior marginals of a discrete Bayesian network. Without a FILE the Monty Hall network is used."
)]
struct Cli {
    /// JSON network description (defaults to the Monty Hall network)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Observed value, repeatable
    #[arg(short, long = "evidence", value_name = "NAME=VALUE", value_parser = parse_observation)]
    evidence: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    output: OutputFormat,

    /// Absolute tolerance for normalization checks
    #[arg(long, default_value_t = PROBABILITY_TOLERANCE)]
    tolerance: f64,

    /// List variables, domains, and parents instead of querying
    #[arg(short, long)]
    list_variables: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
    Debug,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let network = match &cli.file {
        Some(path) => load_network(path).unwrap_or_else(|e| {
            eprintln!("Error loading '{}': {}", path.display(), e);
            process::exit(1);
        }),
        None => monty_hall_network().unwrap_or_else(|e| {
            eprintln!("Error building Monty Hall network: {}", e);
            process::exit(1);
        }),
    };
    tracing::debug!(
        network = network.name(),
        variables = network.len(),
        edges = network.edge_count(),
        "network ready"
    );

    if cli.list_variables {
        print_variables(&network);
        return;
    }

    let queries = if !cli.evidence.is_empty() {
        vec![cli.evidence.iter().cloned().collect::<Evidence>()]
    } else if cli.file.is_none() {
        classic_queries()
    } else {
        vec![Evidence::new()]
    };

    let config = InferenceConfig {
        tolerance: cli.tolerance,
        ..InferenceConfig::default()
    };

    let mut results = Vec::with_capacity(queries.len());
    for evidence in queries {
        match network.posterior_with_config(&evidence, config) {
            Ok(posterior) => results.push((evidence, posterior)),
            Err(e) => {
                eprintln!("Error [{}]: {}", e.kind(), e);
                process::exit(1);
            }
        }
    }

    match cli.output {
        OutputFormat::Json => {
            let payload: Vec<serde_json::Value> = results
                .iter()
                .map(|(evidence, posterior)| format_result(evidence, posterior))
                .collect();
            match serde_json::to_string_pretty(&payload) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing to JSON: {}", e);
                    process::exit(1);
                }
            }
        }
        OutputFormat::Debug => {
            for (evidence, posterior) in &results {
                println!("{:?}\n{:#?}", evidence, posterior);
            }
        }
        OutputFormat::Summary => {
            for (evidence, posterior) in &results {
                print_summary(&network, evidence, posterior);
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_observation(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=').map(|(name, value)| (name.trim(), value.trim())) {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

fn print_variables(network: &BayesianNetwork) {
    println!("Variables in '{}':", network.name());
    for variable in network.variables() {
        let parents = network.parents(variable.name()).unwrap_or_default();
        if parents.is_empty() {
            println!("  - {}", variable);
        } else {
            println!("  - {} | {}", variable, parents.join(", "));
        }
    }
}

fn print_summary(network: &BayesianNetwork, evidence: &Evidence, posterior: &Posterior) {
    if evidence.is_empty() {
        println!("===== Marginals of '{}' =====\n", network.name());
    } else {
        let given: Vec<String> = evidence
            .iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .collect();
        println!("===== Probabilities given {} =====\n", given.join(", "));
    }
    for (name, dist) in posterior {
        println!("{}\t{}", name, dist);
    }
    println!(
        "\nP(evidence) = {:.6} over {} assignments\n",
        posterior.evidence_probability(),
        posterior.assignments()
    );
}

fn format_result(evidence: &Evidence, posterior: &Posterior) -> serde_json::Value {
    let observed: serde_json::Map<String, serde_json::Value> = evidence
        .iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
        .collect();
    serde_json::json!({
        "evidence": observed,
        "evidence_probability": posterior.evidence_probability(),
        "assignments": posterior.assignments(),
        "posterior": posterior,
    })
}
