//! Autotask CLI
//!
//! Runs chains of automation nodes from YAML or JSON files and prints node
//! contracts.
//!
//! Usage from workspace root:
//!   cargo run --bin autotask -- run chain.yaml --dry-run   # Log primitives instead of performing them
//!   cargo run --bin autotask -- check chain.yaml           # Validate without running
//!   cargo run --bin autotask -- nodes --kind image_click   # Print a node's contract

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use autotask::nodes::ImageClickNode;
use autotask::{create_backend, NodeContract, NodeRegistry};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

mod chain;
mod runner;
mod workflow_result;

use chain::Chain;
use runner::ChainRunner;

#[derive(Parser)]
#[command(name = "autotask")]
#[command(version, about = "Run desktop automation chains")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Chain file (JSON or YAML)
    file: PathBuf,

    /// Log every primitive instead of performing it
    #[clap(long)]
    dry_run: bool,

    /// Pause between image lookups, in milliseconds
    #[clap(long, env = "AUTOTASK_ATTEMPT_GAP_MS")]
    attempt_gap_ms: Option<u64>,
}

#[derive(Parser, Debug)]
struct NodesArgs {
    /// Only print this node kind
    #[clap(long)]
    kind: Option<String>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Chain file (JSON or YAML)
    file: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a chain and print its result as JSON
    Run(RunArgs),
    /// Print node contracts as JSON
    Nodes(NodesArgs),
    /// Validate a chain file without running it
    Check(CheckArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Run(args) => run_chain(args).await,
        Commands::Nodes(args) => print_nodes(args),
        Commands::Check(args) => check_chain(args),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ {e:#}");
            std::process::exit(2);
        }
    }
}

fn init_logging() {
    let log_level = env::var("LOG_LEVEL")
        .map(|level| match level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn registry(dry_run: bool, attempt_gap: Option<Duration>) -> Result<NodeRegistry> {
    let (backend, clipboard) =
        create_backend(dry_run).context("failed to initialise automation primitives")?;
    let mut registry = NodeRegistry::builtin(backend.clone(), clipboard);
    if let Some(gap) = attempt_gap {
        registry.register(Arc::new(ImageClickNode::new(backend).with_attempt_gap(gap)));
    }
    Ok(registry)
}

async fn run_chain(args: RunArgs) -> Result<bool> {
    let chain = Chain::load(&args.file)?;
    let registry = registry(args.dry_run, args.attempt_gap_ms.map(Duration::from_millis))?;
    info!(file = %args.file.display(), dry_run = args.dry_run, "running chain");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling chain");
            on_signal.cancel();
        }
    });

    let result = ChainRunner::new(registry)
        .with_cancel(cancel)
        .run(&chain)
        .await?;

    result.display();
    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("failed to serialise chain result")?
    );
    Ok(result.success)
}

fn print_nodes(args: NodesArgs) -> Result<bool> {
    let registry = registry(true, None)?;
    let contracts: BTreeMap<&str, &NodeContract> = registry
        .contracts()
        .filter(|(kind, _)| args.kind.as_deref().map_or(true, |k| k == *kind))
        .collect();

    if contracts.is_empty() {
        if let Some(kind) = &args.kind {
            let known: Vec<_> = registry.kinds().collect();
            bail!("unknown node kind '{kind}', expected one of: {}", known.join(", "));
        }
    }

    println!("{}", serde_json::to_string_pretty(&contracts)?);
    Ok(true)
}

fn check_chain(args: CheckArgs) -> Result<bool> {
    let chain = Chain::load(&args.file)?;
    let issues = chain.validate(&registry(true, None)?);

    if issues.is_empty() {
        println!(
            "✅ {} is valid ({} steps)",
            chain.display_name(),
            chain.steps.len()
        );
        return Ok(true);
    }

    eprintln!("❌ {} has {} problem(s):", chain.display_name(), issues.len());
    for issue in &issues {
        eprintln!("   • {issue}");
    }
    Ok(false)
}
