mod config;
mod logging;
mod pipeline;
pub mod results;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pipeline::{EvalArgs, Partition, SplitsArgs};

/// gastnet: GNN tactic-argument prediction over proof-state ASTs.
#[derive(Parser)]
#[command(name = "gastnet", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands for evaluation and dataset inspection.
#[derive(Subcommand)]
enum Command {
    /// Evaluate the local-context model over a dataset partition.
    Eval {
        /// Path to the eval config TOML file.
        #[arg(long, default_value = "configs/eval.toml")]
        config: PathBuf,
        /// Dataset partition to evaluate.
        #[arg(long, value_enum, default_value_t = Partition::Test)]
        partition: Partition,
        /// Randomly sub-sample this many data files.
        #[arg(long)]
        max_states: Option<usize>,
        /// Path to write the JSON evaluation summary.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the number of data files in each split partition.
    Splits {
        /// Path to the eval config TOML file.
        #[arg(long, default_value = "configs/eval.toml")]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Eval {
            config,
            partition,
            max_states,
            output,
        } => pipeline::run_eval(EvalArgs {
            config,
            partition,
            max_states,
            output,
        }),
        Command::Splits { config } => pipeline::run_splits(SplitsArgs { config }),
    }
}
