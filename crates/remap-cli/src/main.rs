mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    entry::EntrySubcommand, inventory::InventorySubcommand, plan::PlanSubcommand,
    signals::SignalsSubcommand, topics::TopicsSubcommand, waves::WavesSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "remap",
    about = "Deterministic content-migration planner — match pages to topics, assign dispositions, schedule waves",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .remap/ or .git/)
    #[arg(long, global = true, env = "REMAP_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a remap project in the current directory
    Init,

    /// Manage the crawled page inventory
    Inventory {
        #[command(subcommand)]
        subcommand: InventorySubcommand,
    },

    /// Manage the target topic catalog
    Topics {
        #[command(subcommand)]
        subcommand: TopicsSubcommand,
    },

    /// Manage per-URL search query signals
    Signals {
        #[command(subcommand)]
        subcommand: SignalsSubcommand,
    },

    /// Match the inventory against the topic catalog and print the report
    Match,

    /// Batch-confirm matched pages into the inventory
    Confirm {
        /// Minimum confidence a match needs to be confirmed
        #[arg(long, default_value = "0.75")]
        min_confidence: f64,
    },

    /// Manage migration plans
    Plan {
        #[command(subcommand)]
        subcommand: PlanSubcommand,
    },

    /// Override individual plan entries
    Entry {
        #[command(subcommand)]
        subcommand: EntrySubcommand,
    },

    /// Inspect and rebalance execution waves
    Waves {
        #[command(subcommand)]
        subcommand: WavesSubcommand,
    },

    /// Show project status
    Status,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Inventory { subcommand } => cmd::inventory::run(&root, subcommand, cli.json),
        Commands::Topics { subcommand } => cmd::topics::run(&root, subcommand, cli.json),
        Commands::Signals { subcommand } => cmd::signals::run(&root, subcommand, cli.json),
        Commands::Match => cmd::matching::run(&root, cli.json),
        Commands::Confirm { min_confidence } => cmd::confirm::run(&root, min_confidence, cli.json),
        Commands::Plan { subcommand } => cmd::plan::run(&root, subcommand, cli.json),
        Commands::Entry { subcommand } => cmd::entry::run(&root, subcommand, cli.json),
        Commands::Waves { subcommand } => cmd::waves::run(&root, subcommand, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
