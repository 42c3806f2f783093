mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, handoff::HandoffSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "onboard",
    about = "Onboarding questionnaire flow, fitness estimates and signup hand-off",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .onboard/ or .git/)
    #[arg(long, global = true, env = "ONBOARD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .onboard/ with a default config
    Init,

    /// Inspect or validate the config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// List the flow's steps in order
    Steps,

    /// Drive the flow with the answers in a YAML file
    Walk {
        /// Answer file (same field names as the hand-off record)
        file: PathBuf,

        /// Store the completed answers in the hand-off slot
        #[arg(long)]
        finalize: bool,

        /// Wait out each auto-advance delay instead of firing immediately
        #[arg(long)]
        realtime: bool,
    },

    /// Compute the derived metrics for an answer file
    Estimate { file: PathBuf },

    /// Show the confirmation report for the pending hand-off record
    Report {
        /// Read answers from a file instead of the hand-off slot
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Inspect, clear or submit the hand-off record
    Handoff {
        #[command(subcommand)]
        subcommand: HandoffSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Walk { .. } | Commands::Handoff { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Steps => cmd::steps::run(cli.json),
        Commands::Walk {
            file,
            finalize,
            realtime,
        } => cmd::walk::run(&root, &file, finalize, realtime, cli.json),
        Commands::Estimate { file } => cmd::estimate::run(&root, &file, cli.json),
        Commands::Report { file } => cmd::report::run(&root, file.as_deref(), cli.json),
        Commands::Handoff { subcommand } => cmd::handoff::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
