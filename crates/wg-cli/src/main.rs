//! CLI frontend for the Wegweiser story engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "wg",
    about = "Wegweiser — play branching stories one held choice at a time",
    version,
    propagate_version = true
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a story file and report structural problems
    Check {
        /// Story file (JSON)
        story: PathBuf,
    },

    /// List the nodes of a story
    Nodes {
        /// Story file (JSON)
        story: PathBuf,
    },

    /// Play a story in the terminal
    Play {
        /// Story file (JSON)
        story: PathBuf,

        /// Settings file (created if missing)
        #[arg(short, long, default_value = "wegweiser-settings.json")]
        settings: PathBuf,

        /// Engine config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the hold duration in milliseconds
        #[arg(long)]
        hold_ms: Option<i64>,

        /// Print text at once instead of typing it out
        #[arg(long)]
        instant: bool,
    },

    /// Show or edit a settings file
    Settings {
        /// Settings file
        file: PathBuf,

        /// Set the display name used in prompts
        #[arg(short, long)]
        name: Option<String>,

        /// Forget rating history and name
        #[arg(long)]
        reset: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check { story } => commands::check::run(&story),
        Commands::Nodes { story } => commands::nodes::run(&story),
        Commands::Play {
            story,
            settings,
            config,
            hold_ms,
            instant,
        } => commands::play::run(&story, &settings, config.as_deref(), hold_ms, instant),
        Commands::Settings { file, name, reset } => {
            commands::settings::run(&file, name.as_deref(), reset)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
