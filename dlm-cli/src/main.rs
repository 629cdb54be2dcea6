//! # dlm CLI
//!
//! Command-line interface for activating and inspecting layout fragments.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dlm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "dlm.yml")]
    config: PathBuf,

    /// Path to the store seed file (defaults to store.yml next to the config)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activate every configured fragment and report the outcome
    Activate,

    /// Print the activated layout of one fragment owner
    Show {
        /// Fragment owner
        owner: String,

        /// Print namespaced stylesheet preferences as JSON instead
        #[arg(long)]
        prefs: bool,
    },

    /// List the fragments that apply to a person, in merge order
    Audience {
        /// Username of the person
        #[arg(long)]
        user: String,

        /// Person attribute as key=value (repeatable)
        #[arg(long = "attr", value_parser = commands::parse_attribute)]
        attributes: Vec<(String, String)>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays machine readable
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let paths = commands::Paths::new(cli.config, cli.store);
    match cli.command {
        Commands::Activate => commands::activate(&paths),
        Commands::Show { owner, prefs } => commands::show(&paths, &owner, prefs),
        Commands::Audience { user, attributes } => commands::audience(&paths, &user, attributes),
    }
}
