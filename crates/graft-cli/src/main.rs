use clap::{Parser, Subcommand};
use graft_core::GraftConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "graft", version, about = "Graft mutation tooling")]
struct Cli {
    /// Settings file (defaults apply when omitted)
    #[arg(long, global = true, env = "GRAFT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a YAML/JSON list of mutation configs
    Check {
        /// Path to configs.yaml or configs.json
        file: PathBuf,
    },

    /// Resolve mutation props against a store snapshot and print the result
    Resolve {
        /// Fragment declaration (YAML), `fragments` or legacy `queries` style
        #[arg(long)]
        declaration: PathBuf,

        /// Store snapshot: JSON object of record id -> record
        #[arg(long)]
        store: PathBuf,

        /// Raw props: JSON object keyed by prop name
        #[arg(long)]
        props: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Check { file } => commands::check::run(&file)?,
        Command::Resolve {
            declaration,
            store,
            props,
        } => commands::resolve::run(&config, &declaration, &store, &props)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GraftConfig> {
    let Some(path) = path else {
        return Ok(GraftConfig::default());
    };
    GraftConfig::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to load settings from {}: {}", path.display(), e))
}
