//! CloudClip - clipboard synchronization agent
//!
//! This is the main entry point for the CloudClip agent.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cloudclip::config::Config;
use cloudclip::control::ControlSurface;

#[derive(Parser)]
#[command(name = "cloudclip", version, about = "Clipboard synchronization agent backed by a shared HTTP store")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sync agent (default)
    Run,
    /// Show the resolved config file location
    Config,
    /// Write an example config file to the default location
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(cli.config, cli.verbose).await,
        Commands::Config => show_config(cli.config),
        Commands::Init { force } => init_config(force),
    }
}

async fn run(config_path: Option<PathBuf>, verbose: bool) -> Result<()> {
    // Configuration errors are the only fatal ones; everything after this
    // point is soft and keeps the loop alive
    let resolved_path = config_path
        .clone()
        .or_else(Config::find_config_path)
        .unwrap_or_else(Config::default_config_path);
    let config = match Config::load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cloudclip: cannot start: {}", e);
            eprintln!("Run `cloudclip init` to create an example config file.");
            std::process::exit(1);
        }
    };

    init_logging(&config, verbose);
    info!("CloudClip v{}", cloudclip::VERSION);
    info!("Device id: {}", config.device_id);
    info!("Remote resource: {}", config.remote_resource_url());

    let mut agent = cloudclip::build_agent(&config).context("building sync agent")?;
    agent.start();

    let control = ControlSurface::new(agent, resolved_path);
    info!("Status: {}", control.status_label());

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;

    control.quit().await;
    Ok(())
}

fn show_config(config_path: Option<PathBuf>) -> Result<()> {
    let path = config_path
        .or_else(Config::find_config_path)
        .unwrap_or_else(Config::default_config_path);

    if path.exists() {
        println!("{}", path.display());
    } else {
        println!("{} (not found)", path.display());
    }
    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = Config::generate_example_config(force).context("writing example config")?;
    println!("Wrote example config to {}", path.display());
    Ok(())
}

fn init_logging(config: &Config, verbose: bool) {
    let default_filter = if verbose {
        "cloudclip=debug".to_string()
    } else {
        format!("cloudclip={}", config.log_level)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
