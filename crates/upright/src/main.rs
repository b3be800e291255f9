//! Upright CLI - fit images inside size bounds and rotate them upright.
//!
//! Reads each image, scales it to fit the optional max width/height while
//! keeping its aspect ratio, applies the EXIF orientation as a real rotation,
//! and writes a lossless PNG.
//!
//! # Usage
//!
//! ```bash
//! # Fit a single photo into 1024px width
//! upright resize photo.jpg --max-width 1024 -o photo.png
//!
//! # Process a directory into ./out, 8 at a time
//! upright resize ./photos/ --max-width 1600 --max-height 1600 -o ./out -p 8
//!
//! # Preview the planned dimensions without touching any file
//! upright plan 4032 3024 --max-width 1024
//!
//! # View configuration
//! upright config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Upright - fit images inside bounds and rotate them upright.
#[derive(Parser, Debug)]
#[command(name = "upright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resize and rotate images, writing PNG output
    Resize(cli::resize::ResizeArgs),

    /// Show the dimensions an image would be planned to
    Plan(cli::plan::PlanArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match upright_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `upright config path`."
            );
            upright_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Upright v{}", upright_core::VERSION);

    match cli.command {
        Commands::Resize(args) => cli::resize::execute(args, config).await,
        Commands::Plan(args) => cli::plan::execute(args),
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
