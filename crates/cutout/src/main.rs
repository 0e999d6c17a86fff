//! Cutout CLI - On-demand image transformations from compact option strings.
//!
//! Cutout resizes, crops around a focal point (optionally a detected face),
//! masks to a circle with a ring border, and re-encodes as JPEG.
//!
//! # Usage
//!
//! ```bash
//! # Avatar from a portrait
//! cutout transform me.jpg -O w_200,h_200,c_thumb,g_face,r_max,bo_2px_solid_white
//!
//! # A whole directory, JSONL report
//! cutout transform ./photos -O w_0.5,c_fill -d ./out -f jsonl
//!
//! # Inspect how an option string parses
//! cutout options w_200,h_100,c_pad
//!
//! # View configuration
//! cutout config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Cutout - On-demand image transformations from compact option strings.
#[derive(Parser, Debug)]
#[command(name = "cutout")]
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
    /// Transform an image or a directory of images
    Transform(cli::transform::TransformArgs),

    /// Parse an option string and print the result
    Options(cli::options::OptionsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't up yet, so config warnings go straight to stderr.
    let config = match cutout_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `cutout config path`."
            );
            cutout_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Cutout v{}", cutout_core::VERSION);

    match cli.command {
        Commands::Transform(args) => cli::transform::execute(args).await,
        Commands::Options(args) => cli::options::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
