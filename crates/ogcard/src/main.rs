//! ogcard CLI - Open Graph card generator for static blogs.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ogcard_render::ImageFormat;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::render::RenderFormat;

#[derive(Parser)]
#[command(name = "ogcard")]
#[command(about = "Open Graph card generator for static blogs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default site.toml and a sample post
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Validate site.toml and the card fonts it references
    Check,

    /// Render a card for every page in the content directory
    Build {
        /// Content directory (defaults to config)
        #[arg(long)]
        content: Option<PathBuf>,

        /// Output directory (defaults to config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Image format, png or svg (defaults to config)
        #[arg(short, long)]
        format: Option<ImageFormat>,
    },

    /// Render a single card
    Render {
        /// Page title; a " | site" suffix is dropped
        #[arg(short, long)]
        title: String,

        /// Page description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Output file (defaults to og.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "png")]
        format: RenderFormat,
    },

    /// Write the font variable stylesheet
    Fonts {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve built output and render cards on request
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to the configured output)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Check => {
            commands::check::run(&cli.config).await?;
        }
        Commands::Build {
            content,
            output,
            format,
        } => {
            commands::build::run(&cli.config, content, output, format).await?;
        }
        Commands::Render {
            title,
            description,
            output,
            format,
        } => {
            commands::render::run(&cli.config, title, description, output, format).await?;
        }
        Commands::Fonts { output } => {
            commands::fonts::run(&cli.config, output).await?;
        }
        Commands::Serve { port, dir } => {
            commands::serve::run(&cli.config, port, dir).await?;
        }
    }

    Ok(())
}
