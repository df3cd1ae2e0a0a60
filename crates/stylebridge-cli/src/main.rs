//! stylebridge CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "stylebridge")]
#[command(version)]
#[command(about = "Compile stylesheets and emit them the way a bundler plugin would", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile entry points and write the output
    Build {
        /// Stylesheet entry points
        #[arg(required = true)]
        entries: Vec<PathBuf>,

        /// JSON plugin configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Merge everything into FILE
        #[arg(short = 'o', long)]
        out_file: Option<PathBuf>,

        /// Write one stylesheet per entry into DIR
        #[arg(short = 'd', long)]
        out_dir: Option<PathBuf>,

        /// Exclude ids matching this glob (repeatable)
        #[arg(short = 'x', long)]
        exclude: Vec<String>,

        /// Output style (expanded, compressed, ...)
        #[arg(long)]
        style: Option<String>,
    },

    /// Print every file the entry points depend on
    Deps {
        /// Stylesheet entry points
        #[arg(required = true)]
        entries: Vec<PathBuf>,

        /// JSON plugin configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stylebridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            entries,
            config,
            out_file,
            out_dir,
            exclude,
            style,
        } => commands::build::execute(commands::build::BuildArgs {
            entries,
            config,
            out_file,
            out_dir,
            exclude,
            style,
        }),
        Commands::Deps { entries, config } => commands::deps::execute(&entries, config.as_deref()),
    }
}
