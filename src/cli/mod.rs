//! Command-line interface for filesize-filter
//!
//! This module provides the main CLI structure and command dispatch. It uses
//! clap for argument parsing and sets up tracing from the verbosity flags.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
mod output;

pub use output::Output;

/// filesize-filter - Remove small media files from your library catalog
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Catalog index file (overrides library.index_path)
    #[arg(long, value_name = "FILE", global = true)]
    pub index: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan the library root into the catalog, then clean up small files
    Scan(commands::scan::ScanArgs),
    /// Remove media files below the minimum size from the catalog
    Clean(commands::clean::CleanArgs),
    /// List catalog entries with their sizes
    List(commands::list::ListArgs),
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Show version information
    Version,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration after all layers are merged
    Show,
    /// Validate the effective configuration
    Validate,
}

/// Settings shared by every command
pub struct Context {
    pub config_path: Option<String>,
    pub index: Option<PathBuf>,
    pub output: Output,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        setup_logging(self.verbose, self.quiet);

        let ctx = Context {
            config_path: self.config,
            index: self.index,
            output: Output::new(self.verbose > 0, self.quiet),
        };

        match self.command {
            Some(Commands::Scan(args)) => commands::scan::execute(args, &ctx).await,
            Some(Commands::Clean(args)) => commands::clean::execute(args, &ctx).await,
            Some(Commands::List(args)) => commands::list::execute(args, &ctx).await,
            Some(Commands::Config(cmd)) => commands::config::execute(cmd, &ctx).await,
            Some(Commands::Version) => commands::version::execute(&ctx.output).await,
            None => {
                // Show help when no command is provided
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,ignore=warn,globset=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn,globset=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
