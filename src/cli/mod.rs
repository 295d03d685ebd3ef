mod completions;
mod refs;
mod rules;
mod sync;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "asana-sync")]
#[command(about = "Link merged pull requests to Asana tasks and route ownership notes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Show detailed progress
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Comment on linked Asana tasks and merge ownership notes for a pull request
    Sync(sync::SyncArgs),

    /// Extract Asana task references from text (argument or stdin)
    Refs(refs::RefsArgs),

    /// Show which routing rules match a set of changed paths
    Rules(rules::RulesArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Exit code for a run that found nothing to sync
pub const EXIT_NOTHING_TO_DO: u8 = 3;

impl Cli {
    pub fn output(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }

    pub async fn run(self) -> Result<ExitCode> {
        let output = self.output();

        match self.command {
            Commands::Sync(args) => sync::run(args, output).await,
            Commands::Refs(args) => refs::run(&args, output).map(|()| ExitCode::SUCCESS),
            Commands::Rules(args) => rules::run(args, output).map(|()| ExitCode::SUCCESS),
            Commands::Completions(args) => {
                completions::run(&args);
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Output configuration passed to all commands
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
}

impl OutputConfig {
    /// Default log level implied by the verbosity flags
    pub fn log_level(self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet || self.json {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}
