use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::OutputConfig;
use crate::config::Config;
use crate::sync::notes;
use crate::sync::rules::RuleMatcher;
use crate::types::MatchedAnnotation;

#[derive(Args)]
pub struct RulesArgs {
    /// Changed paths to test (reads one per line from stdin when omitted)
    paths: Vec<String>,

    /// Routing configuration file
    #[arg(long, short = 'c', env = "ASANA_SYNC_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct RulesOutput {
    config: String,
    rule_count: usize,
    paths: Vec<String>,
    matched: Vec<MatchedAnnotation>,
    block: String,
}

pub fn run(args: RulesArgs, output: OutputConfig) -> Result<()> {
    let config_path = Config::resolve_path(args.config.as_deref());
    // Unlike `sync`, a broken config is reported here instead of ignored
    let config = Config::load(&config_path)?;

    let paths = if args.paths.is_empty() {
        read_paths_from_stdin()?
    } else {
        args.paths
    };

    let matched = RuleMatcher::new(&config.rules).matches(&paths);
    let block = notes::compose(&matched, &config.asana.owner_heading);

    if output.json {
        let json_output = RulesOutput {
            config: config_path.display().to_string(),
            rule_count: config.rules.len(),
            paths,
            matched,
            block,
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
        return Ok(());
    }

    if matched.is_empty() {
        if !output.quiet {
            println!(
                "{} No rules matched ({} rule(s) in {})",
                "!".yellow(),
                config.rules.len(),
                config_path.display()
            );
        }
        return Ok(());
    }

    for annotation in &matched {
        println!("{}  {}", annotation.owner.cyan(), annotation.text);
    }

    if output.verbose {
        println!();
        println!("Notes block:");
        println!("---{block}\n---");
    }

    Ok(())
}

fn read_paths_from_stdin() -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("No paths given. Pass them as arguments or pipe them on stdin.");
    }
    let input = std::io::read_to_string(stdin).context("Failed to read stdin")?;
    Ok(input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
