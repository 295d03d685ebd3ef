use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::OutputConfig;
use crate::config::Config;
use crate::sync::refs::{resolve_all, resolve_task_id, ReferenceExtractor};

#[derive(Args)]
pub struct RefsArgs {
    /// Text to scan (reads stdin when omitted)
    text: Option<String>,

    /// Reference prefix (defaults to the configured one)
    #[arg(long)]
    prefix: Option<String>,

    /// Routing configuration file
    #[arg(long, short = 'c', env = "ASANA_SYNC_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct RefsOutput {
    count: usize,
    references: Vec<RefOutput>,
    task_ids: Vec<String>,
}

#[derive(Serialize)]
struct RefOutput {
    url: String,
    task_id: Option<String>,
}

pub fn run(args: &RefsArgs, output: OutputConfig) -> Result<()> {
    let text = match args.text {
        Some(ref text) => text.clone(),
        None => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                anyhow::bail!("No text given. Pass it as an argument or pipe it on stdin.");
            }
            std::io::read_to_string(stdin).context("Failed to read stdin")?
        }
    };

    let prefix = match args.prefix {
        Some(ref prefix) => prefix.clone(),
        None => {
            let path = Config::resolve_path(args.config.as_deref());
            if path.exists() {
                Config::load_or_default(&path).asana.reference_prefix
            } else {
                Config::default().asana.reference_prefix
            }
        }
    };

    let extractor = ReferenceExtractor::new(&prefix)?;
    let found = extractor.extract(Some(&text));
    let task_ids: Vec<String> = resolve_all(&found).task_ids.into_iter().collect();
    let references: Vec<RefOutput> = found
        .into_iter()
        .map(|url| {
            let task_id = resolve_task_id(&url).map(str::to_string);
            RefOutput { url, task_id }
        })
        .collect();

    if output.json {
        let json_output = RefsOutput {
            count: references.len(),
            references,
            task_ids,
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
        return Ok(());
    }

    if references.is_empty() {
        if !output.quiet {
            println!("{} No references found", "!".yellow());
        }
        return Ok(());
    }

    for reference in &references {
        match reference.task_id {
            Some(ref id) => println!("{}  {}", id.cyan(), reference.url),
            None => println!("{}  {}", "unresolved".yellow(), reference.url),
        }
    }

    if !output.quiet {
        println!();
        println!(
            "{} {} reference(s), {} task ID(s)",
            "✓".green(),
            references.len(),
            task_ids.len()
        );
    }

    Ok(())
}
