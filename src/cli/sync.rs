use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{OutputConfig, EXIT_NOTHING_TO_DO};
use crate::config::Config;
use crate::credentials::CredentialInputs;
use crate::http::asana::AsanaClient;
use crate::http::github::GithubSource;
use crate::sync::report::{StepResult, SyncReport, SyncStatus};
use crate::sync::source::FixtureSource;
use crate::sync::tracker::{DryRunTracker, OutboundRequest};

#[derive(Args)]
pub struct SyncArgs {
    /// Routing configuration file
    #[arg(long, short = 'c', env = "ASANA_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Run against sample data and print requests instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// JSON pull request fixture to use with --dry-run
    #[arg(long, requires = "dry_run")]
    fixture: Option<PathBuf>,

    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Asana personal access token
    #[arg(long, env = "ASANA_ACCESS_TOKEN", hide_env_values = true)]
    asana_token: Option<String>,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Pull request number
    #[arg(long, env = "PR_NUMBER")]
    pr_number: Option<String>,

    /// Override the GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    github_api_url: Option<String>,

    /// Override the Asana API base URL
    #[arg(long, env = "ASANA_API_URL")]
    asana_api_url: Option<String>,
}

#[derive(Serialize)]
struct SyncOutput<'a> {
    status: SyncStatus,
    dry_run: bool,
    failures: usize,
    report: &'a SyncReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    requests: Option<&'a [OutboundRequest]>,
}

pub async fn run(args: SyncArgs, output: OutputConfig) -> Result<ExitCode> {
    if args.dry_run {
        return run_dry(args, output).await;
    }

    // Everything required must be present before the first API call
    let credentials = CredentialInputs {
        github_token: args.github_token,
        asana_token: args.asana_token,
        repository: args.repository,
        pr_number: args.pr_number,
    }
    .require()?;

    let config = Config::load_or_default(&Config::resolve_path(args.config.as_deref()));
    let github_url = args
        .github_api_url
        .unwrap_or_else(|| config.github.api_url.clone());
    let asana_url = args
        .asana_api_url
        .unwrap_or_else(|| config.asana.api_url.clone());

    let source = GithubSource::new(
        &github_url,
        &credentials.github_token,
        &credentials.repository,
        credentials.pr_number,
    )?;
    let tracker = AsanaClient::new(&asana_url, &credentials.asana_token)?;

    let report = crate::sync::run(&source, &tracker, &config).await?;
    print_report(&report, false, None, output)?;
    Ok(exit_code(&report))
}

async fn run_dry(args: SyncArgs, output: OutputConfig) -> Result<ExitCode> {
    let config = Config::load_or_default(&Config::resolve_path(args.config.as_deref()));
    let source = match args.fixture {
        Some(ref path) => FixtureSource::from_file(path)?,
        None => FixtureSource::sample(),
    };
    let tracker = DryRunTracker::new();

    let report = crate::sync::run(&source, &tracker, &config).await?;
    let requests = tracker.into_requests();
    print_report(&report, true, Some(requests.as_slice()), output)?;
    Ok(exit_code(&report))
}

fn exit_code(report: &SyncReport) -> ExitCode {
    match report.status() {
        SyncStatus::Synced => ExitCode::SUCCESS,
        SyncStatus::NothingToDo => ExitCode::from(EXIT_NOTHING_TO_DO),
    }
}

fn print_report(
    report: &SyncReport,
    dry_run: bool,
    requests: Option<&[OutboundRequest]>,
    output: OutputConfig,
) -> Result<()> {
    if output.json {
        let json_output = SyncOutput {
            status: report.status(),
            dry_run,
            failures: report.failure_count(),
            report,
            requests,
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
        return Ok(());
    }

    for request in requests.unwrap_or_default() {
        print_request(request);
    }

    if output.quiet {
        return Ok(());
    }

    if report.status() == SyncStatus::NothingToDo {
        let reason = if report.references.is_empty() {
            "no Asana URLs found in PR description"
        } else {
            "no valid task IDs found"
        };
        println!("{} Nothing to sync: {}", "!".yellow(), reason);
        for url in &report.unresolved {
            println!("  unresolved: {}", url.dimmed());
        }
        return Ok(());
    }

    println!("{} Synced {}", "✓".green(), report.pull_request);
    if report.matched.is_empty() {
        println!("  Rules:  {}", "none matched".dimmed());
    } else {
        let owners: Vec<&str> = report.matched.iter().map(|m| m.owner.as_str()).collect();
        println!("  Rules:  {}", owners.join(", ").cyan());
    }
    for url in &report.unresolved {
        println!("  {} could not resolve {}", "!".yellow(), url);
    }
    println!();

    for task in &report.tasks {
        println!(
            "  {}  comment: {}  notes: {}",
            task.task_id.bold(),
            describe(&task.comment),
            describe(&task.notes)
        );
        for failure in task.failures() {
            if let StepResult::Failed { operation, error } = failure {
                println!("      {} {}: {}", "✗".red(), operation, error);
            }
        }
    }

    let failures = report.failure_count();
    if failures > 0 {
        println!();
        println!(
            "{} {} operation(s) failed across {} task(s)",
            "!".yellow(),
            failures,
            report.tasks.len()
        );
    }

    Ok(())
}

fn print_request(request: &OutboundRequest) {
    match request {
        OutboundRequest::CreateComment { task_id, text } => {
            println!("[DRY-RUN] Would post comment to task {task_id}:");
            println!("---\n{text}\n---");
        }
        OutboundRequest::UpdateNotes {
            task_id,
            html_notes,
        } => {
            println!("[DRY-RUN] Would update description of task {task_id}:");
            println!("---\n{html_notes}\n---");
        }
    }
}

fn describe(step: &StepResult) -> colored::ColoredString {
    match step {
        StepResult::Done => "done".green(),
        StepResult::Skipped { reason } => format!("skipped ({reason})").dimmed(),
        StepResult::Failed { .. } => "failed".red(),
    }
}
