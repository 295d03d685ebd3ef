//! The PR → Asana sync pipeline.
//!
//! One run handles one pull request: references in its description are
//! resolved to task IDs, routing rules are matched against its changed
//! files, and every task gets a comment plus (when rules matched) an
//! ownership block merged into its notes. Per-task failures are recorded in
//! the [`SyncReport`] and never stop the remaining tasks.

pub mod notes;
pub mod refs;
pub mod report;
pub mod rules;
pub mod source;
pub mod tracker;

use anyhow::{Context, Result};

use crate::config::Config;
use refs::{resolve_all, ReferenceExtractor};
use report::{Operation, SkipReason, StepResult, SyncReport, TaskOutcome};
use rules::RuleMatcher;
use source::ChangeSource;
use tracker::Tracker;

/// Run the sync for the pull request provided by `source`.
///
/// Only a failure to obtain the pull request itself is returned as an error.
pub async fn run<S, T>(source: &S, tracker: &T, config: &Config) -> Result<SyncReport>
where
    S: ChangeSource,
    T: Tracker,
{
    let change = source
        .fetch()
        .await
        .context("Failed to fetch pull request")?;
    let extractor = ReferenceExtractor::new(&config.asana.reference_prefix)?;

    let mut report = SyncReport {
        pull_request: change.url.clone(),
        ..Default::default()
    };

    let references = extractor.extract(change.description.as_deref());
    if references.is_empty() {
        tracing::info!("No Asana URLs found in PR description");
        return Ok(report);
    }
    tracing::info!("Found {} Asana URL(s)", references.len());

    let resolved = resolve_all(&references);
    report.references = references.into_iter().collect();
    report.unresolved = resolved.unresolved;
    if resolved.task_ids.is_empty() {
        tracing::info!("No valid task IDs found");
        return Ok(report);
    }
    report.task_ids = resolved.task_ids.iter().cloned().collect();

    report.matched = RuleMatcher::new(&config.rules).matches(&change.changed_files);
    tracing::info!(
        "{} of {} routing rule(s) matched {} changed file(s)",
        report.matched.len(),
        config.rules.len(),
        change.changed_files.len()
    );

    let block = notes::compose(&report.matched, &config.asana.owner_heading);
    let comment = change.comment_text();

    for task_id in &resolved.task_ids {
        tracing::info!("Processing task {task_id}");
        let outcome = sync_task(tracker, task_id, &comment, &block).await;
        report.tasks.push(outcome);
    }

    Ok(report)
}

async fn sync_task<T: Tracker>(tracker: &T, task_id: &str, comment: &str, block: &str) -> TaskOutcome {
    let comment = match tracker.post_comment(task_id, comment).await {
        Ok(()) => {
            tracing::info!("Comment posted to task {task_id}");
            StepResult::Done
        }
        Err(e) => failed(task_id, Operation::PostComment, &e),
    };

    let notes = if block.is_empty() {
        StepResult::Skipped {
            reason: SkipReason::NoMatchedRules,
        }
    } else {
        merge_notes(tracker, task_id, block).await
    };

    TaskOutcome {
        task_id: task_id.to_string(),
        comment,
        notes,
    }
}

async fn merge_notes<T: Tracker>(tracker: &T, task_id: &str, block: &str) -> StepResult {
    let current = match tracker.fetch_notes(task_id).await {
        Ok(current) => current,
        Err(e) => return failed(task_id, Operation::FetchNotes, &e),
    };

    let outcome = notes::merge(current.as_deref(), block);
    if !outcome.merged {
        tracing::info!("Ownership notes already present on task {task_id}");
        return StepResult::Skipped {
            reason: SkipReason::AlreadyPresent,
        };
    }

    match tracker.update_notes(task_id, &outcome.document).await {
        Ok(()) => {
            tracing::info!("Description updated for task {task_id}");
            StepResult::Done
        }
        Err(e) => failed(task_id, Operation::UpdateNotes, &e),
    }
}

fn failed(task_id: &str, operation: Operation, error: &anyhow::Error) -> StepResult {
    tracing::warn!("Failed to {operation} for task {task_id}: {error:#}");
    StepResult::Failed {
        operation,
        error: format!("{error:#}"),
    }
}
