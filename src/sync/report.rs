use serde::Serialize;

use crate::types::MatchedAnnotation;

/// Tracker operation performed for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    PostComment,
    FetchNotes,
    UpdateNotes,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::PostComment => write!(f, "post comment"),
            Operation::FetchNotes => write!(f, "fetch notes"),
            Operation::UpdateNotes => write!(f, "update notes"),
        }
    }
}

/// Why a notes update was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoMatchedRules,
    AlreadyPresent,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoMatchedRules => write!(f, "no matched rules"),
            SkipReason::AlreadyPresent => write!(f, "already present"),
        }
    }
}

/// Outcome of one step for one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResult {
    Done,
    Skipped { reason: SkipReason },
    Failed { operation: Operation, error: String },
}

impl StepResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepResult::Failed { .. })
    }
}

/// Everything that happened for a single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutcome {
    pub task_id: String,
    pub comment: StepResult,
    pub notes: StepResult,
}

impl TaskOutcome {
    pub fn failures(&self) -> impl Iterator<Item = &StepResult> {
        [&self.comment, &self.notes]
            .into_iter()
            .filter(|step| step.is_failed())
    }
}

/// Overall result class of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// At least one task was processed, possibly with per-task failures
    Synced,
    /// No references or no resolvable task IDs
    NothingToDo,
}

/// Summary of a sync run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub pull_request: String,
    pub references: Vec<String>,
    pub unresolved: Vec<String>,
    pub task_ids: Vec<String>,
    pub matched: Vec<MatchedAnnotation>,
    pub tasks: Vec<TaskOutcome>,
}

impl SyncReport {
    pub fn status(&self) -> SyncStatus {
        if self.tasks.is_empty() {
            SyncStatus::NothingToDo
        } else {
            SyncStatus::Synced
        }
    }

    /// Number of failed steps across all tasks.
    pub fn failure_count(&self) -> usize {
        self.tasks.iter().map(|t| t.failures().count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(comment: StepResult, notes: StepResult) -> TaskOutcome {
        TaskOutcome {
            task_id: "1".into(),
            comment,
            notes,
        }
    }

    #[test]
    fn test_empty_report_is_nothing_to_do() {
        let report = SyncReport::default();
        assert_eq!(report.status(), SyncStatus::NothingToDo);
        assert_eq!(report.failure_count(), 0);
    }

    #[test]
    fn test_failure_count() {
        let failed = StepResult::Failed {
            operation: Operation::PostComment,
            error: "boom".into(),
        };
        let report = SyncReport {
            tasks: vec![
                outcome(failed.clone(), StepResult::Done),
                outcome(
                    StepResult::Done,
                    StepResult::Skipped {
                        reason: SkipReason::AlreadyPresent,
                    },
                ),
                outcome(failed.clone(), failed),
            ],
            ..Default::default()
        };
        assert_eq!(report.status(), SyncStatus::Synced);
        assert_eq!(report.failure_count(), 3);
    }

    #[test]
    fn test_step_result_json() {
        let step = StepResult::Failed {
            operation: Operation::UpdateNotes,
            error: "HTTP 500".into(),
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["operation"], "update_notes");

        let skipped = serde_json::to_value(StepResult::Skipped {
            reason: SkipReason::NoMatchedRules,
        })
        .unwrap();
        assert_eq!(skipped["reason"], "no_matched_rules");
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::PostComment.to_string(), "post comment");
        assert_eq!(Operation::FetchNotes.to_string(), "fetch notes");
        assert_eq!(Operation::UpdateNotes.to_string(), "update notes");
    }
}
