use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;

/// The task tracker a pull request is synced into.
pub trait Tracker {
    /// Add a comment (story) to a task.
    async fn post_comment(&self, task_id: &str, text: &str) -> Result<()>;

    /// Read the task's rich-text notes. `None` when the task has none.
    async fn fetch_notes(&self, task_id: &str) -> Result<Option<String>>;

    /// Replace the task's rich-text notes.
    async fn update_notes(&self, task_id: &str, html_notes: &str) -> Result<()>;
}

/// A request that would have been sent to the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum OutboundRequest {
    CreateComment { task_id: String, text: String },
    UpdateNotes { task_id: String, html_notes: String },
}

/// Tracker for simulate mode: reads come from seeded notes, writes are
/// recorded instead of sent.
#[derive(Default)]
pub struct DryRunTracker {
    notes: HashMap<String, String>,
    requests: RefCell<Vec<OutboundRequest>>,
}

impl DryRunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed existing notes for a task.
    #[cfg(test)]
    pub fn with_notes(mut self, task_id: &str, html_notes: &str) -> Self {
        self.notes.insert(task_id.to_string(), html_notes.to_string());
        self
    }

    /// Every request recorded so far, in the order it was made.
    pub fn into_requests(self) -> Vec<OutboundRequest> {
        self.requests.into_inner()
    }
}

impl Tracker for DryRunTracker {
    async fn post_comment(&self, task_id: &str, text: &str) -> Result<()> {
        self.requests.borrow_mut().push(OutboundRequest::CreateComment {
            task_id: task_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn fetch_notes(&self, task_id: &str) -> Result<Option<String>> {
        Ok(self.notes.get(task_id).cloned())
    }

    async fn update_notes(&self, task_id: &str, html_notes: &str) -> Result<()> {
        self.requests.borrow_mut().push(OutboundRequest::UpdateNotes {
            task_id: task_id.to_string(),
            html_notes: html_notes.to_string(),
        });
        Ok(())
    }
}
