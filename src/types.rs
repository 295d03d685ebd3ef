use serde::{Deserialize, Serialize};

/// A merged pull request as seen by the sync pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub title: String,
    pub url: String,
    pub author: String,
    /// Source branch name
    pub head: String,
    /// Target branch name
    pub base: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Repository-relative paths touched by the pull request
    #[serde(default)]
    pub changed_files: Vec<String>,
}

impl ChangeRequest {
    /// Render the comment posted on every linked task.
    pub fn comment_text(&self) -> String {
        format!(
            "Pull Request merged: {}\nURL: {}\nAuthor: {}\nBranch: {} -> {}\n\n{}",
            self.title,
            self.url,
            self.author,
            self.head,
            self.base,
            self.description.as_deref().unwrap_or("")
        )
    }
}

/// A routing rule that fired for the current set of changed paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedAnnotation {
    pub owner: String,
    pub text: String,
}
