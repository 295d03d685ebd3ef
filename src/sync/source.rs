use std::path::Path;

use anyhow::{Context, Result};

use crate::types::ChangeRequest;

/// Where the pull request under sync comes from.
pub trait ChangeSource {
    async fn fetch(&self) -> Result<ChangeRequest>;
}

/// Fixed pull request data used by `--dry-run`.
pub struct FixtureSource {
    change: ChangeRequest,
}

impl FixtureSource {
    pub fn new(change: ChangeRequest) -> Self {
        Self { change }
    }

    /// Built-in sample covering a focus-mode link, a markdown link and a
    /// duplicate reference to the same task.
    pub fn sample() -> Self {
        Self::new(ChangeRequest {
            title: "Test PR Title".into(),
            url: "https://github.com/owner/repo/pull/1".into(),
            author: "test-user".into(),
            head: "feature/test".into(),
            base: "main".into(),
            description: Some(
                "This is a test PR.\n\
                 Here is the task: https://app.asana.com/0/123/456789/f\n\
                 Also see [Related Task](https://app.asana.com/0/111/222).\n\
                 Duplicate link: https://app.asana.com/0/123/456789\n"
                    .into(),
            ),
            changed_files: vec!["frontend/app.js".into(), "backend/api.py".into()],
        })
    }

    /// Load a pull request fixture from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture: {}", path.display()))?;
        let change = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture: {}", path.display()))?;
        Ok(Self::new(change))
    }
}

impl ChangeSource for FixtureSource {
    async fn fetch(&self) -> Result<ChangeRequest> {
        Ok(self.change.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_fixture() {
        let pr = FixtureSource::sample().fetch().await.unwrap();
        assert_eq!(pr.author, "test-user");
        assert_eq!(pr.changed_files, vec!["frontend/app.js", "backend/api.py"]);
        assert!(pr.description.unwrap().contains("456789/f"));
    }

    #[tokio::test]
    async fn test_fixture_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pr.json");
        std::fs::write(
            &path,
            r#"{"title": "T", "url": "U", "author": "A", "head": "h", "base": "b",
                "description": "https://app.asana.com/0/1/2", "changed_files": ["docs/x.md"]}"#,
        )
        .unwrap();
        let pr = FixtureSource::from_file(&path).unwrap().fetch().await.unwrap();
        assert_eq!(pr.title, "T");
        assert_eq!(pr.changed_files, vec!["docs/x.md"]);
    }

    #[test]
    fn test_fixture_from_missing_file() {
        let err = FixtureSource::from_file(Path::new("/nonexistent/pr.json"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to read fixture"));
    }
}
