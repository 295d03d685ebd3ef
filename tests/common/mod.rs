#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Environment variables the binary reads; cleared so the host environment
/// (for example a CI runner) cannot leak into tests.
const SYNC_ENV: &[&str] = &[
    "GITHUB_TOKEN",
    "ASANA_ACCESS_TOKEN",
    "GITHUB_REPOSITORY",
    "PR_NUMBER",
    "GITHUB_API_URL",
    "ASANA_API_URL",
    "ASANA_SYNC_CONFIG",
];

/// Sample routing configuration used across tests.
pub const SAMPLE_CONFIG: &str = r#"
[asana]
owner_heading = "Owner team"

[[rules]]
team = "UI"
paths = ["frontend/**"]
text = "notify UI"

[[rules]]
team = "API"
paths = ["backend/"]
text = "notify API"

[[rules]]
team = "Mobile"
paths = ["ios/**", "android/**"]
text = "notify Mobile"
"#;

/// A temporary working directory holding config and fixture files.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// A project with `asana-sync.toml` already written.
    pub fn with_sample_config() -> Self {
        let project = Self::new();
        project.write_file("asana-sync.toml", SAMPLE_CONFIG);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parent dirs as needed.
    pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full = self.dir.path().join(relative_path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        std::fs::write(&full, content).expect("failed to write file");
        full
    }

    /// Write a pull request fixture for `sync --dry-run --fixture`.
    pub fn write_fixture(&self, description: Option<&str>, files: &[&str]) -> PathBuf {
        let fixture = serde_json::json!({
            "title": "Fixture PR",
            "url": "https://github.com/acme/web/pull/9",
            "author": "fixture-user",
            "head": "feature/fixture",
            "base": "main",
            "description": description,
            "changed_files": files,
        });
        self.write_file("pr.json", &fixture.to_string())
    }

    /// A command for the binary running inside this project, with a clean
    /// environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(Self::bin());
        cmd.current_dir(self.path());
        for var in SYNC_ENV {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Return the path to the binary (built via cargo).
    pub fn bin() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_asana-sync"))
    }
}
