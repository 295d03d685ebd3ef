//! Pull request metadata from the GitHub REST API.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{build_client, check_status, trim_base_url};
use crate::sync::source::ChangeSource;
use crate::types::ChangeRequest;

/// Files are listed 100 per page; GitHub stops listing after 3000 files.
const FILES_PER_PAGE: usize = 100;
const MAX_FILE_PAGES: usize = 30;

/// Fetches a single pull request and its changed files.
pub struct GithubSource {
    base_url: String,
    token: String,
    repository: String,
    number: u64,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct PullResponse {
    title: String,
    html_url: String,
    body: Option<String>,
    user: UserRef,
    head: BranchRef,
    base: BranchRef,
}

#[derive(Deserialize)]
struct UserRef {
    login: String,
}

#[derive(Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct FileEntry {
    filename: String,
}

impl GithubSource {
    /// `repository` is `owner/name`, as in `GITHUB_REPOSITORY`.
    pub fn new(base_url: &str, token: &str, repository: &str, number: u64) -> Result<Self> {
        Ok(Self {
            base_url: trim_base_url(base_url),
            token: token.to_string(),
            repository: repository.to_string(),
            number,
            http: build_client()?,
        })
    }

    fn pull_url(&self) -> String {
        format!(
            "{}/repos/{}/pulls/{}",
            self.base_url, self.repository, self.number
        )
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .context("Failed to connect to GitHub")?;
        check_status(resp, "GitHub request").await
    }

    async fn fetch_pull(&self) -> Result<PullResponse> {
        self.get(&self.pull_url(), &[])
            .await?
            .json()
            .await
            .context("Failed to parse pull request response")
    }

    async fn fetch_changed_files(&self) -> Result<Vec<String>> {
        let url = format!("{}/files", self.pull_url());
        let mut files = Vec::new();

        for page in 1..=MAX_FILE_PAGES {
            let entries: Vec<FileEntry> = self
                .get(
                    &url,
                    &[
                        ("per_page", FILES_PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?
                .json()
                .await
                .context("Failed to parse pull request files response")?;

            let count = entries.len();
            files.extend(entries.into_iter().map(|f| f.filename));
            if count < FILES_PER_PAGE {
                break;
            }
        }

        Ok(files)
    }
}

impl ChangeSource for GithubSource {
    async fn fetch(&self) -> Result<ChangeRequest> {
        tracing::info!("Fetching PR #{} from {}", self.number, self.repository);
        let pull = self.fetch_pull().await?;
        let changed_files = self.fetch_changed_files().await?;
        tracing::debug!("PR #{} touches {} file(s)", self.number, changed_files.len());

        Ok(ChangeRequest {
            title: pull.title,
            url: pull.html_url,
            author: pull.user.login,
            head: pull.head.name,
            base: pull.base.name,
            description: pull.body,
            changed_files,
        })
    }
}
