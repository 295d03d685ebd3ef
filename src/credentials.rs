//! Credentials and identifiers required for a live sync.
//!
//! Resolved once at startup from flags or environment and passed down
//! explicitly, so nothing below the CLI reads the environment.

use thiserror::Error;

/// Raw values as given on the command line or in the environment
#[derive(Debug, Clone, Default)]
pub struct CredentialInputs {
    pub github_token: Option<String>,
    pub asana_token: Option<String>,
    pub repository: Option<String>,
    pub pr_number: Option<String>,
}

/// Everything a live sync needs before making its first API call
#[derive(Clone)]
pub struct Credentials {
    pub github_token: String,
    pub asana_token: String,
    /// `owner/name`
    pub repository: String,
    pub pr_number: u64,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("github_token", &"<redacted>")
            .field("asana_token", &"<redacted>")
            .field("repository", &self.repository)
            .field("pr_number", &self.pr_number)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Missing environment variables ({})", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("PR_NUMBER must be a positive integer, got {0:?}")]
    InvalidPrNumber(String),
}

impl CredentialInputs {
    /// Validate that every required value is present and well-formed.
    pub fn require(self) -> Result<Credentials, CredentialError> {
        let github_token = non_empty(self.github_token);
        let asana_token = non_empty(self.asana_token);
        let repository = non_empty(self.repository);
        let pr_number = non_empty(self.pr_number);

        let missing: Vec<&'static str> = [
            ("GITHUB_TOKEN", github_token.is_none()),
            ("ASANA_ACCESS_TOKEN", asana_token.is_none()),
            ("GITHUB_REPOSITORY", repository.is_none()),
            ("PR_NUMBER", pr_number.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(github_token), Some(asana_token), Some(repository), Some(pr_number)) =
            (github_token, asana_token, repository, pr_number)
        else {
            return Err(CredentialError::Missing(missing));
        };

        let pr_number = match pr_number.trim().parse::<u64>() {
            Ok(n) if n > 0 => n,
            _ => return Err(CredentialError::InvalidPrNumber(pr_number)),
        };

        Ok(Credentials {
            github_token,
            asana_token,
            repository,
            pr_number,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> CredentialInputs {
        CredentialInputs {
            github_token: Some("gh".into()),
            asana_token: Some("as".into()),
            repository: Some("acme/web".into()),
            pr_number: Some("42".into()),
        }
    }

    #[test]
    fn test_require_complete() {
        let creds = complete().require().unwrap();
        assert_eq!(creds.repository, "acme/web");
        assert_eq!(creds.pr_number, 42);
    }

    #[test]
    fn test_require_reports_all_missing() {
        let err = CredentialInputs::default().require().unwrap_err();
        assert_eq!(
            err,
            CredentialError::Missing(vec![
                "GITHUB_TOKEN",
                "ASANA_ACCESS_TOKEN",
                "GITHUB_REPOSITORY",
                "PR_NUMBER"
            ])
        );
        assert_eq!(
            err.to_string(),
            "Missing environment variables (GITHUB_TOKEN, ASANA_ACCESS_TOKEN, GITHUB_REPOSITORY, PR_NUMBER)"
        );
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let inputs = CredentialInputs {
            asana_token: Some("  ".into()),
            ..complete()
        };
        assert_eq!(
            inputs.require().unwrap_err(),
            CredentialError::Missing(vec!["ASANA_ACCESS_TOKEN"])
        );
    }

    #[test]
    fn test_invalid_pr_number() {
        for bad in ["abc", "0", "-3"] {
            let inputs = CredentialInputs {
                pr_number: Some(bad.into()),
                ..complete()
            };
            assert!(matches!(
                inputs.require(),
                Err(CredentialError::InvalidPrNumber(_))
            ));
        }
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", complete().require().unwrap());
        assert!(!debug.contains("\"gh\""));
        assert!(debug.contains("<redacted>"));
    }
}
