//! Task reference extraction from free-form pull request text.
//!
//! References are URL-shaped tokens that start with the configured prefix
//! and run until the next whitespace. Markdown and HTML wrappers such as
//! `[Task](...)` or `<...>` leave their closing characters attached to the
//! token, so trailing punctuation is stripped before resolution.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use regex::Regex;

/// Characters that never end a real reference and are stripped from the right.
const TRAILING_STOP_CHARS: &[char] = &[')', ']', '}', '>', '.', ',', ';', ':', '"', '\''];

/// Finds task references in text.
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    pattern: Regex,
}

impl ReferenceExtractor {
    /// Build an extractor for references starting with `prefix`.
    ///
    /// The prefix must be non-empty and end in `/`, otherwise plain words or
    /// look-alike hosts (`https://app.asana.com.example.net/`) would match.
    pub fn new(prefix: &str) -> Result<Self> {
        if prefix.trim().is_empty() {
            anyhow::bail!("Reference prefix must not be empty");
        }
        if !prefix.ends_with('/') {
            anyhow::bail!("Reference prefix must end with '/': {prefix}");
        }
        let pattern = Regex::new(&format!(r"{}\S+", regex::escape(prefix)))
            .with_context(|| format!("Invalid reference prefix: {prefix}"))?;
        Ok(Self { pattern })
    }

    /// Return the distinct normalized references found in `text`.
    pub fn extract(&self, text: Option<&str>) -> BTreeSet<String> {
        let Some(text) = text else {
            return BTreeSet::new();
        };

        self.pattern
            .find_iter(text)
            .map(|m| normalize(m.as_str()).to_string())
            .collect()
    }
}

/// Strip trailing non-semantic punctuation from a raw reference.
pub fn normalize(raw: &str) -> &str {
    raw.trim_end_matches(TRAILING_STOP_CHARS)
}

/// Resolve a normalized reference to its task identifier.
///
/// Task URLs nest the task under workspace and project segments and may end
/// with a view-mode suffix (`/f`), so the identifier is the rightmost
/// segment made only of digits.
pub fn resolve_task_id(reference: &str) -> Option<&str> {
    let path = reference.split('?').next().unwrap_or(reference);

    path.split('/')
        .filter(|segment| !segment.is_empty())
        .rev()
        .find(|segment| segment.bytes().all(|b| b.is_ascii_digit()))
}

/// References split by whether they resolved to a task identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedReferences {
    pub task_ids: BTreeSet<String>,
    pub unresolved: Vec<String>,
}

/// Resolve every reference, deduplicating identifiers across the whole set.
pub fn resolve_all<'a, I>(references: I) -> ResolvedReferences
where
    I: IntoIterator<Item = &'a String>,
{
    let mut resolved = ResolvedReferences::default();
    for reference in references {
        match resolve_task_id(reference) {
            Some(id) => {
                resolved.task_ids.insert(id.to_string());
            }
            None => {
                tracing::warn!("Could not extract task ID from URL: {reference}");
                resolved.unresolved.push(reference.clone());
            }
        }
    }
    resolved
}
