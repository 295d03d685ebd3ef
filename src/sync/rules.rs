//! Ownership routing: maps changed paths to the rules whose globs match them.
//!
//! Patterns use gitignore semantics via [`ignore::gitignore`]: a leading `/`
//! anchors to the repository root, `*` and `**` behave as in `.gitignore`,
//! and a directory pattern covers every file beneath it. Within one rule a
//! `!pattern` line re-excludes paths selected by earlier lines.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::config::RoutingRule;
use crate::types::MatchedAnnotation;

/// A routing rule with its pattern set compiled.
struct CompiledRule<'a> {
    rule: &'a RoutingRule,
    matcher: Gitignore,
}

impl CompiledRule<'_> {
    fn matches_any(&self, changed_paths: &[String]) -> bool {
        changed_paths.iter().any(|path| {
            let path = relative_path(path);
            !path.is_empty()
                && self
                    .matcher
                    .matched_path_or_any_parents(Path::new(path), false)
                    .is_ignore()
        })
    }
}

/// Evaluates routing rules against the changed paths of a pull request.
pub struct RuleMatcher<'a> {
    rules: Vec<CompiledRule<'a>>,
}

impl<'a> RuleMatcher<'a> {
    /// Compile every rule's pattern set. Invalid globs are logged and skipped.
    pub fn new(rules: &'a [RoutingRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CompiledRule {
                rule,
                matcher: compile(rule),
            })
            .collect();
        Self { rules }
    }

    /// Return the annotations of every matching rule, in declaration order.
    pub fn matches(&self, changed_paths: &[String]) -> Vec<MatchedAnnotation> {
        self.rules
            .iter()
            .filter(|compiled| compiled.matches_any(changed_paths))
            .map(|compiled| MatchedAnnotation {
                owner: compiled.rule.team.clone(),
                text: compiled.rule.text.clone(),
            })
            .collect()
    }
}

fn compile(rule: &RoutingRule) -> Gitignore {
    let mut builder = GitignoreBuilder::new(".");
    for pattern in &rule.paths {
        if let Err(e) = builder.add_line(None, pattern) {
            tracing::warn!(
                "Skipping invalid pattern {:?} in rule for {}: {}",
                pattern,
                rule.team,
                e
            );
        }
    }

    builder.build().unwrap_or_else(|e| {
        tracing::warn!("Failed to compile patterns for rule {}: {}", rule.team, e);
        Gitignore::empty()
    })
}

/// Paths from the source host are repository-relative, but tolerate a
/// leading `./` or `/` since the matcher requires relative paths.
fn relative_path(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    path.trim_start_matches('/')
}
