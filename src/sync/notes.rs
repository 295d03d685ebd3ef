//! Rendering and merging ownership annotations into Asana `html_notes`.

use crate::types::MatchedAnnotation;

const BODY_OPEN: &str = "<body>";
const BODY_CLOSE: &str = "</body>";

/// Render matched annotations into the block appended to task notes.
///
/// Returns an empty string when nothing matched. Output depends only on the
/// order and content of `matched`, which the idempotency check relies on.
pub fn compose(matched: &[MatchedAnnotation], heading: &str) -> String {
    if matched.is_empty() {
        return String::new();
    }

    let entries: Vec<String> = matched
        .iter()
        .map(|m| {
            format!(
                "<strong>{}: {}</strong>\n{}",
                escape(heading),
                escape(&m.owner),
                escape(&m.text)
            )
        })
        .collect();

    format!("\n\n{}", entries.join("\n\n"))
}

/// Result of merging a composed block into an existing document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub document: String,
    pub merged: bool,
}

/// Insert `block` into `existing` exactly once.
///
/// The block goes right before the closing `</body>` so the rich-text
/// wrapper stays intact. A missing or empty document becomes a fresh
/// `<body>` wrapper; any other document without the marker, whitespace-only
/// included, gets the block appended.
pub fn merge(existing: Option<&str>, block: &str) -> MergeOutcome {
    let current = existing.unwrap_or_default();

    if block.is_empty() || (!current.is_empty() && current.contains(block)) {
        return MergeOutcome {
            document: current.to_string(),
            merged: false,
        };
    }

    let document = if current.is_empty() {
        format!("{BODY_OPEN}{block}{BODY_CLOSE}")
    } else if let Some(idx) = current.rfind(BODY_CLOSE) {
        let mut document = String::with_capacity(current.len() + block.len());
        document.push_str(&current[..idx]);
        document.push_str(block);
        document.push_str(&current[idx..]);
        document
    } else {
        format!("{current}{block}")
    };

    MergeOutcome {
        document,
        merged: true,
    }
}

/// Escape text for Asana's XML-based rich text.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
