//! YAML frontmatter splitting.
//!
//! Handles the `---` delimited YAML frontmatter in markdown notes.
//! Format:
//! ```markdown
//! ---
//! company: Acme
//! related: [Alpha, Beta]
//! ---
//!
//! Body text with [[links]].
//! ```
//!
//! Unlike a strict document store, a note without frontmatter is perfectly
//! valid here: it just has no metadata.

use crate::metadata::MetadataRecord;

/// Split a note into its frontmatter YAML (if any) and body.
///
/// Returns `(None, content)` when the note does not open with a `---`
/// delimiter or the block is never closed.
#[must_use]
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let trimmed = content.trim_start_matches('\u{feff}');

    let Some(after_first) = trimmed.strip_prefix("---") else {
        return (None, content);
    };
    // The opening delimiter must be alone on its line.
    let Some(after_first) = after_first
        .strip_prefix("\r\n")
        .or_else(|| after_first.strip_prefix('\n'))
    else {
        return (None, content);
    };

    // An empty block closes immediately.
    if let Some(rest) = after_first.strip_prefix("---") {
        return (Some(""), skip_line_break(rest));
    }

    let Some(close_pos) = after_first.find("\n---") else {
        return (None, content);
    };

    let yaml = &after_first[..close_pos];
    let rest = &after_first[close_pos + 4..]; // skip \n---

    (Some(yaml.trim_end_matches('\r')), skip_line_break(rest))
}

fn skip_line_break(rest: &str) -> &str {
    rest.strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest)
}

/// Split a note and normalize its frontmatter into a [`MetadataRecord`].
///
/// Returns the record (if the note has well-formed frontmatter) and the body.
#[must_use]
pub fn parse_note(content: &str) -> (Option<MetadataRecord>, &str) {
    let (yaml, body) = split_frontmatter(content);
    (yaml.and_then(MetadataRecord::from_yaml), body)
}
