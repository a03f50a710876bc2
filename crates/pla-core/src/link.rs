//! Link reference type: a raw link found in a note body.

use serde::{Deserialize, Serialize};

/// A link from one note to another, as parsed from the note body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    /// Target note reference (e.g., "Projects/Alpha" or "Alpha#Goals").
    pub target: String,

    /// Text shown in place of the target, when the link carries an alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

impl LinkReference {
    /// A link without an alias.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            display_text: None,
        }
    }

    /// A link shown under a different name (`[[target|alias]]`).
    pub fn aliased(target: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            display_text: Some(display_text.into()),
        }
    }

    /// The target with any `#heading` or `#^block` subpath removed.
    #[must_use]
    pub fn target_path(&self) -> &str {
        self.target
            .split_once('#')
            .map_or(self.target.as_str(), |(path, _)| path)
    }
}
