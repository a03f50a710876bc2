//! Documents and the index that serves them.
//!
//! The suggestion engine never reads files itself. It sees the vault only
//! through [`DocumentIndex`], which a host (or the reference vault crate)
//! implements on top of its own metadata cache.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::link::LinkReference;
use crate::metadata::MetadataRecord;

/// Vault-relative path identifying a note (e.g., "Projects/Alpha.md").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into().replace('\\', "/"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name without directories or the `.md` extension. This is the
    /// title a link uses to reach the note.
    #[must_use]
    pub fn basename(&self) -> &str {
        let file = self.0.rsplit('/').next().unwrap_or(&self.0);
        file.strip_suffix(".md").unwrap_or(file)
    }

    /// Path without the `.md` extension ("Projects/Alpha").
    #[must_use]
    pub fn link_path(&self) -> &str {
        self.0.strip_suffix(".md").unwrap_or(&self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Read access to the host's document index and metadata cache.
///
/// Every method is infallible: a note the index knows nothing about simply
/// has no links and no metadata.
pub trait DocumentIndex {
    /// The note currently open in the editor.
    fn active_document(&self) -> Option<DocumentId>;

    /// Links parsed from a note body, in document order.
    fn parsed_links(&self, doc: &DocumentId) -> Option<Vec<LinkReference>>;

    /// Normalized frontmatter of a note.
    fn metadata(&self, doc: &DocumentId) -> Option<MetadataRecord>;

    /// Every note in the vault.
    fn documents(&self) -> Vec<DocumentId>;

    /// Link targets that point at notes which do not exist.
    fn unresolved_link_targets(&self) -> Vec<String>;
}
