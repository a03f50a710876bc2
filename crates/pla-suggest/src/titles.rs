//! Vault-wide title index: every note's basename plus every link target that
//! does not resolve to a note yet.

use indexmap::IndexSet;
use tracing::debug;

use pla_core::DocumentIndex;

/// Titles offered once a session is broadened to the whole vault.
pub fn vault_titles<I>(index: &I) -> Vec<String>
where
    I: DocumentIndex + ?Sized,
{
    let mut titles = IndexSet::new();
    titles.extend(index.documents().iter().map(|doc| doc.basename().to_string()));
    let notes = titles.len();
    titles.extend(index.unresolved_link_targets());
    debug!(notes, unresolved = titles.len() - notes, "vault titles indexed");
    titles.into_iter().collect()
}
