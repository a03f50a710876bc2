//! Link extraction: raw link references → the display strings offered as
//! candidates.
//!
//! A plain link becomes `target`; an aliased link becomes both `target` and
//! `target|alias`, so the user can pick either form.

use indexmap::IndexSet;

use pla_core::LinkReference;

/// Formatted link strings for one note, without duplicates, in first-seen
/// order.
#[must_use]
pub fn extract_links(refs: &[LinkReference], include_aliases: bool) -> Vec<String> {
    let mut links = IndexSet::new();
    for link in refs {
        links.insert(link.target.clone());
        match link.display_text.as_deref() {
            Some(alias) if include_aliases && !alias.is_empty() && alias != link.target => {
                links.insert(format!("{}|{alias}", link.target));
            }
            _ => {}
        }
    }
    links.into_iter().collect()
}
