//! Notes loaded from a vault directory.
//!
//! Each `.md` file becomes a [`Note`]: its normalized frontmatter plus the
//! links parsed from its body. Hidden directories (`.obsidian`, `.trash`, ...)
//! are never loaded.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use walkdir::{DirEntry, WalkDir};

use pla_core::frontmatter::parse_note;
use pla_core::{DocumentId, DocumentIndex, LinkReference, MetadataRecord, PlaError};

/// One parsed note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: DocumentId,
    pub metadata: Option<MetadataRecord>,
    pub links: Vec<LinkReference>,
}

impl Note {
    /// Parse raw markdown. A body the link grammar rejects contributes no
    /// links; it never fails the note.
    pub fn parse(id: DocumentId, content: &str) -> Self {
        let (metadata, body) = parse_note(content);
        let links = pla_parser::parse_links(body).unwrap_or_else(|e| {
            tracing::warn!(note = %id, error = %e, "failed to parse links");
            Vec::new()
        });
        Self {
            id,
            metadata,
            links,
        }
    }
}

/// The set of notes a suggester can draw on, plus which one is open.
#[derive(Debug, Default)]
pub struct Vault {
    root: Option<PathBuf>,
    notes: BTreeMap<DocumentId, Note>,
    active: Option<DocumentId>,
}

impl Vault {
    /// An empty vault with no backing directory (useful for testing).
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load every markdown note under `root`.
    ///
    /// Unreadable files are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PlaError::Vault`] if `root` is not a directory.
    pub fn open(root: &Path) -> Result<Self, PlaError> {
        if !root.is_dir() {
            return Err(PlaError::Vault(format!(
                "vault root is not a directory: {}",
                root.display()
            )));
        }

        let mut vault = Self {
            root: Some(root.to_path_buf()),
            ..Self::default()
        };

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable vault entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            if let Err(e) = vault.reload(entry.path()) {
                tracing::warn!(path = %entry.path().display(), error = %e, "skipping note");
            }
        }

        tracing::info!(root = %root.display(), notes = vault.notes.len(), "vault loaded");
        Ok(vault)
    }

    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Add or replace a note from its raw markdown.
    pub fn insert_note(&mut self, id: impl Into<DocumentId>, content: &str) -> &Note {
        let id = id.into();
        let note = Note::parse(id.clone(), content);
        self.notes.insert(id.clone(), note);
        &self.notes[&id]
    }

    /// Forget a note. Clears the active note if it was this one.
    pub fn remove_note(&mut self, id: &DocumentId) -> Option<Note> {
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        self.notes.remove(id)
    }

    /// Re-read one file from disk, inserting or removing its note.
    ///
    /// Returns the note's id, or `None` if the path is outside the vault.
    ///
    /// # Errors
    ///
    /// Returns [`PlaError::Io`] if the file exists but cannot be read.
    pub fn reload(&mut self, path: &Path) -> Result<Option<DocumentId>, PlaError> {
        let Some(id) = self.id_for_path(path) else {
            return Ok(None);
        };
        if path.is_file() {
            let content = std::fs::read_to_string(path)?;
            self.insert_note(id.clone(), &content);
            tracing::debug!(note = %id, "note reloaded");
        } else {
            self.remove_note(&id);
            tracing::debug!(note = %id, "note removed");
        }
        Ok(Some(id))
    }

    /// Map a file path to the id of the note it holds.
    #[must_use]
    pub fn id_for_path(&self, path: &Path) -> Option<DocumentId> {
        let relative = match &self.root {
            Some(root) => path.strip_prefix(root).ok()?,
            None => path,
        };
        let rel = relative.to_str()?;
        (!rel.is_empty()).then(|| DocumentId::new(rel))
    }

    #[must_use]
    pub fn note(&self, id: &DocumentId) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    /// Find the note a link target points at: by full path, by path without
    /// extension, or by basename, ignoring case.
    #[must_use]
    pub fn resolve(&self, target: &str) -> Option<&DocumentId> {
        let wanted = resolution_key(target);
        if wanted.is_empty() {
            return None;
        }
        self.notes.keys().find(|id| {
            id.link_path().to_lowercase() == wanted || id.basename().to_lowercase() == wanted
        })
    }

    /// Every key [`Vault::resolve`] accepts, built once per call so link
    /// targets can be checked without scanning the notes.
    fn resolution_keys(&self) -> HashSet<String> {
        let mut keys = HashSet::with_capacity(self.notes.len() * 2);
        for id in self.notes.keys() {
            keys.insert(id.link_path().to_lowercase());
            keys.insert(id.basename().to_lowercase());
        }
        keys
    }

    /// Open a note in the (virtual) editor.
    pub fn set_active(&mut self, id: Option<DocumentId>) {
        self.active = id;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl DocumentIndex for Vault {
    fn active_document(&self) -> Option<DocumentId> {
        self.active.clone()
    }

    fn parsed_links(&self, doc: &DocumentId) -> Option<Vec<LinkReference>> {
        self.notes.get(doc).map(|n| n.links.clone())
    }

    fn metadata(&self, doc: &DocumentId) -> Option<MetadataRecord> {
        self.notes.get(doc).and_then(|n| n.metadata.clone())
    }

    fn documents(&self) -> Vec<DocumentId> {
        self.notes.keys().cloned().collect()
    }

    fn unresolved_link_targets(&self) -> Vec<String> {
        let known = self.resolution_keys();
        let mut unresolved = IndexSet::new();
        for note in self.notes.values() {
            for link in &note.links {
                let target = link.target_path().trim();
                if target.is_empty() || known.contains(&resolution_key(target)) {
                    continue;
                }
                unresolved.insert(target.to_string());
            }
        }
        unresolved.into_iter().collect()
    }
}

/// Lowercased link target without a trailing `.md`, as [`Vault::resolve`]
/// compares them.
fn resolution_key(target: &str) -> String {
    let key = target.trim().to_lowercase();
    match key.strip_suffix(".md") {
        Some(stem) => stem.to_string(),
        None => key,
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

pub(crate) fn is_markdown(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_vault() -> Vault {
        let mut vault = Vault::in_memory();
        vault.insert_note(
            "Projects/Alpha.md",
            "---\ncompany: Acme\n---\nSee [[Beta]] and [[Ghost Note|ghost]].\n",
        );
        vault.insert_note("Beta.md", "Links back to [[projects/alpha]].\n");
        vault
    }

    #[test]
    fn insert_note_parses_metadata_and_links() {
        let vault = sample_vault();
        let alpha = vault.note(&"Projects/Alpha.md".into()).unwrap();
        assert_eq!(alpha.metadata.as_ref().unwrap().get("company").unwrap(), ["Acme"]);
        assert_eq!(alpha.links.len(), 2);
        assert_eq!(alpha.links[1], LinkReference::aliased("Ghost Note", "ghost"));
    }

    #[test]
    fn resolve_matches_path_or_basename_ignoring_case() {
        let vault = sample_vault();
        assert_eq!(vault.resolve("alpha").unwrap().as_str(), "Projects/Alpha.md");
        assert_eq!(vault.resolve("Projects/Alpha").unwrap().as_str(), "Projects/Alpha.md");
        assert_eq!(vault.resolve("Beta.md").unwrap().as_str(), "Beta.md");
        assert!(vault.resolve("Ghost Note").is_none());
    }

    #[test]
    fn unresolved_targets_are_distinct_and_missing() {
        let mut vault = sample_vault();
        vault.insert_note("Gamma.md", "[[Ghost Note#Intro]] [[Beta]] [[#local]]");
        assert_eq!(vault.unresolved_link_targets(), vec!["Ghost Note".to_string()]);
    }

    #[test]
    fn unresolved_targets_scale_with_links_not_links_times_notes() {
        let notes = 2_000;
        let mut vault = Vault::in_memory();
        for i in 0..notes {
            let body = format!(
                "[[Note {}]] [[notes/note {}.md]] [[NOTE {}]] [[Note {}#Top]] [[Draft {}]]",
                (i + 1) % notes,
                (i + 2) % notes,
                (i + 3) % notes,
                (i + 4) % notes,
                i % 100,
            );
            vault.insert_note(format!("notes/Note {i}.md").as_str(), &body);
        }

        let start = std::time::Instant::now();
        let unresolved = vault.unresolved_link_targets();
        let elapsed = start.elapsed();

        assert_eq!(unresolved.len(), 100);
        assert!(unresolved.iter().all(|t| t.starts_with("Draft ")));
        assert!(
            elapsed < std::time::Duration::from_millis(250),
            "unresolved targets took {elapsed:?} for {notes} notes"
        );
    }

    #[test]
    fn removing_active_note_clears_active() {
        let mut vault = sample_vault();
        let beta: DocumentId = "Beta.md".into();
        vault.set_active(Some(beta.clone()));
        assert_eq!(vault.active_document(), Some(beta.clone()));
        assert!(vault.remove_note(&beta).is_some());
        assert_eq!(vault.active_document(), None);
    }

    #[test]
    fn open_loads_markdown_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".obsidian")).unwrap();
        fs::create_dir_all(root.join("people")).unwrap();
        fs::write(root.join(".obsidian").join("cache.md"), "[[Nope]]").unwrap();
        fs::write(root.join("people").join("Jane.md"), "---\nclientId: 7\n---\n").unwrap();
        fs::write(root.join("notes.txt"), "plain text").unwrap();
        fs::write(root.join("Index.md"), "[[Jane]]").unwrap();

        let vault = Vault::open(root).unwrap();
        let ids: Vec<String> = vault.documents().iter().map(|d| d.to_string()).collect();
        assert_eq!(ids, vec!["Index.md", "people/Jane.md"]);
        assert!(vault.unresolved_link_targets().is_empty());
    }

    #[test]
    fn open_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = Vault::open(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, PlaError::Vault(_)));
    }

    #[test]
    fn reload_picks_up_changes_and_deletions() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Alpha.md");
        fs::write(&file, "---\ncompany: Acme\n---\n").unwrap();
        let mut vault = Vault::open(dir.path()).unwrap();

        fs::write(&file, "---\ncompany: Globex\n---\n").unwrap();
        let id = vault.reload(&file).unwrap().unwrap();
        let meta = vault.metadata(&id).unwrap();
        assert_eq!(meta.get("company").unwrap(), ["Globex"]);

        fs::remove_file(&file).unwrap();
        vault.reload(&file).unwrap();
        assert!(vault.is_empty());
    }

    #[test]
    fn paths_outside_root_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut vault = Vault::open(dir.path()).unwrap();
        assert_eq!(vault.reload(Path::new("/elsewhere/Note.md")).unwrap(), None);
    }
}
