//! The suggester driven by host events.
//!
//! [`LinkSuggester`] owns the session memory and the trigger state. The host
//! calls it when the active note changes, when a note's metadata has been
//! re-resolved, and after every keystroke; it answers with the candidates to
//! show and applies the chosen one to the buffer.

use tracing::{debug, trace};

use pla_core::{DocumentId, DocumentIndex, EditorBuffer, Settings, TriggerChars};

use crate::filter;
use crate::session::SessionMemory;
use crate::trigger::{self, Keystroke, Query, TriggerEnv, TriggerInfo, TriggerState};

/// Another suggester sharing the editor. Lines containing its trigger phrase
/// are left to it.
pub trait CooperatingSuggester {
    fn trigger_phrase(&self) -> Option<String>;
}

pub struct LinkSuggester {
    settings: Settings,
    chars: TriggerChars,
    memory: SessionMemory,
    state: TriggerState,
    active: Option<DocumentId>,
    cooperating: Option<Box<dyn CooperatingSuggester>>,
}

impl std::fmt::Debug for LinkSuggester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkSuggester")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("active", &self.active)
            .field("cooperating", &self.cooperating.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for LinkSuggester {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl LinkSuggester {
    pub fn new(settings: Settings) -> Self {
        Self {
            chars: settings.trigger_chars(),
            settings,
            memory: SessionMemory::new(),
            state: TriggerState::Closed,
            active: None,
            cooperating: None,
        }
    }

    /// Defer lines containing `other`'s trigger phrase to it.
    #[must_use]
    pub fn with_cooperating(mut self, other: impl CooperatingSuggester + 'static) -> Self {
        self.cooperating = Some(Box::new(other));
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swap settings. Pools built under the old settings are kept until the
    /// next active-note change.
    pub fn update_settings(&mut self, settings: Settings) {
        self.chars = settings.trigger_chars();
        self.settings = settings;
        self.close();
    }

    #[must_use]
    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    #[must_use]
    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    #[must_use]
    pub fn active(&self) -> Option<&DocumentId> {
        self.active.as_ref()
    }

    /// Rebuild everything for the note now open in the editor.
    pub fn on_active_document_changed<I>(&mut self, index: &I)
    where
        I: DocumentIndex + ?Sized,
    {
        self.memory.clear();
        self.state = TriggerState::Closed;
        self.active = index.active_document();
        match &self.active {
            Some(active) => self.memory.recompute(index, active, &self.settings),
            None => debug!("no active note"),
        }
    }

    /// React to re-resolved metadata. Only the active note matters.
    pub fn on_metadata_resolved<I>(&mut self, index: &I, doc: &DocumentId)
    where
        I: DocumentIndex + ?Sized,
    {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if active != doc || index.active_document().as_ref() != Some(doc) {
            trace!(note = %doc, "metadata update for inactive note ignored");
            return;
        }
        self.memory.refresh(index, doc, &self.settings);
    }

    /// Judge the keystroke that just landed in `editor`.
    ///
    /// Returns the range and query of the session if one is open afterwards.
    /// Broadening a session deletes the trigger characters from the buffer.
    pub fn on_trigger<E>(&mut self, editor: &mut E) -> Option<TriggerInfo>
    where
        E: EditorBuffer + ?Sized,
    {
        let cursor = editor.cursor();
        let line = editor.line(cursor.line);
        let phrase = self.foreign_phrase();
        let env = TriggerEnv {
            chars: self.chars,
            field_values: &self.memory.field_values,
            foreign_phrase: phrase.as_deref(),
            match_count: self.memory.match_count,
        };
        let key = Keystroke {
            cursor,
            line: &line,
        };
        let transition = trigger::step(&self.state, &key, &env);

        if let Some(edit) = transition.edit {
            editor.replace_range("", edit.start, edit.end);
        }
        if !transition.state.is_open() {
            self.close();
            return None;
        }

        if let Some(Query::Values(values)) = transition.state.info().map(|i| &i.query) {
            self.memory.completion_values = values.clone();
        }
        self.memory.mode = transition.state.mode().unwrap_or_default();
        self.memory.trigger_sequence = transition.state.sequence();
        self.state = transition.state;
        self.state.info().cloned()
    }

    /// Candidates for the open session, or `None` when closed or nothing
    /// matches.
    pub fn suggestions(&mut self) -> Option<Vec<String>> {
        let query = self.state.info()?.query.clone();
        filter::suggest(&mut self.memory, &query)
    }

    /// Replace the session range with the chosen candidate and close the
    /// session. Returns `false` if no session was open.
    pub fn select_suggestion<E>(&mut self, editor: &mut E, value: &str) -> bool
    where
        E: EditorBuffer + ?Sized,
    {
        let Some((start, end)) = self.state.info().map(|i| (i.start, i.end)) else {
            return false;
        };
        let text = filter::format_link(value, self.memory.trigger_sequence);
        editor.replace_range(&text, start, end);
        debug!(link = %text, "suggestion inserted");
        self.close();
        true
    }

    pub fn close(&mut self) {
        self.state = TriggerState::Closed;
        self.memory.reset_session();
    }

    fn foreign_phrase(&self) -> Option<String> {
        self.cooperating
            .as_ref()
            .and_then(|other| other.trigger_phrase())
            .or_else(|| self.settings.cooperating_trigger_phrase.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{Mode, TriggerSequence};
    use pla_core::{Position, TextBuffer};
    use pla_vault::Vault;

    fn settings() -> Settings {
        Settings {
            auto_space: true,
            ..Settings::default()
        }
    }

    fn vault() -> Vault {
        let mut vault = Vault::in_memory();
        vault.insert_note(
            "Active.md",
            "---\ncompany: Acme\n---\nWe shipped [[foobar]] and [[Hot Reload]].\n",
        );
        vault.insert_note(
            "Deal.md",
            "---\ncompany: Acme\n---\n[[Foo Bar|alias]]\n",
        );
        vault.insert_note("Globex.md", "---\ncompany: Globex\n---\n[[Hotkeys]]\n");
        vault.set_active(Some("Active.md".into()));
        vault
    }

    fn suggester(vault: &Vault) -> LinkSuggester {
        let mut s = LinkSuggester::new(settings());
        s.on_active_document_changed(vault);
        s
    }

    /// Type `text` one character at a time, feeding every keystroke.
    fn type_keys(s: &mut LinkSuggester, buf: &mut TextBuffer, text: &str) -> Option<TriggerInfo> {
        let mut info = None;
        for c in text.chars() {
            buf.type_text(&c.to_string());
            info = s.on_trigger(buf);
            if info.is_some() {
                s.suggestions();
            }
        }
        info
    }

    #[test]
    fn secondary_trigger_suggests_and_inserts() {
        let vault = vault();
        let mut s = suggester(&vault);
        let mut buf = TextBuffer::default();

        let info = type_keys(&mut s, &mut buf, "See also foo;").unwrap();
        assert_eq!(info.start, Position::new(0, 9));
        assert_eq!(info.end, Position::new(0, 13));
        assert_eq!(s.memory().mode, Mode::Yaml);
        assert_eq!(s.suggestions().unwrap(), ["foobar", "Foo Bar", "Foo Bar|alias"]);

        assert!(s.select_suggestion(&mut buf, "Foo Bar|alias"));
        assert_eq!(buf.text(), "See also [[Foo Bar|alias]]");
        assert!(!s.state().is_open());
    }

    #[test]
    fn broadening_strips_triggers_and_adds_vault_titles() {
        let vault = vault();
        let mut s = suggester(&vault);
        let mut buf = TextBuffer::default();

        type_keys(&mut s, &mut buf, "use hotreload ").unwrap();
        assert_eq!(s.suggestions().unwrap(), ["Hot Reload"]);

        let info = type_keys(&mut s, &mut buf, ",").unwrap();
        assert_eq!(buf.text(), "use hotreload");
        assert_eq!(info.end, Position::new(0, 13));
        assert_eq!(s.memory().mode, Mode::All);
        assert_eq!(s.memory().trigger_sequence, Some(TriggerSequence::PrimaryBroaden));

        assert_eq!(s.suggestions().unwrap(), ["Hot Reload"]);
        assert!(s.select_suggestion(&mut buf, "Hot Reload"));
        assert_eq!(buf.text(), "use [[Hot Reload]] ");
    }

    #[test]
    fn broadened_session_reaches_unrelated_notes() {
        let vault = vault();
        let mut s = suggester(&vault);
        let mut buf = TextBuffer::default();

        assert!(type_keys(&mut s, &mut buf, "hotk;").is_some());
        assert!(s.suggestions().is_none());

        let mut buf = TextBuffer::default();
        let info = type_keys(&mut s, &mut buf, "hotk;,").unwrap();
        assert_eq!(info.query, Query::Text("hotk".into()));
        assert_eq!(s.memory().mode, Mode::AllSemi);
        assert_eq!(s.suggestions().unwrap(), ["Hotkeys"]);
    }

    #[test]
    fn metadata_separator_offers_field_values() {
        let vault = vault();
        let mut s = suggester(&vault);
        let mut buf = TextBuffer::new("---\n");
        buf.set_cursor(Position::new(1, 0));

        type_keys(&mut s, &mut buf, "company: ");
        assert_eq!(s.memory().mode, Mode::YamlComplete);
        assert_eq!(s.suggestions().unwrap(), ["Acme", "Globex"]);

        assert!(s.select_suggestion(&mut buf, "Globex"));
        assert_eq!(buf.text(), "---\ncompany: [[Globex]]");
    }

    #[test]
    fn short_words_do_not_open_sessions() {
        let vault = vault();
        let mut s = suggester(&vault);
        let mut buf = TextBuffer::default();
        assert!(type_keys(&mut s, &mut buf, "go to ").is_none());
        assert!(type_keys(&mut s, &mut buf, "AI ").is_none());
        assert!(s.suggestions().is_none());
    }

    #[test]
    fn cooperating_phrase_blocks_line() {
        struct Citations;
        impl CooperatingSuggester for Citations {
            fn trigger_phrase(&self) -> Option<String> {
                Some("@cite".into())
            }
        }
        let vault = vault();
        let mut s = suggester(&vault).with_cooperating(Citations);
        let mut buf = TextBuffer::default();
        assert!(type_keys(&mut s, &mut buf, "@cite foobar;").is_none());
    }

    #[test]
    fn metadata_event_for_other_note_is_ignored() {
        let mut vault = vault();
        let mut s = suggester(&vault);
        let before = s.memory().clone();

        vault.insert_note("Globex.md", "---\ncompany: Acme\n---\n[[Changed]]\n");
        s.on_metadata_resolved(&vault, &"Globex.md".into());
        assert_eq!(s.memory(), &before);
    }

    #[test]
    fn metadata_event_for_active_note_refreshes() {
        let mut vault = vault();
        let mut s = suggester(&vault);

        vault.insert_note("Active.md", "---\ncompany: Globex\n---\n[[Brand New]]\n");
        s.on_metadata_resolved(&vault, &"Active.md".into());
        assert_eq!(s.memory().file_links, ["Brand New"]);
        assert_eq!(s.memory().yaml_links, ["Globex", "Hotkeys"]);
    }

    #[test]
    fn switching_notes_resets_session() {
        let mut vault = vault();
        let mut s = suggester(&vault);
        let mut buf = TextBuffer::default();
        type_keys(&mut s, &mut buf, "foobar;").unwrap();

        vault.set_active(Some("Globex.md".into()));
        s.on_active_document_changed(&vault);
        assert!(!s.state().is_open());
        assert_eq!(s.memory().match_count, 0);
        assert_eq!(s.memory().file_links, ["Hotkeys"]);
        assert!(s.memory().yaml_links.is_empty());
    }

    #[test]
    fn no_active_note_leaves_memory_empty() {
        let mut vault = vault();
        vault.set_active(None);
        let s = suggester(&vault);
        assert_eq!(s.memory(), &SessionMemory::default());
        assert!(s.active().is_none());
    }
}
