//! Trigger detection.
//!
//! Every keystroke is fed to [`step`] together with the current
//! [`TriggerState`]. The result is the next state, an optional edit to apply
//! to the buffer (broadening deletes the two trigger characters), and, when
//! the session closes, the reason why.
//!
//! A session opens on one of:
//!
//! - the primary trigger (a space, when auto-space is on) after a word,
//! - the secondary trigger (`;` by default) after a word,
//! - a doubled trigger (`;;`, two spaces) which captures the last two words,
//! - a trigger followed by the broaden character (`;,`, ` ,`),
//! - `": "` after a frontmatter field name, which offers that field's values.
//!
//! An open session with matches follows further typing; the broaden character
//! typed right after the trigger widens it to the whole vault.

use serde::{Deserialize, Serialize};
use tracing::trace;

use pla_core::{FieldValueIndex, Position, TriggerChars};

/// Continued sessions close once the query is shorter than this.
pub const MIN_QUERY_CHARS: usize = 4;

/// Primary and broaden triggers ignore words up to this length.
const MAX_IGNORED_WORD: usize = 2;

/// Words of exactly this length only trigger when all uppercase.
const ACRONYM_LEN: usize = 3;

/// Which candidate pool a session draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Links of the active note and of related notes.
    #[default]
    Yaml,
    /// Everything in `Yaml` plus every title in the vault.
    All,
    /// `All`, reached from the secondary trigger.
    AllSemi,
    /// Values of one frontmatter field.
    YamlComplete,
}

/// The keystroke sequence that opened a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerSequence {
    Primary,
    Secondary,
    PrimaryBroaden,
    SecondaryBroaden,
}

impl TriggerSequence {
    /// The sequence reached by typing the broaden character next.
    #[must_use]
    pub fn broadened(self) -> Option<Self> {
        match self {
            Self::Primary => Some(Self::PrimaryBroaden),
            Self::Secondary => Some(Self::SecondaryBroaden),
            Self::PrimaryBroaden | Self::SecondaryBroaden => None,
        }
    }

    /// Space-based sessions get a trailing space after the inserted link.
    #[must_use]
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Primary | Self::PrimaryBroaden)
    }

    #[must_use]
    pub fn mode(self) -> Mode {
        match self {
            Self::Primary | Self::Secondary => Mode::Yaml,
            Self::PrimaryBroaden => Mode::All,
            Self::SecondaryBroaden => Mode::AllSemi,
        }
    }

    fn trigger_char(self, chars: &TriggerChars) -> Option<char> {
        match self {
            Self::Primary | Self::PrimaryBroaden => chars.primary,
            Self::Secondary | Self::SecondaryBroaden => Some(chars.secondary),
        }
    }
}

/// What the user has typed so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Query {
    /// Text between the session start and the cursor.
    Text(String),
    /// Precomputed values for metadata completion.
    Values(Vec<String>),
}

impl Query {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Values(_) => None,
        }
    }
}

/// The range a selection will replace, and the query that filters it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerInfo {
    pub start: Position,
    pub end: Position,
    pub query: Query,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TriggerState {
    #[default]
    Closed,
    MetadataValueComplete(TriggerInfo),
    Open {
        mode: Mode,
        sequence: TriggerSequence,
        info: TriggerInfo,
    },
}

impl TriggerState {
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    #[must_use]
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Self::Closed => None,
            Self::MetadataValueComplete(_) => Some(Mode::YamlComplete),
            Self::Open { mode, .. } => Some(*mode),
        }
    }

    #[must_use]
    pub fn sequence(&self) -> Option<TriggerSequence> {
        match self {
            Self::Open { sequence, .. } => Some(*sequence),
            _ => None,
        }
    }

    #[must_use]
    pub fn info(&self) -> Option<&TriggerInfo> {
        match self {
            Self::Closed => None,
            Self::MetadataValueComplete(info) | Self::Open { info, .. } => Some(info),
        }
    }
}

/// Why a keystroke left (or kept) the session closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    LineStart,
    UnknownField,
    NotATrigger,
    ForeignTrigger,
    EmptyWord,
    WordTooShort,
    NotAnAcronym,
    LeftSession,
    QueryTooShort,
}

/// Delete the text between two positions on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferEdit {
    pub start: Position,
    pub end: Position,
}

/// The editor state a keystroke is judged against.
#[derive(Debug, Clone, Copy)]
pub struct Keystroke<'a> {
    pub cursor: Position,
    /// Full text of the cursor's line, after the keystroke.
    pub line: &'a str,
}

/// Session data the state machine reads but never writes.
#[derive(Debug, Clone, Copy)]
pub struct TriggerEnv<'a> {
    pub chars: TriggerChars,
    pub field_values: &'a FieldValueIndex,
    /// A phrase owned by another suggester; lines containing it never trigger.
    pub foreign_phrase: Option<&'a str>,
    /// Matches shown for the last query; zero means the session has nothing
    /// to continue.
    pub match_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TriggerState,
    pub edit: Option<BufferEdit>,
    pub reason: Option<CloseReason>,
}

impl Transition {
    fn to(state: TriggerState, edit: Option<BufferEdit>) -> Self {
        Self {
            state,
            edit,
            reason: None,
        }
    }

    fn closed(reason: CloseReason, edit: Option<BufferEdit>) -> Self {
        trace!(?reason, "trigger closed");
        Self {
            state: TriggerState::Closed,
            edit,
            reason: Some(reason),
        }
    }
}

/// Advance the trigger state machine by one keystroke.
pub fn step(state: &TriggerState, key: &Keystroke<'_>, env: &TriggerEnv<'_>) -> Transition {
    let chars: Vec<char> = key.line.chars().collect();
    let ch = key.cursor.ch.min(chars.len());
    let line = key.cursor.line;

    if ch == 0 {
        return Transition::closed(CloseReason::LineStart, None);
    }
    if ch >= 2 && chars[ch - 2] == ':' && chars[ch - 1] == ' ' {
        return metadata_value(&chars, line, ch, env);
    }
    match state {
        TriggerState::Open { .. } | TriggerState::MetadataValueComplete(_)
            if env.match_count > 0 =>
        {
            continue_session(state, chars, line, ch, env)
        }
        _ => fresh_trigger(key.line, &chars, line, ch, env),
    }
}

/// `field: ` offers the values seen for `field` elsewhere in the vault.
fn metadata_value(chars: &[char], line: usize, ch: usize, env: &TriggerEnv<'_>) -> Transition {
    let field: String = chars[..ch - 2].iter().collect();
    let field = field.trim();
    if field.is_empty() {
        return Transition::closed(CloseReason::UnknownField, None);
    }
    match env.field_values.lookup(field) {
        Some(values) if !values.is_empty() => {
            let at = Position::new(line, ch);
            Transition::to(
                TriggerState::MetadataValueComplete(TriggerInfo {
                    start: at,
                    end: at,
                    query: Query::Values(values.iter().cloned().collect()),
                }),
                None,
            )
        }
        _ => Transition::closed(CloseReason::UnknownField, None),
    }
}

fn continue_session(
    state: &TriggerState,
    mut chars: Vec<char>,
    line: usize,
    mut ch: usize,
    env: &TriggerEnv<'_>,
) -> Transition {
    let (start, mut mode, mut sequence) = match state {
        TriggerState::Open {
            mode,
            sequence,
            info,
        } => (info.start, *mode, Some(*sequence)),
        TriggerState::MetadataValueComplete(info) => (info.start, Mode::YamlComplete, None),
        TriggerState::Closed => return Transition::closed(CloseReason::NotATrigger, None),
    };

    let mut edit = None;
    if let Some(broadened) = sequence.and_then(TriggerSequence::broadened) {
        let trigger = sequence.and_then(|s| s.trigger_char(&env.chars));
        if ch >= 2 && chars[ch - 1] == env.chars.broaden && Some(chars[ch - 2]) == trigger {
            edit = Some(BufferEdit {
                start: Position::new(line, ch - 2),
                end: Position::new(line, ch),
            });
            chars.drain(ch - 2..ch);
            ch -= 2;
            sequence = Some(broadened);
            mode = broadened.mode();
            trace!(?mode, "session broadened");
        }
    }

    if line != start.line || ch < start.ch {
        return Transition::closed(CloseReason::LeftSession, edit);
    }
    let query: String = chars[start.ch..ch].iter().collect();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Transition::closed(CloseReason::QueryTooShort, edit);
    }

    let end = Position::new(line, ch);
    let next = match (sequence, state) {
        (Some(sequence), _) => TriggerState::Open {
            mode,
            sequence,
            info: TriggerInfo {
                start,
                end,
                query: Query::Text(query),
            },
        },
        // Typing past `field: ` still offers that field's values.
        (None, TriggerState::MetadataValueComplete(info)) => {
            TriggerState::MetadataValueComplete(TriggerInfo {
                start,
                end,
                query: info.query.clone(),
            })
        }
        (None, _) => return Transition::closed(CloseReason::NotATrigger, edit),
    };
    Transition::to(next, edit)
}

fn fresh_trigger(
    text: &str,
    chars: &[char],
    line: usize,
    ch: usize,
    env: &TriggerEnv<'_>,
) -> Transition {
    let TriggerChars {
        primary,
        secondary,
        broaden,
    } = env.chars;
    let typed = chars[ch - 1];
    if !env.chars.is_trigger(typed) {
        return Transition::closed(CloseReason::NotATrigger, None);
    }
    if env
        .foreign_phrase
        .is_some_and(|phrase| !phrase.is_empty() && text.contains(phrase))
    {
        return Transition::closed(CloseReason::ForeignTrigger, None);
    }

    let prev = (ch >= 2).then(|| chars[ch - 2]);
    let semi_all = typed == broaden && prev == Some(secondary);
    let space_all = typed == broaden && primary.is_some() && prev == primary;
    let single = Some(typed) == primary || typed == secondary;
    if !(single || semi_all || space_all) {
        return Transition::closed(CloseReason::NotATrigger, None);
    }

    let doubled = single && prev == Some(typed);
    let (word_start, word_end) = if semi_all || space_all {
        let end = ch - 2;
        (token_start(chars, end), end)
    } else if doubled {
        let end = ch - 2;
        let last = token_start(chars, end);
        if last == 0 {
            (0, end)
        } else {
            (token_start(chars, last - 1), end)
        }
    } else {
        let end = ch - 1;
        (token_start(chars, end), end)
    };

    let word: String = chars[word_start..word_end].iter().collect();
    if word.trim().is_empty() {
        return Transition::closed(CloseReason::EmptyWord, None);
    }
    if Some(typed) == primary || typed == broaden {
        let len = word_end - word_start;
        if len <= MAX_IGNORED_WORD {
            return Transition::closed(CloseReason::WordTooShort, None);
        }
        if len == ACRONYM_LEN && word != word.to_uppercase() {
            return Transition::closed(CloseReason::NotAnAcronym, None);
        }
    }

    let sequence = if semi_all {
        TriggerSequence::SecondaryBroaden
    } else if space_all {
        TriggerSequence::PrimaryBroaden
    } else if typed == secondary {
        TriggerSequence::Secondary
    } else {
        TriggerSequence::Primary
    };
    trace!(?sequence, word = %word, "session opened");
    Transition::to(
        TriggerState::Open {
            mode: sequence.mode(),
            sequence,
            info: TriggerInfo {
                start: Position::new(line, word_start),
                end: Position::new(line, ch),
                query: Query::Text(word),
            },
        },
        None,
    )
}

/// Column where the whitespace-delimited token ending at `end` begins.
fn token_start(chars: &[char], end: usize) -> usize {
    chars[..end]
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(0, |i| i + 1)
}
