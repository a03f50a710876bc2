//! Candidate filtering and link formatting.

use indexmap::IndexSet;
use tracing::trace;

use crate::session::SessionMemory;
use crate::trigger::{Mode, Query, TriggerSequence};

/// Pools for `mode`, each sorted shortest first, concatenated and
/// deduplicated.
#[must_use]
pub fn candidate_pool(memory: &SessionMemory, mode: Mode) -> Vec<String> {
    let pools: Vec<&[String]> = match mode {
        Mode::Yaml => vec![&memory.file_links[..], &memory.yaml_links[..]],
        Mode::All | Mode::AllSemi => vec![
            &memory.file_links[..],
            &memory.yaml_links[..],
            &memory.vault_links[..],
        ],
        Mode::YamlComplete => vec![&memory.completion_values[..]],
    };

    let mut candidates = IndexSet::new();
    for pool in pools {
        let mut sorted = pool.to_vec();
        if mode != Mode::YamlComplete {
            sorted.sort_by_key(|s| s.chars().count());
        }
        candidates.extend(sorted);
    }
    candidates.into_iter().collect()
}

/// Case-insensitive substring match, also trying the candidate with its
/// spaces removed so `hotreload` finds `Hot Reload`.
#[must_use]
pub fn matches_query(candidate: &str, query: &str) -> bool {
    let candidate = candidate.to_lowercase();
    let query = query.to_lowercase();
    candidate.contains(&query) || candidate.replace(' ', "").contains(&query)
}

#[must_use]
pub fn filter_candidates(pool: Vec<String>, query: &str) -> Vec<String> {
    pool.into_iter()
        .filter(|candidate| matches_query(candidate, query))
        .collect()
}

/// Candidates for the current session, or `None` when nothing matches.
///
/// Records the number of matches in `memory`; a session with zero matches
/// does not follow further typing.
pub fn suggest(memory: &mut SessionMemory, query: &Query) -> Option<Vec<String>> {
    let pool = candidate_pool(memory, memory.mode);
    let matches = match (memory.mode, query.as_text()) {
        (Mode::YamlComplete, _) | (_, None) => pool,
        (_, Some(text)) => filter_candidates(pool, text),
    };
    memory.match_count = matches.len();
    trace!(mode = ?memory.mode, matches = matches.len(), "suggestions");
    (!matches.is_empty()).then_some(matches)
}

/// The text inserted for a chosen candidate.
#[must_use]
pub fn format_link(value: &str, sequence: Option<TriggerSequence>) -> String {
    let trailing = if sequence.is_some_and(TriggerSequence::is_primary) {
        " "
    } else {
        ""
    };
    format!("[[{value}]]{trailing}")
}

/// How a candidate is shown in the list: the alias of `target|alias`, or the
/// whole value.
#[must_use]
pub fn display_label(value: &str) -> &str {
    value.split_once('|').map_or(value, |(_, alias)| alias)
}
