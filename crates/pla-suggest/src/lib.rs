//! # pla-suggest
//!
//! Link suggestion engine for PLA.
//!
//! Includes:
//! - Link extraction from parsed note links ([`extract`])
//! - Related-note resolution through shared frontmatter values ([`related`])
//! - The vault-wide title index ([`titles`])
//! - Keystroke trigger detection ([`trigger`])
//! - Candidate filtering and link formatting ([`filter`])
//! - Per-note session memory ([`session`]) and the [`LinkSuggester`] that
//!   ties them to host events

pub mod engine;
pub mod extract;
pub mod filter;
pub mod related;
pub mod session;
pub mod titles;
pub mod trigger;

pub use engine::{CooperatingSuggester, LinkSuggester};
pub use extract::extract_links;
pub use filter::{candidate_pool, display_label, filter_candidates, format_link, suggest};
pub use related::{resolve_related, RelatedLinks, RelationPolicy};
pub use session::{recompute_file_links, recompute_related, recompute_vault_index, SessionMemory};
pub use titles::vault_titles;
pub use trigger::{Mode, Query, TriggerInfo, TriggerSequence, TriggerState};
