//! # pla-vault
//!
//! Reference document index for PLA.
//!
//! A host editor normally owns the metadata cache. This crate stands in for
//! it: it loads a directory of markdown notes, keeps their frontmatter and
//! links in memory, implements [`pla_core::DocumentIndex`], and watches the
//! directory so edits reach the suggester as metadata-update events.

pub mod vault;
pub mod watcher;

pub use vault::{Note, Vault};
pub use watcher::{VaultEvent, VaultWatcher};
