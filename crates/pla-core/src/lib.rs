//! # pla-core
//!
//! Core types and collaborator traits for PLA, a link autocomplete engine
//! for markdown note vaults.
//!
//! This crate defines the foundational types used across all other PLA crates:
//! - [`LinkReference`]: a raw link parsed from a note body
//! - [`MetadataRecord`] and [`FieldValueIndex`]: normalized frontmatter
//! - [`DocumentIndex`]: read access to the host's notes and metadata cache
//! - [`EditorBuffer`]: the host text buffer, plus the in-memory [`TextBuffer`]
//! - [`Settings`]: persisted configuration
//! - Error hierarchy ([`PlaError`])
//! - Frontmatter splitting ([`frontmatter`])

pub mod document;
pub mod editor;
pub mod error;
pub mod frontmatter;
pub mod link;
pub mod metadata;
pub mod settings;

pub use document::{DocumentId, DocumentIndex};
pub use editor::{EditorBuffer, Position, TextBuffer};
pub use error::{PlaError, Result};
pub use link::LinkReference;
pub use metadata::{names_match, FieldValueIndex, MetadataField, MetadataRecord, POSITION_FIELD};
pub use settings::{Settings, TriggerChars};
