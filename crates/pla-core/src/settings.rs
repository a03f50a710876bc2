//! Persisted user settings.
//!
//! Settings live in a small TOML file. Every field has a default, so a
//! missing file or a partial file both load cleanly:
//!
//! ```toml
//! auto_space = true
//! secondary_trigger = ";"
//! related_fields = ["company", "projectId"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PlaError;

/// Frontmatter fields that relate notes to each other unless configured
/// otherwise.
pub const DEFAULT_RELATED_FIELDS: &[&str] = &[
    "company",
    "related",
    "test",
    "projectId",
    "clientId",
    "description",
];

/// User-facing configuration for the link suggester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Open suggestions after every word typed (space is the trigger).
    pub auto_space: bool,
    /// Character that opens suggestions on demand.
    pub secondary_trigger: char,
    /// Character typed after a trigger to widen the search to the whole vault.
    pub broaden_trigger: char,
    /// Offer `target|alias` entries alongside plain targets.
    pub include_aliases: bool,
    /// Frontmatter fields whose shared values make two notes related.
    pub related_fields: Vec<String>,
    /// Trigger phrase of another suggester that must not be interrupted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooperating_trigger_phrase: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_space: false,
            secondary_trigger: ';',
            broaden_trigger: ',',
            include_aliases: true,
            related_fields: DEFAULT_RELATED_FIELDS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            cooperating_trigger_phrase: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PlaError::Io`] if the file exists but cannot be read, and
    /// [`PlaError::Config`] if it is not valid settings TOML.
    pub fn load(path: &Path) -> Result<Self, PlaError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`PlaError::Config`] on malformed TOML or invalid values.
    pub fn from_toml(raw: &str) -> Result<Self, PlaError> {
        let settings: Self = toml::from_str(raw).map_err(|e| PlaError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`PlaError::Serialization`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, PlaError> {
        toml::to_string_pretty(self).map_err(|e| PlaError::Serialization(e.to_string()))
    }

    /// Write settings to a TOML file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`PlaError::Io`] on write failure.
    pub fn save(&self, path: &Path) -> Result<(), PlaError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), PlaError> {
        if self.secondary_trigger == self.broaden_trigger {
            return Err(PlaError::Config(format!(
                "secondary_trigger and broaden_trigger must differ (both '{}')",
                self.secondary_trigger
            )));
        }
        if self.auto_space && (self.secondary_trigger == ' ' || self.broaden_trigger == ' ') {
            return Err(PlaError::Config(
                "space is reserved for the primary trigger when auto_space is on".to_string(),
            ));
        }
        Ok(())
    }

    /// The trigger characters in effect for these settings.
    #[must_use]
    pub fn trigger_chars(&self) -> TriggerChars {
        TriggerChars {
            primary: self.auto_space.then_some(' '),
            secondary: self.secondary_trigger,
            broaden: self.broaden_trigger,
        }
    }
}

/// Characters that open or widen a suggestion session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerChars {
    /// Space when `auto_space` is on, otherwise disabled.
    pub primary: Option<char>,
    pub secondary: char,
    pub broaden: char,
}

impl Default for TriggerChars {
    fn default() -> Self {
        Settings::default().trigger_chars()
    }
}

impl TriggerChars {
    /// Whether `c` can open a session on its own or as part of a sequence.
    #[must_use]
    pub fn is_trigger(&self, c: char) -> bool {
        Some(c) == self.primary || c == self.secondary || c == self.broaden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("pla.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.secondary_trigger, ';');
        assert!(settings.related_fields.iter().any(|f| f == "projectId"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings = Settings::from_toml("auto_space = true\n").unwrap();
        assert!(settings.auto_space);
        assert_eq!(settings.broaden_trigger, ',');
        assert!(settings.include_aliases);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("pla.toml");
        let settings = Settings {
            auto_space: true,
            secondary_trigger: '@',
            related_fields: vec!["client".to_string()],
            cooperating_trigger_phrase: Some(",,".to_string()),
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn rejects_multi_character_trigger() {
        let err = Settings::from_toml("secondary_trigger = \";;\"\n").unwrap_err();
        assert!(matches!(err, PlaError::Config(_)));
    }

    #[test]
    fn rejects_colliding_triggers() {
        assert!(Settings::from_toml("secondary_trigger = \",\"\n").is_err());
        assert!(Settings::from_toml("auto_space = true\nsecondary_trigger = \" \"\n").is_err());
    }

    #[test]
    fn trigger_chars_follow_auto_space() {
        let off = Settings::default().trigger_chars();
        assert_eq!(off.primary, None);
        assert!(!off.is_trigger(' '));
        assert!(off.is_trigger(';'));

        let on = Settings {
            auto_space: true,
            ..Settings::default()
        }
        .trigger_chars();
        assert_eq!(on.primary, Some(' '));
        assert!(on.is_trigger(' '));
        assert!(on.is_trigger(','));
    }
}
