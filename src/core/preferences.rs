//! Theme and view preferences, persisted as a small JSON file.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::LingoError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Text,
    Summarize,
}

impl FromStr for Theme {
    type Err = LingoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(LingoError::Preferences(format!("unknown theme '{other}'"))),
        }
    }
}

impl FromStr for View {
    type Err = LingoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "summarize" => Ok(Self::Summarize),
            other => Err(LingoError::Preferences(format!("unknown view '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
    pub view: View,
}

/// Reads preferences once and writes them back on every change.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    current: Preferences,
}

impl PreferenceStore {
    /// Loads from `path`. A missing or unreadable file yields defaults.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt preferences file");
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        };
        Self { path, current }
    }

    #[must_use]
    pub const fn get(&self) -> Preferences {
        self.current
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written; the current value is
    /// kept then.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), LingoError> {
        self.commit(Preferences {
            theme,
            ..self.current
        })
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written; the current value is
    /// kept then.
    pub fn set_view(&mut self, view: View) -> Result<(), LingoError> {
        self.commit(Preferences {
            view,
            ..self.current
        })
    }

    fn commit(&mut self, next: Preferences) -> Result<(), LingoError> {
        let json = serde_json::to_string_pretty(&next)
            .map_err(|e| LingoError::Preferences(format!("serialize: {e}")))?;
        fs::write(&self.path, json).map_err(|e| {
            LingoError::Preferences(format!("write {}: {e}", self.path.display()))
        })?;
        self.current = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::load(dir.path().join("absent.json"));
        assert_eq!(store.get(), Preferences::default());
        assert_eq!(store.get().theme, Theme::Light);
        assert_eq!(store.get().view, View::Text);
    }

    #[test]
    fn changes_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = PreferenceStore::load(&path);
        store.set_theme(Theme::Dark).unwrap();
        store.set_view(View::Summarize).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"dark\""));
        assert!(raw.contains("\"summarize\""));

        let reloaded = PreferenceStore::load(&path);
        assert_eq!(
            reloaded.get(),
            Preferences {
                theme: Theme::Dark,
                view: View::Summarize
            }
        );
    }

    #[test]
    fn failed_write_keeps_current_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("prefs.json");

        let mut store = PreferenceStore::load(&path);
        let err = store.set_theme(Theme::Dark).unwrap_err();
        assert!(matches!(err, LingoError::Preferences(_)));
        assert!(store.set_view(View::Summarize).is_err());

        assert_eq!(store.get(), Preferences::default());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_or_partial_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{ not json").unwrap();
        assert_eq!(PreferenceStore::load(&corrupt).get(), Preferences::default());

        let partial = dir.path().join("partial.json");
        fs::write(&partial, r#"{ "theme": "dark" }"#).unwrap();
        let prefs = PreferenceStore::load(&partial).get();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.view, View::Text);
    }

    #[test]
    fn parses_names() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" summarize ".parse::<View>().unwrap(), View::Summarize);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
