//! Workspace settings store.
//!
//! A JSON object persisted inside the workspace (`.addlatex/settings.json`).
//! Recognized keys are namespaced strings; unrecognized keys round-trip
//! untouched so the file can hold other tools' configuration.
//!
//! Malformed content is never an error: the store loads as empty with a
//! logged warning and the next save rewrites the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::classify::Language;

pub const KEY_MAIN_FILE: &str = "addlatex.mainFile";
pub const KEY_NOTE: &str = "addlatex.note";
pub const KEY_RECIPE_ENGLISH: &str = "addlatex.recipe.english";
pub const KEY_RECIPE_JAPANESE: &str = "addlatex.recipe.japanese";

/// JSON-backed key-value store for one workspace.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl SettingsStore {
    /// Conventional settings path inside a workspace.
    pub fn default_path(workspace: &Path) -> PathBuf {
        workspace.join(".addlatex").join("settings.json")
    }

    /// Load the store from disk.
    ///
    /// A missing file yields an empty store; malformed JSON or a non-object
    /// root yields an empty store with a warning.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!(
                        "Settings file {} is not a JSON object; starting empty",
                        path.display()
                    );
                    Map::new()
                }
                Err(e) => {
                    log::warn!(
                        "Settings file {} is malformed ({}); starting empty",
                        path.display(),
                        e
                    );
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };

        Self { path, values }
    }

    /// Persist the store as pretty-printed JSON, creating the parent
    /// directory on first use.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&Value::Object(self.values.clone()))
            .context("Failed to serialize settings")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Designated main file, relative to the workspace root.
    pub fn main_file(&self) -> Option<&str> {
        self.get_str(KEY_MAIN_FILE)
    }

    pub fn set_main_file(&mut self, name: &str) {
        self.values
            .insert(KEY_MAIN_FILE.to_string(), Value::String(name.to_string()));
    }

    pub fn note(&self) -> Option<&str> {
        self.get_str(KEY_NOTE)
    }

    pub fn set_note(&mut self, note: &str) {
        self.values
            .insert(KEY_NOTE.to_string(), Value::String(note.to_string()));
    }

    /// Recipe name configured for a language, if any.
    pub fn recipe_for(&self, language: Language) -> Option<&str> {
        match language {
            Language::English => self.get_str(KEY_RECIPE_ENGLISH),
            Language::Japanese => self.get_str(KEY_RECIPE_JAPANESE),
        }
    }

    /// Insert a key only when absent. Returns true when the store changed.
    pub fn set_if_absent(&mut self, key: &str, value: &str) -> bool {
        if self.values.contains_key(key) {
            return false;
        }
        self.values
            .insert(key.to_string(), Value::String(value.to_string()));
        true
    }

    /// Seed the per-language recipe keys with defaults when absent.
    /// Returns true when anything was added.
    pub fn seed_recipes(&mut self, english: &str, japanese: &str) -> bool {
        let a = self.set_if_absent(KEY_RECIPE_ENGLISH, english);
        let b = self.set_if_absent(KEY_RECIPE_JAPANESE, japanese);
        a || b
    }
}
