//! Preamble profiles.
//!
//! A profile is the fixed target configuration for one (language, engine)
//! pair: document class, class options, font package lines, the legacy CJK
//! packages that conflict with it, and the recipe used to build the result.
//!
//! Profiles are declared in TOML. A built-in table is embedded in the binary;
//! a user file can override entries with the same name.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::classify::Language;

/// Supported LaTeX engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Pdflatex,
    Xelatex,
    Uplatex,
}

impl Engine {
    /// Name of the engine binary on `PATH`.
    pub fn binary_name(&self) -> &'static str {
        match self {
            Engine::Pdflatex => "pdflatex",
            Engine::Xelatex => "xelatex",
            Engine::Uplatex => "uplatex",
        }
    }
}

/// Target preamble configuration for one (language, engine) pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreambleProfile {
    pub name: String,
    pub language: Language,
    pub engine: Engine,
    pub document_class: String,
    #[serde(default)]
    pub class_options: Vec<String>,
    /// Full preamble lines inserted before `\begin{document}` when the
    /// guard package is absent.
    #[serde(default)]
    pub font_packages: Vec<String>,
    /// Package whose presence means the font lines are already in place.
    pub font_guard_package: Option<String>,
    /// Packages removed on every rewrite, regardless of their option lists.
    #[serde(default)]
    pub conflicting_packages: Vec<String>,
    /// Also strip font-selection commands tied to the removed packages.
    #[serde(default)]
    pub strip_font_commands: bool,
    /// Name of the build recipe for documents in this configuration.
    pub recipe: String,
}

impl PreambleProfile {
    /// The `\documentclass` line this profile rewrites to.
    pub fn document_class_line(&self) -> String {
        if self.class_options.is_empty() {
            format!("\\documentclass{{{}}}", self.document_class)
        } else {
            format!(
                "\\documentclass[{}]{{{}}}",
                self.class_options.join(","),
                self.document_class
            )
        }
    }
}

/// Root structure of a profile TOML file.
#[derive(Debug, Deserialize)]
struct ProfileFile {
    profiles: Vec<PreambleProfile>,
}

/// In-memory profile table keyed by profile name.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<String, PreambleProfile>,
}

impl ProfileRegistry {
    /// Registry holding only the embedded built-in profiles.
    pub fn builtin() -> Result<Self> {
        let embedded = include_str!("../resources/profiles.toml");
        let file: ProfileFile =
            toml::from_str(embedded).context("embedded profile table is invalid")?;
        let mut profiles = HashMap::new();
        for profile in file.profiles {
            profiles.insert(profile.name.clone(), profile);
        }
        Ok(Self { profiles })
    }

    /// Built-in profiles, layered with the user-global profile file and an
    /// explicit override file. Priority: built-in < user-global < explicit.
    ///
    /// A missing or malformed layer degrades to the layers below it with a
    /// logged warning, never an error.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut registry = Self::builtin()?;

        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir.join("addlatex").join("profiles.toml");
            if user_path.exists() {
                registry.merge_file(&user_path);
            }
        }

        if let Some(path) = override_path {
            registry.merge_file(path);
        }

        Ok(registry)
    }

    /// Merge profiles from a TOML file, overriding entries by name.
    fn merge_file(&mut self, path: &Path) {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<ProfileFile>(&content) {
                Ok(file) => {
                    for profile in file.profiles {
                        self.profiles.insert(profile.name.clone(), profile);
                    }
                }
                Err(e) => {
                    log::warn!("Ignoring malformed profile file {}: {}", path.display(), e);
                }
            },
            Err(e) => {
                log::warn!("Cannot read profile file {}: {}", path.display(), e);
            }
        }
    }

    /// Look up a profile by name.
    pub fn get(&self, name: &str) -> Option<&PreambleProfile> {
        self.profiles.get(name)
    }

    /// Select the profile for a classification.
    ///
    /// English documents always map to the pdfLaTeX profile; Japanese
    /// documents map to the profile for the configured Japanese engine.
    pub fn select(&self, language: Language, japanese_engine: Engine) -> Option<&PreambleProfile> {
        self.profiles.values().find(|p| {
            p.language == language && (language == Language::English || p.engine == japanese_engine)
        })
    }

    /// All profile names, for diagnostics.
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_table_parses() {
        let registry = ProfileRegistry::builtin().expect("builtin profiles");
        assert!(registry.get("english").is_some());
        assert!(registry.get("japanese-uplatex").is_some());
        assert!(registry.get("japanese-xelatex").is_some());
    }

    #[test]
    fn test_select_english() {
        let registry = ProfileRegistry::builtin().expect("builtin profiles");
        // The Japanese engine choice must not affect English selection.
        for engine in [Engine::Uplatex, Engine::Xelatex] {
            let profile = registry
                .select(Language::English, engine)
                .expect("english profile");
            assert_eq!(profile.document_class, "article");
            assert_eq!(profile.recipe, "PDFLaTeX");
        }
    }

    #[test]
    fn test_select_japanese_by_engine() {
        let registry = ProfileRegistry::builtin().expect("builtin profiles");

        let uplatex = registry
            .select(Language::Japanese, Engine::Uplatex)
            .expect("uplatex profile");
        assert_eq!(uplatex.document_class, "jsarticle");
        assert_eq!(uplatex.recipe, "upLaTeX + dvipdfmx");

        let xelatex = registry
            .select(Language::Japanese, Engine::Xelatex)
            .expect("xelatex profile");
        assert_eq!(xelatex.document_class, "bxjsarticle");
        assert!(!xelatex.font_packages.is_empty());
    }

    #[test]
    fn test_document_class_line() {
        let registry = ProfileRegistry::builtin().expect("builtin profiles");

        let english = registry.get("english").expect("english");
        assert_eq!(english.document_class_line(), "\\documentclass{article}");

        let uplatex = registry.get("japanese-uplatex").expect("uplatex");
        assert_eq!(
            uplatex.document_class_line(),
            "\\documentclass[uplatex,dvipdfmx]{jsarticle}"
        );
    }

    #[test]
    fn test_override_file_replaces_entry() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
[[profiles]]
name = "english"
language = "english"
engine = "pdflatex"
document_class = "scrartcl"
recipe = "PDFLaTeX"
"#
        )
        .expect("write override");

        let registry = ProfileRegistry::load(Some(file.path())).expect("load");
        let english = registry.get("english").expect("english");
        assert_eq!(english.document_class, "scrartcl");
        // Untouched entries survive.
        assert!(registry.get("japanese-uplatex").is_some());
    }

    #[test]
    fn test_malformed_override_falls_back() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "not [valid toml").expect("write override");

        let registry = ProfileRegistry::load(Some(file.path())).expect("load");
        let english = registry.get("english").expect("english");
        assert_eq!(english.document_class, "article");
    }
}
