//! The save pipeline.
//!
//! One run per saved document: classify, select the preamble profile,
//! compute the rewrite, persist the edit, record the main file, resolve a
//! recipe, and trigger the build. Every stage returns a value; the result
//! of a run is a [`SaveOutcome`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::build::{self, BuildStatus, Recipe};
use crate::classify::Language;
use crate::config::Config;
use crate::profile::ProfileRegistry;
use crate::rewrite::rewrite_preamble;
use crate::settings::SettingsStore;

/// Result of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub language: Language,
    /// Whether the preamble was rewritten and persisted.
    pub rewritten: bool,
    pub build: BuildStatus,
}

/// Drives the classify → rewrite → edit → build sequence for one workspace.
pub struct Pipeline {
    config: Config,
    registry: ProfileRegistry,
    recipes: Vec<Recipe>,
    store: SettingsStore,
    /// Content this pipeline last wrote, to ignore the watcher echo of its
    /// own edit.
    last_written: Option<(PathBuf, String)>,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let registry = ProfileRegistry::load(config.profile_path.as_deref())?;

        let mut store = SettingsStore::load(&config.settings_path);
        let english_recipe = registry
            .select(Language::English, config.japanese_engine)
            .map(|p| p.recipe.clone())
            .context("no profile for english documents")?;
        let japanese_recipe = registry
            .select(Language::Japanese, config.japanese_engine)
            .map(|p| p.recipe.clone())
            .with_context(|| {
                format!(
                    "no profile for japanese documents with engine {}",
                    config.japanese_engine.binary_name()
                )
            })?;
        if store.seed_recipes(&english_recipe, &japanese_recipe) {
            if let Err(e) = store.save() {
                log::warn!("Could not persist seeded settings: {:#}", e);
            }
        }

        Ok(Self {
            config,
            registry,
            recipes: build::builtin_recipes(),
            store,
            last_written: None,
        })
    }

    /// Settings store view, mainly for tests and diagnostics.
    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Run the pipeline for one saved file.
    ///
    /// Returns `Ok(None)` when the save needs no action: a non-`.tex` path,
    /// or the echo of an edit this pipeline just wrote.
    pub async fn on_save(&mut self, path: &Path) -> Result<Option<SaveOutcome>> {
        // .sty, .cls and anything else are not processed.
        if path.extension().and_then(|s| s.to_str()) != Some("tex") {
            return Ok(None);
        }

        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if let Some((last_path, last_text)) = &self.last_written {
            if last_path == path && *last_text == text {
                log::debug!("Ignoring echo of own edit for {}", path.display());
                return Ok(None);
            }
        }

        let language = Language::of(&text);
        let profile = self
            .registry
            .select(language, self.config.japanese_engine)
            .with_context(|| format!("no profile for {language} documents"))?
            .clone();
        log::debug!(
            "{} classified as {}, profile '{}'",
            path.display(),
            language,
            profile.name
        );

        let rewritten = match rewrite_preamble(&text, &profile) {
            Some(new_text) => {
                tokio::fs::write(path, &new_text)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                self.last_written = Some((path.to_path_buf(), new_text));
                log::info!("Rewrote preamble of {} for {}", path.display(), language);
                true
            }
            None => false,
        };

        self.adopt_main_file(path);

        let build = if self.config.no_build {
            BuildStatus::Skipped
        } else {
            self.build_main_file(language, &profile.recipe).await
        };

        Ok(Some(SaveOutcome {
            language,
            rewritten,
            build,
        }))
    }

    /// Record the first saved document as the workspace main file.
    fn adopt_main_file(&mut self, path: &Path) {
        if self.store.main_file().is_some() {
            return;
        }
        let name = workspace_relative(&self.config.workspace, path);
        log::info!("Adopting {} as the main file", name);
        self.store.set_main_file(&name);
        if let Err(e) = self.store.save() {
            log::warn!("Could not persist main file setting: {:#}", e);
        }
    }

    /// Resolve the recipe for a classification and run it on the main file.
    async fn build_main_file(&self, language: Language, profile_recipe: &str) -> BuildStatus {
        let Some(main_file) = self.store.main_file().map(str::to_string) else {
            log::warn!("No main file recorded; skipping build");
            return BuildStatus::Skipped;
        };

        let recipe_name = self
            .store
            .recipe_for(language)
            .unwrap_or(profile_recipe)
            .to_string();
        let Some(recipe) = build::find_recipe(&self.recipes, &recipe_name) else {
            log::warn!("Unknown recipe '{}'; skipping build", recipe_name);
            return BuildStatus::Skipped;
        };

        build::run_recipe(recipe, &self.config.workspace, &main_file).await
    }
}

/// Path of `file` relative to the workspace root, as a settings value.
fn workspace_relative(workspace: &Path, file: &Path) -> String {
    let workspace = workspace.canonicalize().unwrap_or_else(|_| workspace.to_path_buf());
    let file_abs = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
    match file_abs.strip_prefix(&workspace) {
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string_lossy().into_owned()),
    }
}
