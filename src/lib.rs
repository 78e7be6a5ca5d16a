//! addlatex
//!
//! A save-watching LaTeX build assistant.
//!
//! This library provides:
//! - Japanese-text detection outside comments
//! - Engine-specific preamble rewriting
//! - A JSON-backed workspace settings store
//! - Recipe-driven builds through the TeX toolchain
//! - A file watcher feeding the save pipeline

pub mod build;
pub mod classify;
pub mod config;
pub mod pipeline;
pub mod profile;
pub mod rewrite;
pub mod settings;
pub mod texdist;
pub mod watcher;

// Re-exports for clean public API
pub use build::{BuildStatus, Recipe};
pub use classify::{Language, contains_japanese};
pub use config::Config;
pub use pipeline::{Pipeline, SaveOutcome};
pub use profile::{Engine, PreambleProfile, ProfileRegistry};
pub use rewrite::rewrite_preamble;
pub use settings::SettingsStore;
