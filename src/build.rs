//! Build recipes and external engine invocation.
//!
//! A recipe is a named sequence of toolchain invocations. The built-in set
//! matches the per-language defaults seeded into the settings store;
//! documents pick a recipe through their preamble profile or the store's
//! recipe keys.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::texdist;

/// Placeholder in recipe arguments, replaced by the main file's stem.
pub const DOC_PLACEHOLDER: &str = "%DOC%";

/// One toolchain invocation within a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    pub program: String,
    pub args: Vec<String>,
}

/// A named build configuration: engine plus arguments, possibly staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub name: String,
    pub steps: Vec<BuildStep>,
}

/// Outcome of a build request. Never fatal to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Success,
    Failed,
    /// Builds disabled or no recipe resolved.
    Skipped,
    /// Engine binary not found on PATH.
    ToolMissing,
}

fn step(program: &str, args: &[&str]) -> BuildStep {
    BuildStep {
        program: program.to_string(),
        args: args.iter().map(|s| s.to_string()).collect(),
    }
}

/// The fixed built-in recipe set.
pub fn builtin_recipes() -> Vec<Recipe> {
    vec![
        Recipe {
            name: "PDFLaTeX".to_string(),
            steps: vec![step(
                "pdflatex",
                &["-interaction=nonstopmode", "-synctex=1", DOC_PLACEHOLDER],
            )],
        },
        Recipe {
            name: "XeLaTeX".to_string(),
            steps: vec![step(
                "xelatex",
                &["-interaction=nonstopmode", "-synctex=1", DOC_PLACEHOLDER],
            )],
        },
        Recipe {
            name: "upLaTeX + dvipdfmx".to_string(),
            steps: vec![
                step("uplatex", &["-interaction=nonstopmode", DOC_PLACEHOLDER]),
                step("dvipdfmx", &[DOC_PLACEHOLDER]),
            ],
        },
    ]
}

/// Look up a recipe by name.
pub fn find_recipe<'a>(recipes: &'a [Recipe], name: &str) -> Option<&'a Recipe> {
    recipes.iter().find(|r| r.name == name)
}

/// Expand the document placeholder in a step's arguments.
fn expand_args(step: &BuildStep, doc_stem: &str) -> Vec<String> {
    step.args
        .iter()
        .map(|arg| arg.replace(DOC_PLACEHOLDER, doc_stem))
        .collect()
}

/// Run a recipe's steps in order from the workspace root.
///
/// `main_file` is the workspace-relative path of the document to build; the
/// engines receive it without its extension. The first failing step stops
/// the recipe.
pub async fn run_recipe(recipe: &Recipe, workspace: &Path, main_file: &str) -> BuildStatus {
    let doc = Path::new(main_file);
    let stem = match doc.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => match doc.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.join(stem).to_string_lossy().into_owned(),
            None => stem.to_string(),
        },
        None => {
            log::warn!("Cannot derive a document name from '{main_file}'");
            return BuildStatus::Skipped;
        }
    };

    for step in &recipe.steps {
        if texdist::find_binary(&step.program).is_none() {
            log::warn!(
                "Recipe '{}' needs {} which is not on PATH",
                recipe.name,
                step.program
            );
            return BuildStatus::ToolMissing;
        }

        let args = expand_args(step, &stem);
        log::debug!("Running {} {}", step.program, args.join(" "));

        let status = Command::new(&step.program)
            .args(&args)
            .current_dir(workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(code) if code.success() => {}
            Ok(code) => {
                log::warn!(
                    "Recipe '{}': {} exited with {}",
                    recipe.name,
                    step.program,
                    code
                );
                return BuildStatus::Failed;
            }
            Err(e) => {
                log::warn!("Recipe '{}': {} failed to start: {}", recipe.name, step.program, e);
                return BuildStatus::Failed;
            }
        }
    }

    log::info!("Recipe '{}' finished for {}", recipe.name, main_file);
    BuildStatus::Success
}
