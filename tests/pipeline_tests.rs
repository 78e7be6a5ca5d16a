//! Pipeline integration: classify, rewrite, persist, settings adoption.
//!
//! Builds are disabled throughout; toolchain invocation is covered by the
//! unit tests in `build`.

use std::path::{Path, PathBuf};

use addlatex::build::BuildStatus;
use addlatex::classify::Language;
use addlatex::config::Config;
use addlatex::pipeline::Pipeline;
use addlatex::profile::Engine;
use addlatex::settings::SettingsStore;

fn test_config(workspace: &Path) -> Config {
    Config {
        workspace: workspace.to_path_buf(),
        settings_path: SettingsStore::default_path(workspace),
        japanese_engine: Engine::Xelatex,
        profile_path: None,
        no_build: true,
        log_level: "warn".to_string(),
    }
}

fn write_doc(workspace: &Path, name: &str, content: &str) -> PathBuf {
    let path = workspace.join(name);
    std::fs::write(&path, content).expect("write document");
    path
}

#[tokio::test]
async fn japanese_save_rewrites_file_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let doc = write_doc(
        dir.path(),
        "report.tex",
        "\\documentclass{article}\n\\begin{document}\n日本語\n\\end{document}\n",
    );

    let mut pipeline = Pipeline::new(test_config(dir.path())).expect("pipeline");
    let outcome = pipeline.on_save(&doc).await.expect("run").expect("outcome");

    assert_eq!(outcome.language, Language::Japanese);
    assert!(outcome.rewritten);
    assert_eq!(outcome.build, BuildStatus::Skipped);

    let on_disk = std::fs::read_to_string(&doc).expect("read back");
    assert!(on_disk.contains("\\documentclass[xelatex,ja=standard]{bxjsarticle}"));
    assert!(on_disk.contains("\\usepackage{fontspec}"));
}

#[tokio::test]
async fn english_save_changes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let original = "\\documentclass{article}\n\\begin{document}\nhello\n\\end{document}\n";
    let doc = write_doc(dir.path(), "paper.tex", original);

    let mut pipeline = Pipeline::new(test_config(dir.path())).expect("pipeline");
    let outcome = pipeline.on_save(&doc).await.expect("run").expect("outcome");

    assert_eq!(outcome.language, Language::English);
    assert!(!outcome.rewritten);
    assert_eq!(
        std::fs::read_to_string(&doc).expect("read back"),
        original
    );
}

#[tokio::test]
async fn non_tex_files_are_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sty = write_doc(dir.path(), "macros.sty", "\\newcommand{\\x}{日本語}");
    let cls = write_doc(dir.path(), "custom.cls", "% class file");

    let mut pipeline = Pipeline::new(test_config(dir.path())).expect("pipeline");
    assert!(pipeline.on_save(&sty).await.expect("run").is_none());
    assert!(pipeline.on_save(&cls).await.expect("run").is_none());
}

#[tokio::test]
async fn first_saved_file_becomes_main_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = write_doc(
        dir.path(),
        "main.tex",
        "\\documentclass{article}\n\\begin{document}\na\n\\end{document}\n",
    );
    let second = write_doc(
        dir.path(),
        "appendix.tex",
        "\\documentclass{article}\n\\begin{document}\nb\n\\end{document}\n",
    );

    let config = test_config(dir.path());
    let mut pipeline = Pipeline::new(config.clone()).expect("pipeline");
    pipeline.on_save(&first).await.expect("run first");
    pipeline.on_save(&second).await.expect("run second");

    let store = SettingsStore::load(&config.settings_path);
    assert_eq!(store.main_file(), Some("main.tex"));
}

#[tokio::test]
async fn settings_are_seeded_with_recipe_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());

    let _ = Pipeline::new(config.clone()).expect("pipeline");

    let store = SettingsStore::load(&config.settings_path);
    assert_eq!(store.recipe_for(Language::English), Some("PDFLaTeX"));
    assert_eq!(store.recipe_for(Language::Japanese), Some("XeLaTeX"));
}

#[tokio::test]
async fn own_rewrite_echo_is_suppressed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let doc = write_doc(
        dir.path(),
        "report.tex",
        "\\documentclass{article}\n\\begin{document}\n日本語\n\\end{document}\n",
    );

    let mut pipeline = Pipeline::new(test_config(dir.path())).expect("pipeline");
    let first = pipeline.on_save(&doc).await.expect("run").expect("outcome");
    assert!(first.rewritten);

    // The watcher would now deliver the event for the write the pipeline
    // itself made; that run must be a no-op.
    assert!(pipeline.on_save(&doc).await.expect("echo run").is_none());
}

#[tokio::test]
async fn malformed_settings_do_not_break_the_pipeline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    std::fs::create_dir_all(config.settings_path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&config.settings_path, "{ broken").expect("write garbage");

    let doc = write_doc(
        dir.path(),
        "doc.tex",
        "\\documentclass{article}\n\\begin{document}\nhello\n\\end{document}\n",
    );

    let mut pipeline = Pipeline::new(config).expect("pipeline");
    let outcome = pipeline.on_save(&doc).await.expect("run").expect("outcome");
    assert_eq!(outcome.language, Language::English);
}
