//! TeX toolchain discovery.
//!
//! Locates engine binaries on `PATH`. A missing binary is a warning, never
//! an error; the pipeline still classifies and rewrites without a toolchain.

use std::path::PathBuf;

use crate::profile::Engine;

/// Find a binary by scanning the `PATH` entries.
pub fn find_binary(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{name}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

/// Check that an engine binary is present, warning when it is not.
pub fn check_engine(engine: Engine) -> bool {
    match find_binary(engine.binary_name()) {
        Some(path) => {
            log::debug!("Found {} at {}", engine.binary_name(), path.display());
            true
        }
        None => {
            log::warn!(
                "{} not found on PATH; builds for this engine will fail",
                engine.binary_name()
            );
            false
        }
    }
}

/// Startup presence check for the engines the configuration can reach.
pub fn report_toolchain(japanese_engine: Engine) {
    let pdflatex = check_engine(Engine::Pdflatex);
    let japanese = check_engine(japanese_engine);
    if pdflatex && japanese {
        log::info!("TeX toolchain found");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_binary_missing() {
        assert!(find_binary("definitely-not-a-tex-engine-1234").is_none());
    }

    #[test]
    fn test_find_binary_on_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = dir.path().join("fake-engine");
        std::fs::write(&bin, "").expect("write stub");

        let old_path = std::env::var_os("PATH").unwrap_or_default();
        let mut paths: Vec<PathBuf> = std::env::split_paths(&old_path).collect();
        paths.push(dir.path().to_path_buf());
        let joined = std::env::join_paths(paths).expect("join paths");
        unsafe { std::env::set_var("PATH", &joined) };

        let found = find_binary("fake-engine");

        unsafe { std::env::set_var("PATH", &old_path) };
        assert_eq!(found, Some(bin));
    }
}
