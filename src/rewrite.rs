//! LaTeX preamble rewriting.
//!
//! Regex substitutions over the document snapshot, applied in a fixed order:
//! replace the document class, insert missing font lines before
//! `\begin{document}`, remove conflicting legacy packages, and optionally
//! strip font-selection commands. Each rule that finds nothing to match
//! leaves the text alone; a rewrite that changes nothing returns `None`.
//!
//! The matching is deliberately shallow (single-level braces, one package
//! per `\usepackage`) and the tests pin that behavior down.

use std::sync::LazyLock;

use regex::Regex;

use crate::profile::PreambleProfile;

static DOCUMENT_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\documentclass(\[[^\]]*\])?\{[^}]*\}").expect("static regex")
});

static FONT_COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\(setCJKmainfont|setCJKsansfont|setCJKmonofont|setmainjfont|setsansjfont)(\[[^\]]*\])?\{[^}]*\}\r?\n?",
    )
    .expect("static regex")
});

const BEGIN_DOCUMENT: &str = "\\begin{document}";

/// Rewrite a document's preamble to match a profile.
///
/// Pure: the caller decides whether and how to persist the result. Returns
/// `None` when the text already matches the profile, which also makes the
/// rewrite idempotent.
pub fn rewrite_preamble(text: &str, profile: &PreambleProfile) -> Option<String> {
    let mut out = replace_document_class(text, profile);
    out = ensure_font_packages(out, profile);
    out = remove_conflicting_packages(out, profile);
    if profile.strip_font_commands {
        out = strip_font_commands(out);
    }

    if out == text { None } else { Some(out) }
}

/// Rule 1: replace the first `\documentclass[...]{...}`, options and all.
fn replace_document_class(text: &str, profile: &PreambleProfile) -> String {
    DOCUMENT_CLASS_RE
        .replace(text, regex::NoExpand(&profile.document_class_line()))
        .into_owned()
}

/// Rule 2: insert the profile's font lines immediately before
/// `\begin{document}` when the guard package is absent.
fn ensure_font_packages(text: String, profile: &PreambleProfile) -> String {
    if profile.font_packages.is_empty() {
        return text;
    }

    let present = match profile.font_guard_package.as_deref() {
        Some(guard) => has_package(&text, guard),
        None => profile
            .font_packages
            .first()
            .is_some_and(|line| text.contains(line.as_str())),
    };
    if present {
        return text;
    }

    let Some(pos) = text.find(BEGIN_DOCUMENT) else {
        // No document body; nothing to anchor the insertion to.
        return text;
    };

    let mut out = String::with_capacity(text.len() + 128);
    out.push_str(&text[..pos]);
    for line in &profile.font_packages {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&text[pos..]);
    out
}

/// Rule 3: drop every `\usepackage[...]{pkg}` line for each conflicting
/// package, regardless of its option list.
fn remove_conflicting_packages(text: String, profile: &PreambleProfile) -> String {
    let mut out = text;
    for package in &profile.conflicting_packages {
        let pattern = format!(
            r"\\usepackage(\[[^\]]*\])?\{{{}\}}\r?\n?",
            regex::escape(package)
        );
        // The pattern is built from an escaped package name; a compile
        // failure means no match, which degrades to "no change needed".
        if let Ok(re) = Regex::new(&pattern) {
            out = re.replace_all(&out, "").into_owned();
        }
    }
    out
}

/// Rule 4: strip font-selection commands left behind by removed packages.
fn strip_font_commands(text: String) -> String {
    FONT_COMMAND_RE.replace_all(&text, "").into_owned()
}

/// True if `\usepackage[...]{name}` appears anywhere in the text.
fn has_package(text: &str, name: &str) -> bool {
    let pattern = format!(r"\\usepackage(\[[^\]]*\])?\{{{}\}}", regex::escape(name));
    Regex::new(&pattern).map(|re| re.is_match(text)).unwrap_or(false)
}
