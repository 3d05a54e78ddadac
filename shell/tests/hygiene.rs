//! Hygiene: source-level budgets for the shell crate.
//!
//! Scans `shell/src/` (sidecar `_test.rs` files excluded) for patterns that
//! either crash the page or silently drop an error. Every budget is zero and
//! must stay there.

use std::fs;
use std::path::{Path, PathBuf};

/// `(pattern, budget, why it is banned)`.
const BUDGETS: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "panics on None/Err"),
    (".expect(", 0, "panics on None/Err"),
    ("panic!(", 0, "aborts the page"),
    ("unreachable!(", 0, "aborts the page"),
    ("todo!(", 0, "unfinished code"),
    ("unimplemented!(", 0, "unfinished code"),
    ("let _ =", 0, "discards a value without inspecting it"),
    (".ok()", 0, "discards an error"),
    ("#[allow(dead_code)]", 0, "hides unused code"),
];

fn source_files() -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    files
}

fn collect(dir: &Path, out: &mut Vec<(PathBuf, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let is_source = path.extension().is_some_and(|ext| ext == "rs");
        let is_test = path.to_string_lossy().ends_with("_test.rs");
        if is_source && !is_test {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((path, content));
            }
        }
    }
}

fn hits(files: &[(PathBuf, String)], pattern: &str) -> Vec<String> {
    files
        .iter()
        .flat_map(|(path, content)| {
            content
                .lines()
                .enumerate()
                .filter(|(_, line)| line.contains(pattern))
                .map(move |(n, line)| format!("  {}:{}: {}", path.display(), n + 1, line.trim()))
        })
        .collect()
}

#[test]
fn source_tree_is_scanned() {
    let files = source_files();
    assert!(
        files.iter().any(|(path, _)| path.ends_with("lib.rs")),
        "hygiene scan found no lib.rs; run from the shell package root"
    );
}

#[test]
fn pattern_budgets_hold() {
    let files = source_files();
    let mut report = Vec::new();
    for &(pattern, budget, why) in BUDGETS {
        let found = hits(&files, pattern);
        if found.len() > budget {
            report.push(format!("{pattern} ({why}): found {}, max {budget}\n{}", found.len(), found.join("\n")));
        }
    }
    assert!(report.is_empty(), "hygiene budgets exceeded:\n{}", report.join("\n"));
}
