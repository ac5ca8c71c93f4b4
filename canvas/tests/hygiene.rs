//! Hygiene — keeps the drawing engine free of panics and swallowed errors.
//!
//! Scans production sources under `src/` (sibling `*_test.rs` files are
//! skipped) and fails when a banned pattern shows up. Budgets are zero: the
//! engine runs inside a browser tab and a panic there kills the page.

use std::fs;
use std::path::Path;

/// `(pattern, budget)`.
const BUDGETS: &[(&str, usize)] = &[
    (".unwrap()", 0),
    (".expect(", 0),
    ("panic!(", 0),
    ("unreachable!(", 0),
    ("todo!(", 0),
    ("unimplemented!(", 0),
    ("let _ =", 0),
    (".ok()", 0),
    ("#[allow(dead_code)]", 0),
];

struct SourceFile {
    path: String,
    content: String,
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn sources_are_found() {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    assert!(files.iter().any(|f| f.path.ends_with("engine.rs")), "engine.rs not scanned");
}

#[test]
fn banned_patterns_stay_within_budget() {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);

    let mut failures = Vec::new();
    for &(pattern, budget) in BUDGETS {
        let found = hits(&files, pattern);
        let total: usize = found.iter().map(|(_, c)| c).sum();
        if total > budget {
            let detail = found
                .iter()
                .map(|(path, count)| format!("  {path}: {count}"))
                .collect::<Vec<_>>()
                .join("\n");
            failures.push(format!("`{pattern}`: found {total}, max {budget}\n{detail}"));
        }
    }
    assert!(failures.is_empty(), "hygiene budget exceeded:\n{}", failures.join("\n"));
}
