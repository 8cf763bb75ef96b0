#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// The raw script of the stripping corpus, lines already trimmed.
pub const RAW: &str = include_str!("../fixtures/strip/raw.sh");

/// Expected output of each stage applied on its own to [`RAW`], keyed by
/// stage name.
pub const STAGE_OUTPUTS: [(&str, &str); 7] = [
    ("escaped-quotes", include_str!("../fixtures/strip/escaped_quotes.sh")),
    ("comments", include_str!("../fixtures/strip/comments.sh")),
    ("line-continuation", include_str!("../fixtures/strip/line_continuation.sh")),
    ("heredoc", include_str!("../fixtures/strip/heredoc.sh")),
    ("function-header", include_str!("../fixtures/strip/function_header.sh")),
    ("multi-line-quotes", include_str!("../fixtures/strip/multi_line_quotes.sh")),
    ("pure-syntax", include_str!("../fixtures/strip/pure_syntax.sh")),
];

/// Create a temporary directory holding `files` (name, contents).
/// The caller must hold onto `TempDir` to keep the directory alive.
pub fn setup_dir(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    for (name, contents) in files {
        write_file(&root.join(name), contents);
    }
    (dir, root)
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// One trace line in the format produced by the default PS4.
pub fn trace_line(script: &Path, line: u32, command: &str) -> String {
    format!("+PS4 + {} + 0S + L{line} + {command}\n", script.display())
}
