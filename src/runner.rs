//! Where trace text comes from: pre-captured result files, or test scripts
//! run under a tracing shell.
//!
//! Also provides a [`TraceSource`] trait so the CLI can treat both the same
//! way.
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::ShcovError;
use crate::lines::ensure_exists;

/// Trace prompt understood by [`crate::trace::TraceParser`].
pub const DEFAULT_PS4: &str = "+PS4 + ${BASH_SOURCE} + ${SECONDS}S + L${LINENO} + ";

/// Shell used to run test scripts when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/sh -x";

/// File names picked up when searching a directory for tests.
static TEST_SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^test_.*\.(sh|bash|ksh)$").unwrap());

// ---------------------------------------------------------------------------
// Trace sources
// ---------------------------------------------------------------------------

/// A source of trace text. Each returned string is one complete trace blob.
pub trait TraceSource {
    /// Produce the trace blobs.
    fn traces(&self) -> Result<Vec<String>>;
}

/// Pre-captured trace output. `-` reads a single blob from stdin.
pub struct CannedResults {
    pub paths: Vec<PathBuf>,
}

impl TraceSource for CannedResults {
    fn traces(&self) -> Result<Vec<String>> {
        for path in self.paths.iter().filter(|p| !is_stdin(p)) {
            ensure_exists(path)?;
        }

        self.paths
            .iter()
            .map(|path| {
                if is_stdin(path) {
                    std::io::read_to_string(std::io::stdin())
                        .context("Failed to read trace from stdin")
                } else {
                    let bytes = std::fs::read(path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    Ok(String::from_utf8_lossy(&bytes).into_owned())
                }
            })
            .collect()
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Run test scripts under a tracing shell and capture their output.
pub struct TestRun {
    /// Test scripts, or directories to search for them.
    pub test_paths: Vec<PathBuf>,
    pub shell: ShellCommand,
    /// Value of `PS4` in the child environment.
    pub ps4: String,
}

impl TraceSource for TestRun {
    fn traces(&self) -> Result<Vec<String>> {
        let scripts = discover_test_scripts(&self.test_paths)?;
        if scripts.is_empty() {
            warn!("no test scripts found");
        }
        scripts.iter().map(|script| self.run_script(script)).collect()
    }
}

impl TestRun {
    /// Run one script. A failing script still produces a trace; its exit
    /// status is only logged.
    pub fn run_script(&self, script: &Path) -> Result<String> {
        info!("running {}", script.display());
        let output = Command::new(&self.shell.program)
            .args(&self.shell.args)
            .arg(script)
            .env("PS4", &self.ps4)
            .output()
            .with_context(|| format!("Failed to run {} {}", self.shell, script.display()))?;

        if !output.status.success() {
            warn!("{} exited with {}", script.display(), output.status);
        }

        let mut trace = String::from_utf8_lossy(&output.stderr).into_owned();
        if !trace.is_empty() && !trace.ends_with('\n') {
            trace.push('\n');
        }
        trace.push_str(&String::from_utf8_lossy(&output.stdout));
        Ok(trace)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A shell program and the arguments that enable tracing, e.g. `bash -x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ShellCommand {
    fn default() -> Self {
        Self {
            program: "/bin/sh".to_string(),
            args: vec!["-x".to_string()],
        }
    }
}

impl FromStr for ShellCommand {
    type Err = ShcovError;

    /// Split with shell quoting rules.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = |reason: String| ShcovError::InvalidShell {
            command: s.to_string(),
            reason,
        };
        let mut words = shell_words::split(s).map_err(|e| invalid(e.to_string()))?;
        if words.is_empty() {
            return Err(invalid("empty command".to_string()));
        }
        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
        })
    }
}

impl std::fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let words = std::iter::once(&self.program).chain(&self.args);
        f.write_str(&shell_words::join(words))
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

fn is_test_script(path: &Path) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| TEST_SCRIPT_RE.is_match(name))
}

/// Expand `paths` into test scripts. Files are taken as given; directories
/// are searched recursively for `test_*.sh`, `test_*.bash` and `test_*.ksh`.
/// Every path must exist.
pub fn discover_test_scripts(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    for path in paths {
        ensure_exists(path)?;
    }

    let mut scripts = Vec::new();
    for path in paths {
        if !path.is_dir() {
            scripts.push(path.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_test_script(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        found.sort();
        debug!("{}: {} test scripts", path.display(), found.len());
        scripts.extend(found);
    }
    Ok(scripts)
}
