//! Command handler functions for the shcov CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::debug;

use crate::cobertura::to_cobertura;
use crate::lines::{coverable_lines, ensure_exists, scan_scripts};
use crate::report::{self, CoverageReport, JsonFormatter, TextFormatter};
use crate::runner::{CannedResults, TestRun, TraceSource};
use crate::strip::strip_script;
use crate::trace::{PathFilter, TraceParser};

/// Output format for coverage reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Cobertura,
}

/// Settings shared by every command that produces a coverage report.
#[derive(Debug, Clone, Default)]
pub struct CoverageOptions {
    pub filter: PathFilter,
    /// Scripts always included in the report, traced or not.
    pub scripts: Vec<PathBuf>,
    pub format: OutputFormat,
}

/// Run test scripts and report the coverage they reach.
pub fn cmd_run(run: &TestRun, options: &CoverageOptions) -> Result<String> {
    coverage(run, options)
}

/// Report coverage from pre-captured trace output.
pub fn cmd_report(results: &[PathBuf], options: &CoverageOptions) -> Result<String> {
    let source = CannedResults {
        paths: results.to_vec(),
    };
    coverage(&source, options)
}

/// Show which lines of `script` count, or with `stripped` the text the
/// stripping stages leave behind.
pub fn cmd_lines(script: &Path, stripped: bool) -> Result<String> {
    ensure_exists(script)?;
    let bytes =
        std::fs::read(script).with_context(|| format!("Failed to read {}", script.display()))?;
    let source = String::from_utf8_lossy(&bytes);

    let mut out = String::new();
    if stripped {
        for (number, line) in strip_script(&source).split('\n').enumerate() {
            writeln!(out, "{:>6}  {}", number + 1, line).unwrap();
        }
        return Ok(out);
    }

    let lines: Vec<u32> = coverable_lines(&source).into_iter().collect();
    writeln!(
        out,
        "{}: {} coverable lines",
        script.display(),
        lines.len()
    )
    .unwrap();
    if !lines.is_empty() {
        writeln!(out, "  {}", report::format_line_ranges(&lines)).unwrap();
    }
    Ok(out)
}

/// Core coverage logic. Accepts any trace source so callers can run tests
/// live or replay captured output.
pub fn coverage(source: &dyn TraceSource, options: &CoverageOptions) -> Result<String> {
    for script in &options.scripts {
        ensure_exists(script)?;
    }

    let traces = source.traces()?;
    let executed = TraceParser::new(options.filter.clone())
        .parse_all(traces.iter().map(String::as_str));
    debug!("{} scripts seen in traces", executed.len());

    let extra: Vec<String> = options
        .scripts
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let coverable = scan_scripts(
        executed
            .keys()
            .map(String::as_str)
            .chain(extra.iter().map(String::as_str)),
    );

    let report = CoverageReport::build(&coverable, &executed);
    let output = match options.format {
        OutputFormat::Text => report.format(&TextFormatter)?,
        OutputFormat::Json => report.format(&JsonFormatter)?,
        OutputFormat::Cobertura => {
            let now = chrono::Utc::now().timestamp_millis();
            to_cobertura(&report, &coverable, now)?
        }
    };
    Ok(output)
}
