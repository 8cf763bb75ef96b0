//! Parsing of shell `set -x` output produced with the shcov trace prompt.
//!
//! With `PS4` set to [`crate::runner::DEFAULT_PS4`] every traced statement
//! is printed as
//!
//! ```text
//! +PS4 + /path/to/script.sh + 3S + L42 + echo hello
//! ```
//!
//! with one leading `+` per nesting level. Anything else in the stream
//! (program output, shell diagnostics) is ignored.
use std::str::FromStr;

use tracing::debug;

use crate::error::{Result, ShcovError};
use crate::model::{record_line, ScriptLines};

/// Literal that follows the leading `+` characters of a trace line.
pub const MARKER: &str = "PS4 + ";

/// Separator between the fields of a trace line.
pub const DELIMITER: &str = " + ";

const FIELD_COUNT: usize = 5;

/// One parsed trace line. Borrowed from the trace text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord<'a> {
    pub script: &'a str,
    pub elapsed: &'a str,
    pub line: u32,
    pub command: &'a str,
}

/// Why a line of trace output was not a trace record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceMismatch {
    /// No leading `+` followed by the marker.
    NotTrace,
    /// The marker was present but the line did not split into five fields.
    FieldCount(usize),
    /// The line token was not `L` followed by a positive integer.
    LineNumber,
}

/// Split one line of trace output into its fields.
pub fn parse_trace_line(line: &str) -> std::result::Result<TraceRecord<'_>, TraceMismatch> {
    let unnested = line.trim_start_matches('+');
    if unnested.len() == line.len() || !unnested.starts_with(MARKER) {
        return Err(TraceMismatch::NotTrace);
    }

    let fields: Vec<&str> = unnested.splitn(FIELD_COUNT, DELIMITER).collect();
    let [_, script, elapsed, token, command] = fields[..] else {
        return Err(TraceMismatch::FieldCount(fields.len()));
    };

    let digits = token.strip_prefix('L').unwrap_or(token);
    let line = match digits.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => return Err(TraceMismatch::LineNumber),
    };

    Ok(TraceRecord {
        script,
        elapsed,
        line,
        command,
    })
}

/// A literal `search:replacement` substitution applied to script paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    pub search: String,
    pub replacement: String,
}

impl FromStr for PathRewrite {
    type Err = ShcovError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((search, replacement)) if !search.is_empty() => Ok(PathRewrite {
                search: search.to_string(),
                replacement: replacement.to_string(),
            }),
            _ => Err(ShcovError::InvalidRewrite(s.to_string())),
        }
    }
}

/// Which script paths are kept, and how they are renamed.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    /// Keep only paths containing one of these. Empty keeps everything.
    pub only: Vec<String>,
    /// Drop paths containing any of these.
    pub ignore: Vec<String>,
    /// Applied in order, each to the result of the previous one.
    pub rewrites: Vec<PathRewrite>,
}

impl PathFilter {
    /// The path to record for `script`, or `None` if it is filtered out.
    #[must_use]
    pub fn apply(&self, script: &str) -> Option<String> {
        if !self.only.is_empty() && !self.only.iter().any(|p| script.contains(p.as_str())) {
            debug!("{script:?} not in allowed paths");
            return None;
        }
        if let Some(pattern) = self.ignore.iter().find(|p| script.contains(p.as_str())) {
            debug!("{script:?} ignored by {pattern:?}");
            return None;
        }

        Some(
            self.rewrites
                .iter()
                .fold(script.to_string(), |path, rw| {
                    path.replace(&rw.search, &rw.replacement)
                }),
        )
    }
}

/// Turns trace text into executed line sets.
#[derive(Debug, Clone, Default)]
pub struct TraceParser {
    filter: PathFilter,
}

impl TraceParser {
    #[must_use]
    pub fn new(filter: PathFilter) -> Self {
        Self { filter }
    }

    /// Fold every trace record in `trace` into `executed`.
    pub fn parse_into(&self, trace: &str, executed: &mut ScriptLines) {
        for line in trace.lines() {
            match parse_trace_line(line) {
                Ok(record) => {
                    if let Some(script) = self.filter.apply(record.script) {
                        record_line(executed, &script, record.line);
                    }
                }
                Err(TraceMismatch::NotTrace) => {}
                Err(mismatch) => debug!("dropping trace line ({mismatch:?}): {line:?}"),
            }
        }
    }

    /// Executed lines of a single trace blob.
    #[must_use]
    pub fn parse(&self, trace: &str) -> ScriptLines {
        let mut executed = ScriptLines::new();
        self.parse_into(trace, &mut executed);
        executed
    }

    /// Executed lines across several trace blobs.
    pub fn parse_all<'a, I>(&self, traces: I) -> ScriptLines
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut executed = ScriptLines::new();
        for trace in traces {
            self.parse_into(trace, &mut executed);
        }
        executed
    }
}
