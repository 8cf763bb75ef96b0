//! Coverage aggregation and report formatting.

use std::fmt::Write;

use serde::Serialize;

use crate::error::Result;
use crate::model::{percent, LineSet, ScriptLines};

/// Coverage of a single script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRow {
    /// Script path.
    pub script: String,
    /// Number of coverable lines.
    pub needed: usize,
    /// Coverable lines that were never executed, ascending.
    pub missed: Vec<u32>,
    /// Executed lines that are not coverable, ascending. A non-empty list
    /// points at a stripping rule that erased a line it should not have.
    pub unrecognized: Vec<u32>,
}

impl CoverageRow {
    /// Build a row from the coverable and executed lines of one script.
    #[must_use]
    pub fn new(script: &str, coverable: &LineSet, executed: &LineSet) -> Self {
        Self {
            script: script.to_string(),
            needed: coverable.len(),
            missed: coverable.difference(executed).copied().collect(),
            unrecognized: executed.difference(coverable).copied().collect(),
        }
    }

    /// Floored percentage, `None` when the script has no coverable lines.
    #[must_use]
    pub fn percent(&self) -> Option<u32> {
        percent(self.needed, self.missed.len())
    }

    /// Missed lines as a compact range string.
    #[must_use]
    pub fn missing(&self) -> String {
        format_line_ranges(&self.missed)
    }
}

/// Per-script coverage, ordered by script path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    pub rows: Vec<CoverageRow>,
}

impl CoverageReport {
    /// One row for every script in `coverable`. Scripts without any executed
    /// line are 0% covered; executed scripts that were never analysed are
    /// not reported.
    #[must_use]
    pub fn build(coverable: &ScriptLines, executed: &ScriptLines) -> Self {
        let empty = LineSet::new();
        let rows = coverable
            .iter()
            .map(|(script, lines)| {
                CoverageRow::new(script, lines, executed.get(script).unwrap_or(&empty))
            })
            .collect();
        Self { rows }
    }

    #[must_use]
    pub fn statements(&self) -> usize {
        self.rows.iter().map(|r| r.needed).sum()
    }

    #[must_use]
    pub fn missed(&self) -> usize {
        self.rows.iter().map(|r| r.missed.len()).sum()
    }

    /// Overall floored percentage, `None` when nothing is coverable.
    #[must_use]
    pub fn percent(&self) -> Option<u32> {
        percent(self.statements(), self.missed())
    }

    /// Format using a specific formatter.
    #[must_use]
    pub fn format(&self, formatter: &dyn ReportFormatter) -> Result<String> {
        formatter.format(self)
    }
}

/// Trait for formatting coverage reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &CoverageReport) -> Result<String>;
}

fn percent_cell(percent: Option<u32>) -> String {
    percent.map_or_else(|| "n/a".to_string(), |p| format!("{p}%"))
}

/// Aligned plain-text table.
pub struct TextFormatter;

const HEADERS: [&str; 5] = ["Name", "Stmts", "Miss", "Cover", "Missing"];

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &CoverageReport) -> Result<String> {
        let cells: Vec<[String; 5]> = report
            .rows
            .iter()
            .map(|row| {
                [
                    row.script.clone(),
                    row.needed.to_string(),
                    row.missed.len().to_string(),
                    percent_cell(row.percent()),
                    row.missing(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str("---- coverage ----\n");
        push_table_row(&mut out, &HEADERS, &widths);
        for (cells, row) in cells.iter().zip(&report.rows) {
            push_table_row(&mut out, cells, &widths);
            if !row.unrecognized.is_empty() {
                let ranges = format_line_ranges(&row.unrecognized);
                writeln!(out, "**** lines reached that are not understood: {ranges}").unwrap();
            }
        }
        Ok(out)
    }
}

fn push_table_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let mut line = String::new();
    for (cell, &width) in cells.iter().zip(widths) {
        write!(line, "{:<width$}  ", cell.as_ref()).unwrap();
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

#[derive(Serialize)]
struct JsonRow<'a> {
    name: &'a str,
    statements: usize,
    missed: usize,
    percent: Option<u32>,
    missing: String,
    unrecognized: &'a [u32],
}

#[derive(Serialize)]
struct JsonTotals {
    statements: usize,
    missed: usize,
    percent: Option<u32>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    scripts: Vec<JsonRow<'a>>,
    totals: JsonTotals,
}

/// Machine-readable JSON.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &CoverageReport) -> Result<String> {
        let json = JsonReport {
            scripts: report
                .rows
                .iter()
                .map(|row| JsonRow {
                    name: &row.script,
                    statements: row.needed,
                    missed: row.missed.len(),
                    percent: row.percent(),
                    missing: row.missing(),
                    unrecognized: &row.unrecognized,
                })
                .collect(),
            totals: JsonTotals {
                statements: report.statements(),
                missed: report.missed(),
                percent: report.percent(),
            },
        };
        let mut out = serde_json::to_string_pretty(&json)?;
        out.push('\n');
        Ok(out)
    }
}

/// Coalesce sorted line numbers into `(start, end)` runs of consecutive lines.
///
/// The input must be sorted and deduplicated.
#[must_use]
pub fn coalesce_ranges(lines: &[u32]) -> Vec<(u32, u32)> {
    debug_assert!(
        lines.windows(2).all(|w| w[0] < w[1]),
        "coalesce_ranges requires sorted, deduplicated input"
    );

    let mut ranges: Vec<(u32, u32)> = Vec::new();
    for &line in lines {
        match ranges.last_mut() {
            Some((_, end)) if end.checked_add(1) == Some(line) => *end = line,
            _ => ranges.push((line, line)),
        }
    }
    ranges
}

/// Format line numbers into compact range notation, e.g. "1-3, 7, 9-11".
///
/// The input slice must be sorted in ascending order.
#[must_use]
pub fn format_line_ranges(lines: &[u32]) -> String {
    coalesce_ranges(lines)
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
