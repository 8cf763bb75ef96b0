//! Coverable-line computation: which lines of a script a trace can report.
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Result, ShcovError};
use crate::model::{LineSet, ScriptLines};
use crate::strip::strip_script;

/// 1-based numbers of the lines that are still non-empty after stripping.
#[must_use]
pub fn coverable_lines(source: &str) -> LineSet {
    strip_script(source)
        .split('\n')
        .zip(1u32..)
        .filter(|(line, _)| !line.trim().is_empty())
        .map(|(_, number)| number)
        .collect()
}

/// Read and analyse one script. Invalid UTF-8 is replaced rather than
/// rejected; shell scripts are byte streams.
pub fn script_lines(path: &Path) -> Result<LineSet> {
    let bytes = fs::read(path)?;
    let lines = coverable_lines(&String::from_utf8_lossy(&bytes));
    debug!("{}: {} coverable lines", path.display(), lines.len());
    Ok(lines)
}

/// Fail with [`ShcovError::NotFound`] unless `path` exists.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ShcovError::NotFound(path.to_path_buf()))
    }
}

/// Compute the coverable lines of every script, in parallel.
///
/// Scripts that cannot be read are skipped with a warning. Trace-derived
/// paths are routinely unreadable (an interactive shell reports an empty
/// source), so the caller is expected to have validated any path it requires
/// with [`ensure_exists`].
pub fn scan_scripts<'a, I>(paths: I) -> ScriptLines
where
    I: IntoIterator<Item = &'a str>,
{
    let unique: BTreeSet<&str> = paths.into_iter().collect();

    unique
        .into_par_iter()
        .filter_map(|path| match script_lines(Path::new(path)) {
            Ok(lines) => Some((path.to_string(), lines)),
            Err(e) => {
                warn!("skipping script {path:?}: {e}");
                None
            }
        })
        .collect()
}
