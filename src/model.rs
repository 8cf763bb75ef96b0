//! Shared representation of per-script line sets. The stripper produces the
//! coverable side, the trace parser the executed side; both use the same
//! shape so the report can diff them directly.

use std::collections::{BTreeMap, BTreeSet};

/// 1-based line numbers within one script.
pub type LineSet = BTreeSet<u32>;

/// Script path → line numbers. Used for both the coverable and the executed
/// line sets.
pub type ScriptLines = BTreeMap<String, LineSet>;

/// Integer coverage percentage, floored. `None` when nothing needs covering.
#[must_use]
pub fn percent(needed: usize, missed: usize) -> Option<u32> {
    if needed == 0 {
        return None;
    }
    let hit = needed.saturating_sub(missed) as u64;
    Some((100 * hit / needed as u64) as u32)
}

/// Add one executed line to the set for `script`, creating it on first sight.
pub fn record_line(lines: &mut ScriptLines, script: &str, line: u32) {
    match lines.get_mut(script) {
        Some(set) => {
            set.insert(line);
        }
        None => {
            lines.insert(script.to_string(), LineSet::from([line]));
        }
    }
}
