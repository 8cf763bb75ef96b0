//! Quote handling: escaped quote marks and quoted strings that span lines.
use std::sync::LazyLock;

use regex::Regex;

use super::{Stripper, FILLER};

static ESCAPED_QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\['"]"#).unwrap());

/// Removes `\'` and `\"` so later stages never see them as delimiters.
///
/// Erasing a pair can expose a new one (`\\''` becomes `\'`), so the
/// erase repeats until nothing is left to remove.
pub struct EscapedQuotes;

impl Stripper for EscapedQuotes {
    fn name(&self) -> &'static str {
        "escaped-quotes"
    }

    fn strip(&self, text: &str) -> String {
        let mut text = text.to_string();
        while ESCAPED_QUOTE_RE.is_match(&text) {
            text = ESCAPED_QUOTE_RE.replace_all(&text, "").into_owned();
        }
        text
    }
}

/// Collapses a quoted string spanning several lines.
///
/// Shell traces report such a statement on the line where the quote
/// *closes*, so every line of the span but the last is blanked and the last
/// one starts with [`FILLER`]. Text after the closing quote is kept.
/// Strings on a single line are left alone.
///
/// A span starts at the beginning of the opening line, or right after the
/// previous quoted string closed on that same line.
pub struct MultiLineQuotes;

impl Stripper for MultiLineQuotes {
    fn name(&self) -> &'static str {
        "multi-line-quotes"
    }

    fn strip(&self, text: &str) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut segment = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    segment = i + 1;
                    i += 1;
                }
                b'\\' if is_quote(bytes.get(i + 1)) => i += 2,
                quote @ (b'"' | b'\'') => match closing_quote(bytes, i + 1, quote) {
                    Some(close) => {
                        let newlines = text[segment..close].matches('\n').count();
                        if newlines > 0 {
                            out.push_str(&text[copied..segment]);
                            out.push_str(&"\n".repeat(newlines));
                            out.push_str(FILLER);
                            copied = close + 1;
                        }
                        segment = close + 1;
                        i = close + 1;
                    }
                    // Unterminated: treat this mark as plain text and carry on.
                    None => i += 1,
                },
                _ => i += 1,
            }
        }

        out.push_str(&text[copied..]);
        out
    }
}

fn is_quote(b: Option<&u8>) -> bool {
    matches!(b, Some(b'"' | b'\''))
}

/// Index of the first unescaped `quote` at or after `from`.
fn closing_quote(bytes: &[u8], from: usize, quote: u8) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        if bytes[j] == b'\\' && is_quote(bytes.get(j + 1)) {
            j += 2;
            continue;
        }
        if bytes[j] == quote {
            return Some(j);
        }
        j += 1;
    }
    None
}
