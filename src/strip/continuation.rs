use super::{Stripper, FILLER};

/// Folds backslash-continued statements onto their first physical line.
///
/// A run of continued lines plus the line that ends it becomes [`FILLER`] on
/// the first line and blanks on the rest, since a trace attributes the whole
/// statement to where it starts. A run made only of bare backslashes and
/// followed by a blank line or a comment carries no statement and is blanked
/// entirely.
///
/// Not idempotent: the filler line no longer continues, but the stage is
/// meant to run once per pipeline pass.
pub struct LineContinuation;

impl Stripper for LineContinuation {
    fn name(&self) -> &'static str {
        "line-continuation"
    }

    fn strip(&self, text: &str) -> String {
        let mut lines: Vec<&str> = text.split('\n').collect();
        let mut i = 0;

        while i < lines.len() {
            if continued(lines[i]).is_none() {
                i += 1;
                continue;
            }

            let mut end = i;
            let mut has_content = false;
            while let Some(body) = lines.get(end).copied().and_then(continued) {
                has_content |= !body.trim().is_empty();
                end += 1;
            }

            let ends_empty = lines.get(end).map_or(true, |last| {
                let last = last.trim();
                last.is_empty() || last.starts_with('#')
            });

            if !has_content && ends_empty {
                lines[i..end].fill("");
                i = end;
                continue;
            }

            lines[i] = FILLER;
            lines[i + 1..end].fill("");
            if let Some(last) = lines.get_mut(end) {
                *last = "";
            }
            i = end + 1;
        }

        lines.join("\n")
    }
}

/// If `line` ends in an unescaped backslash, return what precedes it.
///
/// Trailing blanks and a trailing `#token` are ignored so that the stage
/// also works on text whose comments have not been erased yet.
fn continued(line: &str) -> Option<&str> {
    let mut s = line.trim_end_matches([' ', '\t']);
    if !s.ends_with('\\') {
        let token = s.rfind([' ', '\t']).map_or(0, |i| i + 1);
        if let Some(hash) = s[token..].find('#') {
            s = s[..token + hash].trim_end_matches([' ', '\t']);
        }
    }

    let body = s.trim_end_matches('\\');
    let backslashes = s.len() - body.len();
    if backslashes % 2 == 1 {
        Some(&s[..s.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continued() {
        assert_eq!(continued("echo a \\"), Some("echo a "));
        assert_eq!(continued("\\"), Some(""));
        assert_eq!(continued("\\ #test"), Some(""));
        assert_eq!(continued("echo \\\\"), None);
        assert_eq!(continued("echo \\\\\\"), Some("echo \\\\"));
        assert_eq!(continued("echo a"), None);
        assert_eq!(continued(""), None);
    }

    #[test]
    fn test_fold_onto_first_line() {
        let text = "echo hello \\\ntest \\\nboo\nnext";
        assert_eq!(
            LineContinuation.strip(text),
            format!("{FILLER}\n\n\nnext")
        );
    }

    #[test]
    fn test_trailing_bare_backslashes_fold_into_run() {
        let text = "echo a \\\n\\\n\\\n\nnext";
        assert_eq!(
            LineContinuation.strip(text),
            format!("{FILLER}\n\n\n\nnext")
        );
    }

    #[test]
    fn test_bare_backslash_run_before_blank_is_removed() {
        let text = "echo a\n\\\n\\\n\necho b";
        assert_eq!(LineContinuation.strip(text), "echo a\n\n\n\necho b");
    }

    #[test]
    fn test_bare_backslash_run_before_comment_is_removed() {
        let text = "\\\n# note";
        assert_eq!(LineContinuation.strip(text), "\n# note");
    }

    #[test]
    fn test_bare_backslash_then_command_counts() {
        let text = "\\\necho a";
        assert_eq!(LineContinuation.strip(text), format!("{FILLER}\n"));
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let text = "echo hello \\\\\nnext";
        assert_eq!(LineContinuation.strip(text), text);
    }

    #[test]
    fn test_continuation_at_end_of_text() {
        let text = "echo a \\";
        assert_eq!(LineContinuation.strip(text), FILLER);
    }

    #[test]
    fn test_line_count_preserved() {
        let text = "a \\\n\\\nb\n\\\n\nc \\";
        let out = LineContinuation.strip(text);
        assert_eq!(out.matches('\n').count(), text.matches('\n').count());
    }
}
