use std::borrow::Cow;
use std::collections::HashMap;

use super::{Stripper, FILLER};

/// Characters that end an unquoted heredoc terminator word.
const WORD_END: &[char] = &[' ', '\t', ';', '&', '|', '<', '>', '(', ')'];

/// Erases heredocs (`<<WORD`, `<<-WORD`, `<<'WORD'`, `<<"WORD"`, `<<\WORD`).
///
/// The operator line keeps whatever precedes `<<` followed by [`FILLER`];
/// the body and the terminator line are blanked. Only a later line that
/// consists solely of the terminator closes the heredoc. Several operators
/// on one line are blanked through the last terminator. A heredoc with no
/// terminator line is left untouched, and so is `<<` inside `((` arithmetic.
pub struct Heredoc;

impl Stripper for Heredoc {
    fn name(&self) -> &'static str {
        "heredoc"
    }

    fn strip(&self, text: &str) -> String {
        let source: Vec<&str> = text.split('\n').collect();

        // Trimmed line content → ascending line indices, for terminator lookup.
        let mut by_content: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, line) in source.iter().enumerate() {
            by_content.entry(line.trim()).or_default().push(idx);
        }
        let closing_line = |word: &str, after: usize| -> Option<usize> {
            let indices = by_content.get(word)?;
            let pos = indices.partition_point(|&idx| idx <= after);
            indices.get(pos).copied()
        };

        let mut out: Vec<Cow<'_, str>> = source.iter().map(|&l| Cow::Borrowed(l)).collect();
        let mut i = 0;
        while i < source.len() {
            let line = source[i];

            // Several heredocs on one line have their bodies one after the
            // other, each closing after the previous terminator.
            let mut first = None;
            let mut end = i;
            for at in operators(line) {
                let Some(close) = terminator(line, at).and_then(|word| closing_line(word, end))
                else {
                    continue;
                };
                first.get_or_insert(at);
                end = close;
            }

            match first {
                Some(at) => {
                    out[i] = Cow::Owned(format!("{}{FILLER}", &line[..at]));
                    for blanked in &mut out[i + 1..=end] {
                        *blanked = Cow::Borrowed("");
                    }
                    i = end + 1;
                }
                None => i += 1,
            }
        }

        out.join("\n")
    }
}

/// Byte offsets of every `<<` in `line` that starts a heredoc: not part of
/// a `<<<` here-string and not a shift inside an open `((` arithmetic
/// expression.
fn operators(line: &str) -> impl Iterator<Item = usize> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || loop {
        let at = pos + line.get(pos..)?.find("<<")?;
        let here_string = line[at + 2..].starts_with('<');
        pos = if here_string { at + 3 } else { at + 2 };
        if !here_string && !in_arithmetic(&line[..at]) {
            return Some(at);
        }
    })
}

/// Whether `prefix` leaves an `((` (or `$((`) unclosed.
fn in_arithmetic(prefix: &str) -> bool {
    prefix.matches("((").count() > prefix.matches("))").count()
}

/// The terminator word of the `<<` operator at byte offset `at`.
fn terminator(line: &str, at: usize) -> Option<&str> {
    let rest = &line[at + 2..];
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    let rest = rest.trim_start_matches([' ', '\t']);

    let word = match rest.chars().next()? {
        quote @ ('\'' | '"') => {
            let inner = &rest[1..];
            &inner[..inner.find(quote)?]
        }
        _ => {
            let rest = rest.strip_prefix('\\').unwrap_or(rest);
            &rest[..rest.find(WORD_END).unwrap_or(rest.len())]
        }
    };

    (!word.is_empty()).then_some(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminator_forms() {
        assert_eq!(terminator("cat <<EOF", 4), Some("EOF"));
        assert_eq!(terminator("cat <<- EOF", 4), Some("EOF"));
        assert_eq!(terminator("cat <<'END MARK'", 4), Some("END MARK"));
        assert_eq!(terminator("cat <<\"EOF\" > out", 4), Some("EOF"));
        assert_eq!(terminator("cat <<\\EOF", 4), Some("EOF"));
        assert_eq!(terminator("cat <<EOF>out", 4), Some("EOF"));
        assert_eq!(terminator("cat <<", 4), None);
        assert_eq!(terminator("cat <<'EOF", 4), None);
    }

    #[test]
    fn test_operators_skip_here_strings() {
        let found: Vec<_> = operators("a <<< b << c <<d").collect();
        assert_eq!(found, vec![8, 13]);
    }

    #[test]
    fn test_basic_heredoc() {
        let text = "cat <<EOF\nbody\nEOF\necho after";
        assert_eq!(Heredoc.strip(text), format!("cat {FILLER}\n\n\necho after"));
    }

    #[test]
    fn test_redirection_after_terminator() {
        let text = "cat <<EOF > out.txt\nbody\nEOF";
        assert_eq!(Heredoc.strip(text), format!("cat {FILLER}\n\n"));
    }

    #[test]
    fn test_terminator_inside_body_does_not_close() {
        let text = "cat <<- EOF\nEOF hello\nhello EOF\nEOF\nnext";
        assert_eq!(Heredoc.strip(text), format!("cat {FILLER}\n\n\n\nnext"));
    }

    #[test]
    fn test_similar_word_does_not_close() {
        let text = "cat <<'EOF'\nEOFI\nEOF";
        assert_eq!(Heredoc.strip(text), format!("cat {FILLER}\n\n"));
    }

    #[test]
    fn test_unrelated_terminator_elsewhere() {
        let text = "cat <<A\nB\nA\ncat <<B\nA\nB";
        assert_eq!(
            Heredoc.strip(text),
            format!("cat {FILLER}\n\n\ncat {FILLER}\n\n")
        );
    }

    #[test]
    fn test_unterminated_heredoc_passes_through() {
        let text = "cat <<EOF\nbody\nmore";
        assert_eq!(Heredoc.strip(text), text);
    }

    #[test]
    fn test_arithmetic_shift_passes_through() {
        let text = "x=$((1 << 2))\necho $x";
        assert_eq!(Heredoc.strip(text), text);
    }

    #[test]
    fn test_operators_skip_arithmetic_shift() {
        assert_eq!(operators("x=$(( 1 << n ))").count(), 0);
        assert_eq!(operators("(( x << 2 ))").count(), 0);
        let found: Vec<_> = operators("(( x )); cat <<EOF").collect();
        assert_eq!(found, vec![13]);
    }

    #[test]
    fn test_arithmetic_shift_with_matching_later_line() {
        let text = "bits=$(( 1 << shift ))\necho \"$bits\"\nshift\necho after";
        assert_eq!(Heredoc.strip(text), text);

        let text = "(( x << n ))\necho $x\nn";
        assert_eq!(Heredoc.strip(text), text);
    }

    #[test]
    fn test_two_heredocs_on_one_line() {
        let text = "cat <<A; cat <<B\nbody a\nA\nbody b\nB\necho z";
        assert_eq!(Heredoc.strip(text), format!("cat {FILLER}\n\n\n\n\necho z"));
    }

    #[test]
    fn test_second_heredoc_closes_after_first() {
        // `B` on line 2 is inside the first body, so the second heredoc
        // closes on line 5.
        let text = "cat <<A; cat <<B\nB\nA\nbody\nB\nnext";
        assert_eq!(Heredoc.strip(text), format!("cat {FILLER}\n\n\n\n\nnext"));
    }

    #[test]
    fn test_unterminated_second_heredoc_ignored() {
        let text = "cat <<A <<NEVER\nbody\nA\nnext";
        assert_eq!(Heredoc.strip(text), format!("cat {FILLER}\n\n\nnext"));
    }

    #[test]
    fn test_here_string_untouched() {
        let text = "read a <<< word\nword";
        assert_eq!(Heredoc.strip(text), text);
    }

    #[test]
    fn test_terminator_before_operator_ignored() {
        let text = "EOF\ncat <<EOF\nx\nEOF";
        assert_eq!(Heredoc.strip(text), format!("EOF\ncat {FILLER}\n\n"));
    }

    #[test]
    fn test_idempotent() {
        let text = "cat <<EOF\nbody\nEOF\ncat <<X\nnever";
        let once = Heredoc.strip(text);
        assert_eq!(Heredoc.strip(&once), once);
    }
}
