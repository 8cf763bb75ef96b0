use std::sync::LazyLock;

use regex::Regex;

use super::Stripper;

/// A `#` at the start of a line, or one not directly preceded by a quote,
/// backslash, `{` or `$`, starts a comment running to the end of the line.
/// The exceptions keep `${#arr[@]}`, `$#`, `\#` and `"#"` intact.
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"(?m)(^|[^"'\\{$\n])#.*"##).unwrap());

/// Erases comments. A `#` inside a quoted string that does not meet one of
/// the exceptions is still treated as a comment.
pub struct Comments;

impl Stripper for Comments {
    fn name(&self) -> &'static str {
        "comments"
    }

    fn strip(&self, text: &str) -> String {
        COMMENT_RE.replace_all(text, "${1}").into_owned()
    }
}
