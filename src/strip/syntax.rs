use std::sync::LazyLock;

use regex::Regex;

use super::Stripper;

/// Lines made only of keywords or punctuation that a trace never reports:
/// braces, `then`, `fi`, `do`, `done`, `in`, `esac`, a bare `;`, and `case`
/// patterns ending in `)`. Trailing blanks and semicolons are allowed, so
/// `;;` and `esac;` match too.
static PURE_SYNTAX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:[{}]|;|then|fi|do|done|in|esac|[^(\r\n\f]*\))[ \t;]*$").unwrap()
});

pub struct PureSyntax;

impl Stripper for PureSyntax {
    fn name(&self) -> &'static str {
        "pure-syntax"
    }

    fn strip(&self, text: &str) -> String {
        PURE_SYNTAX_RE.replace_all(text, "").into_owned()
    }
}
