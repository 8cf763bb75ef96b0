//! Lexical normalisation of shell scripts.
//!
//! A script is reduced to the lines that represent executable statements by
//! running a fixed chain of text-to-text stages. Every stage:
//!   * assumes each line has already been trimmed,
//!   * keeps the number of lines unchanged (erasing blanks a line, it never
//!     removes the newline),
//!   * is total: unterminated constructs are left as they are.
//!
//! The order of [`PIPELINE`] matters. Later stages rely on constructs that
//! earlier stages have already erased.

pub mod comments;
pub mod continuation;
pub mod function;
pub mod heredoc;
pub mod quotes;
pub mod syntax;

pub use comments::Comments;
pub use continuation::LineContinuation;
pub use function::FunctionHeader;
pub use heredoc::Heredoc;
pub use quotes::{EscapedQuotes, MultiLineQuotes};
pub use syntax::PureSyntax;

/// Placeholder left on a line that still represents one executable
/// statement after a multi-line construct has been collapsed.
pub const FILLER: &str = "@@filler@@";

/// Every stripping stage implements this trait.
pub trait Stripper {
    /// Short stage name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Transform the text. Must preserve the number of lines.
    fn strip(&self, text: &str) -> String;
}

/// The stages, in the order they must run.
pub const PIPELINE: [&dyn Stripper; 7] = [
    &EscapedQuotes,
    &Comments,
    &LineContinuation,
    &Heredoc,
    &FunctionHeader,
    &MultiLineQuotes,
    &PureSyntax,
];

/// Trim leading and trailing whitespace from every line.
#[must_use]
pub fn trim_lines(source: &str) -> String {
    source.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

/// Trim the script and run it through every stage of [`PIPELINE`].
#[must_use]
pub fn strip_script(source: &str) -> String {
    PIPELINE
        .iter()
        .fold(trim_lines(source), |text, stage| {
            let stripped = stage.strip(&text);
            debug_assert_eq!(
                text.matches('\n').count(),
                stripped.matches('\n').count(),
                "stage {} changed the line count",
                stage.name()
            );
            stripped
        })
}
