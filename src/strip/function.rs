use super::Stripper;

/// Erases function declaration syntax: `function NAME`, `function NAME()`,
/// `NAME()` and `NAME ()`, optionally followed by `{` on the same line or
/// alone on the next one. The body is left for the other stages; a
/// single-line function such as `f() { cmd; }` is kept whole.
pub struct FunctionHeader;

impl Stripper for FunctionHeader {
    fn name(&self) -> &'static str {
        "function-header"
    }

    fn strip(&self, text: &str) -> String {
        let mut lines: Vec<&str> = text.split('\n').collect();
        let mut i = 0;

        while i < lines.len() {
            if is_header(lines[i]) {
                let opens_body = lines[i].trim_end().ends_with('{');
                lines[i] = "";
                if !opens_body && lines.get(i + 1).is_some_and(|next| next.trim() == "{") {
                    lines[i + 1] = "";
                    i += 1;
                }
            }
            i += 1;
        }

        lines.join("\n")
    }
}

fn is_header(line: &str) -> bool {
    let line = line.trim();
    match line.strip_prefix("function") {
        Some(rest) if rest.starts_with([' ', '\t']) => is_keyword_header(rest.trim_start()),
        _ => is_paren_header(line),
    }
}

/// `NAME [()] [{]` after the `function` keyword.
fn is_keyword_header(rest: &str) -> bool {
    let name_len = rest.find([' ', '\t']).unwrap_or(rest.len());
    if name_len == 0 {
        return false;
    }
    let after = rest[name_len..].trim_start();
    let after = after.strip_prefix("()").map_or(after, str::trim_start);
    let after = after.strip_prefix('{').unwrap_or(after);
    after.trim().is_empty()
}

/// `NAME() [{]` or `NAME () [{]`.
fn is_paren_header(line: &str) -> bool {
    let line = line.strip_suffix('{').map_or(line, str::trim_end);
    let Some(name) = line.strip_suffix("()").map(str::trim_end) else {
        return false;
    };
    !name.is_empty() && !name.contains([' ', '\t', '='])
}
