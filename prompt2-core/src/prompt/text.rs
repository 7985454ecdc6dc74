//! String helpers shared by the formatter and the line reconciler.
//!
//! Widths are counted in `char`s. Escape sequences only count as zero width
//! when wrapped in `\[ ... \]`, the same convention bash uses for `PS1`.

use crate::error::EscapeError;

use super::parser::{TOKEN_CLOSE, TOKEN_OPEN};

const ELLIPSIS: &str = "...";

/// Expanding tokens, resolved only once the rest of a line is known.
pub const EXPANDING_TOKENS: [&str; 2] = ["cwd", "spc"];

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn dots(n: usize) -> String {
    ".".repeat(n)
}

/// Shorten a path to `max_width` by dropping characters from the front and
/// prefixing `...`, so the most local directories stay visible.
pub fn shorten_path(path: &str, max_width: usize) -> String {
    let len = char_len(path);
    if len <= max_width {
        return path.to_string();
    }
    if max_width < ELLIPSIS.len() {
        return dots(max_width);
    }

    let drop = len - max_width + ELLIPSIS.len();
    let mut out = String::with_capacity(max_width);
    out.push_str(ELLIPSIS);
    out.extend(path.chars().skip(drop));
    out
}

/// Cut `s` to `max_width` characters, the last three of which become `...`.
pub fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
    if char_len(s) <= max_width {
        return s.to_string();
    }
    if max_width < ELLIPSIS.len() {
        return dots(max_width);
    }

    let mut out: String = s.chars().take(max_width - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Turn the two-character sequence `\n` into a real line break.
pub fn replace_literal_newlines(input: &str) -> String {
    input.replace("\\n", "\n")
}

/// A string of `n` spaces.
pub fn space_filler(n: usize) -> String {
    " ".repeat(n)
}

/// Iterate over `@{name}` placeholders as `(start, end, name)` byte ranges,
/// where `end` is one past the closing brace.
fn placeholders(s: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut offset = 0;
    std::iter::from_fn(move || {
        let rest = &s[offset..];
        let start = offset + rest.find(TOKEN_OPEN)?;
        let name_start = start + TOKEN_OPEN.len();
        let close = s[name_start..].find(TOKEN_CLOSE)?;
        let end = name_start + close + 1;
        offset = end;
        Some((start, end, &s[name_start..name_start + close]))
    })
}

/// Whether `line` holds a placeholder for `name` (case-insensitive).
pub fn contains_token(line: &str, name: &str) -> bool {
    placeholders(line).any(|(_, _, token)| token.eq_ignore_ascii_case(name))
}

/// Whether `line` still holds any placeholder other than the expanding ones.
pub fn has_nonexpanding_tokens(line: &str) -> bool {
    placeholders(line).any(|(_, _, token)| {
        !EXPANDING_TOKENS
            .iter()
            .any(|expanding| token.eq_ignore_ascii_case(expanding))
    })
}

/// Number of `@{name}` placeholders (case-insensitive) in `line`.
pub fn count_token(line: &str, name: &str) -> usize {
    placeholders(line)
        .filter(|(_, _, token)| token.eq_ignore_ascii_case(name))
        .count()
}

/// Replace placeholders in a single scan. `replacement` gets each token name
/// and returns its substitute, or `None` to keep the placeholder as is.
/// Substituted text is never scanned again.
pub fn replace_tokens(line: &str, mut replacement: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(line.len());
    let mut copied = 0;
    for (start, end, token) in placeholders(line) {
        if let Some(value) = replacement(token) {
            out.push_str(&line[copied..start]);
            out.push_str(&value);
            copied = end;
        }
    }
    out.push_str(&line[copied..]);
    out
}

/// Remove every `@{name}` placeholder (case-insensitive) from `line`.
pub fn remove_widget_token(line: &str, name: &str) -> String {
    replace_tokens(line, |token| token.eq_ignore_ascii_case(name).then(String::new))
}

/// Count the characters a terminal will actually display.
///
/// Anything inside `\[ ... \]` and any unresolved `@{...}` placeholder is
/// excluded. An `@{` with no closing brace is printed as is, so it counts.
pub fn count_visible_chars(s: &str) -> usize {
    let chars: Vec<char> = s.chars().collect();
    let mut visible = 0;
    let mut in_bracket = false;
    let mut in_token = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        if !in_token && c == '\\' && next == Some('[') {
            in_bracket = true;
            i += 1;
        } else if in_bracket && c == '\\' && next == Some(']') {
            in_bracket = false;
            i += 1;
        } else if !in_bracket
            && !in_token
            && c == '@'
            && next == Some('{')
            && chars[i + 2..].contains(&TOKEN_CLOSE)
        {
            in_token = true;
            i += 1;
        } else if in_token && c == '}' {
            in_token = false;
        } else if !in_bracket && !in_token {
            visible += 1;
        }
        i += 1;
    }

    visible
}

/// Check that every `\e[`/`\033[` sequence sits inside `\[ ... \]` and is
/// closed by an `m`, and that brackets pair up without nesting.
pub fn are_escape_sequences_properly_formed(s: &str) -> Result<(), EscapeError> {
    let bytes = s.as_bytes();
    let mut in_bracket = false;
    let mut in_escape = false;
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.starts_with(b"\\[") {
            if in_bracket {
                return Err(EscapeError::NestedBracket);
            }
            in_bracket = true;
            i += 2;
        } else if rest.starts_with(b"\\]") {
            if !in_bracket {
                return Err(EscapeError::UnmatchedClose);
            }
            if in_escape {
                return Err(EscapeError::UnterminatedEscape);
            }
            in_bracket = false;
            i += 2;
        } else if let Some(marker) = escape_marker_len(rest) {
            if !in_bracket {
                return Err(EscapeError::EscapeOutsideBrackets);
            }
            if in_escape {
                return Err(EscapeError::UnterminatedEscape);
            }
            in_escape = true;
            i += marker;
        } else {
            if bytes[i] == b'm' && in_escape {
                if !in_bracket {
                    return Err(EscapeError::TerminatorOutsideBrackets);
                }
                in_escape = false;
            }
            i += 1;
        }
    }

    if in_escape {
        return Err(EscapeError::UnterminatedEscape);
    }
    if in_bracket {
        return Err(EscapeError::UnclosedBracket);
    }
    Ok(())
}

fn escape_marker_len(rest: &[u8]) -> Option<usize> {
    if rest.starts_with(b"\\033") {
        Some(4)
    } else if rest.starts_with(b"\\e") {
        Some(2)
    } else {
        None
    }
}
