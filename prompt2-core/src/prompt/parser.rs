//! `@{token}` substitution.
//!
//! A single left-to-right scan copies text through and replaces every
//! placeholder found in the [`TokenMap`] with its formatted widget. Unknown
//! placeholders are echoed back unchanged so that a later pass can resolve
//! them; the renderer relies on this for `@{CWD}` and `@{SPC}`.

use tracing::trace;

use crate::config::WidgetTable;
use crate::error::RenderResult;

use super::buffer::PromptBuffer;
use super::format::format_widget;
use super::tokens::TokenMap;
use super::widget::is_active;

pub const TOKEN_OPEN: &str = "@{";
pub const TOKEN_CLOSE: char = '}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Copying literal text
    Outside,
    /// Saw `@`, waiting to see whether `{` follows
    SawAt,
    /// Collecting a token name up to `}`
    InToken,
}

/// Replace every known `@{token}` in `template`.
///
/// Fails with [`crate::RenderError::PromptTooLong`] as soon as the output
/// would pass the buffer limit.
pub fn parse(template: &str, tokens: &TokenMap, widgets: &WidgetTable) -> RenderResult<String> {
    let mut out = PromptBuffer::new();
    let mut state = ScanState::Outside;
    let mut name = String::new();

    for c in template.chars() {
        state = match (state, c) {
            (ScanState::Outside, '@') => ScanState::SawAt,
            (ScanState::Outside, c) => {
                out.push(c)?;
                ScanState::Outside
            }
            (ScanState::SawAt, '{') => {
                name.clear();
                ScanState::InToken
            }
            (ScanState::SawAt, '@') => {
                out.push('@')?;
                ScanState::SawAt
            }
            (ScanState::SawAt, c) => {
                out.push('@')?;
                out.push(c)?;
                ScanState::Outside
            }
            (ScanState::InToken, TOKEN_CLOSE) => {
                resolve(&mut out, &name, tokens, widgets)?;
                ScanState::Outside
            }
            (ScanState::InToken, c) => {
                name.push(c);
                ScanState::InToken
            }
        };
    }

    // Input ran out mid-placeholder: whatever was buffered is plain text
    match state {
        ScanState::Outside => {}
        ScanState::SawAt => out.push('@')?,
        ScanState::InToken => {
            out.push_str(TOKEN_OPEN)?;
            out.push_str(&name)?;
        }
    }

    Ok(out.into_string())
}

fn resolve(
    out: &mut PromptBuffer,
    name: &str,
    tokens: &TokenMap,
    widgets: &WidgetTable,
) -> RenderResult<()> {
    let token = name.to_ascii_lowercase();
    match tokens.get(&token) {
        Some(value) => {
            let active = is_active(&token, value);
            trace!(token = %token, value, active, "resolved widget");
            out.push_str(&format_widget(&token, value, active, widgets))
        }
        None => {
            out.push_str(TOKEN_OPEN)?;
            out.push_str(name)?;
            out.push(TOKEN_CLOSE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderError;
    use crate::config::WidgetConfig;

    fn tokens(pairs: &[(&str, &str)]) -> TokenMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_substitutes_known_tokens() {
        let map = tokens(&[("repo.name", "myproj"), ("repo.branch_name", "main")]);
        let out = parse(
            "<@{Repo.name}:@{REPO.BRANCH_NAME}> $ ",
            &map,
            &WidgetTable::default(),
        )
        .unwrap();
        assert_eq!(out, "<myproj:main> $ ");
    }

    #[test]
    fn test_unknown_tokens_round_trip() {
        let map = tokens(&[("repo.name", "myproj")]);
        let out = parse("@{unknown_xyz} @{CWD} @{Repo.name}", &map, &WidgetTable::default())
            .unwrap();
        assert_eq!(out, "@{unknown_xyz} @{CWD} myproj");
    }

    #[test]
    fn test_plain_text_and_stray_characters() {
        let map = TokenMap::new();
        let table = WidgetTable::default();
        assert_eq!(parse("", &map, &table).unwrap(), "");
        assert_eq!(parse("a@b } c@", &map, &table).unwrap(), "a@b } c@");
        assert_eq!(parse("mail@@{x}", &map, &table).unwrap(), "mail@@{x}");
        assert_eq!(parse("\\u@\\h", &map, &table).unwrap(), "\\u@\\h");
    }

    #[test]
    fn test_unterminated_placeholder_is_literal() {
        let map = tokens(&[("repo.name", "myproj")]);
        let out = parse("x @{Repo.name", &map, &WidgetTable::default()).unwrap();
        assert_eq!(out, "x @{Repo.name");
    }

    #[test]
    fn test_widget_formatting_applied() {
        let map = tokens(&[("repo.ahead", "3"), ("repo.behind", "0")]);
        let mut table = WidgetTable::default();
        for token in ["repo.ahead", "repo.behind"] {
            table.insert(
                token,
                WidgetConfig {
                    string_active: "+%s".to_string(),
                    string_inactive: String::new(),
                    ..WidgetConfig::default()
                },
            );
        }
        assert_eq!(parse("[@{repo.ahead}@{repo.behind}]", &map, &table).unwrap(), "[+3]");
    }

    #[test]
    fn test_too_long_output_fails() {
        let long = "x".repeat(1000);
        let map = tokens(&[("repo.name", long.as_str())]);
        let template = "@{repo.name}".repeat(100);
        let err = parse(&template, &map, &WidgetTable::default()).unwrap_err();
        assert!(matches!(err, RenderError::PromptTooLong { .. }));
    }
}
