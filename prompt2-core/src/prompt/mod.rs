//! Prompt rendering.
//!
//! Rendering is a two-phase protocol over an owned [`TokenMap`]:
//!
//! 1. every static widget in the template is resolved in one pass, leaving
//!    `@{CWD}` and `@{SPC}` (and any unknown placeholder) untouched;
//! 2. each line is then reconciled against the terminal width, which is
//!    when the working directory is shortened and the filler sized.
//!
//! ```
//! use prompt2_core::config::WidgetTable;
//! use prompt2_core::prompt::{TokenMap, render};
//!
//! let tokens: TokenMap = [("repo.name", "myproj"), ("cwd", "~/code/myproj")]
//!     .into_iter()
//!     .collect();
//! let out = render("<@{Repo.name}> @{CWD} $ ", &tokens, &WidgetTable::default(), 80).unwrap();
//! assert_eq!(out, "<myproj> ~/code/myproj $ ");
//! ```

mod buffer;
mod format;
mod lines;
mod parser;
pub mod text;
mod tokens;
mod widget;

use tracing::{debug, warn};

use crate::config::WidgetTable;
use crate::error::{RenderError, RenderResult};

pub use buffer::{PROMPT_MAX_LEN, PROMPT_TOO_LONG, PromptBuffer};
pub use format::{apply_format, decoration_width, format_widget};
pub use lines::reconcile_lines;
pub use parser::{TOKEN_CLOSE, TOKEN_OPEN, parse};
pub use text::{are_escape_sequences_properly_formed, count_visible_chars, shorten_path};
pub use tokens::TokenMap;
pub use widget::{TOKEN_MINUTES_WARNING, WidgetKind, is_active};

/// Render `template` for a terminal `width` columns wide.
///
/// The `cwd` entry of `tokens`, if any, is the working directory to fit;
/// `spc` is always computed here. The template is validated before anything
/// is substituted.
pub fn render(
    template: &str,
    tokens: &TokenMap,
    widgets: &WidgetTable,
    width: usize,
) -> RenderResult<String> {
    are_escape_sequences_properly_formed(template)?;
    let template = text::replace_literal_newlines(template);

    let mut tokens = tokens.clone();
    let cwd = tokens.remove("cwd");
    tokens.remove("spc");

    let resolved = parse(&template, &tokens, widgets)?;
    debug!(
        width,
        lines = resolved.lines().count(),
        "static widgets resolved"
    );
    reconcile_lines(&resolved, &mut tokens, widgets, cwd.as_deref(), width)
}

/// [`render`], substituting [`PROMPT_TOO_LONG`] when the output overflows.
///
/// Malformed templates are still reported as errors.
pub fn render_or_fallback(
    template: &str,
    tokens: &TokenMap,
    widgets: &WidgetTable,
    width: usize,
) -> RenderResult<String> {
    match render(template, tokens, widgets, width) {
        Err(RenderError::PromptTooLong { limit }) => {
            warn!(limit, "prompt too long, using fallback");
            Ok(PROMPT_TOO_LONG.to_string())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use crate::error::EscapeError;

    fn tokens(pairs: &[(&str, &str)]) -> TokenMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_render_end_to_end() {
        let map = tokens(&[("repo.name", "myproj"), ("cwd", "~/code/myproj")]);
        let out = render("<@{Repo.name}> @{CWD} $ ", &map, &WidgetTable::default(), 80).unwrap();
        assert_eq!(out, "<myproj> ~/code/myproj $ ");
    }

    #[test]
    fn test_render_multiline_with_filler() {
        let map = tokens(&[
            ("repo.name", "p"),
            ("repo.branch_name", "main"),
            ("cwd", "~/p"),
        ]);
        let out = render(
            "@{CWD}@{SPC}[@{repo.branch_name}]\\n@{repo.name} $ ",
            &map,
            &WidgetTable::default(),
            12,
        )
        .unwrap();
        assert_eq!(out, "~/p   [main]\np $ ");
    }

    #[test]
    fn test_render_leaves_caller_map_alone() {
        let map = tokens(&[("cwd", "/tmp")]);
        render("@{CWD}@{SPC}", &map, &WidgetTable::default(), 10).unwrap();
        assert_eq!(map.get("cwd"), Some("/tmp"));
        assert!(map.get("spc").is_none());
    }

    #[test]
    fn test_render_rejects_malformed_template() {
        let err = render("\\[\\e[1mBOLD", &TokenMap::new(), &WidgetTable::default(), 80)
            .unwrap_err();
        assert!(matches!(err, RenderError::MalformedTemplate(_)));

        let err = render("\\e[1mx", &TokenMap::new(), &WidgetTable::default(), 80).unwrap_err();
        assert_eq!(
            err,
            RenderError::MalformedTemplate(EscapeError::EscapeOutsideBrackets)
        );
    }

    #[test]
    fn test_render_colours_widgets() {
        let mut widgets = WidgetTable::default();
        widgets.insert(
            "repo.name",
            WidgetConfig {
                colour_on: "\\[\\e[1;32m\\]".to_string(),
                ..WidgetConfig::default()
            },
        );
        let map = tokens(&[("repo.name", "p")]);
        let out = render("@{repo.name}$ ", &map, &widgets, 80).unwrap();
        assert_eq!(out, "\\[\\e[1;32m\\]p\\[\\e[0m\\]$ ");
    }

    #[test]
    fn test_fallback_on_overflow() {
        let map = tokens(&[("repo.name", "x".repeat(200).as_str())]);
        let template = "@{repo.name}".repeat(100);
        let out = render_or_fallback(&template, &map, &WidgetTable::default(), 80).unwrap();
        assert_eq!(out, PROMPT_TOO_LONG);
    }

    #[test]
    fn test_fallback_keeps_malformed_error() {
        let err = render_or_fallback("\\]", &TokenMap::new(), &WidgetTable::default(), 80)
            .unwrap_err();
        assert_eq!(err, RenderError::MalformedTemplate(EscapeError::UnmatchedClose));
    }
}
