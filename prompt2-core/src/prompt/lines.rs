//! Line-wise width reconciliation for `@{CWD}` and `@{SPC}`.
//!
//! Every output line gets the whole terminal width to itself. Once the
//! static widgets on a line are resolved, the working directory is shortened
//! until the line fits and the filler takes up whatever columns are left.

use tracing::debug;

use crate::config::WidgetTable;
use crate::error::RenderResult;

use super::buffer::PromptBuffer;
use super::format::{decoration_width, format_widget};
use super::parser::parse;
use super::text::{
    EXPANDING_TOKENS, count_token, count_visible_chars, has_nonexpanding_tokens, replace_tokens,
    shorten_path, space_filler,
};
use super::tokens::TokenMap;
use super::widget::is_active;

/// Resolve the expanding tokens on every line of `text`.
///
/// `cwd` is the working directory representation to fit; with `None`, any
/// `@{CWD}` is left in place. Line breaks are kept exactly as they appear.
pub fn reconcile_lines(
    text: &str,
    tokens: &mut TokenMap,
    widgets: &WidgetTable,
    cwd: Option<&str>,
    width: usize,
) -> RenderResult<String> {
    let mut out = PromptBuffer::new();

    for segment in text.split_inclusive('\n') {
        let (line, newline) = match segment.strip_suffix('\n') {
            Some(line) => (line, true),
            None => (segment, false),
        };
        let line = reconcile_line(line, tokens, widgets, cwd, width)?;
        out.push_str(&line)?;
        if newline {
            out.push('\n')?;
        }
    }

    Ok(out.into_string())
}

fn reconcile_line(
    line: &str,
    tokens: &mut TokenMap,
    widgets: &WidgetTable,
    cwd: Option<&str>,
    width: usize,
) -> RenderResult<String> {
    // A value injected for a previous line must not leak into this one
    for token in EXPANDING_TOKENS {
        tokens.remove(token);
    }

    let line = if has_nonexpanding_tokens(line) {
        parse(line, tokens, widgets)?
    } else {
        line.to_string()
    };

    // Both expanding tokens are measured and substituted together, so text
    // from one value is never taken for a placeholder
    let mut visible = count_visible_chars(&line);
    let cwd_count = count_token(&line, "cwd");
    let spc_count = count_token(&line, "spc");

    let mut cwd_widget = None;
    if cwd_count > 0 {
        match cwd {
            Some(cwd) => {
                let value = fit_cwd(visible, cwd, cwd_count, widgets, width);
                let active = is_active("cwd", &value);
                visible +=
                    cwd_count * (value.chars().count() + decoration_width("cwd", active, widgets));
                cwd_widget = Some(format_widget("cwd", &value, active, widgets));
                tokens.insert("cwd", value);
            }
            None => debug!("no working directory to substitute"),
        }
    }

    let mut fillers = Vec::new();
    if spc_count > 0 {
        visible += spc_count * decoration_width("spc", true, widgets);
        if visible < width {
            let total = width - visible;
            fillers = (0..spc_count)
                .map(|i| space_filler(total / spc_count + usize::from(i < total % spc_count)))
                .collect();
            tokens.insert("spc", space_filler(total));
        } else {
            debug!(visible, width, "no room for filler");
        }
    }
    let mut fillers = fillers.into_iter();

    let line = replace_tokens(&line, |token| {
        if token.eq_ignore_ascii_case("cwd") {
            cwd_widget.clone()
        } else if token.eq_ignore_ascii_case("spc") {
            // An empty filler list removes the placeholder
            Some(match fillers.next() {
                Some(filler) => format_widget("spc", &filler, is_active("spc", &filler), widgets),
                None => String::new(),
            })
        } else {
            None
        }
    });

    Ok(line)
}

/// Shorten `cwd` so that the line it lands on fits in `width` columns.
///
/// `visible` is the width of the rest of the line and `count` the number of
/// `@{CWD}` placeholders sharing it.
fn fit_cwd(
    visible: usize,
    cwd: &str,
    count: usize,
    widgets: &WidgetTable,
    width: usize,
) -> String {
    let cwd = shorten_path(cwd, widgets.get("cwd").max_width);
    let cwd_len = cwd.chars().count();
    let needed =
        visible + count * (cwd_len + decoration_width("cwd", is_active("cwd", &cwd), widgets));
    if needed <= width {
        return cwd;
    }

    let target = cwd_len.saturating_sub((needed - width).div_ceil(count));
    debug!(needed, width, target, "shortening working directory");
    shorten_path(&cwd, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;

    fn reconcile(text: &str, cwd: Option<&str>, width: usize) -> String {
        let mut tokens = TokenMap::new();
        reconcile_lines(text, &mut tokens, &WidgetTable::default(), cwd, width).unwrap()
    }

    #[test]
    fn test_cwd_fits_untouched() {
        assert_eq!(
            reconcile("<myproj> @{CWD} $ ", Some("~/code/myproj"), 80),
            "<myproj> ~/code/myproj $ "
        );
    }

    #[test]
    fn test_cwd_shortened_to_width() {
        let out = reconcile("@{CWD} $ ", Some("/very/long/path/to/project"), 15);
        assert_eq!(out, "...o/project $ ");
        assert_eq!(out.chars().count(), 15);
    }

    #[test]
    fn test_cwd_width_accounts_for_decoration() {
        let mut widgets = WidgetTable::default();
        widgets.insert(
            "cwd",
            WidgetConfig {
                string_active: "[%s]".to_string(),
                colour_on: "\\[\\e[34m\\]".to_string(),
                ..WidgetConfig::default()
            },
        );
        let mut tokens = TokenMap::new();
        let out =
            reconcile_lines("@{CWD}", &mut tokens, &widgets, Some("/usr/local/share"), 10).unwrap();
        assert_eq!(out, "\\[\\e[34m\\][...share]\\[\\e[0m\\]");
        assert_eq!(count_visible_chars(&out), 10);
    }

    #[test]
    fn test_missing_cwd_left_in_place() {
        assert_eq!(reconcile("@{CWD} $ ", None, 80), "@{CWD} $ ");
    }

    #[test]
    fn test_spc_fills_remaining_columns() {
        assert_eq!(reconcile("a@{SPC}b", None, 10), "a        b");
        assert_eq!(
            reconcile("\\[\\e[1m\\]a\\[\\e[0m\\]@{spc}b", None, 5),
            "\\[\\e[1m\\]a\\[\\e[0m\\]   b"
        );
    }

    #[test]
    fn test_spc_removed_when_line_is_full() {
        assert_eq!(reconcile("abcdefghij@{SPC}", None, 5), "abcdefghij");
        assert_eq!(reconcile("abcde@{SPC}", None, 5), "abcde");
    }

    #[test]
    fn test_each_line_gets_full_width() {
        assert_eq!(reconcile("@{SPC}x\n@{SPC}yy", None, 4), "   x\n  yy");
        assert_eq!(
            reconcile("@{CWD}@{SPC}|\n$ ", Some("~/src"), 8),
            "~/src  |\n$ "
        );
    }

    #[test]
    fn test_line_breaks_preserved() {
        assert_eq!(reconcile("a\n", None, 80), "a\n");
        assert_eq!(reconcile("a\n\nb", None, 80), "a\n\nb");
        assert_eq!(reconcile("", None, 80), "");
    }

    #[test]
    fn test_stale_expanding_values_ignored() {
        let mut tokens = TokenMap::new();
        tokens.insert("cwd", "/stale");
        tokens.insert("spc", "   ");
        let out = reconcile_lines(
            "@{CWD}@{SPC}",
            &mut tokens,
            &WidgetTable::default(),
            Some("/tmp"),
            6,
        )
        .unwrap();
        assert_eq!(out, "/tmp  ");
    }

    #[test]
    fn test_unterminated_placeholder_counts_as_text() {
        let out = reconcile("@{SPC}ab@{cd", None, 10);
        assert_eq!(out, "    ab@{cd");
        assert_eq!(out.chars().count(), 10);
    }

    #[test]
    fn test_cwd_value_not_substituted_again() {
        let mut tokens = TokenMap::new();
        tokens.insert("repo.name", "P");
        let out = reconcile_lines(
            "@{CWD}@{SPC}|",
            &mut tokens,
            &WidgetTable::default(),
            Some("/tmp/@{repo.name}"),
            30,
        )
        .unwrap();
        assert_eq!(out, format!("/tmp/@{{repo.name}}{}|", " ".repeat(12)));
        assert_eq!(out.chars().count(), 30);

        let out = reconcile("@{CWD}@{SPC}|", Some("/x/@{spc}"), 20);
        assert_eq!(out, format!("/x/@{{spc}}{}|", " ".repeat(10)));
    }

    #[test]
    fn test_fillers_share_the_line() {
        let out = reconcile("a@{SPC}b@{SPC}c", None, 10);
        assert_eq!(out, "a    b   c");
        assert_eq!(reconcile("ab@{SPC}@{SPC}", None, 3), "ab ");
    }
}
