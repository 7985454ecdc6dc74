use crate::attributes::{RESET_SEQUENCE, has_escape_marker};
use crate::config::WidgetTable;

use super::text::{count_visible_chars, shorten_path, truncate_with_ellipsis};

const VALUE_SLOT: &str = "%s";

/// Substitute `value` into the first `%s` of `fmt`; `%%` is a literal `%`.
pub fn apply_format(fmt: &str, value: &str) -> String {
    let mut out = String::with_capacity(fmt.len() + value.len());
    let mut used = false;
    let mut chars = fmt.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') if !used => {
                chars.next();
                out.push_str(value);
                used = true;
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    out
}

/// Apply a widget's width limit to its raw value.
fn fit_width(token: &str, value: &str, max_width: usize) -> String {
    if value.chars().count() <= max_width {
        return value.to_string();
    }
    match token.to_ascii_lowercase().as_str() {
        "cwd" => shorten_path(value, max_width),
        // The filler is sized to the terminal, never to the widget
        "spc" => value.to_string(),
        _ => truncate_with_ellipsis(value, max_width),
    }
}

/// Produce the decorated text for one widget.
pub fn format_widget(token: &str, value: &str, active: bool, widgets: &WidgetTable) -> String {
    let config = widgets.get(token);

    let mut value = value.to_string();
    if token.eq_ignore_ascii_case("aws.token_remaining_minutes")
        && value.len() == 1
        && value.chars().all(|c| c.is_ascii_digit())
    {
        value.insert(0, '0');
    }
    let value = fit_width(token, &value, config.max_width);

    let (fmt, colour) = if active {
        (&config.string_active, &config.colour_on)
    } else {
        (&config.string_inactive, &config.colour_off)
    };

    let mut out = String::with_capacity(colour.len() + fmt.len() + value.len());
    out.push_str(colour);
    out.push_str(&apply_format(fmt, &value));
    if has_escape_marker(colour) {
        out.push_str(RESET_SEQUENCE);
    }
    out
}

/// Visible characters a widget adds around its value.
pub fn decoration_width(token: &str, active: bool, widgets: &WidgetTable) -> usize {
    let config = widgets.get(token);
    let (fmt, colour) = if active {
        (&config.string_active, &config.colour_on)
    } else {
        (&config.string_inactive, &config.colour_off)
    };
    count_visible_chars(colour) + count_visible_chars(&apply_format(fmt, ""))
}
