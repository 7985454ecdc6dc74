//! Named terminal attributes (SGR codes) and `%{...}` token expansion.
//!
//! Attribute combos are comma separated and case-insensitive:
//! `"bold, fg blue"` becomes `\[\e[1;34m\]`. Besides the named table,
//! `fg-256-N`/`bg-256-N` select from the 256-colour palette and
//! `fg-rgb-R;G;B`/`bg-rgb-R;G;B` produce 24-bit colours.

/// Reset sequence appended after coloured widgets and produced by `%{}`.
pub const RESET_SEQUENCE: &str = "\\[\\e[0m\\]";

/// Opening of a bash-wrapped escape sequence.
pub const ESCAPE_MARKERS: [&str; 2] = ["\\[\\e[", "\\[\\033["];

const ATTR_OPEN: &str = "%{";
const ATTR_CLOSE: char = '}';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("unknown terminal attribute: {0}")]
    Unknown(String),
}

/// Which slice of the attribute table to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeGroup {
    All,
    Resets,
    Styles,
    Colours,
}

const RESETS: &[(&str, &str)] = &[
    ("reset", "0"),
    ("reset bold", "22"),
    ("reset dim", "22"),
    ("reset italic", "23"),
    ("reset underline", "24"),
    ("reset blink", "25"),
    ("reset reverse", "27"),
    ("reset hidden", "28"),
    ("reset strikethrough", "29"),
];

const STYLES: &[(&str, &str)] = &[
    ("bold", "1"),
    ("dim", "2"),
    ("italic", "3"),
    ("underline", "4"),
    ("blink", "5"),
    ("reverse", "7"),
    ("hidden", "8"),
    ("strikethrough", "9"),
];

const COLOUR_NAMES: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

/// SGR base code for each colour family, paired with its name prefix.
const COLOUR_FAMILIES: [(&str, u8); 4] =
    [("fg", 30), ("bg", 40), ("fg bright", 90), ("bg bright", 100)];

/// Patterns for colours outside the named table.
pub const EXTENDED_COLOUR_FORMS: [&str; 4] =
    ["fg-256-N", "bg-256-N", "fg-rgb-R;G;B", "bg-rgb-R;G;B"];

/// All attribute names in a group, in display order.
pub fn attribute_names(group: AttributeGroup) -> Vec<String> {
    let named = |table: &[(&str, &str)]| {
        table
            .iter()
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>()
    };
    let colours = || {
        let mut names: Vec<String> = COLOUR_FAMILIES
            .iter()
            .flat_map(|(prefix, _)| {
                COLOUR_NAMES
                    .iter()
                    .map(move |colour| format!("{prefix} {colour}"))
            })
            .collect();
        names.push("fg default".to_string());
        names.push("bg default".to_string());
        names
    };

    match group {
        AttributeGroup::Resets => named(RESETS),
        AttributeGroup::Styles => named(STYLES),
        AttributeGroup::Colours => colours(),
        AttributeGroup::All => {
            let mut all = named(RESETS);
            all.extend(named(STYLES));
            all.extend(colours());
            all
        }
    }
}

/// SGR parameter string for a single attribute name.
pub fn attribute_code(name: &str) -> Option<String> {
    let name = name.trim().to_ascii_lowercase();

    if let Some((_, code)) = RESETS.iter().chain(STYLES).find(|(n, _)| *n == name) {
        return Some(code.to_string());
    }
    match name.as_str() {
        "fg default" => return Some("39".to_string()),
        "bg default" => return Some("49".to_string()),
        _ => {}
    }
    // Longest prefixes first so "fg bright red" is not read as "fg" + "bright red"
    for (prefix, base) in COLOUR_FAMILIES.iter().rev() {
        if let Some(colour) = name.strip_prefix(prefix).and_then(|r| r.strip_prefix(' ')) {
            if let Some(idx) = COLOUR_NAMES.iter().position(|c| *c == colour) {
                return Some((*base as usize + idx).to_string());
            }
        }
    }
    for (prefix, selector) in [("fg-", "38"), ("bg-", "48")] {
        let Some(rest) = name.strip_prefix(prefix) else {
            continue;
        };
        if let Some(index) = rest.strip_prefix("256-") {
            let index: u8 = index.parse().ok()?;
            return Some(format!("{selector};5;{index}"));
        }
        if let Some(rgb) = rest.strip_prefix("rgb-") {
            let parts = rgb
                .split(';')
                .map(|part| part.trim().parse::<u8>())
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            if parts.len() != 3 {
                return None;
            }
            return Some(format!(
                "{selector};2;{};{};{}",
                parts[0], parts[1], parts[2]
            ));
        }
    }
    None
}

/// Escape sequence for a comma-separated combo of attribute names.
pub fn attribute_combo(combo: &str) -> Option<String> {
    let codes = combo
        .split(',')
        .map(attribute_code)
        .collect::<Option<Vec<_>>>()?;
    Some(format!("\\[\\e[{}m\\]", codes.join(";")))
}

/// Replace every `%{combo}` in `s` with its escape sequence.
///
/// `%{}` is the reset sequence. An unterminated `%{` is kept as text.
pub fn replace_attribute_tokens(s: &str) -> Result<String, AttributeError> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find(ATTR_OPEN) {
        let (prefix, after_start) = rest.split_at(start);
        out.push_str(prefix);
        let body = &after_start[ATTR_OPEN.len()..];
        let Some(end) = body.find(ATTR_CLOSE) else {
            out.push_str(after_start);
            return Ok(out);
        };
        let combo = &body[..end];
        if combo.trim().is_empty() {
            out.push_str(RESET_SEQUENCE);
        } else {
            let seq = attribute_combo(combo)
                .ok_or_else(|| AttributeError::Unknown(combo.trim().to_string()))?;
            out.push_str(&seq);
        }
        rest = &body[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Whether `s` opens a bracketed escape sequence.
pub fn has_escape_marker(s: &str) -> bool {
    ESCAPE_MARKERS.iter().any(|marker| s.contains(marker))
}
