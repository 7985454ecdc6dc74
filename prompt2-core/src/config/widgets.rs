//! Per-widget formatting configuration.
//!
//! In the TOML file each widget gets a section keyed by its token name:
//!
//! ```toml
//! [widgets.default]
//! colour_off = "%{dim}"
//!
//! [widgets."repo.branch_name"]
//! string_active = "(%s)"
//! max_width = 40
//! ```
//!
//! Fields left out of a widget section inherit from `[widgets.default]`,
//! which in turn inherits from [`WidgetConfig::default`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::attributes::{self, AttributeError};

/// Widest a widget value may be before it is truncated.
pub const DEFAULT_MAX_WIDTH: usize = 256;

/// Section name holding the fallback widget configuration.
pub const DEFAULT_WIDGET: &str = "default";

/// Fully resolved formatting for one widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Format used while the widget is active; `%s` marks the value
    pub string_active: String,
    /// Format used while the widget is inactive
    pub string_inactive: String,
    /// Emitted before an active value
    pub colour_on: String,
    /// Emitted before an inactive value
    pub colour_off: String,
    /// Values longer than this are shortened
    pub max_width: usize,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            string_active: "%s".to_string(),
            string_inactive: "%s".to_string(),
            colour_on: String::new(),
            colour_off: String::new(),
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

/// A widget section as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WidgetSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_active: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_inactive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour_off: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<usize>,
}

impl WidgetSection {
    pub fn with_max_width(max_width: usize) -> Self {
        Self {
            max_width: Some(max_width),
            ..Self::default()
        }
    }

    /// Fill unset fields from `base` and expand `%{...}` attribute tokens in
    /// the colour strings.
    fn resolve(&self, base: &WidgetConfig) -> Result<WidgetConfig, AttributeError> {
        let colour = |value: &Option<String>, fallback: &str| match value {
            Some(raw) => attributes::replace_attribute_tokens(raw),
            None => Ok(fallback.to_string()),
        };
        Ok(WidgetConfig {
            string_active: self
                .string_active
                .clone()
                .unwrap_or_else(|| base.string_active.clone()),
            string_inactive: self
                .string_inactive
                .clone()
                .unwrap_or_else(|| base.string_inactive.clone()),
            colour_on: colour(&self.colour_on, &base.colour_on)?,
            colour_off: colour(&self.colour_off, &base.colour_off)?,
            max_width: self.max_width.unwrap_or(base.max_width),
        })
    }
}

/// Lookup table from lower-cased token name to its widget configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetTable {
    default: WidgetConfig,
    widgets: HashMap<String, WidgetConfig>,
}

impl WidgetTable {
    pub fn new(default: WidgetConfig) -> Self {
        Self {
            default,
            widgets: HashMap::new(),
        }
    }

    /// Resolve the file's widget sections into a table.
    ///
    /// Returns the offending widget name alongside the attribute error.
    pub fn from_sections(
        sections: &BTreeMap<String, WidgetSection>,
    ) -> Result<Self, (String, AttributeError)> {
        let default = match sections
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(DEFAULT_WIDGET))
        {
            Some((name, section)) => section
                .resolve(&WidgetConfig::default())
                .map_err(|e| (name.clone(), e))?,
            None => WidgetConfig::default(),
        };

        let mut table = Self::new(default);
        for (name, section) in sections {
            if name.eq_ignore_ascii_case(DEFAULT_WIDGET) {
                continue;
            }
            let config = section
                .resolve(&table.default)
                .map_err(|e| (name.clone(), e))?;
            table.insert(name, config);
        }
        Ok(table)
    }

    pub fn insert(&mut self, token: &str, config: WidgetConfig) {
        self.widgets.insert(token.to_ascii_lowercase(), config);
    }

    /// Configuration for `token`, falling back to the default widget.
    pub fn get(&self, token: &str) -> &WidgetConfig {
        self.widgets
            .get(&token.to_ascii_lowercase())
            .unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(toml_src: &str) -> BTreeMap<String, WidgetSection> {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn test_lookup_falls_back_to_default() {
        let table = WidgetTable::default();
        assert_eq!(table.get("repo.name"), &WidgetConfig::default());
        assert_eq!(table.get("repo.name").max_width, DEFAULT_MAX_WIDTH);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut table = WidgetTable::default();
        table.insert(
            "Repo.Branch_Name",
            WidgetConfig {
                max_width: 12,
                ..WidgetConfig::default()
            },
        );
        assert_eq!(table.get("repo.branch_name").max_width, 12);
        assert_eq!(table.get("REPO.BRANCH_NAME").max_width, 12);
    }

    #[test]
    fn test_sections_inherit_from_default_section() {
        let sections = section(
            r#"
[default]
string_inactive = ""
max_width = 100

["repo.ahead"]
string_active = "↑%s"
"#,
        );
        let table = WidgetTable::from_sections(&sections).unwrap();

        let ahead = table.get("repo.ahead");
        assert_eq!(ahead.string_active, "↑%s");
        assert_eq!(ahead.string_inactive, "");
        assert_eq!(ahead.max_width, 100);

        let other = table.get("repo.behind");
        assert_eq!(other.string_active, "%s");
        assert_eq!(other.max_width, 100);
    }

    #[test]
    fn test_colour_attributes_are_expanded() {
        let sections = section(
            r#"
["repo.name"]
colour_on = "%{bold,fg green}"
colour_off = "plain"
"#,
        );
        let table = WidgetTable::from_sections(&sections).unwrap();
        let widget = table.get("repo.name");
        assert_eq!(widget.colour_on, "\\[\\e[1;32m\\]");
        assert_eq!(widget.colour_off, "plain");
    }

    #[test]
    fn test_unknown_attribute_names_widget() {
        let sections = section(
            r#"
["repo.name"]
colour_on = "%{fg chartreuse-ish}"
"#,
        );
        let (widget, err) = WidgetTable::from_sections(&sections).unwrap_err();
        assert_eq!(widget, "repo.name");
        assert!(err.to_string().contains("chartreuse-ish"));
    }
}
