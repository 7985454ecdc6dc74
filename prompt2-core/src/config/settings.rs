//! Settings loaded from TOML files.
//!
//! Lookup order when no path is given on the command line:
//! `$PROMPT2_CONFIG_DIR/config.toml`, `./.prompt2.toml`, then
//! `~/.config/prompt2/config.toml`. Nothing is ever written while looking.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::state::CwdType;

use super::widgets::WidgetSection;

/// Environment variable naming a directory that holds `config.toml`.
pub const CONFIG_DIR_ENV: &str = "PROMPT2_CONFIG_DIR";

/// Per-directory configuration file name.
pub const LOCAL_CONFIG_FILE: &str = ".prompt2.toml";

pub const DEFAULT_GIT_PROMPT: &str = "<@{Repo.name}> @{CWD} $ ";
pub const DEFAULT_NON_GIT_PROMPT: &str = "\\W$ ";
pub const DEFAULT_FRESH_REPO_PROMPT: &str = "<@{Repo.name}> @{CWD} (new) $ ";

/// Branch names are cut shorter than other widgets unless configured.
pub const DEFAULT_BRANCH_MAX_WIDTH: usize = 40;

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# prompt2 configuration file
# Located at: ~/.config/prompt2/config.toml
#
# Templates use @{token} placeholders, for example @{Repo.name} or
# @{repo.branch_name}. @{CWD} and @{SPC} are sized to the terminal width.
# Terminal attributes can be written as %{bold,fg blue}; %{} resets them.
# The templates can also be set through GP2_GIT_PROMPT, GP2_NON_GIT_PROMPT,
# GP2_FRESH_REPO_PROMPT and GP2_CWD_TYPE.

[prompt]
git = "<@{Repo.name}> @{CWD} $ "
non_git = "\\W$ "
fresh_repo = "<@{Repo.name}> @{CWD} (new) $ "
# full | basename | git | home
cwd_type = "home"

[logging]
# Used when RUST_LOG is not set
level = "warn"

# Fallback for every widget without its own section
[widgets.default]
string_active = "%s"
string_inactive = "%s"
colour_on = ""
colour_off = ""
max_width = 256

[widgets."repo.branch_name"]
max_width = 40

# [widgets."repo.ahead"]
# string_active = "↑%s"
# string_inactive = ""
# colour_on = "%{fg green}"
"#;

/// Settings loaded from a TOML configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Prompt templates
    #[serde(default)]
    pub prompt: PromptSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Widget sections keyed by lower-cased token name
    #[serde(default = "default_widgets")]
    pub widgets: BTreeMap<String, WidgetSection>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt: PromptSettings::default(),
            logging: LoggingSettings::default(),
            widgets: default_widgets(),
        }
    }
}

/// Which templates to render and how to show the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PromptSettings {
    /// Template inside a repository
    #[serde(default = "default_git_prompt")]
    pub git: String,

    /// Template outside any repository
    #[serde(default = "default_non_git_prompt")]
    pub non_git: String,

    /// Template inside a repository with no commits yet
    #[serde(default = "default_fresh_repo_prompt")]
    pub fresh_repo: String,

    /// Representation `@{CWD}` expands to
    #[serde(default)]
    pub cwd_type: CwdType,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_git_prompt() -> String {
    DEFAULT_GIT_PROMPT.to_string()
}

fn default_non_git_prompt() -> String {
    DEFAULT_NON_GIT_PROMPT.to_string()
}

fn default_fresh_repo_prompt() -> String {
    DEFAULT_FRESH_REPO_PROMPT.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_widgets() -> BTreeMap<String, WidgetSection> {
    BTreeMap::from([(
        "repo.branch_name".to_string(),
        WidgetSection::with_max_width(DEFAULT_BRANCH_MAX_WIDTH),
    )])
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            git: default_git_prompt(),
            non_git: default_non_git_prompt(),
            fresh_repo: default_fresh_repo_prompt(),
            cwd_type: CwdType::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    ConfigDirNotFound,

    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
}

impl Settings {
    /// Load settings from the first configuration file found.
    ///
    /// Falls back to the built-in defaults when there is none.
    pub fn load() -> Result<Self, SettingsError> {
        match Self::find() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load settings from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.is_file() {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }
        tracing::info!("Loading configuration from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = toml::from_str(content)?;
        settings.widgets = std::mem::take(&mut settings.widgets)
            .into_iter()
            .map(|(name, section)| (name.to_ascii_lowercase(), section))
            .collect();
        Ok(settings)
    }

    /// Serialize settings to TOML content.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the user configuration file path.
    ///
    /// Uses `$PROMPT2_CONFIG_DIR` when set, otherwise the XDG config
    /// directory: `~/.config/prompt2/config.toml`
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var(CONFIG_DIR_ENV) {
            let dir = PathBuf::from(override_dir);
            return Ok(dir.join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("prompt2");

        Ok(config_dir.join("config.toml"))
    }

    /// First existing configuration file in lookup order.
    pub fn find() -> Option<PathBuf> {
        if let Ok(override_dir) = std::env::var(CONFIG_DIR_ENV) {
            let path = PathBuf::from(override_dir).join("config.toml");
            if path.is_file() {
                return Some(path);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join("prompt2").join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Write the commented default configuration file.
    pub fn create_default_config(path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG_TOML)?;

        Ok(())
    }

    /// Save settings to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Widget sections with built-in entries the file leaves out filled in.
    pub fn widget_sections(&self) -> BTreeMap<String, WidgetSection> {
        let mut sections = default_widgets();
        sections.extend(self.widgets.clone());
        sections
    }
}
