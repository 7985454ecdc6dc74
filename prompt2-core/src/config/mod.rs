//! Configuration management for prompt2.
//!
//! Settings come from a TOML file (see [`Settings`] for the lookup order)
//! and are then overridden by the `GP2_*` environment variables:
//!
//! - `GP2_GIT_PROMPT` - template inside a repository
//! - `GP2_NON_GIT_PROMPT` - template outside any repository
//! - `GP2_FRESH_REPO_PROMPT` - template in a repository with no commits
//! - `GP2_CWD_TYPE` - `full`, `basename`, `git` or `home`
//!
//! ```toml
//! [prompt]
//! git = "%{bold}@{repo.name}%{} @{CWD}@{SPC}@{repo.branch_name}\n$ "
//! cwd_type = "git"
//!
//! [widgets."repo.branch_name"]
//! string_active = "(%s)"
//! colour_on = "%{fg cyan}"
//! max_width = 30
//! ```

mod settings;
mod widgets;

use std::fmt;
use std::path::Path;

use crate::attributes::{self, AttributeError};
use crate::error::EscapeError;
use crate::prompt::are_escape_sequences_properly_formed;
use crate::state::{CwdType, RepoState};

pub use settings::{
    CONFIG_DIR_ENV, DEFAULT_BRANCH_MAX_WIDTH, DEFAULT_FRESH_REPO_PROMPT, DEFAULT_GIT_PROMPT,
    DEFAULT_NON_GIT_PROMPT, LOCAL_CONFIG_FILE, LoggingSettings, PromptSettings, Settings,
    SettingsError,
};
pub use widgets::{DEFAULT_MAX_WIDTH, DEFAULT_WIDGET, WidgetConfig, WidgetSection, WidgetTable};

pub const ENV_GIT_PROMPT: &str = "GP2_GIT_PROMPT";
pub const ENV_NON_GIT_PROMPT: &str = "GP2_NON_GIT_PROMPT";
pub const ENV_FRESH_REPO_PROMPT: &str = "GP2_FRESH_REPO_PROMPT";
pub const ENV_CWD_TYPE: &str = "GP2_CWD_TYPE";

/// Which of the three templates applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateContext {
    Git,
    NonGit,
    FreshRepo,
}

impl TemplateContext {
    pub const ALL: [Self; 3] = [Self::Git, Self::NonGit, Self::FreshRepo];

    /// Pick the template for the repository state at hand.
    pub fn select(repo: &RepoState) -> Self {
        if !repo.is_repo() {
            Self::NonGit
        } else if repo.is_fresh {
            Self::FreshRepo
        } else {
            Self::Git
        }
    }

    /// Key under `[prompt]`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::NonGit => "non_git",
            Self::FreshRepo => "fresh_repo",
        }
    }

    /// Upper-case label used in the malformed-template fallback prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Git => "GIT",
            Self::NonGit => "NON_GIT",
            Self::FreshRepo => "FRESH_REPO",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Git => ENV_GIT_PROMPT,
            Self::NonGit => ENV_NON_GIT_PROMPT,
            Self::FreshRepo => ENV_FRESH_REPO_PROMPT,
        }
    }

    fn raw<'a>(&self, prompt: &'a PromptSettings) -> &'a str {
        match self {
            Self::Git => &prompt.git,
            Self::NonGit => &prompt.non_git,
            Self::FreshRepo => &prompt.fresh_repo,
        }
    }
}

impl fmt::Display for TemplateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Fully resolved configuration for one render.
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings as loaded, after environment overrides
    pub settings: Settings,
    /// Resolved widget formatting
    pub widgets: WidgetTable,
    git: String,
    non_git: String,
    fresh_repo: String,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Unknown attribute '{name}' in {section}")]
    UnknownAttribute { section: String, name: String },

    #[error("Malformed {context} prompt: {source}")]
    MalformedTemplate {
        context: TemplateContext,
        source: EscapeError,
    },

    #[error("Invalid GP2_CWD_TYPE: {0}")]
    InvalidCwdType(String),
}

impl ConfigError {
    fn unknown_attribute(section: impl Into<String>, err: AttributeError) -> Self {
        let AttributeError::Unknown(name) = err;
        Self::UnknownAttribute {
            section: section.into(),
            name,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// With `explicit`, that file must exist and parse. Without it the
    /// usual lookup applies, and a missing or unreadable file means
    /// built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match explicit {
            Some(path) => Settings::load_from(path)?,
            None => Settings::load().unwrap_or_else(|err| {
                tracing::warn!("Ignoring configuration file: {}", err);
                Settings::default()
            }),
        };
        apply_env_overrides(&mut settings)?;
        Self::from_settings(settings)
    }

    /// Resolve attributes and validate templates for already-loaded settings.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let widgets =
            WidgetTable::from_sections(&settings.widget_sections()).map_err(|(widget, err)| {
                ConfigError::unknown_attribute(format!("widgets.{widget}"), err)
            })?;

        let git = resolve_template(TemplateContext::Git, &settings.prompt)?;
        let non_git = resolve_template(TemplateContext::NonGit, &settings.prompt)?;
        let fresh_repo = resolve_template(TemplateContext::FreshRepo, &settings.prompt)?;

        Ok(Self {
            settings,
            widgets,
            git,
            non_git,
            fresh_repo,
        })
    }

    /// Check each template on its own, reporting every failure.
    pub fn check_templates(
        settings: &Settings,
    ) -> Vec<(TemplateContext, Result<(), ConfigError>)> {
        TemplateContext::ALL
            .into_iter()
            .map(|context| {
                let result = resolve_template(context, &settings.prompt).map(|_| ());
                (context, result)
            })
            .collect()
    }

    /// Template for `context`, attributes already expanded.
    pub fn template(&self, context: TemplateContext) -> &str {
        match context {
            TemplateContext::Git => &self.git,
            TemplateContext::NonGit => &self.non_git,
            TemplateContext::FreshRepo => &self.fresh_repo,
        }
    }

    pub fn cwd_type(&self) -> CwdType {
        self.settings.prompt.cwd_type
    }

    /// Filter directive for logging when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &str {
        &self.settings.logging.level
    }
}

fn resolve_template(
    context: TemplateContext,
    prompt: &PromptSettings,
) -> Result<String, ConfigError> {
    let template = attributes::replace_attribute_tokens(context.raw(prompt)).map_err(|err| {
        ConfigError::unknown_attribute(format!("prompt.{}", context.key()), err)
    })?;
    are_escape_sequences_properly_formed(&template)
        .map_err(|source| ConfigError::MalformedTemplate { context, source })?;
    Ok(template)
}

/// Apply the `GP2_*` environment variables on top of the file settings.
pub fn apply_env_overrides(settings: &mut Settings) -> Result<(), ConfigError> {
    for context in TemplateContext::ALL {
        if let Ok(value) = std::env::var(context.env_var()) {
            tracing::debug!("{} overrides prompt.{}", context.env_var(), context.key());
            let slot = match context {
                TemplateContext::Git => &mut settings.prompt.git,
                TemplateContext::NonGit => &mut settings.prompt.non_git,
                TemplateContext::FreshRepo => &mut settings.prompt.fresh_repo,
            };
            *slot = value;
        }
    }

    if let Ok(value) = std::env::var(ENV_CWD_TYPE) {
        settings.prompt.cwd_type = value.parse().map_err(ConfigError::InvalidCwdType)?;
    }

    Ok(())
}

/// Serialises tests that mutate the process environment.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
