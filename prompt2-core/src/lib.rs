//! Template engine behind the `prompt2` shell prompt.
//!
//! A prompt template mixes literal text, bash escapes and `@{token}`
//! placeholders. Rendering takes a [`prompt::TokenMap`] of widget values
//! (built from the [`state`] value objects) and a [`config::WidgetTable`]
//! of formatting rules, and produces the final `PS1` string sized to the
//! terminal.

pub mod attributes;
pub mod config;
pub mod error;
pub mod prompt;
pub mod state;

pub use config::{Config, ConfigError, Settings, SettingsError, TemplateContext};
pub use error::{EscapeError, RenderError, RenderResult};
pub use prompt::{PROMPT_MAX_LEN, PROMPT_TOO_LONG, TokenMap, render, render_or_fallback};
pub use state::{AwsState, CwdInfo, CwdType, RepoState, SysState};
