use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::{debug, error, warn};

use prompt2_core::attributes::{
    AttributeGroup, EXTENDED_COLOUR_FORMS, attribute_combo, attribute_names,
};
use prompt2_core::config::{
    Config, ConfigError, Settings, TemplateContext, WidgetTable, apply_env_overrides,
};
use prompt2_core::{PROMPT_TOO_LONG, RenderError, render_or_fallback};
use prompt2_status::Snapshot;

use crate::cli::AttributeList;
use crate::width::terminal_width;

pub type CommandResult = Result<ExitCode, Box<dyn std::error::Error>>;

/// Printed instead of a prompt when the configuration cannot be loaded.
pub const CONFIG_ERROR_PROMPT: &str = "CONFIG ERROR $ ";

pub fn malformed_prompt(context: TemplateContext) -> String {
    format!("MALFORMED {} PROMPT $ ", context.label())
}

/// Print `prompt` without a trailing newline.
fn emit(prompt: &str, code: ExitCode) -> ExitCode {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout.write_all(prompt.as_bytes()).and_then(|()| stdout.flush()) {
        debug!("Could not write prompt: {}", err);
        return ExitCode::FAILURE;
    }
    code
}

fn current_dir() -> PathBuf {
    std::env::current_dir()
        .or_else(|err| {
            warn!("Could not read working directory: {}", err);
            std::env::var("PWD").map(PathBuf::from)
        })
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Render the prompt for the working directory.
///
/// Always prints something usable as a prompt, even on failure.
pub fn render(config: Result<Config, ConfigError>, width: Option<usize>) -> ExitCode {
    let config = match config {
        Ok(config) => config,
        Err(ConfigError::MalformedTemplate { context, source }) => {
            error!("Malformed {} prompt: {}", context, source);
            return emit(&malformed_prompt(context), ExitCode::FAILURE);
        }
        Err(err) => {
            error!("{}", err);
            return emit(CONFIG_ERROR_PROMPT, ExitCode::FAILURE);
        }
    };

    let snapshot = Snapshot::gather(&current_dir());
    let context = TemplateContext::select(&snapshot.repo);
    let tokens = snapshot.tokens(config.cwd_type());
    let width = terminal_width(width);
    debug!(%context, width, "rendering prompt");

    match render_or_fallback(config.template(context), &tokens, &config.widgets, width) {
        Ok(prompt) => emit(&prompt, ExitCode::SUCCESS),
        Err(RenderError::MalformedTemplate(source)) => {
            error!("Malformed {} prompt: {}", context, source);
            emit(&malformed_prompt(context), ExitCode::FAILURE)
        }
        Err(RenderError::PromptTooLong { limit }) => {
            warn!(limit, "prompt too long");
            emit(PROMPT_TOO_LONG, ExitCode::SUCCESS)
        }
    }
}

/// Dump every token value for the working directory.
pub fn status(config: &Config) -> CommandResult {
    let snapshot = Snapshot::gather(&current_dir());
    let tokens = snapshot.tokens(config.cwd_type());

    let mut stdout = io::stdout().lock();
    for (token, value) in tokens.sorted() {
        writeln!(stdout, "{token} {value}")?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Validate each template and widget section, reporting all problems.
pub fn check(explicit: Option<&Path>) -> CommandResult {
    let mut settings = match explicit {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    apply_env_overrides(&mut settings)?;

    let mut ok = true;
    for (context, result) in Config::check_templates(&settings) {
        match result {
            Ok(()) => println!("{context}: ok"),
            Err(err) => {
                ok = false;
                println!("{context}: {err}");
            }
        }
    }
    match WidgetTable::from_sections(&settings.widget_sections()) {
        Ok(_) => println!("widgets: ok"),
        Err((widget, err)) => {
            ok = false;
            println!("widgets.{widget}: {err}");
        }
    }

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print an attribute escape sequence, or list the known names.
pub fn attribute(combo: Option<&str>, list: Option<AttributeList>) -> CommandResult {
    if let Some(list) = list {
        let names: Vec<String> = match list {
            AttributeList::All => attribute_names(AttributeGroup::All),
            AttributeList::Styles => attribute_names(AttributeGroup::Styles),
            AttributeList::Colours => attribute_names(AttributeGroup::Colours),
            AttributeList::Resets => attribute_names(AttributeGroup::Resets),
            AttributeList::Rgb => EXTENDED_COLOUR_FORMS.iter().map(|s| s.to_string()).collect(),
        };
        for name in names {
            println!("{name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(combo) = combo else {
        return Err("no attribute combo given".into());
    };
    match attribute_combo(combo) {
        Some(sequence) => {
            println!("{sequence}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("Unknown attribute in {combo:?}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Write the commented default configuration.
pub fn init_config(path: Option<PathBuf>, force: bool) -> CommandResult {
    let path = match path {
        Some(path) => path,
        None => Settings::config_path()?,
    };
    if path.exists() && !force {
        eprintln!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
        return Ok(ExitCode::FAILURE);
    }

    Settings::create_default_config(&path)?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_malformed_prompt() {
        assert_eq!(malformed_prompt(TemplateContext::Git), "MALFORMED GIT PROMPT $ ");
        assert_eq!(
            malformed_prompt(TemplateContext::NonGit),
            "MALFORMED NON_GIT PROMPT $ "
        );
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt2").join("config.toml");

        assert_eq!(init_config(Some(path.clone()), false).unwrap(), ExitCode::SUCCESS);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[prompt]"));

        fs::write(&path, "# mine\n").unwrap();
        assert_eq!(init_config(Some(path.clone()), false).unwrap(), ExitCode::FAILURE);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");

        assert_eq!(init_config(Some(path.clone()), true).unwrap(), ExitCode::SUCCESS);
        assert_eq!(fs::read_to_string(&path).unwrap(), written);
    }

    #[test]
    fn test_check_reports_each_template() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        fs::write(&good, "[prompt]\ngit = \"%{bold}@{repo.name}%{} $ \"\n").unwrap();
        assert_eq!(check(Some(&good)).unwrap(), ExitCode::SUCCESS);

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[prompt]\nnon_git = '\\[\\e[1mBOLD'\n").unwrap();
        assert_eq!(check(Some(&bad)).unwrap(), ExitCode::FAILURE);

        assert!(check(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_attribute_command() {
        assert_eq!(attribute(Some("bold,fg red"), None).unwrap(), ExitCode::SUCCESS);
        assert_eq!(attribute(Some("sparkly"), None).unwrap(), ExitCode::FAILURE);
        assert_eq!(
            attribute(None, Some(AttributeList::Rgb)).unwrap(),
            ExitCode::SUCCESS
        );
        assert!(attribute(None, None).is_err());
    }
}
