//! Environment snapshots handed to the renderer.
//!
//! These are plain value objects filled in by the collectors in
//! `prompt2-status`. Numeric fields use [`UNKNOWN`] when a value could not
//! be determined, so widgets can tell "zero" apart from "no data".

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel for numeric facts that could not be gathered.
pub const UNKNOWN: i32 = -1;

/// Placeholder shown for repository name/branch when HEAD has no commit.
pub const NO_DATA: &str = "NO_DATA";

/// Git repository facts for the current directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoState {
    /// 1 inside a repository, 0 outside, -1 unknown
    pub is_git_repo: i32,
    /// Repository exists but HEAD points at an unborn branch
    pub is_fresh: bool,
    pub name: String,
    pub branch_name: String,
    /// Working tree root, when inside a repository
    pub root: Option<PathBuf>,
    pub rebase_active: i32,
    pub conflicts: i32,
    pub has_upstream: i32,
    pub ahead: i32,
    pub behind: i32,
    pub staged: i32,
    pub modified: i32,
    pub untracked: i32,
}

impl Default for RepoState {
    fn default() -> Self {
        Self {
            is_git_repo: UNKNOWN,
            is_fresh: false,
            name: String::new(),
            branch_name: String::new(),
            root: None,
            rebase_active: UNKNOWN,
            conflicts: UNKNOWN,
            has_upstream: UNKNOWN,
            ahead: UNKNOWN,
            behind: UNKNOWN,
            staged: UNKNOWN,
            modified: UNKNOWN,
            untracked: UNKNOWN,
        }
    }
}

impl RepoState {
    /// State for a directory outside any repository.
    pub fn not_a_repo() -> Self {
        Self {
            is_git_repo: 0,
            ..Self::default()
        }
    }

    pub fn is_repo(&self) -> bool {
        self.is_git_repo > 0
    }
}

/// AWS SSO login token facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwsState {
    /// 1 valid, 0 expired or absent, -1 unreadable
    pub token_is_valid: i32,
    pub token_remaining_hours: i32,
    pub token_remaining_minutes: i32,
}

impl Default for AwsState {
    fn default() -> Self {
        Self {
            token_is_valid: UNKNOWN,
            token_remaining_hours: UNKNOWN,
            token_remaining_minutes: UNKNOWN,
        }
    }
}

/// Facts about the user and host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysState {
    pub username: String,
    pub hostname: String,
    pub uid: i32,
    pub gid: i32,
}

impl Default for SysState {
    fn default() -> Self {
        Self {
            username: String::new(),
            hostname: String::new(),
            uid: UNKNOWN,
            gid: UNKNOWN,
        }
    }
}

impl SysState {
    /// `#` for root, `$` for everyone else.
    pub fn promptchar(&self) -> &'static str {
        if self.uid == 0 { "#" } else { "$" }
    }
}

/// Which representation of the working directory `@{CWD}` expands to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CwdType {
    Full,
    Basename,
    Git,
    #[default]
    Home,
}

impl CwdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Basename => "basename",
            Self::Git => "git",
            Self::Home => "home",
        }
    }
}

impl fmt::Display for CwdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CwdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "basename" => Ok(Self::Basename),
            "git" => Ok(Self::Git),
            "home" => Ok(Self::Home),
            other => Err(format!("unknown cwd type: {other}")),
        }
    }
}

/// Working directory plus the anchors needed to render it relative to
/// home or to the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CwdInfo {
    pub path: PathBuf,
    pub home: Option<PathBuf>,
    pub repo_root: Option<PathBuf>,
}

impl CwdInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            home: None,
            repo_root: None,
        }
    }

    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn with_repo_root(mut self, root: Option<PathBuf>) -> Self {
        self.repo_root = root;
        self
    }

    pub fn full(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.full())
    }

    /// Path with the home directory replaced by `~`.
    pub fn home_path(&self) -> String {
        let Some(home) = self.home.as_deref() else {
            return self.full();
        };
        match relative_to(&self.path, home) {
            Some(rest) if rest.is_empty() => "~/".to_string(),
            Some(rest) => format!("~/{rest}"),
            None => self.full(),
        }
    }

    /// Path relative to the repository root, with `+` standing for the root.
    /// Falls back to [`CwdInfo::home_path`] outside a repository.
    pub fn git_path(&self) -> String {
        let Some(root) = self.repo_root.as_deref() else {
            return self.home_path();
        };
        match relative_to(&self.path, root) {
            Some(rest) => format!("+/{rest}"),
            None => self.home_path(),
        }
    }

    pub fn render(&self, cwd_type: CwdType) -> String {
        match cwd_type {
            CwdType::Full => self.full(),
            CwdType::Basename => self.basename(),
            CwdType::Git => self.git_path(),
            CwdType::Home => self.home_path(),
        }
    }
}

fn relative_to(path: &Path, base: &Path) -> Option<String> {
    let rest = path.strip_prefix(base).ok()?;
    Some(rest.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd(path: &str) -> CwdInfo {
        CwdInfo::new(path)
            .with_home(Some(PathBuf::from("/home/ada")))
            .with_repo_root(Some(PathBuf::from("/home/ada/code/proj")))
    }

    #[test]
    fn test_home_path() {
        assert_eq!(cwd("/home/ada").home_path(), "~/");
        assert_eq!(cwd("/home/ada/code").home_path(), "~/code");
        assert_eq!(cwd("/etc/nginx").home_path(), "/etc/nginx");
        // A sibling directory sharing the prefix is not inside home
        assert_eq!(cwd("/home/adam").home_path(), "/home/adam");
    }

    #[test]
    fn test_git_path() {
        assert_eq!(cwd("/home/ada/code/proj").git_path(), "+/");
        assert_eq!(cwd("/home/ada/code/proj/src/bin").git_path(), "+/src/bin");

        let outside = CwdInfo::new("/home/ada/notes").with_home(Some(PathBuf::from("/home/ada")));
        assert_eq!(outside.git_path(), "~/notes");
    }

    #[test]
    fn test_basename_and_full() {
        let info = cwd("/home/ada/code/proj/src");
        assert_eq!(info.basename(), "src");
        assert_eq!(info.full(), "/home/ada/code/proj/src");
        assert_eq!(CwdInfo::new("/").basename(), "/");
    }

    #[test]
    fn test_render_by_type() {
        let info = cwd("/home/ada/code/proj/src");
        assert_eq!(info.render(CwdType::Full), "/home/ada/code/proj/src");
        assert_eq!(info.render(CwdType::Basename), "src");
        assert_eq!(info.render(CwdType::Git), "+/src");
        assert_eq!(info.render(CwdType::Home), "~/code/proj/src");
    }

    #[test]
    fn test_cwd_type_parse() {
        assert_eq!("GIT".parse::<CwdType>(), Ok(CwdType::Git));
        assert_eq!(" home ".parse::<CwdType>(), Ok(CwdType::Home));
        assert!("nowhere".parse::<CwdType>().is_err());
    }

    #[test]
    fn test_defaults_are_unknown() {
        let repo = RepoState::default();
        assert_eq!(repo.ahead, UNKNOWN);
        assert!(!repo.is_repo());
        assert_eq!(RepoState::not_a_repo().is_git_repo, 0);
        assert_eq!(AwsState::default().token_is_valid, UNKNOWN);
    }

    #[test]
    fn test_promptchar() {
        let mut sys = SysState::default();
        sys.uid = 0;
        assert_eq!(sys.promptchar(), "#");
        sys.uid = 1000;
        assert_eq!(sys.promptchar(), "$");
    }
}
