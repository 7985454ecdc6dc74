//! Widget categories and the active/inactive rule for each.

/// How a widget's raw value decides whether it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    /// Active when the value is non-empty.
    Text,
    /// Active when the value parses as an integer greater than zero.
    Toggle,
    /// Active when the SSO token has no whole hours left.
    TokenHours,
    /// Active when ten minutes or fewer remain on the SSO token.
    TokenMinutes,
}

/// Minutes left on the SSO token at which the minutes widget turns active.
pub const TOKEN_MINUTES_WARNING: i64 = 10;

impl WidgetKind {
    /// Look up the category for a (case-insensitive) token name.
    pub fn of(token: &str) -> Option<Self> {
        let kind = match token.to_ascii_lowercase().as_str() {
            "cwd" | "spc" | "cwd.full" | "cwd.basename" | "cwd.git_path" | "cwd.home_path"
            | "repo.name" | "repo.branch_name" | "sys.username" | "sys.hostname"
            | "sys.promptchar" => Self::Text,
            "repo.is_git_repo" | "repo.rebase_active" | "repo.conflicts" | "repo.has_upstream"
            | "repo.ahead" | "repo.behind" | "repo.staged" | "repo.modified"
            | "repo.untracked" | "aws.token_is_valid" | "sys.uid" | "sys.gid" => Self::Toggle,
            "aws.token_remaining_hours" => Self::TokenHours,
            "aws.token_remaining_minutes" => Self::TokenMinutes,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_active(&self, value: &str) -> bool {
        match self {
            Self::Text => !value.is_empty(),
            Self::Toggle => parse_count(value) > 0,
            Self::TokenHours => parse_count(value) <= 0,
            Self::TokenMinutes => parse_count(value) <= TOKEN_MINUTES_WARNING,
        }
    }
}

/// Decide whether the widget for `token` is active given its value.
///
/// Unknown tokens are never active.
pub fn is_active(token: &str, value: &str) -> bool {
    WidgetKind::of(token).is_some_and(|kind| kind.is_active(value))
}

/// Integer value of a widget, treating anything non-numeric as zero.
fn parse_count(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}
