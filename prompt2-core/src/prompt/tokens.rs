use std::collections::HashMap;

use crate::state::{AwsState, CwdInfo, RepoState, SysState};

/// Values for every widget token in one render, keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    values: HashMap<String, String>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map of static widget values from the gathered state.
    pub fn assemble(repo: &RepoState, aws: &AwsState, sys: &SysState) -> Self {
        let mut map = Self::new();

        map.insert("repo.is_git_repo", repo.is_git_repo.to_string());
        map.insert("repo.name", repo.name.as_str());
        map.insert("repo.branch_name", repo.branch_name.as_str());
        map.insert("repo.rebase_active", repo.rebase_active.to_string());
        map.insert("repo.conflicts", repo.conflicts.to_string());
        map.insert("repo.has_upstream", repo.has_upstream.to_string());
        map.insert("repo.ahead", repo.ahead.to_string());
        map.insert("repo.behind", repo.behind.to_string());
        map.insert("repo.staged", repo.staged.to_string());
        map.insert("repo.modified", repo.modified.to_string());
        map.insert("repo.untracked", repo.untracked.to_string());

        map.insert("aws.token_is_valid", aws.token_is_valid.to_string());
        map.insert(
            "aws.token_remaining_hours",
            aws.token_remaining_hours.to_string(),
        );
        map.insert(
            "aws.token_remaining_minutes",
            aws.token_remaining_minutes.to_string(),
        );

        map.insert("sys.username", sys.username.as_str());
        map.insert("sys.hostname", sys.hostname.as_str());
        map.insert("sys.uid", sys.uid.to_string());
        map.insert("sys.gid", sys.gid.to_string());
        map.insert("sys.promptchar", sys.promptchar());

        map
    }

    /// Add the fixed `cwd.*` representations of the working directory.
    pub fn with_cwd_paths(mut self, cwd: &CwdInfo) -> Self {
        self.insert("cwd.full", cwd.full());
        self.insert("cwd.basename", cwd.basename());
        self.insert("cwd.git_path", cwd.git_path());
        self.insert("cwd.home_path", cwd.home_path());
        self
    }

    pub fn insert(&mut self, token: &str, value: impl Into<String>) {
        self.values.insert(token.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values
            .get(&token.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn remove(&mut self, token: &str) -> Option<String> {
        self.values.remove(&token.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries sorted by token name.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for TokenMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key.as_ref(), value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn sample_repo() -> RepoState {
        RepoState {
            is_git_repo: 1,
            name: "myproj".to_string(),
            branch_name: "main".to_string(),
            ahead: 2,
            behind: 0,
            ..RepoState::default()
        }
    }

    #[test]
    fn test_assemble_stringifies_fields() {
        let sys = SysState {
            username: "ada".to_string(),
            hostname: "box".to_string(),
            uid: 1000,
            gid: 1000,
        };
        let map = TokenMap::assemble(&sample_repo(), &AwsState::default(), &sys);

        assert_eq!(map.get("repo.name"), Some("myproj"));
        assert_eq!(map.get("repo.is_git_repo"), Some("1"));
        assert_eq!(map.get("repo.ahead"), Some("2"));
        assert_eq!(map.get("repo.behind"), Some("0"));
        assert_eq!(map.get("repo.staged"), Some("-1"));
        assert_eq!(map.get("aws.token_is_valid"), Some("-1"));
        assert_eq!(map.get("sys.promptchar"), Some("$"));
        assert_eq!(map.get("sys.uid"), Some("1000"));
        assert!(map.get("cwd").is_none());
        assert!(map.get("spc").is_none());
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let a = TokenMap::assemble(&sample_repo(), &AwsState::default(), &SysState::default());
        let b = TokenMap::assemble(&sample_repo(), &AwsState::default(), &SysState::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_strings_are_empty_not_missing() {
        let map = TokenMap::assemble(
            &RepoState::not_a_repo(),
            &AwsState::default(),
            &SysState::default(),
        );
        assert_eq!(map.get("repo.name"), Some(""));
        assert_eq!(map.get("sys.hostname"), Some(""));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut map = TokenMap::new();
        map.insert("Repo.Name", "x");
        assert_eq!(map.get("REPO.NAME"), Some("x"));
        assert_eq!(map.sorted(), vec![("repo.name", "x")]);
        assert_eq!(map.remove("repo.NAME"), Some("x".to_string()));
        assert!(map.is_empty());
    }

    #[test]
    fn test_cwd_paths() {
        let cwd = CwdInfo::new("/home/ada/proj/src")
            .with_home(Some(PathBuf::from("/home/ada")))
            .with_repo_root(Some(PathBuf::from("/home/ada/proj")));
        let map = TokenMap::new().with_cwd_paths(&cwd);
        assert_eq!(map.get("cwd.full"), Some("/home/ada/proj/src"));
        assert_eq!(map.get("cwd.basename"), Some("src"));
        assert_eq!(map.get("cwd.git_path"), Some("+/src"));
        assert_eq!(map.get("cwd.home_path"), Some("~/proj/src"));
    }
}
