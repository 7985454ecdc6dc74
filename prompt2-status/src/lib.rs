//! Collectors that fill in the `prompt2-core` state objects.
//!
//! Every collector degrades instead of failing: anything that cannot be
//! read is logged and left at its sentinel value, so a prompt can always
//! be rendered.

pub mod aws;
mod error;
pub mod git;
pub mod sys;

use std::path::{Path, PathBuf};

use tracing::warn;

use prompt2_core::TokenMap;
use prompt2_core::state::{AwsState, CwdInfo, CwdType, RepoState, SysState};

pub use aws::inspect_sso_cache;
pub use error::{StatusError, StatusResult};
pub use git::inspect_repo;
pub use sys::inspect_system;

/// Everything known about the environment for one render.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub repo: RepoState,
    pub aws: AwsState,
    pub sys: SysState,
    pub cwd: CwdInfo,
}

impl Snapshot {
    /// Run every collector for the working directory `cwd`.
    pub fn gather(cwd: &Path) -> Self {
        let home = home_dir();
        let repo = inspect_repo(cwd);
        let aws = home
            .as_deref()
            .map(inspect_sso_cache)
            .unwrap_or_default();
        let sys = inspect_system();
        let cwd = CwdInfo::new(cwd)
            .with_home(home)
            .with_repo_root(repo.root.clone());

        Self {
            repo,
            aws,
            sys,
            cwd,
        }
    }

    /// Token values for the renderer, with `cwd` in the given representation.
    pub fn tokens(&self, cwd_type: CwdType) -> TokenMap {
        let mut tokens =
            TokenMap::assemble(&self.repo, &self.aws, &self.sys).with_cwd_paths(&self.cwd);
        tokens.insert("cwd", self.cwd.render(cwd_type));
        tokens
    }
}

fn home_dir() -> Option<PathBuf> {
    match dirs::home_dir().ok_or(StatusError::MissingHome) {
        Ok(home) => Some(home),
        Err(err) => {
            warn!("{}", err);
            None
        }
    }
}
