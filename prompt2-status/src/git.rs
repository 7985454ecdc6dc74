//! Repository inspection using the git2 crate.

use std::path::Path;

use git2::{BranchType, ErrorCode, Oid, Reference, Repository, StatusOptions};
use tracing::{debug, warn};

use prompt2_core::state::{NO_DATA, RepoState};

use crate::error::StatusResult;

/// Hex digits shown for a detached HEAD.
const SHORT_OID_LEN: usize = 7;

/// Gather the repository facts for `path`.
///
/// Walks up from `path` to find the repository. Outside any repository
/// the result is [`RepoState::not_a_repo`]; facts that cannot be read are
/// left at their sentinel values.
pub fn inspect_repo(path: &Path) -> RepoState {
    let repo = match Repository::discover(path) {
        Ok(repo) => repo,
        Err(err) => {
            debug!("No repository at {:?}: {}", path, err.message());
            return RepoState::not_a_repo();
        }
    };

    let mut state = RepoState {
        is_git_repo: 1,
        root: repo.workdir().map(Path::to_path_buf),
        ..RepoState::default()
    };
    if let Err(err) = read_repo(&repo, &mut state) {
        warn!("Could not read repository at {:?}: {}", repo.path(), err);
    }
    state
}

fn read_repo(repo: &Repository, state: &mut RepoState) -> StatusResult<()> {
    state.rebase_active = flag(rebase_in_progress(repo));

    let head = match repo.head() {
        Ok(head) => Some(head),
        Err(err) if matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
        Err(err) => return Err(err.into()),
    };

    match &head {
        Some(head) => {
            state.name = repo_name(repo);
            state.branch_name = branch_name(repo, head)?;
        }
        None => {
            state.is_fresh = true;
            state.name = NO_DATA.to_string();
            state.branch_name = NO_DATA.to_string();
        }
    }

    if !repo.is_bare() {
        count_status(repo, state)?;
    }

    if let Some(head) = &head {
        count_upstream(repo, head, state)?;
    }
    Ok(())
}

fn flag(value: bool) -> i32 {
    i32::from(value)
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn rebase_in_progress(repo: &Repository) -> bool {
    let git_dir = repo.path();
    git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists()
}

fn repo_name(repo: &Repository) -> String {
    let dir = repo.workdir().unwrap_or_else(|| repo.path());
    dir.file_name()
        .map(|name| name.to_string_lossy().trim_end_matches(".git").to_string())
        .unwrap_or_else(|| NO_DATA.to_string())
}

fn branch_name(repo: &Repository, head: &Reference<'_>) -> StatusResult<String> {
    if repo.head_detached()? {
        let oid = head.peel_to_commit()?.id();
        return Ok(oid.to_string().chars().take(SHORT_OID_LEN).collect());
    }
    Ok(head.shorthand().unwrap_or(NO_DATA).to_string())
}

fn count_status(repo: &Repository, state: &mut RepoState) -> StatusResult<()> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .renames_head_to_index(true);
    let statuses = repo.statuses(Some(&mut opts))?;

    let (mut conflicts, mut staged, mut modified, mut untracked) = (0, 0, 0, 0);
    for entry in statuses.iter() {
        let status = entry.status();
        if status.is_conflicted() {
            conflicts += 1;
            continue;
        }
        if status.is_index_new()
            || status.is_index_modified()
            || status.is_index_renamed()
            || status.is_index_deleted()
            || status.is_index_typechange()
        {
            staged += 1;
        }
        if status.is_wt_modified()
            || status.is_wt_deleted()
            || status.is_wt_renamed()
            || status.is_wt_typechange()
        {
            modified += 1;
        }
        if status.is_wt_new() {
            untracked += 1;
        }
    }

    state.conflicts = count(conflicts);
    state.staged = count(staged);
    state.modified = count(modified);
    state.untracked = count(untracked);
    Ok(())
}

/// Tracking branch tip: the configured upstream, else `origin/<branch>`.
fn upstream_target(repo: &Repository, head: &Reference<'_>) -> Option<Oid> {
    if !head.is_branch() {
        return None;
    }
    let name = head.shorthand()?;

    let configured = repo
        .find_branch(name, BranchType::Local)
        .and_then(|branch| branch.upstream())
        .ok()
        .and_then(|upstream| upstream.get().target());
    configured.or_else(|| repo.refname_to_id(&format!("refs/remotes/origin/{name}")).ok())
}

fn count_upstream(
    repo: &Repository,
    head: &Reference<'_>,
    state: &mut RepoState,
) -> StatusResult<()> {
    let (Some(local), Some(upstream)) = (head.target(), upstream_target(repo, head)) else {
        state.has_upstream = 0;
        return Ok(());
    };

    let (ahead, behind) = repo.graph_ahead_behind(local, upstream)?;
    debug!(ahead, behind, "compared with upstream");
    state.has_upstream = 1;
    state.ahead = count(ahead);
    state.behind = count(behind);
    Ok(())
}
