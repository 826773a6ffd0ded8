use crate::error::Result;
use crate::revs::CommitToken;

use std::fmt;

/// The checkout the user was on when the tool started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Context {
    /// A local branch, by short name.
    Branch(String),
    /// A detached HEAD, by commit id.
    Detached(String),
}

impl Context {
    /// Whether this context is the named branch.
    pub fn is_branch(&self, name: &str) -> bool {
        matches!(self, Context::Branch(b) if b == name)
    }

    /// The argument to pass to `git checkout` to get back here.
    pub fn checkout_target(&self) -> &str {
        match self {
            Context::Branch(name) | Context::Detached(name) => name,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Branch(name) => write!(f, "{}", name),
            Context::Detached(id) => write!(f, "detached HEAD at {}", id),
        }
    }
}

/// Version-control operations a transfer needs.
///
/// [`crate::git::GitCli`] implements this by running `git`. Tests substitute
/// a recording fake.
pub trait Vcs {
    /// Resolves a name to a local branch's short name.
    fn resolve_branch(&self, name: &str) -> Result<String>;

    /// The current working context.
    fn current_context(&self) -> Result<Context>;

    /// Switches the working context to a branch or commit.
    fn checkout(&self, target: &str) -> Result<()>;

    /// Expands a token into full commit ids, oldest first.
    fn list_commits(&self, token: &CommitToken) -> Result<Vec<String>>;

    /// Replays one commit onto the current checkout.
    fn cherry_pick(&self, commit: &str) -> Result<()>;

    /// Abandons a cherry-pick that stopped on a conflict.
    fn cherry_pick_abort(&self) -> Result<()>;

    /// Best common ancestor of two refs.
    fn merge_base(&self, a: &str, b: &str) -> Result<String>;

    /// Whether `commit` is reachable from `branch`.
    fn is_ancestor(&self, commit: &str, branch: &str) -> Result<bool>;

    /// Rewrites `branch` from `base` to its tip, dropping every id in `drop`.
    ///
    /// Leaves the working context where it was on success.
    fn drop_commits(&self, branch: &str, base: &str, drop: &[String]) -> Result<()>;

    /// Whether a cherry-pick or rebase is stopped waiting for the user.
    fn operation_in_progress(&self) -> bool;
}
