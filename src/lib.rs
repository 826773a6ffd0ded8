//! # git-transfer
//!
//! A CLI tool to move commits from one branch to another.
//!
//! This crate provides functionality to:
//! - Resolve a source and a destination branch
//! - Cherry-pick single commits or ranges onto the destination, oldest first
//! - Drop those commits from the source with a non-interactive `git rebase -i`
//! - Return to the branch the user started on
//!
//! ## Usage
//!
//! ```bash
//! # Move one commit from `feature` to `main`
//! git-transfer feature main abc123
//!
//! # Move everything `feature` has that `main` lacks, one rebase per commit
//! git-transfer --per-commit feature main main..feature
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface and main entry point
//! - [`transfer`] - The replay-then-remove orchestrator
//! - [`context`] - Scoped save/restore of the current checkout
//! - [`vcs`] - Backend trait the orchestrator runs against
//! - [`git`] - `git` command wrappers and the real backend
//! - [`revs`] - Commit token and `rev-list` parsing
//! - [`settings`] - Conflict policy and removal strategy
//! - [`sequence_editor`] - Rebase todo file transformation
//! - [`prompt`] - User confirmation abstraction
//! - [`banner`] - Decorative plan banner
//! - [`error`] - Error type and exit codes

pub mod banner;
pub mod cli;
pub mod context;
pub mod error;
pub mod git;
pub mod prompt;
pub mod revs;
pub mod sequence_editor;
pub mod settings;
pub mod transfer;
pub mod vcs;

#[cfg(test)]
pub(crate) mod mock;

pub use error::{Result, TransferError};
