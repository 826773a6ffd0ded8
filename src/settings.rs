use crate::error::{Result, TransferError};

use clap::ValueEnum;
use std::str::FromStr;

/// What to do when replaying a commit onto the destination fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConflictPolicy {
    /// Abort the failed cherry-pick and stop once the commits already moved are removed.
    #[default]
    Abort,
    /// Abort the failed cherry-pick and keep that commit on the source.
    Skip,
    /// Remove the commit from the source anyway.
    Continue,
}

/// How commits are removed from the source branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RemovalStrategy {
    /// One history rewrite after every commit has been replayed.
    #[default]
    Batch,
    /// One history rewrite per replayed commit.
    PerCommit,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        <ConflictPolicy as ValueEnum>::from_str(s.trim(), true)
    }
}

impl FromStr for RemovalStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        <RemovalStrategy as ValueEnum>::from_str(s.trim(), true)
    }
}

/// `git config` key for the conflict policy.
pub const CONFLICT_KEY: &str = "transfer.onConflict";

/// `git config` key for the removal strategy.
pub const REMOVAL_KEY: &str = "transfer.removal";

/// Effective behavior knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    pub on_conflict: ConflictPolicy,
    pub removal: RemovalStrategy,
    pub dry_run: bool,
    pub confirm: bool,
}

impl Settings {
    /// Layers explicit flags over values read from `git config`.
    ///
    /// `lookup` returns the raw config value for a key, or an empty string
    /// when the key is unset. Flags win; config fills the gaps; defaults
    /// cover the rest.
    pub fn resolve<F>(
        on_conflict: Option<ConflictPolicy>,
        removal: Option<RemovalStrategy>,
        mut lookup: F,
    ) -> Result<Self>
    where
        F: FnMut(&str) -> String,
    {
        let on_conflict = match on_conflict {
            Some(p) => p,
            None => from_config(CONFLICT_KEY, &lookup(CONFLICT_KEY))?,
        };
        let removal = match removal {
            Some(r) => r,
            None => from_config(REMOVAL_KEY, &lookup(REMOVAL_KEY))?,
        };

        Ok(Settings {
            on_conflict,
            removal,
            ..Settings::default()
        })
    }
}

fn from_config<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr<Err = String> + Default,
{
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    raw.parse::<T>()
        .map_err(|e| TransferError::usage(format!("invalid value for `{}`: {}", key, e)))
}
