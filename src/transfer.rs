use crate::context::ContextGuard;
use crate::error::{Result, TransferError};
use crate::prompt::{ConfirmPrompter, confirm_rewrite};
use crate::revs::CommitToken;
use crate::settings::{ConflictPolicy, RemovalStrategy, Settings};
use crate::vcs::Vcs;

use std::collections::{HashMap, HashSet};

/// Resolved inputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub source: String,
    pub dest: String,
    pub tokens: Vec<CommitToken>,
}

impl Plan {
    /// Resolves both branch names and classifies the commit tokens.
    ///
    /// # Errors
    ///
    /// [`TransferError::Usage`] if either name is not a local branch. Nothing
    /// has been changed at that point.
    pub fn resolve<V: Vcs + ?Sized>(
        vcs: &V,
        from: &str,
        to: &str,
        refs: &[String],
    ) -> Result<Self> {
        let source = vcs.resolve_branch(from)?;
        let dest = vcs.resolve_branch(to)?;
        if source == dest {
            return Err(TransferError::usage(format!(
                "source and destination are both `{}`",
                source
            )));
        }

        Ok(Plan {
            source,
            dest,
            tokens: refs.iter().map(|r| CommitToken::parse(r)).collect(),
        })
    }
}

/// Why a commit was not removed from the source branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Replay failed and the conflict policy said to skip it.
    ReplayFailed,
    /// The commit is not in the part of the source history that can be rewritten.
    NotOnSource,
    /// The user declined the rewrite.
    Declined,
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Commits cherry-picked onto the destination, in order.
    pub replayed: Vec<String>,
    /// Commits dropped from the source, in order.
    pub removed: Vec<String>,
    /// Commits left on the source, with the reason.
    pub skipped: Vec<(String, SkipReason)>,
    /// Exit code of the last failing sub-operation, `0` if none failed.
    pub exit_code: i32,
}

/// One line of a dry-run preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCommit {
    pub id: String,
    pub removable: bool,
}

/// Runs a [`Plan`] against a [`Vcs`].
pub struct Transfer<'a, V: Vcs + ?Sized> {
    vcs: &'a V,
    settings: Settings,
}

/// Remembers the user's answer to the rewrite question for the whole run.
struct Approval {
    asked: Option<bool>,
}

impl<'a, V: Vcs + ?Sized> Transfer<'a, V> {
    pub fn new(vcs: &'a V, settings: Settings) -> Self {
        Transfer { vcs, settings }
    }

    /// Expands every token and reports which commits could be removed from
    /// the source. Changes nothing.
    pub fn preview(&self, plan: &Plan) -> Result<Vec<PlannedCommit>> {
        let mut known_base = None;
        let mut seen = HashSet::new();
        let mut planned = Vec::new();
        for token in &plan.tokens {
            for id in self.vcs.list_commits(token)? {
                if !seen.insert(id.clone()) {
                    continue;
                }
                let base = self.base(plan, &mut known_base)?;
                let removable = self.removable(&id, &plan.source, &base)?;
                planned.push(PlannedCommit { id, removable });
            }
        }
        Ok(planned)
    }

    /// Performs the transfer.
    ///
    /// The working context is switched to the destination for the duration
    /// of the run and restored on every exit path.
    pub fn run<P: ConfirmPrompter + ?Sized>(
        &self,
        plan: &Plan,
        prompter: &mut P,
    ) -> Result<Outcome> {
        let original = self.vcs.current_context()?;
        let guard = ContextGuard::enter(self.vcs, original, &plan.dest)?;
        log::debug!(
            "transferring from {} to {} (started on {})",
            plan.source,
            plan.dest,
            guard.original()
        );

        let mut known_base = None;
        let mut outcome = Outcome::default();
        let mut pending: Vec<String> = Vec::new();
        let mut approval = Approval { asked: None };
        let mut renamed: HashMap<String, String> = HashMap::new();
        let mut seen: HashSet<String> = HashSet::new();

        for token in &plan.tokens {
            let mut ids = self.vcs.list_commits(token)?;
            if ids.is_empty() {
                log::warn!("`{}` names no commits", token.as_str());
            }
            for id in ids.iter_mut() {
                while let Some(newer) = renamed.get(id.as_str()) {
                    *id = newer.clone();
                }
            }

            let mut next = 0;
            while next < ids.len() {
                let id = ids[next].clone();
                next += 1;

                if seen.contains(&id) {
                    log::debug!("{} was already moved by an earlier token", id);
                    continue;
                }
                // Resolved before the first replay, which can move the merge base.
                let base = self.base(plan, &mut known_base)?;

                if let Err(e) = self.vcs.cherry_pick(&id) {
                    if !matches!(e, TransferError::Conflict { .. }) {
                        return Err(e);
                    }
                    outcome.exit_code = e.exit_code();
                    match self.settings.on_conflict {
                        ConflictPolicy::Abort => {
                            self.abandon_pick()?;
                            self.flush(
                                plan,
                                &base,
                                &mut pending,
                                &mut outcome,
                                &mut approval,
                                &mut *prompter,
                            )?;
                            guard.restore()?;
                            return Err(e);
                        }
                        ConflictPolicy::Skip => {
                            log::warn!("{}; leaving it on {}", e, plan.source);
                            self.abandon_pick()?;
                            outcome.skipped.push((id, SkipReason::ReplayFailed));
                            continue;
                        }
                        ConflictPolicy::Continue => {
                            log::warn!("{}; removing it from {} anyway", e, plan.source);
                        }
                    }
                } else {
                    outcome.replayed.push(id.clone());
                }
                seen.insert(id.clone());

                if !self.removable(&id, &plan.source, &base)? {
                    log::warn!(
                        "{} is not on {} past {}; not removing it",
                        id,
                        plan.source,
                        base
                    );
                    outcome.skipped.push((id, SkipReason::NotOnSource));
                    continue;
                }

                match self.settings.removal {
                    RemovalStrategy::Batch => pending.push(id),
                    RemovalStrategy::PerCommit => {
                        let approved = approval.get(
                            &mut *prompter,
                            self.settings.confirm,
                            &plan.source,
                            1,
                        )?;
                        if !approved {
                            outcome.skipped.push((id, SkipReason::Declined));
                            continue;
                        }
                        for (old, new) in self.drop_one(plan, &base, &id)? {
                            for later in ids[next..].iter_mut().filter(|l| **l == old) {
                                *later = new.clone();
                            }
                            renamed.insert(old, new);
                        }
                        outcome.removed.push(id);
                    }
                }
            }
        }

        if let Some(base) = &known_base {
            self.flush(
                plan,
                base,
                &mut pending,
                &mut outcome,
                &mut approval,
                &mut *prompter,
            )?;
        }
        guard.restore()?;
        Ok(outcome)
    }

    /// The merge base of the destination and the source, looked up once per
    /// run and only when a commit needs it.
    fn base(&self, plan: &Plan, cached: &mut Option<String>) -> Result<String> {
        if let Some(base) = cached {
            return Ok(base.clone());
        }
        let base = self.vcs.merge_base(&plan.dest, &plan.source)?;
        log::debug!("{} and {} meet at {}", plan.dest, plan.source, base);
        *cached = Some(base.clone());
        Ok(base)
    }

    /// Aborts a stopped cherry-pick, if there is one.
    fn abandon_pick(&self) -> Result<()> {
        if self.vcs.operation_in_progress() {
            self.vcs.cherry_pick_abort()?;
        }
        Ok(())
    }

    /// A commit can be dropped if the source reaches it and the merge base
    /// does not.
    fn removable(&self, id: &str, source: &str, base: &str) -> Result<bool> {
        Ok(self.vcs.is_ancestor(id, source)? && !self.vcs.is_ancestor(id, base)?)
    }

    /// Drops every pending commit from the source in one rewrite.
    fn flush<P: ConfirmPrompter + ?Sized>(
        &self,
        plan: &Plan,
        base: &str,
        pending: &mut Vec<String>,
        outcome: &mut Outcome,
        approval: &mut Approval,
        prompter: &mut P,
    ) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(pending);

        if !approval.get(prompter, self.settings.confirm, &plan.source, batch.len())? {
            outcome
                .skipped
                .extend(batch.into_iter().map(|id| (id, SkipReason::Declined)));
            return Ok(());
        }

        log::info!("dropping {} commit(s) from {}", batch.len(), plan.source);
        self.vcs.drop_commits(&plan.source, base, &batch)?;
        outcome.removed.extend(batch);
        Ok(())
    }

    /// Drops one commit from the source and returns the `(old, new)` ids of
    /// the commits the rewrite renamed.
    fn drop_one(&self, plan: &Plan, base: &str, id: &str) -> Result<Vec<(String, String)>> {
        let span = CommitToken::Range(format!("{}..{}", base, plan.source));

        let before = self.vcs.list_commits(&span)?;
        self.vcs
            .drop_commits(&plan.source, base, std::slice::from_ref(&id.to_string()))?;
        let after = self.vcs.list_commits(&span)?;

        let kept: Vec<String> = before.into_iter().filter(|c| c != id).collect();
        if kept.len() != after.len() {
            log::warn!(
                "{} changed shape after dropping {}; later commits keep their old ids",
                plan.source,
                id
            );
            return Ok(Vec::new());
        }

        Ok(kept
            .into_iter()
            .zip(after)
            .filter(|(old, new)| old != new)
            .inspect(|(old, new)| log::debug!("{} is now {}", old, new))
            .collect())
    }
}

impl Approval {
    fn get<P: ConfirmPrompter + ?Sized>(
        &mut self,
        prompter: &mut P,
        confirm: bool,
        branch: &str,
        count: usize,
    ) -> Result<bool> {
        if !confirm {
            return Ok(true);
        }
        if let Some(answer) = self.asked {
            return Ok(answer);
        }
        let answer = confirm_rewrite(prompter, branch, count)
            .map_err(|e| TransferError::environment(format!("prompt error: {}", e)))?;
        self.asked = Some(answer);
        Ok(answer)
    }
}
