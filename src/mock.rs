use crate::error::{Result, TransferError};
use crate::revs::CommitToken;
use crate::vcs::{Context, Vcs};

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

#[derive(Default)]
struct State {
    branches: BTreeMap<String, Vec<String>>,
    objects: HashSet<String>,
    head: Option<Context>,
    calls: Vec<String>,
    conflicts: HashSet<String>,
    failing_checkouts: HashSet<String>,
    fail_rewrite: bool,
    in_progress: bool,
}

#[derive(Default)]
pub struct MockVcs {
    state: RefCell<State>,
}

fn git_error(command: String, code: i32) -> TransferError {
    TransferError::Git {
        command,
        code: Some(code),
        stderr: String::new(),
    }
}

impl MockVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(self, name: &str, commits: &[&str]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let commits: Vec<String> = commits.iter().map(|c| c.to_string()).collect();
            state.objects.extend(commits.iter().cloned());
            state.branches.insert(name.to_string(), commits);
        }
        self
    }

    pub fn on(self, branch: &str) -> Self {
        self.state.borrow_mut().head = Some(Context::Branch(branch.to_string()));
        self
    }

    pub fn conflicting(self, commit: &str) -> Self {
        self.state.borrow_mut().conflicts.insert(commit.to_string());
        self
    }

    pub fn failing_checkout(self, target: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_checkouts
            .insert(target.to_string());
        self
    }

    pub fn failing_rewrite(self) -> Self {
        self.state.borrow_mut().fail_rewrite = true;
        self
    }

    pub fn set_in_progress(&self, value: bool) {
        self.state.borrow_mut().in_progress = value;
    }

    pub fn head(&self) -> Context {
        self.state
            .borrow()
            .head
            .clone()
            .unwrap_or(Context::Detached(String::new()))
    }

    pub fn branch(&self, name: &str) -> Vec<String> {
        self.state
            .borrow()
            .branches
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn ancestors(&self, rev: &str) -> Vec<String> {
        let state = self.state.borrow();
        if let Some(commits) = state.branches.get(rev) {
            return commits.clone();
        }
        for commits in state.branches.values() {
            if let Some(pos) = commits.iter().position(|c| c == rev) {
                return commits[..=pos].to_vec();
            }
        }
        Vec::new()
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Vcs for MockVcs {
    fn resolve_branch(&self, name: &str) -> Result<String> {
        if self.state.borrow().branches.contains_key(name) {
            Ok(name.to_string())
        } else {
            Err(TransferError::usage(format!("`{}` is not a branch", name)))
        }
    }

    fn current_context(&self) -> Result<Context> {
        Ok(self.head())
    }

    fn checkout(&self, target: &str) -> Result<()> {
        self.record(format!("checkout {}", target));
        let mut state = self.state.borrow_mut();
        if state.failing_checkouts.contains(target) {
            return Err(git_error(format!("checkout {}", target), 1));
        }
        state.head = Some(if state.branches.contains_key(target) {
            Context::Branch(target.to_string())
        } else {
            Context::Detached(target.to_string())
        });
        Ok(())
    }

    fn list_commits(&self, token: &CommitToken) -> Result<Vec<String>> {
        match token {
            CommitToken::Single(r) => {
                let state = self.state.borrow();
                if let Some(commits) = state.branches.get(r) {
                    Ok(commits.last().cloned().into_iter().collect())
                } else if state.objects.contains(r) {
                    Ok(vec![r.clone()])
                } else {
                    Err(git_error(format!("rev-parse {}", r), 128))
                }
            }
            CommitToken::Range(range) => {
                let (left, right) = match range.split_once("...") {
                    Some(parts) => parts,
                    None => range.split_once("..").unwrap_or((range.as_str(), "")),
                };
                let exclude: HashSet<String> = self.ancestors(left).into_iter().collect();
                Ok(self
                    .ancestors(right)
                    .into_iter()
                    .filter(|c| !exclude.contains(c))
                    .collect())
            }
        }
    }

    fn cherry_pick(&self, commit: &str) -> Result<()> {
        self.record(format!("cherry-pick {}", commit));
        let mut state = self.state.borrow_mut();
        if state.conflicts.contains(commit) {
            state.in_progress = true;
            return Err(TransferError::Conflict {
                commit: commit.to_string(),
                code: Some(1),
            });
        }
        let branch = match &state.head {
            Some(Context::Branch(b)) => b.clone(),
            _ => return Err(git_error(format!("cherry-pick {}", commit), 128)),
        };
        let picked = format!("{}'", commit);
        state.objects.insert(picked.clone());
        if let Some(commits) = state.branches.get_mut(&branch) {
            commits.push(picked);
        }
        Ok(())
    }

    fn cherry_pick_abort(&self) -> Result<()> {
        self.record("cherry-pick --abort".to_string());
        self.state.borrow_mut().in_progress = false;
        Ok(())
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        let left = self.ancestors(a);
        let right = self.ancestors(b);
        left.iter()
            .zip(right.iter())
            .take_while(|(x, y)| x == y)
            .last()
            .map(|(x, _)| x.clone())
            .ok_or_else(|| git_error(format!("merge-base {} {}", a, b), 1))
    }

    fn is_ancestor(&self, commit: &str, branch: &str) -> Result<bool> {
        Ok(self.ancestors(branch).iter().any(|c| c == commit))
    }

    fn drop_commits(&self, branch: &str, base: &str, drop: &[String]) -> Result<()> {
        if drop.is_empty() {
            return Ok(());
        }
        self.record(format!("rebase {} drop {}", branch, drop.join(",")));

        let mut state = self.state.borrow_mut();
        if state.fail_rewrite {
            state.in_progress = true;
            return Err(git_error(format!("rebase -i {} {}", base, branch), 1));
        }

        let commits = state.branches.get(branch).cloned().unwrap_or_default();
        let start = commits.iter().position(|c| c == base).map_or(0, |p| p + 1);
        let mut rewritten = commits[..start].to_vec();
        let mut changed = false;
        for c in &commits[start..] {
            if drop.contains(c) {
                changed = true;
            } else if changed {
                let renamed = format!("{}*", c);
                state.objects.insert(renamed.clone());
                rewritten.push(renamed);
            } else {
                rewritten.push(c.clone());
            }
        }
        state.branches.insert(branch.to_string(), rewritten);
        Ok(())
    }

    fn operation_in_progress(&self) -> bool {
        self.state.borrow().in_progress
    }
}
