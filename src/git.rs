use crate::error::{Result, TransferError};
use crate::revs::{CommitToken, parse_rev_list};
use crate::sequence_editor::DROP_ENV;
use crate::vcs::{Context, Vcs};

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Builds the value for the `GIT_SEQUENCE_EDITOR` environment variable.
///
/// Wraps `exe_path` in quotes if it contains spaces, and appends the `--sequence-editor`
/// argument.
///
/// # Examples
///
/// ```ignore
/// let path = "/usr/local/bin/git-transfer";
/// assert_eq!(
///     build_sequence_editor_env(path),
///     "/usr/local/bin/git-transfer --sequence-editor"
/// );
///
/// let path_with_space = "/path/with space/git-transfer";
/// assert_eq!(
///     build_sequence_editor_env(path_with_space),
///     "\"/path/with space/git-transfer\" --sequence-editor"
/// );
/// ```
pub(crate) fn build_sequence_editor_env(exe_path: &str) -> String {
    let quoted = if exe_path.contains(' ') {
        format!("\"{}\"", exe_path)
    } else {
        exe_path.to_string()
    };

    format!("{quoted} --sequence-editor")
}

/// Renders the arguments of a `git` command for logs and error messages.
fn describe(cmd: &Command) -> String {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs a git command with inherited stdio and returns only its exit status.
///
/// The user sees git's own output (conflict markers, rebase progress) directly.
///
/// # Returns
///
/// * `Ok(())` if the command exited with status `0`.
/// * `Err(TransferError::Git)` carrying the child's exit code otherwise, or
///   the spawn error if the process could not start.
fn run_status(mut cmd: Command) -> Result<()> {
    let command = describe(&cmd);
    log::debug!("git {}", command);

    match cmd.status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(TransferError::Git {
                    command,
                    code: status.code(),
                    stderr: String::new(),
                })
            }
        }
        Err(e) => Err(TransferError::Git {
            command,
            code: None,
            stderr: e.to_string(),
        }),
    }
}

/// Runs a command and returns its trimmed standard output on success,
/// or an error carrying its trimmed standard error on failure.
fn run_output(mut cmd: Command) -> Result<String> {
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    let command = describe(&cmd);
    log::debug!("git {}", command);

    match cmd.output() {
        Ok(out) => {
            if out.status.success() {
                Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
            } else {
                Err(TransferError::Git {
                    command,
                    code: out.status.code(),
                    stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
                })
            }
        }
        Err(e) => Err(TransferError::Git {
            command,
            code: None,
            stderr: e.to_string(),
        }),
    }
}

fn git() -> Command {
    Command::new("git")
}

/// Runs `git rev-parse <flag>` and returns its output as a trimmed string.
///
/// Used to query repository metadata such as `--show-toplevel` or `--git-dir`.
pub fn rev_parse(flag: &str) -> Result<String> {
    let mut cmd = git();
    cmd.arg("rev-parse").arg(flag);
    run_output(cmd)
}

/// Runs `git config --get <key>` and returns the value as a trimmed string.
///
/// A missing key (or any other failure) yields an empty string rather than an
/// error, so callers can treat "unset" and "empty" alike.
///
/// # Examples
///
/// ```ignore
/// // Ignored because it requires a Git repository.
/// use git_transfer::git::config_get;
///
/// let policy = config_get("transfer.onConflict");
/// if policy.is_empty() {
///     println!("using the default conflict policy");
/// }
/// ```
pub fn config_get(key: &str) -> String {
    let mut cmd = git();
    cmd.arg("config").arg("--get").arg(key);
    run_output(cmd).unwrap_or_default()
}

/// Detects if a Git rebase is currently in progress.
///
/// This checks for the presence of the `rebase-merge` or `rebase-apply`
/// directories inside `.git/`, which are created by Git during an interactive
/// or apply-style rebase.
pub fn rebase_in_progress(git_dir: &Path) -> bool {
    git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists()
}

/// Detects a cherry-pick stopped on a conflict.
pub fn cherry_pick_in_progress(git_dir: &Path) -> bool {
    git_dir.join("CHERRY_PICK_HEAD").exists()
}

/// [`Vcs`] backed by the `git` executable in the current repository.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    git_dir: PathBuf,
}

impl GitCli {
    /// Verifies git is available and locates the enclosing repository.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Environment`] if `git` is not on `PATH` or the
    /// current directory is not inside a work tree.
    pub fn discover() -> Result<Self> {
        if which::which("git").is_err() {
            return Err(TransferError::environment("`git` not found in PATH."));
        }

        let root = match rev_parse("--show-toplevel") {
            Ok(s) => PathBuf::from(s),
            Err(e) => {
                return Err(TransferError::environment(format!(
                    "not inside a git repo ({})",
                    e
                )));
            }
        };

        let git_dir = match rev_parse("--git-dir") {
            Ok(s) => {
                let p = PathBuf::from(s);
                if p.is_absolute() { p } else { root.join(p) }
            }
            Err(e) => {
                return Err(TransferError::environment(format!(
                    "unable to locate .git dir ({})",
                    e
                )));
            }
        };

        Ok(GitCli { root, git_dir })
    }

    /// Work tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the repository directory, for display.
    pub fn repo_name(&self) -> String {
        self.root
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("current repository")
            .to_string()
    }
}

impl Vcs for GitCli {
    fn resolve_branch(&self, name: &str) -> Result<String> {
        if name.is_empty() || name.starts_with('-') {
            return Err(TransferError::usage(format!("`{}` is not a branch", name)));
        }

        let mut cmd = git();
        cmd.args(["rev-parse", "--verify", "--quiet", "--symbolic-full-name"])
            .arg(name);
        let full = run_output(cmd)
            .map_err(|_| TransferError::usage(format!("`{}` is not a branch", name)))?;

        match full.strip_prefix("refs/heads/") {
            Some(short) if !short.is_empty() => Ok(short.to_string()),
            _ => Err(TransferError::usage(format!("`{}` is not a branch", name))),
        }
    }

    fn current_context(&self) -> Result<Context> {
        let mut cmd = git();
        cmd.args(["symbolic-ref", "--quiet", "--short", "HEAD"]);
        match run_output(cmd) {
            Ok(branch) => Ok(Context::Branch(branch)),
            Err(_) => rev_parse("HEAD").map(Context::Detached),
        }
    }

    fn checkout(&self, target: &str) -> Result<()> {
        let mut cmd = git();
        cmd.arg("checkout").arg(target);
        run_status(cmd)
    }

    fn list_commits(&self, token: &CommitToken) -> Result<Vec<String>> {
        match token {
            CommitToken::Single(r) => {
                let mut cmd = git();
                cmd.args(["rev-parse", "--verify", "--quiet"])
                    .arg(format!("{}^{{commit}}", r));
                let id = run_output(cmd).map_err(|e| match e {
                    TransferError::Git { command, code, .. } => TransferError::Git {
                        command,
                        code,
                        stderr: format!("`{}` is not a commit", r),
                    },
                    other => other,
                })?;
                Ok(vec![id])
            }
            CommitToken::Range(range) => {
                let mut cmd = git();
                cmd.args(["rev-list", "--reverse", "--left-right"])
                    .arg(range)
                    .arg("--");
                run_output(cmd).map(|out| parse_rev_list(&out))
            }
        }
    }

    fn cherry_pick(&self, commit: &str) -> Result<()> {
        let mut cmd = git();
        cmd.arg("cherry-pick").arg(commit);
        run_status(cmd).map_err(|e| match e {
            TransferError::Git { code, .. } => TransferError::Conflict {
                commit: commit.to_string(),
                code,
            },
            other => other,
        })
    }

    fn cherry_pick_abort(&self) -> Result<()> {
        let mut cmd = git();
        cmd.args(["cherry-pick", "--abort"]);
        run_status(cmd)
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        let mut cmd = git();
        cmd.arg("merge-base").arg(a).arg(b);
        run_output(cmd)
    }

    fn is_ancestor(&self, commit: &str, branch: &str) -> Result<bool> {
        let mut cmd = git();
        cmd.args(["merge-base", "--is-ancestor"]).arg(commit).arg(branch);
        match run_output(cmd) {
            Ok(_) => Ok(true),
            Err(TransferError::Git { code: Some(1), .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Runs `git rebase -i <base> <branch>` with this executable installed as
    /// the sequence editor, so the todo list is edited without a human.
    ///
    /// The rebase checks out `branch`; on success the previous context is
    /// checked out again. On failure the repository is left mid-rebase for the
    /// user to resolve.
    fn drop_commits(&self, branch: &str, base: &str, drop: &[String]) -> Result<()> {
        if drop.is_empty() {
            return Ok(());
        }

        let before = self.current_context()?;

        let exe = std::env::current_exe().map_err(|e| {
            TransferError::environment(format!("cannot locate current executable: {}", e))
        })?;
        let editor = build_sequence_editor_env(&exe.to_string_lossy());

        let mut cmd = git();
        cmd.args(["rebase", "-i"]).arg(base).arg(branch);
        cmd.env("GIT_SEQUENCE_EDITOR", editor);
        cmd.env(DROP_ENV, drop.join(" "));
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
        run_status(cmd)?;

        if self.current_context()? != before {
            let mut back = git();
            back.args(["checkout", "--quiet"]).arg(before.checkout_target());
            run_status(back)?;
        }
        Ok(())
    }

    fn operation_in_progress(&self) -> bool {
        rebase_in_progress(&self.git_dir) || cherry_pick_in_progress(&self.git_dir)
    }
}
