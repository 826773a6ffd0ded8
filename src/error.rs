use thiserror::Error;

/// Every way a transfer can fail.
///
/// Each variant maps to a process exit code through [`TransferError::exit_code`].
#[derive(Error, Debug)]
pub enum TransferError {
    /// Bad or missing arguments, including branch names that do not resolve.
    #[error("{0}")]
    Usage(String),

    /// `git` is missing, the cwd is not a repository, or similar.
    #[error("{0}")]
    Environment(String),

    /// A git subprocess exited unsuccessfully.
    #[error("`git {command}` failed{}", describe_stderr(.stderr))]
    Git {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Replaying a commit onto the destination failed.
    #[error("cherry-pick of {commit} failed")]
    Conflict { commit: String, code: Option<i32> },

    /// The rebase todo hook could not read or write its file.
    #[error("sequence editor: {0}")]
    Editor(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TransferError>;

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

impl TransferError {
    pub fn usage(msg: impl Into<String>) -> Self {
        TransferError::Usage(msg.into())
    }

    pub fn environment(msg: impl Into<String>) -> Self {
        TransferError::Environment(msg.into())
    }

    /// Process exit status for this error.
    ///
    /// Subprocess failures propagate the child's own code; a child killed by a
    /// signal (no code) maps to `1`, as does every other category.
    pub fn exit_code(&self) -> i32 {
        match self {
            TransferError::Git { code, .. } | TransferError::Conflict { code, .. } => {
                failure_code(*code)
            }
            _ => 1,
        }
    }
}

/// Normalizes an optional child exit code into a non-zero status.
pub(crate) fn failure_code(code: Option<i32>) -> i32 {
    match code {
        Some(0) | None => 1,
        Some(c) => c,
    }
}
