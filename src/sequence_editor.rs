use crate::error::{Result, TransferError};
use crate::revs::abbrev_matches;

use std::{
    fs::{File, read_to_string},
    io::Write,
    path::Path,
};

/// Environment variable carrying the whitespace-separated commit ids the
/// todo list must drop.
pub const DROP_ENV: &str = "GIT_TRANSFER_DROP";

/// Entry point when git invokes this binary as `GIT_SEQUENCE_EDITOR`.
///
/// # Arguments
///
/// * `todo_path` - Optional path to the todo file.
///
/// # Returns
///
/// * `Ok(())` on success.
/// * `Err` if the file path or the drop list is missing, or an I/O operation fails.
pub fn run(todo_path: Option<&str>) -> Result<()> {
    let path = match todo_path {
        Some(p) => p,
        None => return Err(TransferError::Editor(String::from("missing todo file path"))),
    };

    let drops = match std::env::var(DROP_ENV) {
        Ok(v) => parse_drop_list(&v),
        Err(_) => return Err(TransferError::Editor(format!("{} is not set", DROP_ENV))),
    };

    rewrite(Path::new(path), &drops)
}

/// Splits the drop list carried in [`DROP_ENV`].
pub fn parse_drop_list(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Reads the todo file at `path`, turns every `pick` line naming one of
/// `drops` into a `drop` line, and writes the result back.
pub fn rewrite(path: &Path, drops: &[String]) -> Result<()> {
    let body = match read_to_string(path) {
        Ok(content) => content,
        Err(e) => return Err(TransferError::Editor(format!("read failed: {}", e))),
    };

    let transformed = body
        .lines()
        .map(|line| transform_line(line, drops))
        .collect::<Vec<String>>()
        .join("\n")
        + "\n";

    let mut file = match File::create(path) {
        Ok(f) => f,
        Err(e) => return Err(TransferError::Editor(format!("create failed: {}", e))),
    };

    match file.write_all(transformed.as_bytes()) {
        Ok(_) => Ok(()),
        Err(e) => Err(TransferError::Editor(format!("write failed: {}", e))),
    }
}

/// Converts a single line from a rebase todo file.
///
/// Comments and non-`pick` commands pass through. A `pick` (or `p`) line whose
/// abbreviated id matches an entry in `drops` becomes `drop`, keeping its
/// indentation, id and subject. Lines are never removed outright, since
/// `rebase.missingCommitsCheck=error` rejects a todo list with missing picks.
fn transform_line(line: &str, drops: &[String]) -> String {
    let trimmed = line.trim_start();

    if trimmed.starts_with('#') {
        return line.to_string();
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim_start();

    if command != "pick" && command != "p" {
        return line.to_string();
    }

    let id = rest.split_whitespace().next().unwrap_or("");
    if !drops.iter().any(|d| abbrev_matches(id, d)) {
        return line.to_string();
    }

    let indent = &line[..line.len() - trimmed.len()];
    format!("{}drop {}", indent, rest)
}
