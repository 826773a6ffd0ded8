/// Entry point for the `git-transfer` binary.
///
/// Delegates to the CLI entry function and exits the process with the
/// returned exit code. On error, exits with the error's own exit code.
fn main() {
    match git_transfer::cli::entry() {
        Ok(code) => std::process::exit(code),
        Err(e) => std::process::exit(e.exit_code()),
    }
}
