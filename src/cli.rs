use crate::{
    banner::print_banner,
    error::{Result, TransferError},
    git::{self, GitCli},
    prompt,
    sequence_editor,
    settings::{ConflictPolicy, RemovalStrategy, Settings},
    transfer::{Outcome, PlannedCommit, Plan, SkipReason, Transfer},
};

use clap::{ArgAction, CommandFactory, Parser, error::ErrorKind};
use console::style;
use env_logger::Env;
use std::env;

#[derive(Parser, Debug)]
#[command(
    name = "git-transfer",
    version,
    about = "Move commits from one branch to another"
)]
struct Args {
    /// Branch the commits are taken from
    from: String,

    /// Branch the commits are replayed onto
    to: String,

    /// Commits or ranges (`A..B`, `A...B`) to move, applied in order
    commits: Vec<String>,

    /// What to do when a cherry-pick fails [default: transfer.onConflict or abort]
    #[arg(long, value_enum, value_name = "POLICY")]
    on_conflict: Option<ConflictPolicy>,

    /// Rewrite <FROM> once per commit instead of once at the end
    #[arg(long, conflicts_with = "batch")]
    per_commit: bool,

    /// Rewrite <FROM> once after every commit is replayed
    #[arg(long)]
    batch: bool,

    /// Show what would be moved without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Ask before rewriting the history of <FROM>
    #[arg(long)]
    confirm: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn removal(&self) -> Option<RemovalStrategy> {
        if self.per_commit {
            Some(RemovalStrategy::PerCommit)
        } else if self.batch {
            Some(RemovalStrategy::Batch)
        } else {
            None
        }
    }
}

/// Prints the one-line usage summary to stdout.
fn print_usage() {
    println!("{}", Args::command().render_usage());
    println!("Try 'git-transfer --help' for more information.");
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn short(id: &str) -> &str {
    id.get(..10).unwrap_or(id)
}

fn print_preview(plan: &Plan, planned: &[PlannedCommit]) {
    if planned.is_empty() {
        println!("{}", style("Nothing to transfer.").yellow().bold());
        return;
    }
    for commit in planned {
        if commit.removable {
            println!(
                "  {} {}",
                style("move").green().bold(),
                short(&commit.id)
            );
        } else {
            println!(
                "  {} {} (not on {}; will only be copied)",
                style("copy").yellow().bold(),
                short(&commit.id),
                plan.source
            );
        }
    }
}

fn print_outcome(plan: &Plan, outcome: &Outcome) {
    for (id, reason) in &outcome.skipped {
        let why = match reason {
            SkipReason::ReplayFailed => "cherry-pick failed",
            SkipReason::NotOnSource => "not on the source branch",
            SkipReason::Declined => "rewrite declined",
        };
        println!(
            "{}",
            style(format!("Kept {} on {}: {}", short(id), plan.source, why)).yellow()
        );
    }

    let style_line = if outcome.exit_code == 0 {
        style(format!(
            "✅ Replayed {} commit(s) onto {} and removed {} from {}.",
            outcome.replayed.len(),
            plan.dest,
            outcome.removed.len(),
            plan.source
        ))
        .green()
        .bold()
    } else {
        style(format!(
            "Replayed {} commit(s) onto {} and removed {} from {}, with failures.",
            outcome.replayed.len(),
            plan.dest,
            outcome.removed.len(),
            plan.source
        ))
        .yellow()
        .bold()
    };
    println!("{}", style_line);
}

fn conflict_hint(commit: &str) -> String {
    format!(
        "The cherry-pick was aborted and {} is still on the source branch. \
         Commits moved before it were removed. Rerun with --on-conflict skip to move the rest.",
        short(commit)
    )
}

/// Reports an error the way the rest of the CLI does.
fn report(err: &TransferError) {
    match err {
        TransferError::Usage(msg) => {
            eprintln!("{}", style(format!("Error: {}", msg)).red().bold());
            print_usage();
        }
        TransferError::Conflict { commit, .. } => {
            eprintln!("{}", style(format!("❌ {}", err)).red().bold());
            eprintln!("{}", style(conflict_hint(commit)).yellow());
        }
        TransferError::Git { command, .. } if command.starts_with("rebase") => {
            eprintln!("{}", style(format!("❌ {}", err)).red().bold());
            eprintln!(
                "{}",
                style("Resolve the rebase and run `git rebase --continue`, or `git rebase --abort`.")
                    .yellow()
            );
        }
        _ => {
            eprintln!("{}", style(format!("❌ {}", err)).red().bold());
        }
    }
}

fn run(args: Args) -> Result<i32> {
    init_logging(args.verbose);

    let vcs = GitCli::discover()?;
    log::debug!("repository at {}", vcs.root().display());

    let mut settings = Settings::resolve(args.on_conflict, args.removal(), git::config_get)?;
    settings.dry_run = args.dry_run;
    settings.confirm = args.confirm;

    let plan = Plan::resolve(&vcs, &args.from, &args.to, &args.commits)?;
    let transfer = Transfer::new(&vcs, settings);

    if settings.dry_run || settings.confirm {
        print_banner(&plan, &settings, &vcs.repo_name());
    }

    if settings.dry_run {
        let planned = transfer.preview(&plan)?;
        print_preview(&plan, &planned);
        return Ok(0);
    }

    let mut prompter = prompt::DialoguerConfirmPrompter;
    let outcome = transfer.run(&plan, &mut prompter)?;
    print_outcome(&plan, &outcome);
    Ok(outcome.exit_code)
}

/// Main CLI entry point for `git-transfer`.
///
/// This function:
/// 1. Handles the special `--sequence-editor` invocation made by `git rebase -i`.
/// 2. Parses arguments; a missing or unknown argument prints usage and yields `1`.
/// 3. Verifies that `git` is installed and that the cwd is a git repository.
/// 4. Resolves settings from flags and `git config`.
/// 5. Resolves both branches; an unresolvable one prints usage and yields `1`.
/// 6. Runs the transfer (or previews it with `--dry-run`).
///
/// # Exit Codes
///
/// * `0` – Every sub-operation succeeded.
/// * `1` – Usage or environment error.
/// * Otherwise – The exit code of the last failing git command.
pub fn entry() -> Result<i32> {
    let args: Vec<String> = env::args().collect();

    // Special case: act as `git sequence-editor` if invoked with that flag.
    if args.len() >= 2 && args[1] == "--sequence-editor" {
        let path = args.get(2).map(|s| s.as_str());
        return match sequence_editor::run(path) {
            Ok(_) => Ok(0),
            Err(e) => {
                eprintln!(
                    "{}",
                    style(format!("Sequence editor error: {}", e)).red().bold()
                );
                Err(e)
            }
        };
    }

    let parsed = match Args::try_parse_from(&args) {
        Ok(a) => a,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(0);
            }
            _ => {
                let err = TransferError::usage(e.kind().as_str().unwrap_or("invalid arguments"));
                report(&err);
                return Err(err);
            }
        },
    };

    match run(parsed) {
        Ok(code) => Ok(code),
        Err(e) => {
            report(&e);
            Err(e)
        }
    }
}
