use crate::settings::{ConflictPolicy, RemovalStrategy, Settings};
use crate::transfer::Plan;

use console::{measure_text_width, style};
use std::iter;

/// Prints a decorative, colorized banner describing the planned transfer.
///
/// The banner is dynamically sized to fit the widest **visible** line of text,
/// using [`console::measure_text_width`] to ignore ANSI color codes when
/// calculating padding. It is framed with Unicode box-drawing characters
/// (`╔═╗`, `║ ║`, `╚═╝`) and uses [`console::style`] for coloring and bolding.
///
/// Borders are styled independently from the inner text so that embedded color
/// codes inside the content do not affect the color of the box edges.
///
/// # Parameters
///
/// * `plan` – The resolved source, destination and commit tokens.
/// * `settings` – The effective conflict policy and removal strategy.
/// * `repo_name` – Repository name shown in the title.
pub fn print_banner(plan: &Plan, settings: &Settings, repo_name: &str) {
    let lines = banner_lines(plan, settings, repo_name);

    let max_width = lines
        .iter()
        .map(|l| measure_text_width(l)) // ignore ANSI in content
        .max()
        .unwrap_or(0)
        + 2;

    let border = "═".repeat(max_width);
    let top = style(format!("╔{}╗", border)).blue().bold();
    let bottom = style(format!("╚{}╝", border)).blue().bold();
    let left = style("║ ").blue().bold().to_string();
    let right = style("║").blue().bold().to_string();

    println!();
    println!("{top}");
    for line in lines {
        let visible = measure_text_width(&line);
        let pad = max_width - visible; // includes the one space after left border
        println!("{}{}{}{}", left, line, " ".repeat(pad - 1), right);
    }
    println!("{bottom}");
    println!();
}

/// Constructs the lines of text for the transfer banner.
///
/// Order: title, source/destination, strategy and policy lines (styled),
/// then the steps the tool will take. Some lines carry ANSI styling, so
/// callers must measure visible width rather than `str::len()`.
fn banner_lines(plan: &Plan, settings: &Settings, repo_name: &str) -> Vec<String> {
    let top = [
        format!("Transfer commits in {}", repo_name),
        String::new(),
        format!("From: {}", plan.source),
        format!("To:   {}", plan.dest),
        format!(
            "Commits: {}",
            if plan.tokens.is_empty() {
                String::from("(none)")
            } else {
                plan.tokens
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        ),
        String::new(),
    ]
    .into_iter();

    let removal = match settings.removal {
        RemovalStrategy::Batch => style(format!(
            "Removal: one rebase of `{}` after all commits are replayed.",
            plan.source
        ))
        .cyan()
        .bold()
        .to_string(),
        RemovalStrategy::PerCommit => style(format!(
            "Removal: one rebase of `{}` per replayed commit.",
            plan.source
        ))
        .yellow()
        .bold()
        .to_string(),
    };

    let policy = match settings.on_conflict {
        ConflictPolicy::Abort => style("On conflict: stop the run.").cyan().to_string(),
        ConflictPolicy::Skip => style("On conflict: skip the commit and keep going.")
            .cyan()
            .to_string(),
        ConflictPolicy::Continue => style("On conflict: remove the commit anyway.")
            .red()
            .bold()
            .to_string(),
    };

    let mode = [removal, policy].into_iter();

    let bottom = iter::once(String::new()).chain(
        [
            "This tool will:".to_string(),
            format!("  1) Cherry-pick each commit onto `{}`", plan.dest),
            format!("  2) Drop them from `{}` with `git rebase -i`", plan.source),
        ]
        .into_iter(),
    );

    top.chain(mode).chain(bottom).collect()
}
