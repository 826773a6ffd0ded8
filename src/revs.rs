/// One positional commit argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitToken {
    /// A single commit reference such as `abc123` or `feature~2`.
    Single(String),
    /// A range expression, `A..B` or `A...B`.
    Range(String),
}

impl CommitToken {
    /// Classifies a token by the presence of a two- or three-dot separator.
    pub fn parse(token: &str) -> Self {
        if token.contains("..") {
            CommitToken::Range(token.to_string())
        } else {
            CommitToken::Single(token.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CommitToken::Single(s) | CommitToken::Range(s) => s,
        }
    }
}

/// Parses `git rev-list --left-right` output into commit ids, oldest first
/// when the listing was produced with `--reverse`.
///
/// Lines marked `<` belong to the left side of a symmetric difference and
/// lines marked `-` are boundary commits; both are excluded.
pub fn parse_rev_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| match l.as_bytes()[0] {
            b'<' | b'-' => None,
            b'>' => Some(l[1..].trim().to_string()),
            _ => Some(l.to_string()),
        })
        .collect()
}

/// Whether an abbreviated id from a rebase todo line names `full`.
///
/// Abbreviations shorter than four characters never match.
pub fn abbrev_matches(abbrev: &str, full: &str) -> bool {
    abbrev.len() >= 4
        && full
            .get(..abbrev.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(abbrev))
}
