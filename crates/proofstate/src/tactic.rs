//! Tactic-text helpers.
//!
//! Tactic scripts are plain strings like `apply H2.` or `intros n m.`.
//! The local-context model needs the head (the tactic name) and the first
//! argument (the hypothesis identifier a tactic targets, when present).

/// The leading token of a tactic, without the trailing period.
pub fn head(tactic: &str) -> Option<&str> {
    tokens(tactic).next()
}

/// The first argument token of a tactic, if any.
///
/// `apply H2.` → `Some("H2")`; `auto.` → `None`.
pub fn argument(tactic: &str) -> Option<&str> {
    tokens(tactic).nth(1)
}

fn tokens(tactic: &str) -> impl Iterator<Item = &str> {
    tactic
        .split_whitespace()
        .map(|t| t.trim_end_matches('.'))
        .filter(|t| !t.is_empty())
}
