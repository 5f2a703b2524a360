//! Modification guard for generated queries.
//!
//! Detection is a case-insensitive substring scan, not a SQL parse. Keywords
//! embedded in identifiers (`address` contains `add`, `created_at` contains
//! `create`) therefore block too; callers opt in with `allow_modify`.

use serde::Serialize;

/// Keywords that indicate the statement may change data or schema.
pub const MODIFY_KEYWORDS: [&str; 7] =
    ["insert", "update", "delete", "drop", "create", "add", "truncate"];

/// Outcome of checking one candidate query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum GuardVerdict {
    Approved,
    Blocked { keyword: &'static str },
}

impl GuardVerdict {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// First modification keyword found in `candidate`, if any.
pub fn find_modify_keyword(candidate: &str) -> Option<&'static str> {
    let lowered = candidate.to_lowercase();
    MODIFY_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lowered.contains(keyword))
}

/// Approve or block a candidate query.
pub fn check(candidate: &str, allow_modify: bool) -> GuardVerdict {
    if allow_modify {
        return GuardVerdict::Approved;
    }

    match find_modify_keyword(candidate) {
        Some(keyword) => GuardVerdict::Blocked { keyword },
        None => GuardVerdict::Approved,
    }
}
