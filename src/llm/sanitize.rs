//! Cleanup of raw model output into a candidate query.

use regex::Regex;
use std::sync::OnceLock;

pub const FENCE: &str = "```";

/// Delimiters removed from a completion, tried in order at each position:
/// an opening fence with optional language tag through its line break,
/// a closing fence that ends the text together with the line break before it,
/// and any other bare fence.
const FENCE_PATTERN: &str = r"```[ \t]*[\w+-]*[ \t]*\r?\n|\r?\n[ \t]*```[ \t]*$|```";

fn fence_regex() -> &'static Regex {
    static FENCE_RE: OnceLock<Regex> = OnceLock::new();
    FENCE_RE.get_or_init(|| Regex::new(FENCE_PATTERN).expect("fence pattern is valid"))
}

/// Remove Markdown code fences and lowercase the rest.
///
/// An opening fence such as ```` ```sql ```` loses its tag and line break
/// wherever it starts, and inline fences such as ```` ```SELECT 1``` ```` lose
/// only their delimiters. Other whitespace is kept and the result is not
/// checked for SQL validity.
pub fn sanitize(raw: &str) -> String {
    fence_regex().replace_all(raw, "").to_lowercase()
}
