//! Deterministic normalization of natural-language input.

/// Suffixes stripped from each word, checked in this order.
///
/// Policy artifact: changing the list or its order changes every prompt.
pub const SUFFIXES: [&str; 9] = ["ing", "ly", "ed", "ious", "es", "s", "ment", "tion", "ness"];

/// Punctuation set removed before tokenizing (ASCII punctuation).
pub fn is_stripped_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Strip the first matching suffix from `word`.
///
/// At most one suffix is removed. A word that is nothing but a suffix
/// (`"s"`, `"ing"`) is returned unchanged so no token becomes empty.
pub fn strip_suffix(word: &str) -> &str {
    for suffix in SUFFIXES {
        if let Some(stem) = word.strip_suffix(suffix) {
            if stem.is_empty() {
                return word;
            }
            return stem;
        }
    }
    word
}

/// Normalize a natural-language query.
///
/// Removes punctuation, splits on whitespace, strips one suffix per word,
/// and rejoins with single spaces. Case is left untouched.
///
/// # Examples
///
/// ```
/// use aisqlite::llm::normalize;
///
/// assert_eq!(normalize("I am running the query quickly"), "I am runn the query quick");
/// ```
pub fn normalize(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| !is_stripped_punctuation(*c)).collect();

    cleaned
        .split_whitespace()
        .map(strip_suffix)
        .collect::<Vec<_>>()
        .join(" ")
}
