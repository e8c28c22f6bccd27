//! Canonical form for free-text answers.
//!
//! Two fill-in answers match exactly when their normalized forms are equal.
//! No fuzzy matching, no partial credit.

/// Characters stripped from answers before comparison.
const STRIPPED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

/// Map raw learner input to its canonical comparable form: lowercase, strip
/// sentence punctuation, collapse any whitespace run to a single space, trim.
/// Pure and idempotent.
pub fn normalize(input: &str) -> String {
    let stripped: String = input
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
