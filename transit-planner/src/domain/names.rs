//! Stop name normalization and similarity.
//!
//! Different transport types often model the same physical place as
//! separate stops (a metro station and the tram stop above it). Their
//! display names differ in decoration only, so we compare normalized names.

use std::collections::HashSet;

/// Generic words that carry no identifying information.
const GENERIC_WORDS: &[&str] = &[
    "station",
    "stop",
    "metro",
    "метростанция",
    "спирка",
    "метро",
];

/// Minimum length (in characters) of a word shared by two names.
const MIN_SHARED_WORD_LEN: usize = 4;

/// Keep ASCII letters/digits and the basic Cyrillic alphabet; drop the rest.
fn keep_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('а'..='я').contains(&c)
}

/// Split a display name into normalized, significant words.
///
/// Words are lowercased, stripped of punctuation and accented letters,
/// generic words are removed and roman `ii`/`iii` become digits.
pub fn name_tokens(name: &str) -> Vec<String> {
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '/' || c == ',')
        .map(|word| word.to_lowercase().chars().filter(|c| keep_char(*c)).collect::<String>())
        .filter(|word| !word.is_empty())
        .filter(|word| !GENERIC_WORDS.contains(&word.as_str()))
        .map(|word| match word.as_str() {
            "ii" => "2".to_string(),
            "iii" => "3".to_string(),
            _ => word,
        })
        .collect()
}

/// Normalized form of a display name, used for equality checks.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::normalize_name;
///
/// assert_eq!(normalize_name("Metro Station Serdika II"), "serdika2");
/// assert_eq!(normalize_name("SERDIKA  ii"), "serdika2");
/// ```
pub fn normalize_name(name: &str) -> String {
    name_tokens(name).concat()
}

/// Whether two stop names refer to the same place.
///
/// True when one normalized name contains the other, or when they share a
/// significant word of at least four characters. Empty names never match.
pub fn names_similar(a: &str, b: &str) -> bool {
    let tokens_a = name_tokens(a);
    let tokens_b = name_tokens(b);
    let norm_a = tokens_a.concat();
    let norm_b = tokens_b.concat();

    if norm_a.is_empty() || norm_b.is_empty() {
        return false;
    }

    if norm_a.contains(&norm_b) || norm_b.contains(&norm_a) {
        return true;
    }

    let words_a: HashSet<&str> = tokens_a
        .iter()
        .filter(|w| w.chars().count() >= MIN_SHARED_WORD_LEN)
        .map(String::as_str)
        .collect();

    tokens_b
        .iter()
        .filter(|w| w.chars().count() >= MIN_SHARED_WORD_LEN)
        .any(|w| words_a.contains(w.as_str()))
}
