//! Literal text helpers shared by the scorer, emergence monitor and
//! pattern aggregator.

use std::collections::BTreeSet;

/// Words ignored when comparing insight text.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "i",
    "in", "is", "it", "its", "of", "on", "or", "so", "that", "the", "their", "they", "this", "to",
    "was", "were", "with", "you", "your",
];

/// Lowercase words with punctuation stripped.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
}

/// Distinct non-stopword terms.
pub fn significant_terms(text: &str) -> BTreeSet<String> {
    words(text)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Normalized form used to group insights: lowercase, punctuation
/// stripped, stopwords removed, single-space separated.
pub fn normalize(text: &str) -> String {
    words(text)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("The user prefers SHORT answers!"), "user prefers short answers");
        assert_eq!(normalize("user prefers short answers"), "user prefers short answers");
        assert_eq!(normalize("the a an"), "");
    }

    #[test]
    fn test_significant_terms() {
        let terms = significant_terms("Rest is part of the work, and work is rest.");
        assert_eq!(terms.len(), 3);
        assert!(terms.contains("rest"));
        assert!(terms.contains("part"));
        assert!(terms.contains("work"));
    }
}
