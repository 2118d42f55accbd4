//! Keyword theme extraction.
//!
//! Counts fixed complaint/compliment keywords across dialog
//! transcripts and surfaces the most frequent themes.

use std::cmp::Reverse;

/// Keywords that signal a complaint theme, in tie-break priority order.
pub const COMPLAINT_KEYWORDS: [&str; 9] = [
    "wait",
    "slow",
    "problem",
    "issue",
    "complaint",
    "frustrated",
    "angry",
    "billing",
    "connection",
];

/// Keywords that signal a compliment theme, in tie-break priority order.
pub const COMPLIMENT_KEYWORDS: [&str; 9] = [
    "great",
    "excellent",
    "helpful",
    "fast",
    "quick",
    "thank",
    "good",
    "satisfied",
    "amazing",
];

/// Maximum number of themes reported per keyword set.
const TOP_KEYWORD_LIMIT: usize = 5;

/// Rank keywords by how many texts contain them as a substring.
///
/// Matching is plain substring containment, not word-boundary matching,
/// so "thank" also matches inside "thanks". This is a known
/// false-positive source kept for compatibility with existing reports.
///
/// Zero-match keywords are dropped; ties keep keyword-list order
/// (stable sort); at most 5 keywords are returned, most frequent first.
pub fn top_keywords(texts: &[&str], keywords: &[&str]) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = keywords
        .iter()
        .map(|kw| (*kw, texts.iter().filter(|t| t.contains(kw)).count()))
        .filter(|(_, count)| *count > 0)
        .collect();

    counts.sort_by_key(|(_, count)| Reverse(*count));
    counts.truncate(TOP_KEYWORD_LIMIT);

    counts.into_iter().map(|(kw, _)| kw.to_string()).collect()
}
