//! Display-name decomposition: champion title, kennel segment, bare name.
//!
//! Scraped and stored display names routinely pack an honorific prefix and a
//! kennel affiliation into one string ("Ch. Eminent's Boss"). The rules here
//! are ordered heuristics tied to how the source community writes names, and
//! they intentionally never fail: the worst case returns the whole string as
//! the name with no title and no kennel.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Champion-title prefixes, most specific first so "gr. ch." wins over "ch.".
const TITLE_PREFIXES: &[&str] = &[
    "int. ch.",
    "int ch.",
    "gr. ch.",
    "gr ch.",
    "grand ch.",
    "nat. ch.",
    "jun. ch.",
    "jr. ch.",
    "champion",
    "ch.",
];

/// Vocabulary that marks a word as the tail of a kennel-name segment.
/// Matched as a case-insensitive substring of the word.
const KENNEL_MARKERS: &[&str] = &[
    "kennel", "kennels", "bull", "bullies", "bulls", "haus", "house", "camp", "yard", "farm",
    "ranch",
];

/// How many leading words may carry a possessive marker ("Eminent's").
const POSSESSIVE_WINDOW: usize = 3;

/// How many leading words are scanned for kennel-marker vocabulary.
const MARKER_WINDOW: usize = 4;

static POSSESSIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:'s|’s|s'|s’)$").unwrap());

/// A display name split into its optional title, kennel segment, and the
/// individual's bare name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameParts {
    /// Canonicalized title: lowercase, dots stripped ("ch", "gr ch").
    pub title: Option<String>,
    /// Kennel segment as written, possessive kept. Empty when undetected.
    pub kennel: String,
    pub name: String,
}

fn canonical_title(prefix: &str) -> String {
    prefix
        .replace('.', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip a known title prefix from the start of the string, if present.
/// Titles not ending in a dot must be followed by whitespace (or nothing)
/// so "Chico" is not read as "Ch." + "ico".
fn strip_title(full: &str) -> (Option<String>, &str) {
    let lower = full.to_lowercase();
    for prefix in TITLE_PREFIXES {
        if !lower.starts_with(prefix) {
            continue;
        }
        // Byte-indexed against the original string; skip if lowercasing
        // shifted a char boundary (non-ASCII input).
        let Some(rest) = full.get(prefix.len()..) else {
            continue;
        };
        if prefix.ends_with('.') || rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return (Some(canonical_title(prefix)), rest.trim_start());
        }
    }
    (None, full)
}

/// Split a display name into title, kennel, and bare name.
pub fn split_name(full: &str) -> NameParts {
    let (title, remainder) = strip_title(full.trim());
    let words: Vec<&str> = remainder.split_whitespace().collect();

    // (b) possessive marker within the first few words ends the kennel.
    let possessive_limit = POSSESSIVE_WINDOW.min(words.len());
    for i in 0..possessive_limit {
        if POSSESSIVE_RE.is_match(words[i]) && i + 1 < words.len() {
            return NameParts {
                title,
                kennel: words[..=i].join(" "),
                name: words[i + 1..].join(" "),
            };
        }
    }

    // (c) known kennel-indicator vocabulary within the early-word window.
    let marker_limit = MARKER_WINDOW.min(words.len());
    for i in 0..marker_limit {
        let lower = words[i].to_lowercase();
        if KENNEL_MARKERS.iter().any(|m| lower.contains(m)) && i + 1 < words.len() {
            return NameParts {
                title,
                kennel: words[..=i].join(" "),
                name: words[i + 1..].join(" "),
            };
        }
    }

    // (d) no kennel boundary found: the whole remainder is the name.
    NameParts {
        title,
        kennel: String::new(),
        name: words.join(" "),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
