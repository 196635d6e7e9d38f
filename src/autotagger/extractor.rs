//! Local keyword extraction used when the remote tagging service is unavailable.
//!
//! The extractor is a pure function: lowercase the text, blank out URLs, blank
//! out everything that is not `[a-z0-9]`, drop short words and stopwords, then
//! rank the survivors by frequency.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

/// Number of tags returned when the caller does not ask for a specific limit.
pub const DEFAULT_MAX_TAGS: usize = 6;

/// Tokens shorter than this never become tags.
const MIN_TAG_LEN: usize = 3;

/// Common English function words excluded from tag candidacy (lowercase).
const STOPWORDS: &[&str] = &[
    "the", "and", "a", "an", "of", "to", "in", "for", "on", "with", "is", "are", "was", "were",
    "be", "by", "this", "that", "it", "as", "at", "from", "or", "we", "you", "your", "i", "my",
    "me", "our", "they", "their", "but", "not", "have", "has", "had", "can", "will", "would",
    "should", "could",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

// Must run before punctuation stripping, otherwise "https://example.com" leaks "example".
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("URL pattern is a valid regex"));

/// Returns `true` if `word` is in the fixed stopword set.
///
/// The set is lowercase; callers are expected to lowercase first.
#[must_use]
pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}

/// Clamps a signed tag limit coming from user input to a usable `usize`.
///
/// Negative limits behave like zero.
///
/// ```
/// use secondbrain::autotagger::clamp_max_tags;
///
/// assert_eq!(clamp_max_tags(-3), 0);
/// assert_eq!(clamp_max_tags(4), 4);
/// ```
#[must_use]
pub fn clamp_max_tags(max_tags: i64) -> usize {
    usize::try_from(max_tags.max(0)).unwrap_or(usize::MAX)
}

/// Extracts up to `max_tags` candidate tags from free-form text.
///
/// Tags are lowercase ASCII alphanumerics of at least three characters,
/// ordered by descending frequency. Ties keep the order in which the
/// tokens first appeared. Never fails; unusable input yields an empty list.
///
/// # Examples
///
/// ```
/// use secondbrain::autotagger::extract_tags;
///
/// let tags = extract_tags("react react hooks hooks hooks learning javascript", 6);
/// assert_eq!(&tags[..2], ["hooks", "react"]);
///
/// let tags = extract_tags("Visit https://example.com for more info about React", 6);
/// assert!(tags.contains(&"react".to_string()));
/// assert!(!tags.contains(&"example".to_string()));
/// ```
#[must_use]
pub fn extract_tags(text: &str, max_tags: usize) -> Vec<String> {
    if max_tags == 0 || text.trim().is_empty() {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    let without_urls = URL_PATTERN.replace_all(&lowered, " ");
    let cleaned: String = without_urls
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut frequencies = TokenFrequencies::default();
    for token in cleaned.split_whitespace() {
        if token.len() < MIN_TAG_LEN || is_stopword(token) {
            continue;
        }
        frequencies.record(token);
    }

    frequencies
        .ranked()
        .into_iter()
        .take(max_tags)
        .map(str::to_string)
        .collect()
}

/// Extracts tags using [`DEFAULT_MAX_TAGS`].
#[must_use]
pub fn extract_default_tags(text: &str) -> Vec<String> {
    extract_tags(text, DEFAULT_MAX_TAGS)
}

/// Per-call token counts that remember first-seen order.
#[derive(Default)]
struct TokenFrequencies<'a> {
    index: HashMap<&'a str, usize>,
    entries: Vec<(&'a str, usize)>,
}

impl<'a> TokenFrequencies<'a> {
    fn record(&mut self, token: &'a str) {
        match self.index.get(token) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(token, self.entries.len());
                self.entries.push((token, 1));
            }
        }
    }

    /// Tokens by descending count; `sort_by` is stable so ties stay in first-seen order.
    fn ranked(mut self) -> Vec<&'a str> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.into_iter().map(|(token, _)| token).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_frequency() {
        let tags = extract_tags("react react hooks hooks hooks learning javascript", 6);
        assert_eq!(tags, vec!["hooks", "react", "learning", "javascript"]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let tags = extract_tags("zeta alpha zeta alpha mid", 6);
        assert_eq!(tags, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn truncates_to_limit() {
        let tags = extract_tags("aaa aaa aaa bbb bbb ccc ccc ccc ccc ddd ddd eee eee eee", 3);
        assert_eq!(tags, vec!["ccc", "aaa", "eee"]);
    }

    #[test]
    fn zero_limit_returns_nothing() {
        assert!(extract_tags("react hooks", 0).is_empty());
    }

    #[test]
    fn clamp_max_tags_treats_negative_as_zero() {
        assert_eq!(clamp_max_tags(-1), 0);
        assert_eq!(clamp_max_tags(i64::MIN), 0);
        assert_eq!(clamp_max_tags(0), 0);
        assert_eq!(clamp_max_tags(6), 6);
        assert!(extract_tags("react hooks", clamp_max_tags(-5)).is_empty());
    }

    #[test]
    fn urls_are_removed_before_punctuation() {
        let tags = extract_tags("see https://docs.rust-lang.org/book/ownership.html now", 6);
        assert_eq!(tags, vec!["see", "now"]);
    }

    #[test]
    fn uppercase_scheme_is_still_a_url() {
        let tags = extract_tags("HTTPS://Example.COM/Path tokio", 6);
        assert_eq!(tags, vec!["tokio"]);
    }

    #[test]
    fn url_pattern_requires_scheme_separator() {
        // "https" on its own is just a word
        let tags = extract_tags("https everywhere", 6);
        assert_eq!(tags, vec!["https", "everywhere"]);
    }

    #[test]
    fn non_ascii_letters_split_words() {
        let tags = extract_tags("café naïve résumé", 6);
        // "caf", "na", "ve", "r", "sum" survive stripping; only 3+ char ones remain
        assert_eq!(tags, vec!["caf", "sum"]);
    }

    #[test]
    fn digits_are_kept() {
        let tags = extract_tags("web3 and 2024 plans", 6);
        assert_eq!(tags, vec!["web3", "2024", "plans"]);
    }

    #[test]
    fn stopword_lookup_is_lowercase() {
        assert!(is_stopword("the"));
        assert!(is_stopword("should"));
        assert!(!is_stopword("The"));
        assert!(!is_stopword("rust"));
    }

    #[test]
    fn default_limit_is_six() {
        let text = "word1 word1 word2 word2 word3 word3 word4 word4 word5 word5 word6 word6 word7 word7";
        assert_eq!(extract_default_tags(text).len(), DEFAULT_MAX_TAGS);
    }
}
