use std::collections::HashSet;

/// Cleanup for user-entered and suggested tags.
///
/// User tags are free text: they are trimmed and lowercased but otherwise kept
/// as typed, so "machine learning" stays a single two-word tag.
pub struct TagNormalizer;

impl TagNormalizer {
    /// Normalizes a single tag: trims surrounding whitespace and lowercases.
    ///
    /// ```
    /// use secondbrain::autotagger::TagNormalizer;
    ///
    /// assert_eq!(TagNormalizer::normalize_tag("  Rust "), "rust");
    /// assert_eq!(TagNormalizer::normalize_tag("Machine Learning"), "machine learning");
    /// ```
    #[must_use]
    pub fn normalize_tag(tag: &str) -> String {
        tag.trim().to_lowercase()
    }

    /// Normalizes a collection of tags, dropping empties and duplicates.
    ///
    /// Keeps the first occurrence of each tag.
    ///
    /// ```
    /// use secondbrain::autotagger::TagNormalizer;
    ///
    /// let tags = vec!["Rust".to_string(), "rust".to_string(), " ".to_string()];
    /// assert_eq!(TagNormalizer::normalize_tags(tags), vec!["rust"]);
    /// ```
    #[must_use]
    pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        tags.into_iter()
            .map(|tag| Self::normalize_tag(tag.as_ref()))
            .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
            .collect()
    }

    /// Parses a comma-separated tag list as typed into the `--tags` option.
    ///
    /// ```
    /// use secondbrain::autotagger::TagNormalizer;
    ///
    /// assert_eq!(TagNormalizer::parse_list("Rust, learning, ,rust"), vec!["rust", "learning"]);
    /// ```
    #[must_use]
    pub fn parse_list(input: &str) -> Vec<String> {
        Self::normalize_tags(input.split(','))
    }

    /// Appends suggested tags that are not already present.
    #[must_use]
    pub fn merge(existing: &[String], suggested: &[String]) -> Vec<String> {
        Self::normalize_tags(existing.iter().chain(suggested))
    }
}
