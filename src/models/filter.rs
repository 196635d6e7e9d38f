use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{KnowledgeType, ValidationError};
use crate::autotagger::TagNormalizer;

/// Ordering for item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    /// Newest first.
    #[default]
    Recent,
    /// Oldest first.
    Oldest,
    /// Alphabetical by title.
    Title,
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recent => write!(f, "recent"),
            Self::Oldest => write!(f, "oldest"),
            Self::Title => write!(f, "title"),
        }
    }
}

impl FromStr for SortOption {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "oldest" => Ok(Self::Oldest),
            "title" => Ok(Self::Title),
            other => Err(ValidationError::UnknownSort(other.to_string())),
        }
    }
}

/// Filters applied when listing knowledge items.
///
/// The default matches everything, newest first.
///
/// # Examples
///
/// ```
/// use secondbrain::{FilterState, KnowledgeType, SortOption};
///
/// let filter = FilterState::default()
///     .search("hooks")
///     .kind(KnowledgeType::Note)
///     .tags(["React"])
///     .sort(SortOption::Title);
///
/// assert!(filter.is_active());
/// assert_eq!(filter.tags, vec!["react"]);
/// assert!(!FilterState::default().is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    /// Case-insensitive substring matched against title or content.
    pub search: String,
    /// Only items of this type; `None` means all types.
    #[serde(rename = "type")]
    pub kind: Option<KnowledgeType>,
    /// Items must carry every one of these tags.
    pub tags: Vec<String>,
    pub sort: SortOption,
}

impl FilterState {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn kind(mut self, kind: KnowledgeType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = TagNormalizer::normalize_tags(tags);
        self
    }

    pub fn sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Trimmed search term, or `None` when searching is off.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    /// Returns `true` if any filter (not counting sort order) narrows the results.
    pub fn is_active(&self) -> bool {
        self.search_term().is_some() || self.kind.is_some() || !self.tags.is_empty()
    }
}
