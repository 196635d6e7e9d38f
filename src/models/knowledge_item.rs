use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use super::{ItemId, KnowledgeType};
use crate::autotagger::TagNormalizer;

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum content length in characters.
pub const MAX_CONTENT_LEN: usize = 10_000;

/// Input that cannot be stored or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title too long ({actual} characters, max {max})")]
    TitleTooLong { actual: usize, max: usize },

    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("Content too long ({actual} characters, max {max})")]
    ContentTooLong { actual: usize, max: usize },

    #[error("Invalid source URL: {0}")]
    InvalidSourceUrl(String),

    #[error("Unknown item type '{0}' (expected note, link or insight)")]
    UnknownType(String),

    #[error("Unknown sort option '{0}' (expected recent, oldest or title)")]
    UnknownSort(String),
}

/// A stored knowledge item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: ItemId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: KnowledgeType,
    pub tags: Vec<String>,
    pub source_url: Option<String>,
    pub summary: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Payload for creating a knowledge item.
///
/// # Examples
///
/// ```
/// use secondbrain::{KnowledgeType, NewKnowledgeItem};
///
/// let item = NewKnowledgeItem::new("Rust ownership", "Borrowing rules in practice")
///     .kind(KnowledgeType::Insight)
///     .tags(["Rust", "memory"]);
///
/// assert_eq!(item.tags, vec!["rust", "memory"]);
/// assert!(item.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewKnowledgeItem {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: KnowledgeType,
    pub tags: Vec<String>,
    pub source_url: Option<String>,
    pub summary: Option<String>,
}

impl NewKnowledgeItem {
    /// Creates a note with the given title and content and no tags.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Sets the item type.
    pub fn kind(mut self, kind: KnowledgeType) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the tags, normalizing them.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = TagNormalizer::normalize_tags(tags);
        self
    }

    /// Sets the source URL; an empty string clears it.
    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = non_empty(url.into());
        self
    }

    /// Sets the summary; an empty string clears it.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = non_empty(summary.into());
        self
    }

    /// Checks the title, content and source URL limits.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.title, &self.content, self.source_url.as_deref())
    }
}

/// Partial update of a knowledge item. `None` leaves a field unchanged.
///
/// `source_url: Some(String::new())` clears the URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub kind: Option<KnowledgeType>,
    pub tags: Option<Vec<String>>,
    pub source_url: Option<String>,
    pub summary: Option<String>,
}

impl ItemUpdate {
    /// Returns `true` if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the update to a copy of `item`, without touching timestamps.
    pub fn apply_to(&self, item: &KnowledgeItem) -> KnowledgeItem {
        let mut updated = item.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(content) = &self.content {
            updated.content = content.clone();
        }
        if let Some(kind) = self.kind {
            updated.kind = kind;
        }
        if let Some(tags) = &self.tags {
            updated.tags = TagNormalizer::normalize_tags(tags);
        }
        if let Some(url) = &self.source_url {
            updated.source_url = non_empty(url.clone());
        }
        if let Some(summary) = &self.summary {
            updated.summary = non_empty(summary.clone());
        }
        updated
    }
}

impl KnowledgeItem {
    /// Checks the same limits as [`NewKnowledgeItem::validate`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.title, &self.content, self.source_url.as_deref())
    }
}

fn validate_fields(
    title: &str,
    content: &str,
    source_url: Option<&str>,
) -> Result<(), ValidationError> {
    validate_title(title)?;
    validate_content(content)?;
    if let Some(url) = source_url {
        validate_source_url(url)?;
    }
    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong {
            actual: len,
            max: MAX_TITLE_LEN,
        });
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    let len = content.chars().count();
    if len > MAX_CONTENT_LEN {
        return Err(ValidationError::ContentTooLong {
            actual: len,
            max: MAX_CONTENT_LEN,
        });
    }
    Ok(())
}

fn validate_source_url(url: &str) -> Result<(), ValidationError> {
    reqwest::Url::parse(url)
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidSourceUrl(format!("{}: {}", url, e)))
}
