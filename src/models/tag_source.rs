use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a set of suggested tags came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    /// Suggested by the remote AI function.
    Ai,
    /// Extracted locally because the AI function was unavailable.
    Local,
}

impl TagSource {
    /// Maps the `fallback` flag of a tag suggestion to its source.
    pub fn from_fallback(fallback: bool) -> Self {
        if fallback { Self::Local } else { Self::Ai }
    }
}

impl fmt::Display for TagSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ai => write!(f, "ai"),
            Self::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TagSource::Ai).unwrap(), r#""ai""#);
        assert_eq!(
            serde_json::to_string(&TagSource::Local).unwrap(),
            r#""local""#
        );
    }

    #[test]
    fn test_tag_source_from_fallback_flag() {
        assert_eq!(TagSource::from_fallback(true), TagSource::Local);
        assert_eq!(TagSource::from_fallback(false), TagSource::Ai);
    }

    #[test]
    fn test_tag_source_display() {
        assert_eq!(TagSource::Ai.to_string(), "ai");
        assert_eq!(TagSource::Local.to_string(), "local");
    }
}
