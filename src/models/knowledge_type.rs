use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Kind of knowledge item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeType {
    /// Free-form note.
    #[default]
    Note,
    /// Saved link, usually with a `source_url`.
    Link,
    /// Short realization or takeaway.
    Insight,
}

impl KnowledgeType {
    /// All variants in display order.
    pub const ALL: [KnowledgeType; 3] = [Self::Note, Self::Link, Self::Insight];

    /// Stable lowercase name used in storage and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Link => "link",
            Self::Insight => "insight",
        }
    }
}

impl fmt::Display for KnowledgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnowledgeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "note" => Ok(Self::Note),
            "link" => Ok(Self::Link),
            "insight" => Ok(Self::Insight),
            other => Err(ValidationError::UnknownType(other.to_string())),
        }
    }
}
