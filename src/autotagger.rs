//! Tag suggestion for knowledge items.
//!
//! Two sources feed tag suggestions: the remote AI function and a local
//! keyword extractor that needs no network. [`AiAssistant`] tries the remote
//! function first and falls back to the extractor, so a caller always gets
//! tags back and learns which source produced them.
//!
//! # Examples
//!
//! ## Local extraction
//!
//! ```
//! use secondbrain::autotagger::{extract_tags, DEFAULT_MAX_TAGS};
//!
//! let tags = extract_tags(
//!     "Machine learning models learn patterns from data. Machine learning is powerful.",
//!     DEFAULT_MAX_TAGS,
//! );
//! assert_eq!(&tags[..2], ["machine", "learning"]);
//! ```
//!
//! ## Suggesting tags for a new item
//!
//! ```no_run
//! use std::sync::Arc;
//! use secondbrain::ai::AiClientBuilder;
//! use secondbrain::autotagger::{AiAssistant, TagNormalizer};
//! use secondbrain::config::Config;
//! use secondbrain::service::KnowledgeService;
//! use secondbrain::{Database, NewKnowledgeItem};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let client = AiClientBuilder::from_config(&config).build()?;
//! let assistant = AiAssistant::new(Arc::new(client));
//!
//! let title = "React Hooks";
//! let content = "useEffect runs after render; useState keeps local state.";
//! let suggested = assistant.auto_tag(title, content).await;
//! if let Some(notice) = suggested.notice() {
//!     eprintln!("{notice}");
//! }
//!
//! let tags = TagNormalizer::merge(&["react".to_string()], &suggested.tags);
//! let service = KnowledgeService::new(Database::in_memory()?);
//! service.create_item(NewKnowledgeItem::new(title, content).tags(tags))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Normalization
//!
//! User-entered tags only go through [`TagNormalizer`]: trimmed, lowercased and
//! deduplicated. Extracted tags are already lowercase `[a-z0-9]` tokens.

mod assistant;
mod extractor;
mod normalizer;

pub use assistant::{AiAssistant, AutoTagResult, FALLBACK_NOTICE, FallbackReason, OFFLINE_NOTICE};
pub use extractor::{
    DEFAULT_MAX_TAGS, clamp_max_tags, extract_default_tags, extract_tags, is_stopword,
};
pub use normalizer::TagNormalizer;
