//! AI assistant facade: remote summaries and tag suggestions with a local
//! fallback for tagging.
//!
//! Both operations are total. Whatever the remote function does, `auto_tag`
//! returns tags and `summarize` returns `Option<String>`; callers branch on
//! [`AutoTagResult::fallback`] or on `None`, never on an error type.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::extractor::{DEFAULT_MAX_TAGS, extract_tags};
use crate::ai::{AiClientTrait, AiError, AiRequest};
use crate::models::{KnowledgeItem, TagSource};

/// Notice shown when the AI function answered with an error status.
pub const FALLBACK_NOTICE: &str = "AI unavailable — using local tag suggestions.";

/// Notice shown when the AI function could not be reached at all.
pub const OFFLINE_NOTICE: &str = "Using local tag suggestions (offline).";

/// Why a tag request ended up on the local extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackReason {
    /// The function responded with a non-success status.
    Unavailable,
    /// The request never completed (network, timeout or no endpoint).
    Offline,
}

impl FallbackReason {
    fn from_error(error: &AiError) -> Self {
        match error {
            AiError::Http { .. } => Self::Unavailable,
            _ => Self::Offline,
        }
    }
}

/// Outcome of a tag suggestion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoTagResult {
    pub tags: Vec<String>,
    /// `true` iff the tags came from the local extractor.
    pub fallback: bool,
    /// Set when the local extractor stood in for a failed remote call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FallbackReason>,
}

impl AutoTagResult {
    /// Tags suggested by the remote function.
    pub fn remote(tags: Vec<String>) -> Self {
        Self {
            tags,
            fallback: false,
            reason: None,
        }
    }

    /// Tags produced by the local extractor on request.
    pub fn local(tags: Vec<String>) -> Self {
        Self {
            tags,
            fallback: true,
            reason: None,
        }
    }

    /// Local tags standing in for a failed remote call.
    pub fn fallback(tags: Vec<String>, reason: FallbackReason) -> Self {
        Self {
            tags,
            fallback: true,
            reason: Some(reason),
        }
    }

    pub fn source(&self) -> TagSource {
        TagSource::from_fallback(self.fallback)
    }

    /// A non-alarming message for the user when a remote call fell back.
    pub fn notice(&self) -> Option<&'static str> {
        match self.reason? {
            FallbackReason::Unavailable => Some(FALLBACK_NOTICE),
            FallbackReason::Offline => Some(OFFLINE_NOTICE),
        }
    }
}

/// Text handed to the local extractor when the remote call fails.
fn fallback_text(title: &str, content: &str) -> String {
    format!("{} \n {}", title, content)
}

/// Marks one in-flight call; clears itself when dropped, on every exit path.
struct LoadingGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl<'a> LoadingGuard<'a> {
    fn start(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self { in_flight }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Facade over the AI function used by the CLI.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use secondbrain::ai::AiClientBuilder;
/// use secondbrain::autotagger::AiAssistant;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AiClientBuilder::new()
///     .endpoint("https://project.supabase.co/functions/v1/ai-process")
///     .api_key("anon-key")
///     .build()?;
/// let assistant = AiAssistant::new(Arc::new(client));
///
/// let result = assistant.auto_tag("React Hooks", "useEffect and useState").await;
/// if let Some(notice) = result.notice() {
///     eprintln!("{notice}");
/// }
/// println!("{}", result.tags.join(", "));
/// # Ok(())
/// # }
/// ```
pub struct AiAssistant {
    client: Arc<dyn AiClientTrait>,
    in_flight: AtomicUsize,
    fallback_limit: usize,
}

impl AiAssistant {
    /// Creates an assistant; local fallback returns up to [`DEFAULT_MAX_TAGS`] tags.
    pub fn new(client: Arc<dyn AiClientTrait>) -> Self {
        Self {
            client,
            in_flight: AtomicUsize::new(0),
            fallback_limit: DEFAULT_MAX_TAGS,
        }
    }

    /// Sets how many tags the local fallback may return.
    #[must_use]
    pub fn with_fallback_limit(mut self, max_tags: usize) -> Self {
        self.fallback_limit = max_tags;
        self
    }

    /// Suggests tags with the local extractor only, without a network call.
    pub fn local_tags(&self, title: &str, content: &str) -> AutoTagResult {
        AutoTagResult::local(self.extract_local(title, content))
    }

    fn extract_local(&self, title: &str, content: &str) -> Vec<String> {
        extract_tags(&fallback_text(title, content), self.fallback_limit)
    }

    /// Returns `true` while any summarize, auto-tag or ask call is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Suggests tags for an item.
    ///
    /// A 2xx response is used as-is, even when it carries no usable tags.
    /// Any non-2xx status or transport failure switches to the local
    /// extractor and sets `fallback`.
    pub async fn auto_tag(&self, title: &str, content: &str) -> AutoTagResult {
        let _loading = LoadingGuard::start(&self.in_flight);
        let request = AiRequest::auto_tag(title, content);

        match self.client.send(&request).await {
            Ok(response) => {
                let tags = response.tags().unwrap_or_else(|| {
                    debug!("AI response had no tags array; treating as empty");
                    Vec::new()
                });
                info!(count = tags.len(), "Received AI tag suggestions");
                AutoTagResult::remote(tags)
            }
            Err(error) => {
                let reason = FallbackReason::from_error(&error);
                warn!(%error, ?reason, "AI tagging unavailable, falling back to local extraction");
                AutoTagResult::fallback(self.extract_local(title, content), reason)
            }
        }
    }

    /// Requests a short summary. `None` means no summary is available;
    /// there is no local substitute.
    pub async fn summarize(&self, title: &str, content: &str) -> Option<String> {
        let _loading = LoadingGuard::start(&self.in_flight);
        self.request_text(AiRequest::summarize(title, content)).await
    }

    /// Asks a question answered from the given items.
    pub async fn ask(&self, question: &str, items: &[KnowledgeItem]) -> Option<String> {
        let _loading = LoadingGuard::start(&self.in_flight);
        self.request_text(AiRequest::query(query_prompt(question, items)))
            .await
    }

    async fn request_text(&self, request: AiRequest) -> Option<String> {
        let action = request.action;
        match self.client.send(&request).await {
            Ok(response) => {
                let result = response.result();
                if result.is_none() {
                    warn!(%action, "AI response had no result text");
                }
                result
            }
            Err(error) => {
                warn!(%action, %error, "AI request failed");
                None
            }
        }
    }
}

/// Items longer than this are cut when sent as question context.
const MAX_CONTEXT_CHARS: usize = 1000;

/// Renders a question plus the items it should be answered from.
fn query_prompt(question: &str, items: &[KnowledgeItem]) -> String {
    let context = if items.is_empty() {
        "(none)".to_string()
    } else {
        format_items_context(items)
    };
    format!("Question: {}\n\nKnowledge items:\n{}", question.trim(), context)
}

fn format_items_context(items: &[KnowledgeItem]) -> String {
    items
        .iter()
        .map(|item| {
            // Truncate very long items
            let content = match item.content.char_indices().nth(MAX_CONTEXT_CHARS) {
                Some((cut, _)) => format!("{}...", &item.content[..cut]),
                None => item.content.clone(),
            };

            let tags_str = if item.tags.is_empty() {
                String::new()
            } else {
                format!("\nTags: {}", item.tags.join(", "))
            };

            format!(
                "[ITEM ID={}] {} ({})\nContent: {}{}\n---",
                item.id, item.title, item.kind, content, tags_str
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
