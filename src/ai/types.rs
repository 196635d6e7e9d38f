use std::fmt;

use serde::{Deserialize, Serialize};

/// Operation requested from the remote AI function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AiAction {
    /// One or two sentence summary of an item.
    Summarize,
    /// Tag suggestions for an item.
    AutoTag,
    /// Free-form question over a set of items.
    Query,
}

impl fmt::Display for AiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summarize => write!(f, "summarize"),
            Self::AutoTag => write!(f, "auto-tag"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// JSON body sent to the AI function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiRequest {
    pub action: AiAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl AiRequest {
    pub fn summarize(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            action: AiAction::Summarize,
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }

    pub fn auto_tag(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            action: AiAction::AutoTag,
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }

    pub fn query(content: impl Into<String>) -> Self {
        Self {
            action: AiAction::Query,
            title: None,
            content: Some(content.into()),
        }
    }
}

/// Raw body of a successful (2xx) response.
///
/// Parsing is lenient: a body that is not JSON, or lacks the expected field,
/// simply yields `None` from the accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiResponse {
    body: String,
}

impl AiResponse {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Returns the unparsed response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// The `tags` array of an auto-tag response.
    ///
    /// Returns `None` when the body is not JSON or `tags` is missing or not an
    /// array. Non-string array elements are skipped.
    pub fn tags(&self) -> Option<Vec<String>> {
        let json = self.json()?;
        let tags = json.get("tags")?.as_array()?;
        Some(
            tags.iter()
                .filter_map(|tag| tag.as_str())
                .map(str::to_string)
                .collect(),
        )
    }

    /// The `result` string of a summarize or query response.
    pub fn result(&self) -> Option<String> {
        self.json()?
            .get("result")?
            .as_str()
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&AiAction::AutoTag).unwrap(),
            r#""auto-tag""#
        );
        assert_eq!(
            serde_json::to_string(&AiAction::Summarize).unwrap(),
            r#""summarize""#
        );
        assert_eq!(AiAction::Query.to_string(), "query");
    }

    #[test]
    fn request_body_matches_wire_shape() {
        let request = AiRequest::auto_tag("My Title", "My content");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "auto-tag", "title": "My Title", "content": "My content"})
        );
    }

    #[test]
    fn query_request_omits_title() {
        let json = serde_json::to_value(AiRequest::query("what is rust?")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "query", "content": "what is rust?"})
        );
    }

    #[test]
    fn tags_parsed_from_valid_body() {
        let response = AiResponse::new(r#"{"tags": ["react", "hooks"]}"#);
        assert_eq!(
            response.tags(),
            Some(vec!["react".to_string(), "hooks".to_string()])
        );
    }

    #[test]
    fn empty_tags_array_is_present_but_empty() {
        assert_eq!(AiResponse::new(r#"{"tags": []}"#).tags(), Some(Vec::new()));
    }

    #[test]
    fn missing_or_malformed_tags_is_none() {
        assert_eq!(AiResponse::new("{}").tags(), None);
        assert_eq!(AiResponse::new(r#"{"tags": "rust"}"#).tags(), None);
        assert_eq!(AiResponse::new("<html>oops</html>").tags(), None);
        assert_eq!(AiResponse::new("").tags(), None);
    }

    #[test]
    fn non_string_tags_are_skipped() {
        let response = AiResponse::new(r#"{"tags": ["rust", 7, null, "async"]}"#);
        assert_eq!(
            response.tags(),
            Some(vec!["rust".to_string(), "async".to_string()])
        );
    }

    #[test]
    fn result_parsed_only_when_string() {
        assert_eq!(
            AiResponse::new(r#"{"result": "A summary."}"#).result(),
            Some("A summary.".to_string())
        );
        assert_eq!(AiResponse::new(r#"{"result": 42}"#).result(), None);
        assert_eq!(AiResponse::new(r#"{"error": "nope"}"#).result(), None);
        assert_eq!(AiResponse::new("not json").result(), None);
    }
}
