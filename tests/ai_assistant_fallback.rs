/// Tests for the assistant facade against scripted AI clients.
///
/// Each client stands in for one behavior of the remote function (success,
/// error status, transport failure) so the fallback rules can be checked
/// without a network.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use secondbrain::ai::{AiClientTrait, AiError, AiRequest, AiResponse, DisabledClient};
use secondbrain::autotagger::{
    AiAssistant, AutoTagResult, FALLBACK_NOTICE, FallbackReason, OFFLINE_NOTICE,
};
use secondbrain::TagSource;
use tokio::sync::Notify;

/// Replies with a fixed status and body, mimicking the HTTP client's mapping.
struct ScriptedClient {
    status: u16,
    body: &'static str,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AiClientTrait for ScriptedClient {
    async fn send(&self, _request: &AiRequest) -> Result<AiResponse, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if (200..300).contains(&self.status) {
            Ok(AiResponse::new(self.body))
        } else {
            Err(AiError::Http {
                status: self.status,
                message: self.body.to_string(),
            })
        }
    }
}

/// Fails like an unreachable host.
struct UnreachableClient;

#[async_trait]
impl AiClientTrait for UnreachableClient {
    async fn send(&self, _request: &AiRequest) -> Result<AiResponse, AiError> {
        let error = reqwest::Client::new()
            .get("not a url")
            .build()
            .expect_err("request with a bad URL should fail to build");
        Err(AiError::Network(error))
    }
}

/// Blocks until released, so a test can observe the in-flight state.
struct GatedClient {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl AiClientTrait for GatedClient {
    async fn send(&self, _request: &AiRequest) -> Result<AiResponse, AiError> {
        self.entered.notify_one();
        self.release.notified().await;
        Err(AiError::Http {
            status: 500,
            message: "late failure".to_string(),
        })
    }
}

const TITLE: &str = "React Hooks";
const CONTENT: &str = "React hooks like useEffect and useState manage state in React components.";

#[tokio::test]
async fn not_deployed_function_falls_back_to_local_tags() {
    let assistant = AiAssistant::new(ScriptedClient::new(404, "Not Found"));

    let result = assistant.auto_tag(TITLE, CONTENT).await;

    assert!(result.fallback);
    assert!(!result.tags.is_empty());
    assert_eq!(result.tags[0], "react");
    assert_eq!(result.source(), TagSource::Local);
    assert_eq!(result.notice(), Some(FALLBACK_NOTICE));
}

#[tokio::test]
async fn server_errors_fall_back_to_local_tags() {
    for status in [429, 500, 502, 503] {
        let assistant = AiAssistant::new(ScriptedClient::new(status, r#"{"error": "busy"}"#));

        let result = assistant.auto_tag(TITLE, CONTENT).await;

        assert!(result.fallback, "status {status} should fall back");
        assert_eq!(result.reason, Some(FallbackReason::Unavailable));
        assert!(!result.tags.is_empty());
    }
}

#[tokio::test]
async fn transport_failure_falls_back_to_local_tags() {
    let assistant = AiAssistant::new(Arc::new(UnreachableClient));

    let result = assistant.auto_tag(TITLE, CONTENT).await;

    assert!(result.fallback);
    assert!(result.tags.contains(&"hooks".to_string()));
    assert_eq!(result.reason, Some(FallbackReason::Offline));
    assert_eq!(result.notice(), Some(OFFLINE_NOTICE));
}

#[tokio::test]
async fn unconfigured_client_falls_back_to_local_tags() {
    let assistant = AiAssistant::new(Arc::new(DisabledClient));

    let result = assistant.auto_tag(TITLE, CONTENT).await;

    assert!(result.fallback);
    assert_eq!(result.notice(), Some(OFFLINE_NOTICE));
}

#[tokio::test]
async fn successful_response_is_used_as_is() {
    let client = ScriptedClient::new(200, r#"{"tags": ["react", "frontend"]}"#);
    let assistant = AiAssistant::new(client.clone());

    let result = assistant.auto_tag(TITLE, CONTENT).await;

    assert_eq!(
        result,
        AutoTagResult::remote(vec!["react".to_string(), "frontend".to_string()])
    );
    assert_eq!(result.notice(), None);
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_success_body_is_not_a_fallback() {
    let assistant = AiAssistant::new(ScriptedClient::new(200, "{}"));

    let result = assistant.auto_tag(TITLE, CONTENT).await;

    assert_eq!(result, AutoTagResult::remote(Vec::new()));
}

#[tokio::test]
async fn each_call_makes_exactly_one_request() {
    let client = ScriptedClient::new(500, "boom");
    let assistant = AiAssistant::new(client.clone());

    assistant.auto_tag(TITLE, CONTENT).await;
    assistant.summarize(TITLE, CONTENT).await;

    assert_eq!(client.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn summarize_returns_remote_result() {
    let assistant = AiAssistant::new(ScriptedClient::new(
        200,
        r#"{"result": "Hooks manage state and effects."}"#,
    ));

    assert_eq!(
        assistant.summarize(TITLE, CONTENT).await,
        Some("Hooks manage state and effects.".to_string())
    );
}

#[tokio::test]
async fn summarize_failure_is_absent_not_an_error() {
    let not_deployed = AiAssistant::new(ScriptedClient::new(404, "Not Found"));
    assert_eq!(not_deployed.summarize(TITLE, CONTENT).await, None);

    let unreachable = AiAssistant::new(Arc::new(UnreachableClient));
    assert_eq!(unreachable.summarize(TITLE, CONTENT).await, None);
}

#[tokio::test]
async fn loading_flag_tracks_in_flight_call() {
    let client = Arc::new(GatedClient {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let assistant = Arc::new(AiAssistant::new(client.clone()));
    assert!(!assistant.is_loading());

    let task = {
        let assistant = Arc::clone(&assistant);
        tokio::spawn(async move { assistant.auto_tag(TITLE, CONTENT).await })
    };

    client.entered.notified().await;
    assert!(assistant.is_loading());

    client.release.notify_one();
    let result = task.await.expect("auto_tag task panicked");

    assert!(result.fallback);
    assert!(!assistant.is_loading());
}
