use super::*;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use pagehands_protocols::bus::{ExecutorRequest, MessageBus};
use pagehands_protocols::error::{BusError, ToolErrorKind};
use pagehands_protocols::provider::{CompletionResponse, ProviderCapabilities};
use pagehands_protocols::types::{MessageRole, ToolCall};

use crate::settings::MemorySettingsStore;

struct ScriptedProvider {
    replies: parking_lot::Mutex<VecDeque<Result<CompletionResponse, ProviderError>>>,
    requests: parking_lot::Mutex<Vec<CompletionRequest>>,
    capabilities: ProviderCapabilities,
    delay: Duration,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<CompletionResponse, ProviderError>>) -> Self {
        Self {
            replies: parking_lot::Mutex::new(replies.into()),
            requests: parking_lot::Mutex::new(Vec::new()),
            capabilities: ProviderCapabilities {
                tool_calling: true,
                separate_system: false,
            },
            delay: Duration::ZERO,
        }
    }

    fn without_tools(mut self) -> Self {
        self.capabilities.tool_calling = false;
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        self.requests.lock().push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(CompletionResponse::text("default")))
    }
}

struct StaticFactory {
    provider: Arc<ScriptedProvider>,
    created: AtomicU32,
}

impl ProviderFactory for StaticFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Arc<dyn LLMProvider>, ProviderError> {
        config
            .kind()
            .map_err(|_| ProviderError::UnknownProvider(config.provider.clone()))?;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self.provider.clone())
    }
}

/// Executor that answers each tool call from a script, keyed by tool name.
struct ScriptedBus {
    replies: parking_lot::Mutex<Vec<(String, Value)>>,
    sent: parking_lot::Mutex<Vec<ExecutorRequest>>,
}

impl ScriptedBus {
    fn new(replies: Vec<(&str, Value)>) -> Self {
        Self {
            replies: parking_lot::Mutex::new(replies.into_iter().map(|(t, v)| (t.to_string(), v)).collect()),
            sent: parking_lot::Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<ExecutorRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl MessageBus for ScriptedBus {
    async fn send(&self, _target_id: &str, request: ExecutorRequest) -> Result<Value, BusError> {
        self.sent.lock().push(request.clone());
        let key = match &request {
            ExecutorRequest::ExecuteTool { tool, .. } => tool.clone(),
            other => other.action().to_string(),
        };
        let mut replies = self.replies.lock();
        match replies.iter().position(|(k, _)| *k == key) {
            Some(index) => Ok(replies.remove(index).1),
            None => Ok(json!({"success": true, "tool": key})),
        }
    }

    async fn inject_executor(&self, _target_id: &str) -> Result<(), BusError> {
        Ok(())
    }
}

struct Harness {
    orchestrator: SessionOrchestrator,
    provider: Arc<ScriptedProvider>,
    factory: Arc<StaticFactory>,
    bus: Arc<ScriptedBus>,
}

async fn harness_with(
    provider: ScriptedProvider,
    bus: ScriptedBus,
    config: ProviderConfig,
    options: OrchestratorConfig,
) -> Harness {
    let provider = Arc::new(provider);
    let factory = Arc::new(StaticFactory {
        provider: provider.clone(),
        created: AtomicU32::new(0),
    });
    let bus = Arc::new(bus);
    let orchestrator = SessionOrchestrator::new(
        options,
        Arc::new(SessionStore::new()),
        ExecutorClient::new(bus.clone(), Duration::from_millis(1)),
        Arc::new(MemorySettingsStore::new(config)),
        factory.clone(),
    )
    .await
    .unwrap();
    Harness {
        orchestrator,
        provider,
        factory,
        bus,
    }
}

async fn harness(provider: ScriptedProvider, bus: ScriptedBus) -> Harness {
    harness_with(provider, bus, configured(), OrchestratorConfig::default()).await
}

fn configured() -> ProviderConfig {
    ProviderConfig::for_provider("openai").with_api_key("sk-test-0000000001")
}

fn tool_reply(calls: Vec<ToolCall>) -> Result<CompletionResponse, ProviderError> {
    Ok(CompletionResponse::new("", calls, None))
}

fn text_reply(text: &str) -> Result<CompletionResponse, ProviderError> {
    Ok(CompletionResponse::text(text))
}

fn chat(message: &str) -> OrchestratorRequest {
    OrchestratorRequest::Chat {
        message: message.to_string(),
        tab_id: "tab-1".to_string(),
        page_context: Some(PageContext::new("https://form.test", "Signup form")),
    }
}

#[tokio::test]
async fn test_chat_without_key_reports_not_configured() {
    let h = harness_with(
        ScriptedProvider::new(vec![]),
        ScriptedBus::new(vec![]),
        ProviderConfig::for_provider("anthropic"),
        OrchestratorConfig::default(),
    )
    .await;

    let reply = h.orchestrator.handle(chat("hello")).await;
    let error = reply["error"].as_str().unwrap();
    assert!(error.starts_with("AI not configured"));
    assert_eq!(h.factory.created.load(Ordering::SeqCst), 0);
    assert!(h.provider.requests().is_empty());
    assert!(h.bus.sent().is_empty());
    assert!(h.orchestrator.sessions().is_empty());
}

#[tokio::test]
async fn test_local_provider_needs_no_key() {
    let h = harness_with(
        ScriptedProvider::new(vec![text_reply("hi there")]).without_tools(),
        ScriptedBus::new(vec![]),
        ProviderConfig::for_provider("local"),
        OrchestratorConfig::default(),
    )
    .await;

    let reply = h.orchestrator.handle(chat("hello")).await;
    assert_eq!(reply["response"], "hi there");
    assert!(h.provider.requests()[0].tools.is_empty());
}

#[tokio::test]
async fn test_click_submit_button_scenario() {
    let call = ToolCall::new("call_abc", "click_element", r#"{"description":"submit button"}"#);
    let h = harness(
        ScriptedProvider::new(vec![tool_reply(vec![call]), text_reply("I clicked the Submit button.")]),
        ScriptedBus::new(vec![(
            "click_element",
            json!({
                "success": true,
                "tool": "click_element",
                "method": "fuzzy",
                "element": {"tag": "button", "text": "Submit"}
            }),
        )]),
    )
    .await;

    let reply = h.orchestrator.handle(chat("click the submit button")).await;
    assert_eq!(reply["response"], "I clicked the Submit button.");
    assert_eq!(reply["toolResults"][0]["method"], "fuzzy");
    assert_eq!(reply["toolResults"][0]["element"]["tag"], "button");

    match &h.bus.sent()[0] {
        ExecutorRequest::ExecuteTool { tool, params, tool_call_id } => {
            assert_eq!(tool, "click_element");
            assert_eq!(params["description"], "submit button");
            assert!(params.get("selector").is_none());
            assert_eq!(tool_call_id.as_deref(), Some("call_abc"));
        }
        other => panic!("unexpected executor request {:?}", other),
    }

    let requests = h.provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools.len(), 6);
    assert!(requests[0].system.contains("Signup form"));
    let tool_turn = requests[1].messages.last().unwrap();
    assert_eq!(tool_turn.role, MessageRole::Tool);
    assert_eq!(tool_turn.tool_call_id.as_deref(), Some("call_abc"));
    assert!(tool_turn.content.contains("\"method\":\"fuzzy\""));

    let history = h.orchestrator.history("tab-1").await;
    let roles: Vec<MessageRole> = history.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![MessageRole::User, MessageRole::Assistant, MessageRole::Tool, MessageRole::Assistant]
    );
    assert_eq!(history[1].tool_calls[0].id, "call_abc");
    assert_eq!(history[3].content, "I clicked the Submit button.");
}

#[tokio::test]
async fn test_tool_calls_run_in_order_and_failures_do_not_halt() {
    let calls = vec![
        ToolCall::new("c1", "fill_form", r#"{"field_description":"email","value":"a@b.test"}"#),
        ToolCall::new("c2", "click_element", r#"{"description":"missing thing"}"#),
        ToolCall::new("c3", "scroll_page", r#"{"direction":"down"}"#),
    ];
    let h = harness(
        ScriptedProvider::new(vec![tool_reply(calls), text_reply("")]),
        ScriptedBus::new(vec![(
            "click_element",
            json!({
                "success": false,
                "tool": "click_element",
                "error": "Element not found: missing thing",
                "errorKind": "element_not_found"
            }),
        )]),
    )
    .await;

    let reply = h.orchestrator.chat("tab-1", "fill and submit", None).await.unwrap();
    let tools: Vec<&str> = reply.tool_results.iter().map(|r| r.tool.as_str()).collect();
    assert_eq!(tools, vec!["fill_form", "click_element", "scroll_page"]);
    assert!(!reply.tool_results[1].success);
    assert_eq!(reply.tool_results[1].error_kind, Some(ToolErrorKind::ElementNotFound));
    assert_eq!(reply.response, ACTIONS_PARTIAL);

    let sent: Vec<String> = h
        .bus
        .sent()
        .iter()
        .map(|r| match r {
            ExecutorRequest::ExecuteTool { tool_call_id, .. } => tool_call_id.clone().unwrap_or_default(),
            other => other.action().to_string(),
        })
        .collect();
    assert_eq!(sent, vec!["c1", "c2", "c3"]);

    let history = h.orchestrator.history("tab-1").await;
    let ids: Vec<&str> = history
        .iter()
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
}

#[tokio::test]
async fn test_follow_up_tool_calls_are_ignored() {
    let follow_up = CompletionResponse::new(
        "Scrolled.",
        vec![ToolCall::new("c9", "navigate", r#"{"url":"https://evil.test"}"#)],
        None,
    );
    let h = harness(
        ScriptedProvider::new(vec![
            tool_reply(vec![ToolCall::new("c1", "scroll_page", r#"{"direction":"down"}"#)]),
            Ok(follow_up),
        ]),
        ScriptedBus::new(vec![]),
    )
    .await;

    let reply = h.orchestrator.chat("tab-1", "scroll down", None).await.unwrap();
    assert_eq!(reply.response, "Scrolled.");
    assert_eq!(h.bus.sent().len(), 1);
    assert_eq!(h.provider.requests().len(), 2);
    assert!(h.orchestrator.history("tab-1").await.last().unwrap().tool_calls.is_empty());
}

#[tokio::test]
async fn test_history_is_bounded() {
    let options = OrchestratorConfig {
        max_history: 4,
        ..Default::default()
    };
    let replies = (0..6).map(|i| text_reply(&format!("reply {}", i))).collect();
    let h = harness_with(ScriptedProvider::new(replies), ScriptedBus::new(vec![]), configured(), options).await;

    for i in 0..6 {
        h.orchestrator.chat("tab-1", &format!("message {}", i), None).await.unwrap();
        assert!(h.orchestrator.history("tab-1").await.len() <= 4);
    }
    let history = h.orchestrator.history("tab-1").await;
    assert_eq!(history[0].content, "message 4");
    assert_eq!(history[3].content, "reply 5");
}

#[tokio::test]
async fn test_provider_failure_is_plain_language_and_rolls_back() {
    let h = harness(
        ScriptedProvider::new(vec![Err(ProviderError::AuthenticationFailed("invalid x-api-key".to_string()))]),
        ScriptedBus::new(vec![]),
    )
    .await;

    let reply = h.orchestrator.handle(chat("hello")).await;
    assert!(reply["error"].as_str().unwrap().contains("API key"));
    assert!(h.orchestrator.history("tab-1").await.is_empty());
}

#[tokio::test]
async fn test_turns_for_one_tab_are_serialized() {
    let h = harness(
        ScriptedProvider::new(vec![text_reply("first"), text_reply("second")])
            .with_delay(Duration::from_millis(20)),
        ScriptedBus::new(vec![]),
    )
    .await;

    let (a, b) = futures::join!(
        h.orchestrator.chat("tab-1", "one", None),
        h.orchestrator.chat("tab-1", "two", None)
    );
    assert!(a.is_ok() && b.is_ok());

    let history = h.orchestrator.history("tab-1").await;
    let roles: Vec<MessageRole> = history.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![MessageRole::User, MessageRole::Assistant, MessageRole::User, MessageRole::Assistant]
    );
    // The second turn saw the first turn's complete exchange.
    assert_eq!(h.provider.requests()[1].messages.len(), 3);
}

#[tokio::test]
async fn test_tab_closed_evicts_session() {
    let h = harness(ScriptedProvider::new(vec![text_reply("ok")]), ScriptedBus::new(vec![])).await;
    h.orchestrator.chat("tab-1", "hi", None).await.unwrap();
    assert!(h.orchestrator.sessions().contains("tab-1"));

    let reply = h
        .orchestrator
        .handle(OrchestratorRequest::TabClosed {
            tab_id: "tab-1".to_string(),
        })
        .await;
    assert_eq!(reply["success"], true);
    assert!(!h.orchestrator.sessions().contains("tab-1"));

    let history = h
        .orchestrator
        .handle(OrchestratorRequest::GetHistory {
            tab_id: "tab-1".to_string(),
        })
        .await;
    assert_eq!(history["history"], json!([]));
}

#[tokio::test]
async fn test_clear_history_works_without_provider() {
    let h = harness_with(
        ScriptedProvider::new(vec![]),
        ScriptedBus::new(vec![]),
        ProviderConfig::for_provider("openai"),
        OrchestratorConfig::default(),
    )
    .await;
    let reply = h
        .orchestrator
        .handle(OrchestratorRequest::ClearHistory {
            tab_id: "tab-1".to_string(),
        })
        .await;
    assert_eq!(reply["success"], true);
}

#[tokio::test]
async fn test_get_config_redacts_key() {
    let h = harness(ScriptedProvider::new(vec![]), ScriptedBus::new(vec![])).await;
    let reply = h.orchestrator.handle(OrchestratorRequest::GetConfig).await;
    assert_eq!(reply["config"]["provider"], "openai");
    assert_eq!(reply["config"]["apiKey"], "****0001");
}

#[tokio::test]
async fn test_set_config_rebuilds_provider() {
    let h = harness_with(
        ScriptedProvider::new(vec![text_reply("now configured")]),
        ScriptedBus::new(vec![]),
        ProviderConfig::for_provider("openai"),
        OrchestratorConfig::default(),
    )
    .await;
    assert!(h.orchestrator.handle(chat("hi")).await.get("error").is_some());

    let reply = h
        .orchestrator
        .handle(OrchestratorRequest::SetConfig {
            config: json!({"provider": "anthropic", "api_key": "sk-ant-abcdefgh1234", "max_tokens": 512}),
        })
        .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["config"]["apiKey"], "****1234");
    assert_eq!(reply["config"]["maxTokens"], 512);
    assert_eq!(h.factory.created.load(Ordering::SeqCst), 1);

    let reply = h.orchestrator.handle(chat("hi")).await;
    assert_eq!(reply["response"], "now configured");
    assert_eq!(h.provider.requests()[0].max_tokens, 512);
}

#[tokio::test]
async fn test_set_config_keeps_key_when_masked_value_echoed() {
    let h = harness(ScriptedProvider::new(vec![]), ScriptedBus::new(vec![])).await;
    h.orchestrator
        .set_config(json!({"apiKey": "****0001", "temperature": 0.2}))
        .await
        .unwrap();
    let reply = h.orchestrator.get_config();
    assert_eq!(reply["config"]["apiKey"], "****0001");
    assert_eq!(h.factory.created.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_set_config_rejects_unknown_provider() {
    let h = harness(ScriptedProvider::new(vec![]), ScriptedBus::new(vec![])).await;
    let reply = h
        .orchestrator
        .handle(OrchestratorRequest::SetConfig {
            config: json!({"provider": "gemini"}),
        })
        .await;
    assert!(reply["error"].as_str().unwrap().contains("provider.provider"));
    assert_eq!(h.orchestrator.get_config()["config"]["provider"], "openai");
}

#[tokio::test]
async fn test_extract_data_goes_straight_to_executor() {
    let h = harness_with(
        ScriptedProvider::new(vec![]),
        ScriptedBus::new(vec![(
            "extract_data",
            json!({
                "success": true,
                "tool": "extract_data",
                "data": {"price": 19.99, "missing": {"error": "No element matches .nope"}}
            }),
        )]),
        ProviderConfig::for_provider("openai"),
        OrchestratorConfig::default(),
    )
    .await;

    let reply = h
        .orchestrator
        .handle(OrchestratorRequest::ExtractData {
            tab_id: "tab-1".to_string(),
            schema: json!({"price": {"selector": ".price", "transform": "number"}, "missing": {"selector": ".nope"}}),
            page_context: None,
        })
        .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["data"]["price"], 19.99);
    assert!(reply["data"]["missing"]["error"].is_string());
    assert!(h.provider.requests().is_empty());

    match &h.bus.sent()[0] {
        ExecutorRequest::ExecuteTool { tool, params, .. } => {
            assert_eq!(tool, "extract_data");
            assert_eq!(params["schema"]["price"]["selector"], ".price");
        }
        other => panic!("unexpected executor request {:?}", other),
    }
}

#[tokio::test]
async fn test_execute_action_rejects_unknown_tool() {
    let h = harness(ScriptedProvider::new(vec![]), ScriptedBus::new(vec![])).await;
    let reply = h
        .orchestrator
        .handle(OrchestratorRequest::ExecuteAction {
            tab_id: "tab-1".to_string(),
            action_data: ActionData::new("run_script", json!({})),
        })
        .await;
    assert!(reply["error"].as_str().unwrap().contains("Unknown tool"));
    assert!(h.bus.sent().is_empty());
}

#[tokio::test]
async fn test_summarize_uses_body_text_without_tools() {
    let h = harness(
        ScriptedProvider::new(vec![text_reply("A short summary.")]),
        ScriptedBus::new(vec![(
            "get_structure",
            json!({
                "url": "https://news.test",
                "title": "News",
                "meta": {},
                "interactive": {"counts": {"buttons": 0, "links": 0, "inputs": 0, "selects": 0, "textareas": 0}, "elements": []},
                "forms": [],
                "headings": [],
                "navigation": [],
                "bodyText": "Markets rallied today."
            }),
        )]),
    )
    .await;

    let reply = h
        .orchestrator
        .handle(OrchestratorRequest::Summarize {
            tab_id: "tab-1".to_string(),
            page_context: None,
        })
        .await;
    assert_eq!(reply["summary"], "A short summary.");
    let request = &h.provider.requests()[0];
    assert!(request.tools.is_empty());
    assert!(request.messages[0].content.contains("Markets rallied today."));
    assert!(h.orchestrator.history("tab-1").await.is_empty());
}

#[tokio::test]
async fn test_analyze_page_returns_analysis_and_structure() {
    let h = harness(
        ScriptedProvider::new(vec![text_reply("A login page with one form.")]),
        ScriptedBus::new(vec![(
            "get_structure",
            json!({
                "url": "https://login.test",
                "title": "Sign in",
                "meta": {},
                "interactive": {"counts": {"buttons": 1, "links": 0, "inputs": 2, "selects": 0, "textareas": 0}, "elements": []},
                "forms": [],
                "headings": [{"level": 1, "text": "Welcome back"}],
                "navigation": [],
                "bodyText": "Welcome back"
            }),
        )]),
    )
    .await;

    let reply = h
        .orchestrator
        .handle(OrchestratorRequest::AnalyzePage {
            tab_id: "tab-1".to_string(),
        })
        .await;

    assert_eq!(reply["analysis"], "A login page with one form.");
    assert_eq!(reply["structure"]["title"], "Sign in");
    assert_eq!(reply["structure"]["interactive"]["counts"]["inputs"], 2);
    assert!(h.provider.requests()[0].tools.is_empty());
    assert_eq!(h.bus.sent(), vec![ExecutorRequest::GetStructure]);
}

#[tokio::test]
async fn test_malformed_message_is_rejected() {
    let h = harness(ScriptedProvider::new(vec![]), ScriptedBus::new(vec![])).await;
    let reply = h.orchestrator.handle_value(json!({"action": "chat"})).await;
    assert!(reply["error"].as_str().unwrap().starts_with("Invalid request"));
}

#[test]
fn test_camel_case() {
    assert_eq!(camel_case("base_url"), "baseUrl");
    assert_eq!(camel_case("timeout_ms"), "timeoutMs");
    assert_eq!(camel_case("apiKey"), "apiKey");
}

#[tokio::test]
async fn test_failed_follow_up_still_reports_tool_results() {
    let call = ToolCall::new("call_1", "click_element", r#"{"description":"Create account"}"#);
    let mut config = configured();
    config.max_retries = 0;
    let h = harness_with(
        ScriptedProvider::new(vec![
            tool_reply(vec![call]),
            Err(ProviderError::from_status(500, "upstream exploded")),
        ]),
        ScriptedBus::new(vec![("click_element", json!({"success": true, "tool": "click_element"}))]),
        config,
        OrchestratorConfig::default(),
    )
    .await;

    let reply = h.orchestrator.handle(chat("create my account")).await;
    assert!(reply.get("error").is_none(), "{}", reply);
    let response = reply["response"].as_str().unwrap();
    assert!(response.starts_with(ACTIONS_PARTIAL));
    assert!(response.contains("busy or unavailable"));
    assert_eq!(reply["toolResults"][0]["success"], true);

    let history = h.orchestrator.history("tab-1").await;
    let roles: Vec<MessageRole> = history.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![MessageRole::User, MessageRole::Assistant, MessageRole::Tool, MessageRole::Assistant]
    );
    assert_eq!(history[3].content, response);
}
