//! Session orchestrator: request dispatch and the chat turn state machine.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, field, info, info_span, warn, Instrument, Span};

use pagehands_config::{Config, ConfigValidator, OrchestratorConfig, ProviderConfig};
use pagehands_protocols::bus::{ActionData, OrchestratorRequest};
use pagehands_protocols::error::ProviderError;
use pagehands_protocols::page::PageContext;
use pagehands_protocols::provider::{CompletionRequest, LLMProvider};
use pagehands_protocols::tool::{ToolDefinition, ToolName, ToolRegistry, ToolResult};
use pagehands_protocols::types::{Message, TurnState};

use crate::context_builder::ContextBuilder;
use crate::error::OrchestratorError;
use crate::executor_client::ExecutorClient;
use crate::factory::ProviderFactory;
use crate::retry::{RetryConfig, RetryProvider};
use crate::session::Session;
use crate::session_store::{SessionCleaner, SessionStore};
use crate::settings::SettingsStore;

const EMPTY_REPLY: &str = "I'm not sure how to help with that.";
const ACTIONS_DONE: &str = "I've completed the requested actions.";
const ACTIONS_PARTIAL: &str = "I tried the requested actions, but some of them could not be completed.";

/// Reply to a chat turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub tool_results: Vec<ToolResult>,
}

/// The provider built from the current settings.
struct ProviderSlot {
    config: ProviderConfig,
    provider: Option<Arc<dyn LLMProvider>>,
    build_error: Option<ProviderError>,
}

/// Owns all sessions and handles every orchestrator request.
pub struct SessionOrchestrator {
    options: OrchestratorConfig,
    sessions: Arc<SessionStore>,
    executor: ExecutorClient,
    settings: Arc<dyn SettingsStore>,
    factory: Arc<dyn ProviderFactory>,
    slot: RwLock<ProviderSlot>,
}

impl SessionOrchestrator {
    /// Create an orchestrator, building the provider from the stored settings.
    pub async fn new(
        options: OrchestratorConfig,
        sessions: Arc<SessionStore>,
        executor: ExecutorClient,
        settings: Arc<dyn SettingsStore>,
        factory: Arc<dyn ProviderFactory>,
    ) -> Result<Self, OrchestratorError> {
        let config = settings.load().await?;
        let slot = build_slot(factory.as_ref(), config);
        Ok(Self {
            options,
            sessions,
            executor,
            settings,
            factory,
            slot: RwLock::new(slot),
        })
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Idle-session sweeper for this orchestrator's store.
    pub fn cleaner(&self) -> SessionCleaner {
        SessionCleaner::new(
            self.sessions.clone(),
            Duration::from_secs(self.options.session_ttl_secs),
            Duration::from_secs(self.options.sweep_interval_secs),
        )
    }

    /// Handle a raw bus message.
    pub async fn handle_value(&self, message: Value) -> Value {
        match serde_json::from_value::<OrchestratorRequest>(message) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!("Rejected malformed request: {}", e);
                json!({ "error": format!("Invalid request: {}", e) })
            }
        }
    }

    /// Handle one request. Failures become a single `{error}` reply.
    pub async fn handle(&self, request: OrchestratorRequest) -> Value {
        let action = request.action();
        debug!(action, tab_id = request.tab_id().unwrap_or("-"), "Handling request");

        let result = match request {
            OrchestratorRequest::Chat {
                message,
                tab_id,
                page_context,
            } => self
                .chat(&tab_id, &message, page_context)
                .await
                .and_then(|reply| to_value(&reply)),
            OrchestratorRequest::AnalyzePage { tab_id } => self.analyze_page(&tab_id).await,
            OrchestratorRequest::Summarize { tab_id, page_context } => {
                self.summarize(&tab_id, page_context).await
            }
            OrchestratorRequest::ExtractData { tab_id, schema, .. } => {
                self.extract_data(&tab_id, schema).await.and_then(|r| to_value(&r))
            }
            OrchestratorRequest::GetPageStructure { tab_id } => self
                .executor
                .get_structure(&tab_id)
                .await
                .map_err(OrchestratorError::from)
                .and_then(|structure| Ok(json!({ "structure": to_value(&structure)? }))),
            OrchestratorRequest::ExecuteAction { tab_id, action_data } => {
                self.execute_action(&tab_id, action_data).await.and_then(|r| to_value(&r))
            }
            OrchestratorRequest::GetConfig => Ok(self.get_config()),
            OrchestratorRequest::SetConfig { config } => self.set_config(config).await,
            OrchestratorRequest::ClearHistory { tab_id } => {
                let cleared = self.sessions.remove(&tab_id);
                info!(tab_id = %tab_id, cleared, "Cleared history");
                Ok(json!({ "success": true }))
            }
            OrchestratorRequest::GetHistory { tab_id } => Ok(json!({ "history": self.history(&tab_id).await })),
            OrchestratorRequest::TabClosed { tab_id } => {
                self.tab_closed(&tab_id);
                Ok(json!({ "success": true }))
            }
        };

        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(action, "Request failed: {}", e);
                json!({ "error": e.user_message() })
            }
        }
    }

    /// Run one chat turn for a tab.
    pub async fn chat(
        &self,
        tab_id: &str,
        message: &str,
        page_context: Option<PageContext>,
    ) -> Result<ChatResponse, OrchestratorError> {
        if message.trim().is_empty() {
            return Err(OrchestratorError::InvalidRequest("Message is empty".to_string()));
        }
        let (provider, config) = self.current_provider()?;

        let handle = self.sessions.get_or_create(tab_id);
        let mut session = handle.lock().await;

        let span = info_span!("chat_turn", tab_id, provider = provider.id(), state = field::Empty);
        let reply = self
            .run_turn(&mut session, provider.as_ref(), &config, message, page_context, &span)
            .instrument(span.clone())
            .await;

        session.trim_history(self.options.max_history);
        session.touch();
        enter_state(&span, TurnState::Idle);
        reply
    }

    async fn run_turn(
        &self,
        session: &mut Session,
        provider: &dyn LLMProvider,
        config: &ProviderConfig,
        message: &str,
        page_context: Option<PageContext>,
        span: &Span,
    ) -> Result<ChatResponse, OrchestratorError> {
        let checkpoint = session.history.len();
        if page_context.is_some() {
            session.page_context = page_context;
        }
        session.push(Message::user(message));

        let tools_enabled = provider.capabilities().tool_calling;
        let system = ContextBuilder::new()
            .with_page_context(session.page_context.as_ref())
            .with_tools(tools_enabled)
            .build();
        let tools: Vec<ToolDefinition> = if tools_enabled {
            ToolRegistry::builtin().definitions().to_vec()
        } else {
            Vec::new()
        };

        enter_state(span, TurnState::AwaitingModel);
        let first = match provider
            .complete(build_request(config, &system, &session.history, &tools))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                session.history.truncate(checkpoint);
                return Err(e.into());
            }
        };

        let calls = first.calls().to_vec();
        if calls.is_empty() || !tools_enabled {
            if !calls.is_empty() {
                warn!(count = calls.len(), "Ignoring tool calls from a provider without tool support");
            }
            let text = non_empty(first.content, EMPTY_REPLY);
            session.push(Message::assistant(text.clone()));
            return Ok(ChatResponse {
                response: text,
                tool_results: Vec::new(),
            });
        }

        enter_state(span, TurnState::ExecutingTools);
        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            let result = self.executor.execute_tool(&session.tab_id, call).await;
            if !result.success {
                info!(tool = %call.name, error = result.error.as_deref().unwrap_or(""), "Tool call failed");
            }
            results.push(result);
        }

        session.push(Message::assistant_with_tools(first.content, calls.clone()));
        for (call, result) in calls.iter().zip(&results) {
            session.push(Message::tool(&call.id, result.to_message_content()));
        }

        enter_state(span, TurnState::AwaitingFinal);
        let text = match provider
            .complete(build_request(config, &system, &session.history, &tools))
            .await
        {
            Ok(last) => {
                if !last.calls().is_empty() {
                    warn!(count = last.calls().len(), "Ignoring tool calls in follow-up response");
                }
                let fallback = if results.iter().all(|r| r.success) {
                    ACTIONS_DONE
                } else {
                    ACTIONS_PARTIAL
                };
                non_empty(last.content, fallback)
            }
            // The actions already ran; report them rather than the bare error.
            Err(e) => {
                warn!("Follow-up completion failed: {}", e);
                format!("{} {}", ACTIONS_PARTIAL, e.user_message())
            }
        };
        session.push(Message::assistant(text.clone()));

        Ok(ChatResponse {
            response: text,
            tool_results: results,
        })
    }

    /// Ask the model to analyze a fresh structure snapshot.
    pub async fn analyze_page(&self, tab_id: &str) -> Result<Value, OrchestratorError> {
        let (provider, config) = self.current_provider()?;
        let structure = self.executor.get_structure(tab_id).await?;

        let context = structure.to_context();
        let system = ContextBuilder::new().with_page_context(Some(&context)).build();
        let prompt = ContextBuilder::analysis_prompt(&structure);
        let response = provider
            .complete(build_request(&config, &system, &[Message::user(prompt)], &[]))
            .await?;

        Ok(json!({
            "analysis": response.content,
            "structure": to_value(&structure)?,
        }))
    }

    /// Ask the model to summarize the page's body text.
    pub async fn summarize(
        &self,
        tab_id: &str,
        page_context: Option<PageContext>,
    ) -> Result<Value, OrchestratorError> {
        let (provider, config) = self.current_provider()?;
        let structure = self.executor.get_structure(tab_id).await?;

        let context = page_context.unwrap_or_else(|| structure.to_context());
        let system = ContextBuilder::new().with_page_context(Some(&context)).build();
        let prompt = ContextBuilder::summary_prompt(&structure.title, &structure.body_text);
        let response = provider
            .complete(build_request(&config, &system, &[Message::user(prompt)], &[]))
            .await?;

        Ok(json!({ "summary": response.content }))
    }

    /// Declarative extraction through the executor. Needs no provider.
    pub async fn extract_data(&self, tab_id: &str, schema: Value) -> Result<ToolResult, OrchestratorError> {
        if !schema.is_object() {
            return Err(OrchestratorError::InvalidRequest(
                "Extraction schema must be an object".to_string(),
            ));
        }
        let tool = ToolName::ExtractData.as_str();
        Ok(self
            .executor
            .run_tool(tab_id, tool, json!({ "schema": schema }), None)
            .await)
    }

    /// Execute a tool directly, without the model.
    pub async fn execute_action(&self, tab_id: &str, data: ActionData) -> Result<ToolResult, OrchestratorError> {
        if data.tool.parse::<ToolName>().is_err() {
            return Err(OrchestratorError::InvalidRequest(format!("Unknown tool: {}", data.tool)));
        }
        Ok(self.executor.execute_action(tab_id, data).await)
    }

    /// Current provider settings with the key redacted.
    pub fn get_config(&self) -> Value {
        let config = self.slot.read().config.redacted();
        json!({ "config": config })
    }

    /// Merge a partial provider config over the current one, persist it and
    /// rebuild the provider.
    pub async fn set_config(&self, patch: Value) -> Result<Value, OrchestratorError> {
        let Value::Object(patch) = patch else {
            return Err(OrchestratorError::InvalidRequest("config must be an object".to_string()));
        };

        let current = self.slot.read().config.clone();
        let config = merge_config(&current, patch)?;

        let validation = ConfigValidator::validate(&Config {
            provider: config.clone(),
            ..Default::default()
        })?;
        if !validation.is_valid() {
            let messages: Vec<String> = validation
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.path, e.message))
                .collect();
            return Err(OrchestratorError::Config(messages.join("; ")));
        }

        self.settings.save(&config).await?;
        let slot = build_slot(self.factory.as_ref(), config);
        info!(
            provider = %slot.config.provider,
            configured = slot.provider.is_some(),
            "Provider settings updated"
        );
        let redacted = slot.config.redacted();
        *self.slot.write() = slot;

        Ok(json!({ "success": true, "config": redacted }))
    }

    /// History of a tab, oldest first; empty when there is no session.
    pub async fn history(&self, tab_id: &str) -> Vec<Message> {
        match self.sessions.get(tab_id) {
            Some(handle) => handle.lock().await.history.clone(),
            None => Vec::new(),
        }
    }

    /// Drop a closed tab's session.
    pub fn tab_closed(&self, tab_id: &str) {
        if self.sessions.remove(tab_id) {
            info!(tab_id, "Tab closed, session removed");
        }
    }

    fn current_provider(&self) -> Result<(Arc<dyn LLMProvider>, ProviderConfig), OrchestratorError> {
        let slot = self.slot.read();
        match (&slot.provider, &slot.build_error) {
            (Some(provider), _) => Ok((provider.clone(), slot.config.clone())),
            (None, Some(e)) => Err(OrchestratorError::Provider(e.clone())),
            (None, None) => Err(OrchestratorError::NotConfigured(slot.config.provider.clone())),
        }
    }
}

fn build_slot(factory: &dyn ProviderFactory, config: ProviderConfig) -> ProviderSlot {
    if !config.has_credentials() {
        if config.kind().is_err() {
            return ProviderSlot {
                build_error: Some(ProviderError::UnknownProvider(config.provider.clone())),
                config,
                provider: None,
            };
        }
        debug!(provider = %config.provider, "No API key stored; provider not built");
        return ProviderSlot {
            config,
            provider: None,
            build_error: None,
        };
    }

    match factory.create(&config) {
        Ok(inner) => {
            let provider: Arc<dyn LLMProvider> =
                Arc::new(RetryProvider::new(inner, RetryConfig::from(&config)));
            ProviderSlot {
                config,
                provider: Some(provider),
                build_error: None,
            }
        }
        Err(e) => {
            warn!(provider = %config.provider, "Could not build provider: {}", e);
            ProviderSlot {
                config,
                provider: None,
                build_error: Some(e),
            }
        }
    }
}

fn build_request(
    config: &ProviderConfig,
    system: &str,
    history: &[Message],
    tools: &[ToolDefinition],
) -> CompletionRequest {
    CompletionRequest::new(system, history.to_vec())
        .with_tools(tools.to_vec())
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
}

/// Overlay a partial config, accepting snake_case keys and ignoring a masked key
/// echoed back from `get_config`.
fn merge_config(current: &ProviderConfig, patch: Map<String, Value>) -> Result<ProviderConfig, OrchestratorError> {
    let mut merged = match serde_json::to_value(current) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    for (key, value) in patch {
        let key = camel_case(&key);
        if key == "apiKey" && value.as_str().is_some_and(|k| k.starts_with("****")) {
            continue;
        }
        if value.is_null() {
            merged.remove(&key);
        } else {
            merged.insert(key, value);
        }
    }

    serde_json::from_value(Value::Object(merged))
        .map_err(|e| OrchestratorError::InvalidRequest(format!("Invalid config: {}", e)))
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn enter_state(span: &Span, state: TurnState) {
    span.record("state", field::display(state));
    debug!(parent: span, state = %state, "Turn state");
}

fn non_empty(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, OrchestratorError> {
    serde_json::to_value(value).map_err(|e| OrchestratorError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
