//! Message and tool conversion for OpenAI API.

use pagehands_protocols::provider::CompletionRequest;
use pagehands_protocols::types::{Message, MessageRole};
use pagehands_protocols::ToolDefinition;

use crate::api::{ApiMessage, ApiTool, ApiToolCall, FunctionCall, FunctionDef};

/// Convert the system prompt and history to OpenAI API format.
pub fn convert_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if !request.system.is_empty() {
        messages.push(ApiMessage {
            role: "system".to_string(),
            content: Some(request.system.clone()),
            tool_calls: None,
            tool_call_id: None,
        });
    }
    // A trimmed history can open on tool results whose call was dropped.
    let history = request
        .messages
        .iter()
        .skip_while(|m| m.role == MessageRole::Tool);
    messages.extend(history.map(convert_message));
    messages
}

fn convert_message(msg: &Message) -> ApiMessage {
    let role = msg.role.as_str().to_string();

    // Assistant turns that called tools
    if msg.has_tool_calls() {
        let tool_calls = msg
            .tool_calls
            .iter()
            .map(|tc| ApiToolCall {
                id: tc.id.clone(),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: tc.name.clone(),
                    arguments: tc.arguments.clone(),
                },
            })
            .collect();

        return ApiMessage {
            role,
            content: if msg.content.is_empty() { None } else { Some(msg.content.clone()) },
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        };
    }

    ApiMessage {
        role,
        content: Some(msg.content.clone()),
        tool_calls: None,
        tool_call_id: if msg.role == MessageRole::Tool { msg.tool_call_id.clone() } else { None },
    }
}

/// Convert tool definitions for OpenAI API.
pub fn convert_tools(request: &CompletionRequest) -> Vec<ApiTool> {
    request.tools.iter().map(convert_tool).collect()
}

fn convert_tool(tool: &ToolDefinition) -> ApiTool {
    ApiTool {
        tool_type: "function".to_string(),
        function: FunctionDef {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}
