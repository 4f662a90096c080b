use super::*;

#[test]
fn test_message_user() {
    let msg = Message::user("Hello");
    assert_eq!(msg.role, MessageRole::User);
    assert_eq!(msg.content, "Hello");
    assert!(msg.tool_calls.is_empty());
    assert!(msg.tool_call_id.is_none());
}

#[test]
fn test_message_tool() {
    let msg = Message::tool("call_1", "{\"success\":true}");
    assert_eq!(msg.role, MessageRole::Tool);
    assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
}

#[test]
fn test_message_assistant_with_tools() {
    let call = ToolCall::new("call_1", "click_element", "{\"description\":\"submit\"}");
    let msg = Message::assistant_with_tools("", vec![call]);
    assert!(msg.has_tool_calls());
    assert_eq!(msg.tool_calls[0].name, "click_element");
}

#[test]
fn test_message_serialization_is_camel_case() {
    let msg = Message::tool("call_9", "done");
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["role"], "tool");
    assert_eq!(json["toolCallId"], "call_9");
    assert!(json.get("toolCalls").is_none());
}

#[test]
fn test_message_deserialization_defaults() {
    let msg: Message = serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
    assert_eq!(msg.role, MessageRole::Assistant);
    assert!(msg.tool_calls.is_empty());
}

#[test]
fn test_role_as_str() {
    assert_eq!(MessageRole::System.as_str(), "system");
    assert_eq!(MessageRole::Tool.as_str(), "tool");
}

#[test]
fn test_tool_call_parsed_arguments() {
    let call = ToolCall::new("1", "navigate", r#"{"url":"https://example.com"}"#);
    let args = call.parsed_arguments().unwrap();
    assert_eq!(args["url"], "https://example.com");
}

#[test]
fn test_tool_call_empty_arguments_is_empty_object() {
    let call = ToolCall::new("1", "scroll_page", "  ");
    assert_eq!(call.parsed_arguments().unwrap(), serde_json::json!({}));
}

#[test]
fn test_tool_call_invalid_arguments() {
    let call = ToolCall::new("1", "navigate", "{not json");
    assert!(call.parsed_arguments().is_err());
}
