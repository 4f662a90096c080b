use super::*;
use pagehands_protocols::types::ToolCall;
use pagehands_protocols::ToolRegistry;

#[test]
fn test_convert_system_separate() {
    let request = CompletionRequest::new("You automate pages.", vec![Message::user("hi")]);
    assert_eq!(convert_system(&request).as_deref(), Some("You automate pages."));
    let messages = convert_messages(&request.messages);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, "user");
}

#[test]
fn test_history_system_messages_fold_into_system() {
    let request = CompletionRequest::new(
        "Base prompt",
        vec![Message::system("Extra rule"), Message::user("hi")],
    );
    assert_eq!(convert_system(&request).as_deref(), Some("Base prompt\n\nExtra rule"));
    assert_eq!(convert_messages(&request.messages).len(), 1);
}

#[test]
fn test_empty_system_is_none() {
    let request = CompletionRequest::new("", vec![Message::user("hi")]);
    assert!(convert_system(&request).is_none());
}

#[test]
fn test_assistant_tool_calls_become_tool_use_blocks() {
    let call = ToolCall::new("toolu_1", "click_element", r#"{"description":"submit button"}"#);
    let messages = convert_messages(&[
        Message::user("click submit"),
        Message::assistant_with_tools("Clicking it.", vec![call]),
    ]);
    assert_eq!(messages[1].role, "assistant");
    match &messages[1].content {
        ApiContent::Blocks(blocks) => {
            assert_eq!(blocks.len(), 2);
            assert_eq!(blocks[0], ContentBlock::Text { text: "Clicking it.".to_string() });
            match &blocks[1] {
                ContentBlock::ToolUse { id, name, input } => {
                    assert_eq!(id, "toolu_1");
                    assert_eq!(name, "click_element");
                    assert_eq!(input["description"], "submit button");
                }
                other => panic!("expected tool_use, got {:?}", other),
            }
        }
        other => panic!("expected blocks, got {:?}", other),
    }
}

#[test]
fn test_invalid_arguments_become_empty_input() {
    let call = ToolCall::new("toolu_1", "scroll_page", "{broken");
    let messages = convert_messages(&[
        Message::user("scroll"),
        Message::assistant_with_tools("", vec![call]),
    ]);
    match &messages[1].content {
        ApiContent::Blocks(blocks) => match &blocks[0] {
            ContentBlock::ToolUse { input, .. } => assert_eq!(input, &serde_json::json!({})),
            other => panic!("expected tool_use, got {:?}", other),
        },
        other => panic!("expected blocks, got {:?}", other),
    }
}

#[test]
fn test_tool_results_become_user_turn() {
    let calls = vec![
        ToolCall::new("t1", "fill_form", "{}"),
        ToolCall::new("t2", "click_element", "{}"),
    ];
    let history = vec![
        Message::user("sign me up"),
        Message::assistant_with_tools("", calls),
        Message::tool("t1", r#"{"success":true}"#),
        Message::tool("t2", r#"{"success":false}"#),
    ];
    let messages = convert_messages(&history);
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].role, "user");
    match &messages[2].content {
        ApiContent::Blocks(blocks) => {
            assert_eq!(blocks.len(), 2);
            assert!(matches!(&blocks[0], ContentBlock::ToolResult { tool_use_id, .. } if tool_use_id == "t1"));
            assert!(matches!(&blocks[1], ContentBlock::ToolResult { tool_use_id, .. } if tool_use_id == "t2"));
        }
        other => panic!("expected blocks, got {:?}", other),
    }
}

#[test]
fn test_leading_orphans_from_trimmed_history_are_dropped() {
    let history = vec![
        Message::tool("t0", "{}"),
        Message::assistant("Done."),
        Message::user("next"),
    ];
    let messages = convert_messages(&history);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, "user");
}

#[test]
fn test_tool_result_after_plain_user_text_is_separate() {
    let history = vec![Message::user("hello"), Message::tool("t1", "{}")];
    let messages = convert_messages(&history);
    assert_eq!(messages.len(), 2);
    assert!(matches!(messages[0].content, ApiContent::Text(_)));
}

#[test]
fn test_convert_tools_renames_parameters() {
    let request = CompletionRequest::new("", vec![])
        .with_tools(ToolRegistry::builtin().definitions().to_vec());
    let tools = convert_tools(&request);
    assert_eq!(tools.len(), 6);
    let json = serde_json::to_value(&tools[1]).unwrap();
    assert_eq!(json["name"], "fill_form");
    assert!(json.get("parameters").is_none());
    assert_eq!(json["input_schema"]["required"], serde_json::json!(["field_description", "value"]));
}
