use super::*;
use serde_json::json;

#[test]
fn test_chat_request_deserialization() {
    let req: OrchestratorRequest = serde_json::from_value(json!({
        "action": "chat",
        "message": "click the submit button",
        "tabId": "7",
        "pageContext": {"url": "https://form.test", "title": "Form"}
    }))
    .unwrap();

    match req {
        OrchestratorRequest::Chat { message, tab_id, page_context } => {
            assert_eq!(message, "click the submit button");
            assert_eq!(tab_id, "7");
            assert_eq!(page_context.unwrap().title, "Form");
        }
        other => panic!("unexpected request: {:?}", other),
    }
}

#[test]
fn test_numeric_tab_id_is_accepted() {
    let req: OrchestratorRequest =
        serde_json::from_value(json!({"action": "tab_closed", "tabId": 42})).unwrap();
    assert_eq!(req.tab_id(), Some("42"));
    assert_eq!(req.action(), "tab_closed");
}

#[test]
fn test_unit_actions() {
    let req: OrchestratorRequest = serde_json::from_value(json!({"action": "get_config"})).unwrap();
    assert_eq!(req, OrchestratorRequest::GetConfig);
    assert!(req.tab_id().is_none());
}

#[test]
fn test_execute_action_data() {
    let req: OrchestratorRequest = serde_json::from_value(json!({
        "action": "execute_action",
        "tabId": "1",
        "actionData": {"tool": "scroll_page", "params": {"direction": "down"}}
    }))
    .unwrap();
    match req {
        OrchestratorRequest::ExecuteAction { action_data, .. } => {
            assert_eq!(action_data.tool, "scroll_page");
            assert_eq!(action_data.params["direction"], "down");
        }
        other => panic!("unexpected request: {:?}", other),
    }
}

#[test]
fn test_unknown_action_is_rejected() {
    let result: Result<OrchestratorRequest, _> =
        serde_json::from_value(json!({"action": "run_script", "tabId": "1"}));
    assert!(result.is_err());
}

#[test]
fn test_executor_request_serialization() {
    let req = ExecutorRequest::ExecuteTool {
        tool: "click_element".to_string(),
        params: json!({"description": "submit button"}),
        tool_call_id: Some("call_1".to_string()),
    };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["action"], "execute_tool");
    assert_eq!(value["toolCallId"], "call_1");
    assert_eq!(value["params"]["description"], "submit button");
}

#[test]
fn test_executor_request_unit_variant() {
    let value = serde_json::to_value(ExecutorRequest::GetStructure).unwrap();
    assert_eq!(value, json!({"action": "get_structure"}));
    let back: ExecutorRequest = serde_json::from_value(json!({"action": "get_selection"})).unwrap();
    assert_eq!(back.action(), "get_selection");
}
