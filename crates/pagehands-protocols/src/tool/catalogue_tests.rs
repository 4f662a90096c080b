use super::*;

#[test]
fn test_builtin_has_six_tools_in_order() {
    let names: Vec<_> = ToolRegistry::builtin()
        .definitions()
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["click_element", "fill_form", "scroll_page", "find_text", "extract_data", "navigate"]
    );
}

#[test]
fn test_builtin_is_shared() {
    let a = ToolRegistry::builtin() as *const ToolRegistry;
    let b = ToolRegistry::builtin() as *const ToolRegistry;
    assert_eq!(a, b);
}

#[test]
fn test_click_element_schema() {
    let def = ToolRegistry::builtin().get("click_element").unwrap();
    assert_eq!(def.parameters["required"], json!(["description"]));
    assert_eq!(def.parameters["properties"]["selector"]["type"], "string");
}

#[test]
fn test_fill_form_schema_fields() {
    let def = ToolRegistry::builtin().get("fill_form").unwrap();
    let props = def.parameters["properties"].as_object().unwrap();
    assert!(props.contains_key("field_description"));
    assert!(props.contains_key("value"));
    assert!(props.contains_key("selector"));
    assert_eq!(def.parameters["required"], json!(["field_description", "value"]));
}

#[test]
fn test_scroll_page_direction_enum() {
    let def = ToolRegistry::builtin().get("scroll_page").unwrap();
    assert_eq!(
        def.parameters["properties"]["direction"]["enum"],
        json!(["up", "down", "top", "bottom"])
    );
}

#[test]
fn test_find_text_case_sensitive_is_boolean() {
    let def = ToolRegistry::builtin().get("find_text").unwrap();
    assert_eq!(def.parameters["properties"]["case_sensitive"]["type"], "boolean");
}

#[test]
fn test_extract_data_transform_enum() {
    let def = ToolRegistry::builtin().get("extract_data").unwrap();
    let rule = &def.parameters["properties"]["schema"]["additionalProperties"];
    assert_eq!(rule["properties"]["transform"]["enum"], json!(["number", "date", "trim"]));
}

#[test]
fn test_get_unknown_tool() {
    assert!(ToolRegistry::builtin().get("execute_js").is_none());
}

#[test]
fn test_tool_name_from_str() {
    assert_eq!("navigate".parse::<ToolName>().unwrap(), ToolName::Navigate);
    assert!("eval".parse::<ToolName>().is_err());
}

#[test]
fn test_tool_name_serde_matches_as_str() {
    for name in ToolName::ALL {
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json.trim_matches('"'), name.as_str());
    }
}
