//! Tests for the tool system.

use std::sync::Arc;

use adk::tools::*;

#[test]
fn parameter_builder_constructs_schema() {
    let params = ToolParameters::object()
        .string("query", "Search query", true)
        .number("limit", "Max results", false)
        .boolean("verbose", "Enable verbose output", false)
        .build();

    let schema = &params.schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["query"]["type"], "string");
    assert_eq!(schema["properties"]["limit"]["type"], "number");
    assert_eq!(schema["required"].as_array().unwrap().len(), 1);
}

#[test]
fn parameter_builder_string_enum() {
    let params = ToolParameters::object()
        .string_enum("units", "Temperature units", &["celsius", "fahrenheit"], true)
        .build();

    let enums = params.schema["properties"]["units"]["enum"]
        .as_array()
        .unwrap();
    assert_eq!(enums.len(), 2);
}

#[test]
fn tool_arguments_accessors() {
    let args = ToolArguments::new(serde_json::json!({"city": "Seoul", "days": 3, "metric": true}));
    assert_eq!(args.get_str("city").unwrap(), "Seoul");
    assert_eq!(args.get_i64("days").unwrap(), 3);
    assert!(args.get_bool("metric").unwrap());
    assert_eq!(args.get_str_opt("missing"), None);
    assert!(args.get_str("missing").is_err());
}

#[test]
fn tool_arguments_deserialize() {
    #[derive(serde::Deserialize, PartialEq, Debug)]
    struct Params {
        city: String,
        days: Option<u32>,
    }

    let args = ToolArguments::new(serde_json::json!({"city": "Busan", "days": 2}));
    let params: Params = args.deserialize().unwrap();
    assert_eq!(params.city, "Busan");
    assert_eq!(params.days, Some(2));
}

fn greet_tool(description: &'static str) -> Arc<dyn Tool> {
    FunctionTool::new(
        "greet",
        description,
        ToolParameters::object()
            .string("name", "Name", true)
            .build(),
        |args, _ctx| async move {
            let name = args.get_str("name")?;
            Ok(serde_json::json!({"greeting": format!("Hello, {}!", name)}))
        },
    )
    .into_arc()
}

#[tokio::test]
async fn function_tool_executes() {
    let tool = greet_tool("Greet a person");
    assert_eq!(tool.name(), "greet");
    assert_eq!(tool.description(), "Greet a person");

    let args = ToolArguments::new(serde_json::json!({"name": "World"}));
    let result = tool
        .execute(&args, &ToolExecutionContext::default())
        .await
        .unwrap();
    assert_eq!(result["greeting"], "Hello, World!");
}

#[test]
fn tool_set_keeps_last_registration_per_name() {
    let echo = FunctionTool::new("echo", "Echo", ToolParameters::empty(), |args, _ctx| async move {
        Ok(args.raw().clone())
    })
    .into_arc();
    let set = ToolSet::new([greet_tool("first"), echo, greet_tool("second")]);

    assert_eq!(set.len(), 2);
    assert_eq!(set.names(), vec!["greet", "echo"]);
    assert_eq!(set.get("greet").unwrap().description(), "second");
    assert!(set.get("missing").is_none());

    let definitions = set.definitions();
    assert_eq!(definitions[0].name, "greet");
    assert_eq!(definitions[0].parameters["required"][0], "name");
}
