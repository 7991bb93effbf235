// Integration tests for tapedeck-tools
//
// These run the bundled tools inside a full agent invocation and check what
// a display would see.

use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use tapedeck_core::{
    box_tools, multiplex, run_tool, AgentInput, ChannelProducer, DocumentUpdate, DynTool,
    EventSink, Fragment, ProducerError,
};
use tapedeck_tools::{all_tools, GithubRepoTool, InvoiceTool, ToolsConfig, WeatherTool};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_all_tools_names_and_schemas() {
    let tools = all_tools(&ToolsConfig::default()).unwrap();
    let names: Vec<&str> = tools.iter().map(|tool| tool.name()).collect();
    assert_eq!(names, vec!["github_repo", "get_order_invoice", "get_weather"]);

    for tool in &tools {
        let schema = tool.input_schema();
        assert!(schema["properties"].is_object(), "{} has no properties", tool.name());
        assert!(!tool.description().is_empty());
    }

    let weather = &tools[2].input_schema();
    let required: Vec<&str> = weather["required"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(required.contains(&"city"));
    assert!(required.contains(&"state"));
    assert!(!required.contains(&"country"));
}

#[tokio::test]
async fn test_box_tools_collects_mixed_tools() {
    let config = ToolsConfig::default();
    let client = config.http_client().unwrap();
    let tools: Vec<Box<dyn DynTool>> = box_tools![
        InvoiceTool::new(&config),
        WeatherTool::new(&config, client.clone()),
        GithubRepoTool::new(&config, client),
    ];

    let names: Vec<&str> = tools.iter().map(|tool| tool.name()).collect();
    assert_eq!(names, vec!["get_order_invoice", "get_weather", "github_repo"]);

    let (sink, events) = EventSink::channel();
    let result = run_tool(tools[0].as_ref(), json!({"order_id": "ORD-9"}), &sink).await;
    drop(sink);
    let rendered: Vec<_> = events.collect().await;
    assert_eq!(rendered.len(), 2);
    assert!(result.contains("ORD-9"));
}

/// Agent that narrates, calls `github_repo`, then narrates again in a second run.
#[tokio::test]
async fn test_github_tool_inside_agent_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/tokio-rs/tokio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "description": "Async runtime",
            "stargazers_count": 1,
            "language": "Rust"
        })))
        .mount(&server)
        .await;

    let config = ToolsConfig::default().with_github_api_url(server.uri());
    let tools = Arc::new(all_tools(&config).unwrap());

    let producer = ChannelProducer::new(move |_input: AgentInput, sink: EventSink| {
        let tools = tools.clone();
        async move {
            sink.token("run-1", "Let me check.");
            let result = run_tool(
                tools[0].as_ref(),
                json!({"owner": "tokio-rs", "repo": "tokio"}),
                &sink,
            )
            .await;
            sink.token("run-2", format!("Done: {}", result.len()));
            Ok::<(), ProducerError>(())
        }
    });

    let handle = multiplex(&producer, AgentInput::new("tokio-rs/tokio?"));
    let updates: Vec<DocumentUpdate> = handle.document.collect().await;

    let run_one = Fragment::RunText {
        run_id: "run-1".to_string(),
    };
    let run_two = Fragment::RunText {
        run_id: "run-2".to_string(),
    };
    assert_eq!(updates.len(), 5);
    assert_eq!(updates[0], DocumentUpdate::Append(run_one));
    assert_eq!(
        updates[1],
        DocumentUpdate::Replace(Fragment::bare("GithubLoading"))
    );
    assert!(matches!(
        &updates[2],
        DocumentUpdate::Replace(Fragment::Component { name, props })
            if name == "Github" && props["language"] == "Rust"
    ));
    assert_eq!(updates[3], DocumentUpdate::Append(run_two));
    assert_eq!(updates[4], DocumentUpdate::Closed);

    assert_eq!(
        handle.runs.subscribe("run-1").unwrap().current().text,
        "Let me check."
    );
    assert!(handle.completion.await.is_ok());
}

#[tokio::test]
async fn test_failing_tool_renders_error_fragment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/nobody/nothing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = ToolsConfig::default().with_github_api_url(server.uri());
    let tools = all_tools(&config).unwrap();
    let (sink, events) = EventSink::channel();

    let message = run_tool(
        tools[0].as_ref(),
        json!({"owner": "nobody", "repo": "nothing"}),
        &sink,
    )
    .await;
    drop(sink);

    assert!(message.contains("Failed to fetch repository nobody/nothing"));

    let rendered: Vec<_> = events
        .filter_map(|item| async move { item.ok() })
        .map(|event| tapedeck_core::classify(&event))
        .collect()
        .await;
    assert_eq!(rendered.len(), 2);
    assert_eq!(
        rendered[1],
        tapedeck_core::ClassifiedAction::Render {
            mode: tapedeck_core::UiMutation::Replace,
            fragment: Fragment::error(&message),
        }
    );
}

#[tokio::test]
async fn test_invalid_input_is_reported_to_agent() {
    let tools = all_tools(&ToolsConfig::default()).unwrap();
    let (sink, _events) = EventSink::channel();

    let message = run_tool(tools[2].as_ref(), json!({"city": "Paris"}), &sink).await;
    assert!(message.starts_with("Error running get_weather: Invalid input"));
}
