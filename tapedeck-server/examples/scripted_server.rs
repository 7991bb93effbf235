//! Scripted tapedeck server with the bundled tools.
//!
//! A keyword-driven agent stands in for a language model: it picks a tool
//! from the message, streams a short reply, and lets the tool render its
//! loading and result components.
//!
//! Run with:
//! ```sh
//! cargo run -p tapedeck-server --example scripted_server
//! ```
//!
//! Test with curl:
//! ```sh
//! curl -X POST http://localhost:3000/api/agent \
//!   -H "Content-Type: application/json" \
//!   -d '{"input": "show me tokio-rs/tokio"}' \
//!   -N
//! ```

use std::sync::Arc;

use serde_json::{json, Value};
use tapedeck_core::{
    run_tool, AgentConfig, AgentInput, ChannelProducer, DynTool, EventSink, ProducerError,
    StreamEvent, CHAIN_END,
};
use tapedeck_server::TapedeckRouter;
use tapedeck_tools::{all_tools, ToolsConfig};

/// Pick a tool and its input from the user's message.
fn route(input: &str) -> Option<(&'static str, Value)> {
    let lower = input.to_lowercase();
    let slug = input
        .split_whitespace()
        .filter_map(|word| word.split_once('/'))
        .find(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'));
    if let Some((owner, repo)) = slug {
        return Some(("github_repo", json!({"owner": owner, "repo": repo})));
    }
    if lower.contains("invoice") || lower.contains("order") {
        let order_id = input.split_whitespace().last().unwrap_or("1");
        return Some(("get_order_invoice", json!({"order_id": order_id})));
    }
    if let Some((_, place)) = lower.split_once("weather in ") {
        let mut parts = place.split(',').map(str::trim);
        let city = parts.next().unwrap_or_default();
        let state = parts.next().unwrap_or_default();
        return Some(("get_weather", json!({"city": city, "state": state})));
    }
    None
}

async fn keyword_agent(
    tools: Arc<Vec<Box<dyn DynTool>>>,
    input: AgentInput,
    sink: EventSink,
) -> Result<(), ProducerError> {
    let reply_run = uuid::Uuid::new_v4().to_string();

    let output = match route(&input.input) {
        Some((name, tool_input)) => {
            let tool = tools
                .iter()
                .find(|tool| tool.name() == name)
                .ok_or_else(|| ProducerError::Failed(format!("tool {} is not enabled", name)))?;
            sink.token(&reply_run, format!("Let me check with {}. ", name));
            let result = run_tool(tool.as_ref(), tool_input, &sink).await;
            sink.token(&reply_run, "Done.");
            result
        }
        None => {
            let reply = "Try a repository like tokio-rs/tokio, an invoice for order 42, \
                         or the weather in Portland, OR.";
            for word in reply.split_inclusive(' ') {
                sink.token(&reply_run, word);
            }
            reply.to_string()
        }
    };

    sink.emit(
        StreamEvent::new(CHAIN_END, "AgentExecutor", uuid::Uuid::new_v4().to_string())
            .with_output(json!({"output": output})),
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tools = Arc::new(all_tools(&ToolsConfig::default())?);

    let producer = ChannelProducer::new(move |input: AgentInput, sink: EventSink| {
        keyword_agent(Arc::clone(&tools), input, sink)
    });
    let config = AgentConfig::builder()
        .name("scripted")
        .producer(producer)
        .build()?;

    let app = TapedeckRouter::new(config)
        .with_stream("/api/agent")
        .with_cors()
        .build()?;

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("Server running at http://localhost:3000");
    println!("Stream endpoint: POST http://localhost:3000/api/agent");

    axum::serve(listener, app).await?;

    Ok(())
}
