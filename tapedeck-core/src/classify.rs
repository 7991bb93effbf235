//! Decode raw producer events into the actions the multiplexer understands.

use serde::Deserialize;
use serde_json::Value;

use crate::event::{StreamEvent, CHAT_MODEL_STREAM, YIELD_UI_NAME};
use crate::fragment::Fragment;

/// How a render signal mutates the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMutation {
    /// Add the fragment after the current content.
    Append,
    /// Replace the whole current content with the fragment.
    #[serde(alias = "update")]
    Replace,
}

/// The decoded meaning of one [`StreamEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedAction {
    /// Render a fragment into the document.
    Render { mode: UiMutation, fragment: Fragment },
    /// Append a text delta to a run's text stream.
    Token { run_id: String, text: String },
    /// Anything else; ignored.
    Other,
}

#[derive(Deserialize)]
struct RenderOutput {
    #[serde(rename = "type")]
    mode: UiMutation,
    value: Value,
}

/// Classify an event.
///
/// Render signals with a malformed payload are dropped (classified as
/// [`ClassifiedAction::Other`]) so they never reach the document.
pub fn classify(event: &StreamEvent) -> ClassifiedAction {
    if event.name == YIELD_UI_NAME {
        return classify_render(event);
    }

    if event.event == CHAT_MODEL_STREAM {
        let text = event
            .data
            .chunk
            .as_ref()
            .and_then(|chunk| chunk.get("text"))
            .and_then(Value::as_str);

        if let Some(text) = text.filter(|t| !t.is_empty()) {
            return ClassifiedAction::Token {
                run_id: event.run_id.clone(),
                text: text.to_string(),
            };
        }
    }

    ClassifiedAction::Other
}

fn classify_render(event: &StreamEvent) -> ClassifiedAction {
    let Some(output) = event.data.output.as_ref() else {
        log::warn!("dropping render signal without output (run {})", event.run_id);
        return ClassifiedAction::Other;
    };

    let render = match RenderOutput::deserialize(output) {
        Ok(render) => render,
        Err(e) => {
            log::warn!("dropping malformed render signal (run {}): {}", event.run_id, e);
            return ClassifiedAction::Other;
        }
    };

    match Fragment::from_value(&render.value) {
        Ok(fragment) => ClassifiedAction::Render {
            mode: render.mode,
            fragment,
        },
        Err(e) => {
            log::warn!("dropping invalid fragment (run {}): {}", event.run_id, e);
            ClassifiedAction::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CHAIN_END;
    use serde_json::json;

    fn render_event(output: Value) -> StreamEvent {
        StreamEvent::new(CHAIN_END, YIELD_UI_NAME, "tool-run").with_output(output)
    }

    #[test]
    fn test_classify_append_render() {
        let event = StreamEvent::ui_append("tool-run", &Fragment::bare("GithubLoading"));
        assert_eq!(
            classify(&event),
            ClassifiedAction::Render {
                mode: UiMutation::Append,
                fragment: Fragment::bare("GithubLoading"),
            }
        );
    }

    #[test]
    fn test_classify_update_and_replace_are_replace() {
        for mode in ["update", "replace"] {
            let event = render_event(json!({
                "type": mode,
                "value": {"kind": "text", "text": "done"}
            }));
            assert_eq!(
                classify(&event),
                ClassifiedAction::Render {
                    mode: UiMutation::Replace,
                    fragment: Fragment::text("done"),
                },
                "mode {} should classify as replace",
                mode
            );
        }
    }

    #[test]
    fn test_classify_malformed_render_is_other() {
        let bad_outputs = vec![
            json!({"type": "append"}),
            json!({"type": "append", "value": {"kind": "component", "name": ""}}),
            json!({"type": "prepend", "value": {"kind": "text", "text": "x"}}),
            json!({"value": {"kind": "text", "text": "x"}}),
            json!("not an object"),
        ];

        for output in bad_outputs {
            let event = render_event(output.clone());
            assert_eq!(
                classify(&event),
                ClassifiedAction::Other,
                "Should drop render output: {}",
                output
            );
        }

        let no_output = StreamEvent::new(CHAIN_END, YIELD_UI_NAME, "tool-run");
        assert_eq!(classify(&no_output), ClassifiedAction::Other);
    }

    #[test]
    fn test_classify_token() {
        let event = StreamEvent::token("run-a", "Hel");
        assert_eq!(
            classify(&event),
            ClassifiedAction::Token {
                run_id: "run-a".to_string(),
                text: "Hel".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_token_without_text_is_other() {
        let cases = vec![
            json!({"tool_call_chunks": [{"name": "github_repo"}]}),
            json!({"text": ""}),
            json!({"text": 42}),
            json!({"text": null}),
        ];

        for chunk in cases {
            let event = StreamEvent::new(CHAT_MODEL_STREAM, "chat_model", "run-a").with_chunk(chunk.clone());
            assert_eq!(
                classify(&event),
                ClassifiedAction::Other,
                "Should ignore chunk: {}",
                chunk
            );
        }

        let no_chunk = StreamEvent::new(CHAT_MODEL_STREAM, "chat_model", "run-a");
        assert_eq!(classify(&no_chunk), ClassifiedAction::Other);
    }

    #[test]
    fn test_classify_unrelated_events() {
        let events = vec![
            StreamEvent::new("on_chain_start", "AgentExecutor", "r1"),
            StreamEvent::new("on_tool_end", "github_repo", "r2").with_output(json!("result")),
            StreamEvent::new(CHAIN_END, "AgentExecutor", "r1")
                .with_output(json!({"type": "append", "value": {"kind": "text", "text": "x"}})),
        ];

        for event in events {
            assert_eq!(classify(&event), ClassifiedAction::Other);
        }
    }
}
