//! # Tapedeck
//!
//! Stream a tool-using agent's output to a remote display while it runs.
//!
//! An agent emits one ordered sequence of [`StreamEvent`]s: text tokens from
//! the model and "render this component" signals from tools. [`multiplex`]
//! drains that sequence on a background task and fans it out into:
//!
//! - a **document** stream of [`DocumentUpdate`]s (append, replace, closed),
//! - one live **run text** stream per generation run, referenced from the
//!   document by a [`Fragment::RunText`] placeholder and resolved through the
//!   [`RunDirectory`],
//! - a [`Completion`] future with the last event's payload.
//!
//! ## Quick Start
//!
//! ```rust
//! use futures::StreamExt;
//! use tapedeck_core::{AgentConfig, ChatRequest, DocumentUpdate, Fragment, ReplayProducer, StreamEvent};
//!
//! # tokio_test::block_on(async {
//! let producer = ReplayProducer::new(vec![
//!     StreamEvent::ui_append("tool", &Fragment::bare("GithubLoading")),
//!     StreamEvent::token("run-a", "Hello"),
//! ]);
//! let config = AgentConfig::builder().producer(producer).build()?;
//!
//! let mut handle = config.invoke(ChatRequest::new("Show me tokio-rs/tokio"));
//! while let Some(update) = handle.document.next().await {
//!     if let DocumentUpdate::Append(Fragment::RunText { run_id }) = &update {
//!         let text = handle.runs.subscribe(run_id).unwrap().finished().await;
//!         assert_eq!(text.text, "Hello");
//!     }
//! }
//! let payload = handle.completion.await?;
//! assert!(payload.is_none());
//! # Ok::<(), tapedeck_core::Error>(())
//! # }).unwrap();
//! ```
//!
//! ## Tools
//!
//! Implement [`Tool`] to render UI while a tool runs. Each tool gets a
//! [`ToolUi`] that emits render signals on the same event sequence as the
//! agent's tokens, so ordering between text and components is preserved.
//!
//! ## Feature Flags
//!
//! - `test-utils` - Scripted event sequences and drain helpers for tests

pub mod classify;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod fragment;
pub mod multiplex;
pub mod producer;
pub mod stream;
pub mod tool;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use classify::{classify, ClassifiedAction, UiMutation};
pub use completion::Completion;
pub use config::{invoke, AgentConfig, AgentConfigBuilder, ConfigError, SharedProducer};
pub use conversation::{convert_chat_history, AgentInput, ChatRequest, Content, Message, Role};
pub use error::{Error, Result};
pub use event::{EventData, StreamEvent, CHAIN_END, CHAT_MODEL_STREAM, YIELD_UI_NAME};
pub use fragment::{Fragment, FragmentError};
pub use multiplex::{multiplex, MultiplexError, StreamHandle};
pub use producer::{
    ChannelProducer, EventProducer, EventSequence, EventSink, ProducerError, ReplayProducer,
};
pub use stream::{
    Document, DocumentStream, DocumentSubscription, DocumentUpdate, RunDirectory, RunRegistry,
    RunText, RunTextStream, RunTextSubscription, StreamError,
};
pub use tool::{box_tool, run_tool, DynTool, Tool, ToolError, ToolOutput, ToolUi};
