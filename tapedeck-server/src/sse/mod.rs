//! Server-Sent Events transport for streamed documents.
//!
//! One POST starts one agent invocation; the response is an SSE stream that
//! flattens the document and every run's text into ordered [`UiEvent`]s.
//!
//! Queued document updates are forwarded before run text, so a `TEXT_DELTA`
//! may trail document events that were produced after it. Each run's text is
//! still complete and in order, and always ends before `DOCUMENT_END`.
//!
//! # Event Mapping
//!
//! | Multiplexer output | Wire event(s) |
//! |--------------------|---------------|
//! | `DocumentUpdate::Append` | `DOCUMENT_APPEND` |
//! | `DocumentUpdate::Replace` | `DOCUMENT_REPLACE` |
//! | run text snapshot | `TEXT_DELTA` (new suffix only) |
//! | run text closed | `TEXT_END` |
//! | `DocumentUpdate::Closed` | pending `TEXT_DELTA`/`TEXT_END`, then `DOCUMENT_END` |
//! | completion resolved | `RUN_FINISHED` |
//! | completion rejected | `RUN_ERROR` |
//!
//! [`UiEvent`]: events::UiEvent

pub mod convert;
pub mod events;
pub mod handler;
