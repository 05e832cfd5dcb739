#![deny(missing_docs)]

//! Core library for the askdoc document question-answering server.

/// HTTP routing and REST handlers.
pub mod api;
/// Chat-completion client abstraction and OpenAI-compatible adapter.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// Document text extraction with per-format decoders.
pub mod extract;
/// Structured logging and tracing setup.
pub mod logging;
/// Request counters for observability.
pub mod metrics;
/// Question-answering pipeline composing extraction and completion.
pub mod qa;
