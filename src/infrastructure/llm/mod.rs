//! Model runtime client
//!
//! Talks to an Ollama-compatible runtime over HTTP (`/api/generate`, non-streaming)
//! and exposes it through the `LlmProvider` trait.

mod client;
mod types;

pub use client::Client;
