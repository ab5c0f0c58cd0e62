//! Lightweight LLM integration helpers.
//!
//! Typed clients for the hosted chat providers and the local Ollama model
//! listing used by the CLI commands.

/// Assistant reply structures.
pub mod ai;
/// Chat client handle and provider factories.
pub mod chat_models;
pub(crate) mod chat_runtime;
/// Google Generative AI wire format.
pub mod google;
/// Local Ollama model listing.
pub mod ollama;
/// OpenAI-compatible chat-completions wire format.
pub mod openai;
/// Provider identities, credentials and errors.
pub mod provider;
