//! Core tutoring logic for the language-learning loop.
//!
//! This crate holds the glue around the `gemini-live` streaming client:
//! phrase generation against a local Ollama endpoint, the speech tool
//! contracts the orchestrator calls, language-name mapping, the tutor
//! orchestrator itself, and environment configuration.

pub mod config;
pub mod content;
pub mod language;
pub mod orchestrator;
pub mod tools;
