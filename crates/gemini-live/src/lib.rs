//! Streaming client for the Gemini Live bidirectional audio API.
//!
//! This crate wraps the `BidiGenerateContent` WebSocket protocol so the tutor
//! agents can synthesize speech, stream learner audio, and receive real-time
//! pronunciation analysis directly from the model. It is structured in three
//! layers:
//!
//! - `transport`: opens and drives the raw WebSocket, decoding server frames
//!   into tagged [`InboundMessage`]s at the ingestion boundary.
//! - `session`: per-turn operations over one open stream (text turns, chunked
//!   realtime audio, end-of-turn signalling, pull-based receive).
//! - `client`: the high-level facade that owns durable configuration and the
//!   synthesis / pronunciation-analysis workflows.

pub mod client;
pub mod error;
pub mod feedback;
pub mod protocol;
pub mod session;
pub mod transport;

pub use client::{ConversationOptions, LiveAudioClient, LiveClientConfig};
pub use error::{LiveError, Result};
pub use feedback::{PronunciationFeedback, parse_feedback};
pub use protocol::{
    DEFAULT_AUDIO_MIME, DEFAULT_STREAM_CHUNK_SIZE, InboundMessage, ResponseModality, StreamConfig,
};
pub use session::LiveSession;
pub use transport::{LiveTransport, WsTransport};

#[cfg(test)]
pub(crate) mod testing;
