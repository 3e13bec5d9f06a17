//! Wire types for the `BidiGenerateContent` WebSocket protocol.
//!
//! Outbound messages are serialized as externally tagged camelCase JSON;
//! inbound server envelopes are reduced to [`InboundMessage`] once, at the
//! ingestion boundary, so the rest of the crate pattern-matches exhaustively
//! instead of probing optional fields.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_AUDIO_MIME: &str = "audio/wav";
/// ~0.5s of 16 kHz mono PCM.
pub const DEFAULT_STREAM_CHUNK_SIZE: usize = 32_000;

/// The kind of content a session requests back from the model.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseModality {
    Audio,
    Text,
}

/// The originator of an outbound conversational turn.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Per-session stream configuration, fixed once the session is open.
#[derive(Clone, Debug)]
pub struct StreamConfig {
    pub response_modalities: Vec<ResponseModality>,
    pub voice: String,
    pub spoken_language: String,
    pub temperature: Option<f32>,
}

impl StreamConfig {
    /// Builds the generation config for the setup message. Audio settings are
    /// only included when the caller expects audio back.
    pub fn generation_config(&self) -> GenerationConfig {
        let audio_config = self
            .response_modalities
            .contains(&ResponseModality::Audio)
            .then(|| AudioConfig {
                voice: self.voice.clone(),
                format: "wav".to_string(),
                spoken_language: self.spoken_language.clone(),
            });
        GenerationConfig {
            response_modalities: self.response_modalities.clone(),
            temperature: self.temperature,
            audio_config,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<ResponseModality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_config: Option<AudioConfig>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub voice: String,
    pub format: String,
    pub spoken_language: String,
}

/// Messages sent from the client to the live endpoint.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum ClientMessage {
    Setup(BidiGenerateContentSetup),
    ClientContent(BidiGenerateContentClientContent),
    RealtimeInput(BidiGenerateContentRealtimeInput),
}

impl ClientMessage {
    pub fn setup(model: String, generation_config: GenerationConfig) -> Self {
        Self::Setup(BidiGenerateContentSetup {
            model,
            generation_config,
        })
    }

    pub fn client_content(turns: Vec<Content>, turn_complete: bool) -> Self {
        Self::ClientContent(BidiGenerateContentClientContent {
            turns,
            turn_complete,
        })
    }

    pub fn realtime_audio(audio: Blob) -> Self {
        Self::RealtimeInput(BidiGenerateContentRealtimeInput {
            audio: Some(audio),
            audio_stream_end: None,
        })
    }

    pub fn audio_stream_end() -> Self {
        Self::RealtimeInput(BidiGenerateContentRealtimeInput {
            audio: None,
            audio_stream_end: Some(true),
        })
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BidiGenerateContentSetup {
    pub model: String,
    pub generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BidiGenerateContentClientContent {
    pub turns: Vec<Content>,
    pub turn_complete: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BidiGenerateContentRealtimeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_stream_end: Option<bool>,
}

#[derive(Serialize, Debug)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-part text turn.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Serialize, Debug)]
pub struct Part {
    pub text: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

impl Blob {
    /// Wraps raw bytes as a base64 audio blob.
    pub fn encode(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }
}

/// A single inbound unit after ingestion, discriminated once per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Decoded audio bytes from the model.
    Audio(Vec<u8>),
    /// A text fragment from the model.
    Text(String),
    /// A server message carrying neither audio nor text.
    Empty,
}

/// Raw server frame, as deserialized off the wire.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerEnvelope {
    pub setup_complete: Option<serde_json::Value>,
    pub server_content: Option<LiveServerContent>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LiveServerContent {
    pub model_turn: Option<ServerContentTurn>,
    pub turn_complete: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct ServerContentTurn {
    #[serde(default)]
    pub parts: Vec<ServerPart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerPart {
    pub text: Option<String>,
    pub inline_data: Option<ServerBlob>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerBlob {
    pub data: String,
}

impl ServerEnvelope {
    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete.is_some()
    }

    /// Whether this envelope marks the end of the model's turn.
    pub fn turn_complete(&self) -> bool {
        self.server_content
            .as_ref()
            .and_then(|content| content.turn_complete)
            == Some(true)
    }

    /// Flattens the envelope into tagged inbound messages.
    ///
    /// Audio parts with invalid base64 are dropped with a warning rather than
    /// failing the whole stream. A content envelope carrying neither audio nor
    /// text yields a single [`InboundMessage::Empty`].
    pub fn into_messages(self) -> Vec<InboundMessage> {
        let Some(content) = self.server_content else {
            return Vec::new();
        };
        let turn_complete = content.turn_complete == Some(true);
        let mut messages = Vec::new();
        if let Some(turn) = content.model_turn {
            for part in turn.parts {
                if let Some(blob) = part.inline_data {
                    match STANDARD.decode(&blob.data) {
                        Ok(bytes) => messages.push(InboundMessage::Audio(bytes)),
                        Err(error) => warn!(%error, "dropping audio part with invalid base64"),
                    }
                }
                if let Some(text) = part.text {
                    messages.push(InboundMessage::Text(text));
                }
            }
        }
        if messages.is_empty() && !turn_complete {
            messages.push(InboundMessage::Empty);
        }
        messages
    }
}
