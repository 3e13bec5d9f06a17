//! High-level facade over the live stream: conversation sessions, phrase
//! synthesis, and pronunciation analysis.

use crate::error::{LiveError, Result};
use crate::feedback::{PronunciationFeedback, parse_feedback};
use crate::protocol::{
    Content, DEFAULT_STREAM_CHUNK_SIZE, ResponseModality, Role, StreamConfig,
};
use crate::session::LiveSession;
use crate::transport::WsTransport;
use tracing::info;

const SYNTHESIS_INSTRUCTIONS: &str = "You stream pronunciation-perfect speech audio for \
    language learners. Speak phrases exactly as given without explanations.";

const ANALYSIS_INSTRUCTIONS: &str = "You are a pronunciation coach. Compare the learner audio \
    to the provided target phrase. Respond with compact JSON using this schema:\n\
    {\n  \"accuracy\": float 0..1,\n  \"is_correct\": bool,\n  \"feedback\": str,\n  \
    \"problematic_words\": [str],\n  \"suggestions\": [str],\n  \"transcription\": str\n}\n\
    Do not include any additional commentary.";

/// Durable configuration for a [`LiveAudioClient`].
#[derive(Debug, Clone)]
pub struct LiveClientConfig {
    pub api_key: String,
    pub model: String,
    /// Default voice for audio responses.
    pub voice: String,
    /// Size bound for realtime audio chunks, fixed per client instance.
    pub chunk_size: usize,
}

impl LiveClientConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            voice: "Studio".to_string(),
            chunk_size: DEFAULT_STREAM_CHUNK_SIZE,
        }
    }
}

/// Per-conversation overrides for [`LiveAudioClient::open_conversation`].
#[derive(Debug, Clone, Default)]
pub struct ConversationOptions {
    /// System instructions sent as an open turn right after connecting.
    pub instructions: Option<String>,
    /// Requested response modalities; defaults to audio and text.
    pub response_modalities: Option<Vec<ResponseModality>>,
    pub audio_voice: Option<String>,
    pub spoken_language: Option<String>,
}

/// Wraps the live API so the tutor agents can synthesize speech, stream
/// learner audio, and receive real-time analysis directly from the model.
#[derive(Debug)]
pub struct LiveAudioClient {
    config: LiveClientConfig,
}

impl LiveAudioClient {
    /// Fails with [`LiveError::MissingApiKey`] when no credential was supplied;
    /// that is a fatal configuration error, never retried.
    pub fn new(config: LiveClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LiveError::MissingApiKey);
        }
        Ok(Self { config })
    }

    async fn connect(&self, stream_config: StreamConfig) -> Result<LiveSession> {
        let transport =
            WsTransport::connect(&self.config.api_key, &self.config.model, &stream_config).await?;
        Ok(LiveSession::new(Box::new(transport), self.config.chunk_size))
    }

    /// Opens a bidirectional session for continuous conversation.
    ///
    /// The returned session must be torn down with [`LiveSession::close`];
    /// if the optional instructions fail to send, the stream is closed here
    /// before the error propagates.
    pub async fn open_conversation(&self, options: ConversationOptions) -> Result<LiveSession> {
        let modalities = options
            .response_modalities
            .unwrap_or_else(|| vec![ResponseModality::Audio, ResponseModality::Text]);
        let stream_config = StreamConfig {
            response_modalities: modalities,
            voice: options
                .audio_voice
                .unwrap_or_else(|| self.config.voice.clone()),
            spoken_language: options
                .spoken_language
                .unwrap_or_else(|| "en".to_string()),
            temperature: None,
        };

        let mut session = self.connect(stream_config).await?;
        if let Some(instructions) = options.instructions {
            if let Err(error) = session.send_system_instructions(&instructions).await {
                let _ = session.close().await;
                return Err(error);
            }
        }
        Ok(session)
    }

    /// Streams TTS audio for one phrase and returns the concatenated bytes.
    ///
    /// Fails with [`LiveError::NoAudio`] when the model produced zero audio
    /// frames: synthesis success always means at least one frame, so an empty
    /// buffer is never valid output.
    pub async fn synthesize_phrase_audio(
        &self,
        phrase: &str,
        language_code: &str,
    ) -> Result<Vec<u8>> {
        let stream_config = StreamConfig {
            response_modalities: vec![ResponseModality::Audio],
            voice: self.config.voice.clone(),
            spoken_language: language_code.to_string(),
            temperature: None,
        };
        let session = self.connect(stream_config).await?;
        synthesize_on(session, phrase, language_code).await
    }

    /// Streams learner audio to the model and returns structured feedback.
    ///
    /// Fails with [`LiveError::NoText`] when the model gave no textual reply
    /// at all; a non-empty but malformed reply is handled by the parser's
    /// fallback instead, never as an error.
    pub async fn analyze_pronunciation(
        &self,
        audio: &[u8],
        target_text: &str,
        language_code: &str,
    ) -> Result<PronunciationFeedback> {
        let stream_config = StreamConfig {
            response_modalities: vec![ResponseModality::Text],
            voice: self.config.voice.clone(),
            spoken_language: language_code.to_string(),
            temperature: Some(0.2),
        };
        let session = self.connect(stream_config).await?;
        analyze_on(session, audio, target_text, language_code).await
    }
}

/// Runs the synthesis exchange on an open session, closing it on every path.
pub(crate) async fn synthesize_on(
    mut session: LiveSession,
    phrase: &str,
    language_code: &str,
) -> Result<Vec<u8>> {
    let outcome = run_synthesis(&mut session, phrase, language_code).await;
    let closed = session.close().await;
    let audio = outcome?;
    closed?;
    if audio.is_empty() {
        return Err(LiveError::NoAudio);
    }
    info!(bytes = audio.len(), "phrase synthesis complete");
    Ok(audio)
}

async fn run_synthesis(
    session: &mut LiveSession,
    phrase: &str,
    language_code: &str,
) -> Result<Vec<u8>> {
    session
        .send_turns(
            vec![
                Content::text(Role::System, SYNTHESIS_INSTRUCTIONS),
                Content::text(
                    Role::User,
                    format!("Language code: {language_code}\nSpeak this phrase: {phrase}"),
                ),
            ],
            true,
        )
        .await?;
    session.collect_audio().await
}

/// Runs the analysis exchange on an open session, closing it on every path.
pub(crate) async fn analyze_on(
    mut session: LiveSession,
    audio: &[u8],
    target_text: &str,
    language_code: &str,
) -> Result<PronunciationFeedback> {
    let outcome = run_analysis(&mut session, audio, target_text, language_code).await;
    let closed = session.close().await;
    let text = outcome?;
    closed?;
    if text.is_empty() {
        return Err(LiveError::NoText);
    }
    Ok(parse_feedback(&text))
}

async fn run_analysis(
    session: &mut LiveSession,
    audio: &[u8],
    target_text: &str,
    language_code: &str,
) -> Result<String> {
    session
        .send_turns(
            vec![
                Content::text(Role::System, ANALYSIS_INSTRUCTIONS),
                Content::text(
                    Role::User,
                    format!(
                        "Language code: {language_code}\nTarget phrase: {target_text}\n\
                         Begin evaluating once the audio stream finishes."
                    ),
                ),
            ],
            false,
        )
        .await?;
    session.stream_audio(audio).await?;
    session.end_turn().await?;
    session.collect_text().await
}
