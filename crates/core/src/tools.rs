//! Speech tool contracts used by the orchestrator.
//!
//! Audio crosses this boundary as base64 text exclusively; the live client
//! underneath always deals in raw bytes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gemini_live::{LiveAudioClient, PronunciationFeedback};

pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

#[async_trait]
pub trait SpeechTools: Send + Sync {
    /// Transcribes base64-encoded audio into text.
    async fn speech_to_text(&self, audio_b64: &str, language: &str, sample_rate: u32)
    -> Result<String>;

    /// Synthesizes speech, returning base64-encoded WAV audio.
    async fn text_to_speech(&self, text: &str, language: &str, voice: &str) -> Result<String>;

    /// Scores a learner attempt against the target text.
    async fn analyze_pronunciation(
        &self,
        audio_b64: &str,
        target_text: &str,
        language: &str,
    ) -> Result<PronunciationFeedback>;
}

/// Stub implementation with no backing service: empty transcripts, empty
/// audio, and a fixed not-implemented feedback record.
pub struct PlaceholderSpeechTools;

#[async_trait]
impl SpeechTools for PlaceholderSpeechTools {
    async fn speech_to_text(
        &self,
        _audio_b64: &str,
        _language: &str,
        _sample_rate: u32,
    ) -> Result<String> {
        Ok(String::new())
    }

    async fn text_to_speech(&self, _text: &str, _language: &str, _voice: &str) -> Result<String> {
        Ok(STANDARD.encode(b""))
    }

    async fn analyze_pronunciation(
        &self,
        _audio_b64: &str,
        _target_text: &str,
        _language: &str,
    ) -> Result<PronunciationFeedback> {
        Ok(PronunciationFeedback {
            feedback: "Pronunciation analysis not yet implemented".to_string(),
            ..PronunciationFeedback::default()
        })
    }
}

/// [`SpeechTools`] bridged onto the live streaming client.
pub struct LiveSpeechTools {
    client: LiveAudioClient,
}

impl LiveSpeechTools {
    pub fn new(client: LiveAudioClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SpeechTools for LiveSpeechTools {
    // The live API has no dedicated STT surface; transcription rides on the
    // analysis schema's `transcription` field with an empty target.
    async fn speech_to_text(
        &self,
        audio_b64: &str,
        language: &str,
        _sample_rate: u32,
    ) -> Result<String> {
        let audio = STANDARD
            .decode(audio_b64)
            .context("speech-to-text input was not valid base64")?;
        let feedback = self.client.analyze_pronunciation(&audio, "", language).await?;
        Ok(feedback.transcription)
    }

    async fn text_to_speech(&self, text: &str, language: &str, _voice: &str) -> Result<String> {
        let audio = self.client.synthesize_phrase_audio(text, language).await?;
        Ok(STANDARD.encode(audio))
    }

    async fn analyze_pronunciation(
        &self,
        audio_b64: &str,
        target_text: &str,
        language: &str,
    ) -> Result<PronunciationFeedback> {
        let audio = STANDARD
            .decode(audio_b64)
            .context("pronunciation analysis input was not valid base64")?;
        Ok(self
            .client
            .analyze_pronunciation(&audio, target_text, language)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn placeholder_tools_return_inert_values() {
        let tools = PlaceholderSpeechTools;

        assert_eq!(tools.speech_to_text("", "es", 16_000).await.unwrap(), "");
        assert_eq!(tools.text_to_speech("hola", "es", "default").await.unwrap(), "");

        let feedback = tools.analyze_pronunciation("", "hola", "es").await.unwrap();
        assert_eq!(feedback.feedback, "Pronunciation analysis not yet implemented");
        assert_eq!(feedback.accuracy, 0.0);
        assert!(!feedback.is_correct);
    }
}
