//! The tutor orchestrator: drives the present → listen → feedback loop.

use crate::content::ContentGenerator;
use crate::language::language_code;
use crate::tools::{DEFAULT_SAMPLE_RATE, SpeechTools};
use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gemini_live::PronunciationFeedback;
use std::sync::Arc;
use tracing::{debug, info};

/// The learning context for one session.
#[derive(Debug, Clone)]
pub struct UserContext {
    /// Target language name, e.g. "Spanish".
    pub language: String,
    /// Difficulty level, e.g. "B1 Intermediate".
    pub difficulty: String,
    /// Optional scenario, e.g. "ordering food in a restaurant".
    pub scenario: Option<String>,
}

/// Usage error: a loop operation was invoked before the session context was set.
#[derive(Debug, thiserror::Error)]
#[error("user context not set; call set_user_context before starting the learning loop")]
pub struct ContextNotSet;

/// Coordinates the learning loop: presents phrases, analyzes learner attempts,
/// and produces feedback. Holds no per-phrase state beyond the user context.
pub struct TutorOrchestrator {
    content: Arc<dyn ContentGenerator>,
    tools: Arc<dyn SpeechTools>,
    context: Option<UserContext>,
}

impl TutorOrchestrator {
    pub fn new(content: Arc<dyn ContentGenerator>, tools: Arc<dyn SpeechTools>) -> Self {
        Self {
            content,
            tools,
            context: None,
        }
    }

    pub fn set_user_context(
        &mut self,
        language: impl Into<String>,
        difficulty: impl Into<String>,
        scenario: Option<String>,
    ) {
        self.context = Some(UserContext {
            language: language.into(),
            difficulty: difficulty.into(),
            scenario,
        });
    }

    fn context(&self) -> Result<&UserContext, ContextNotSet> {
        self.context.as_ref().ok_or(ContextNotSet)
    }

    /// Requests a fresh practice phrase from the content generator.
    pub async fn request_new_phrase(&self) -> Result<String> {
        let ctx = self.context()?;
        let phrase = self
            .content
            .generate_phrase(&ctx.language, &ctx.difficulty, ctx.scenario.as_deref())
            .await?;
        info!(language = %ctx.language, "generated new practice phrase");
        Ok(phrase)
    }

    /// Presents a phrase as WAV audio.
    pub async fn present_phrase(&self, phrase: &str) -> Result<Vec<u8>> {
        let ctx = self.context()?;
        let audio_b64 = self
            .tools
            .text_to_speech(phrase, language_code(&ctx.language), "default")
            .await?;
        STANDARD
            .decode(&audio_b64)
            .context("text-to-speech tool returned invalid base64 audio")
    }

    /// Analyzes the learner's recorded attempt against the target phrase.
    pub async fn analyze_user_speech(
        &self,
        user_audio: &[u8],
        target_phrase: &str,
    ) -> Result<PronunciationFeedback> {
        let ctx = self.context()?;
        let code = language_code(&ctx.language);
        let audio_b64 = STANDARD.encode(user_audio);

        let transcript = self
            .tools
            .speech_to_text(&audio_b64, code, DEFAULT_SAMPLE_RATE)
            .await?;
        debug!(%transcript, "speech-to-text pass complete");

        self.tools
            .analyze_pronunciation(&audio_b64, target_phrase, code)
            .await
    }

    /// Composes feedback for an analysis and speaks it.
    pub async fn provide_feedback(
        &self,
        analysis: &PronunciationFeedback,
        target_phrase: &str,
    ) -> Result<(String, Vec<u8>)> {
        let ctx = self.context()?;
        let feedback_text = compose_feedback(analysis, target_phrase);
        let audio_b64 = self
            .tools
            .text_to_speech(&feedback_text, language_code(&ctx.language), "default")
            .await?;
        let audio = STANDARD
            .decode(&audio_b64)
            .context("text-to-speech tool returned invalid base64 audio")?;
        Ok((feedback_text, audio))
    }

    /// Replays a phrase on demand.
    pub async fn replay_phrase(&self, phrase: &str) -> Result<Vec<u8>> {
        self.present_phrase(phrase).await
    }
}

fn compose_feedback(analysis: &PronunciationFeedback, target_phrase: &str) -> String {
    if analysis.is_correct {
        return format!("¡Perfecto! Great job! You pronounced '{target_phrase}' correctly.");
    }

    let mut text = if analysis.problematic_words.is_empty() {
        "That was close! ".to_string()
    } else {
        format!(
            "That was close! Let's focus on the word(s): {}. ",
            analysis.problematic_words.join(", ")
        )
    };
    if analysis.suggestions.is_empty() {
        text.push_str("Try to match the pronunciation more closely.");
    } else {
        text.push_str(&analysis.suggestions.join(" "));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::CannedContentGenerator;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records tool invocations and plays back canned values.
    struct RecordingTools {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingTools {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SpeechTools for RecordingTools {
        async fn speech_to_text(
            &self,
            _audio_b64: &str,
            language: &str,
            _sample_rate: u32,
        ) -> Result<String> {
            self.calls.lock().unwrap().push(format!("stt:{language}"));
            Ok("hola".to_string())
        }

        async fn text_to_speech(&self, text: &str, language: &str, _voice: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("tts:{language}:{text}"));
            Ok(STANDARD.encode(b"wav-bytes"))
        }

        async fn analyze_pronunciation(
            &self,
            _audio_b64: &str,
            target_text: &str,
            language: &str,
        ) -> Result<PronunciationFeedback> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("analyze:{language}:{target_text}"));
            Ok(PronunciationFeedback {
                accuracy: 0.7,
                is_correct: false,
                feedback: "Close".to_string(),
                problematic_words: vec!["gracias".to_string()],
                suggestions: vec!["Roll the r.".to_string()],
                transcription: "grasias".to_string(),
            })
        }
    }

    fn orchestrator_with(tools: Arc<RecordingTools>) -> TutorOrchestrator {
        let mut orchestrator =
            TutorOrchestrator::new(Arc::new(CannedContentGenerator), tools);
        orchestrator.set_user_context("Spanish", "B1 Intermediate", None);
        orchestrator
    }

    #[tokio::test]
    async fn operations_without_context_fail_with_usage_error() {
        let orchestrator =
            TutorOrchestrator::new(Arc::new(CannedContentGenerator), RecordingTools::new());

        let err = orchestrator.request_new_phrase().await.unwrap_err();
        assert!(err.downcast_ref::<ContextNotSet>().is_some());

        let err = orchestrator.present_phrase("hola").await.unwrap_err();
        assert!(err.downcast_ref::<ContextNotSet>().is_some());
    }

    #[tokio::test]
    async fn request_new_phrase_uses_context_language() {
        let orchestrator = orchestrator_with(RecordingTools::new());
        let phrase = orchestrator.request_new_phrase().await.unwrap();
        assert_eq!(phrase, "A practice phrase in Spanish");
    }

    #[tokio::test]
    async fn present_phrase_decodes_tool_audio() {
        let tools = RecordingTools::new();
        let orchestrator = orchestrator_with(tools.clone());

        let audio = orchestrator.present_phrase("hola").await.unwrap();
        assert_eq!(audio, b"wav-bytes");
        assert_eq!(tools.calls.lock().unwrap()[0], "tts:es:hola");
    }

    #[tokio::test]
    async fn analyze_user_speech_transcribes_then_analyzes() {
        let tools = RecordingTools::new();
        let orchestrator = orchestrator_with(tools.clone());

        let analysis = orchestrator
            .analyze_user_speech(b"pcm", "gracias")
            .await
            .unwrap();

        assert_eq!(analysis.accuracy, 0.7);
        assert_eq!(
            *tools.calls.lock().unwrap(),
            vec!["stt:es".to_string(), "analyze:es:gracias".to_string()]
        );
    }

    #[tokio::test]
    async fn feedback_for_correct_attempt_is_positive() {
        let orchestrator = orchestrator_with(RecordingTools::new());
        let analysis = PronunciationFeedback {
            is_correct: true,
            ..PronunciationFeedback::default()
        };

        let (text, audio) = orchestrator
            .provide_feedback(&analysis, "gracias")
            .await
            .unwrap();

        assert_eq!(
            text,
            "¡Perfecto! Great job! You pronounced 'gracias' correctly."
        );
        assert_eq!(audio, b"wav-bytes");
    }

    #[tokio::test]
    async fn feedback_names_problem_words_and_suggestions() {
        let orchestrator = orchestrator_with(RecordingTools::new());
        let analysis = PronunciationFeedback {
            problematic_words: vec!["gracias".to_string(), "por".to_string()],
            suggestions: vec!["Roll the r.".to_string()],
            ..PronunciationFeedback::default()
        };

        let (text, _) = orchestrator
            .provide_feedback(&analysis, "gracias por todo")
            .await
            .unwrap();

        assert_eq!(
            text,
            "That was close! Let's focus on the word(s): gracias, por. Roll the r."
        );
    }

    #[tokio::test]
    async fn feedback_without_details_suggests_retrying() {
        let orchestrator = orchestrator_with(RecordingTools::new());
        let analysis = PronunciationFeedback::default();

        let (text, _) = orchestrator
            .provide_feedback(&analysis, "hola")
            .await
            .unwrap();

        assert_eq!(
            text,
            "That was close! Try to match the pronunciation more closely."
        );
    }

    #[tokio::test]
    async fn replay_goes_through_text_to_speech_again() {
        let tools = RecordingTools::new();
        let orchestrator = orchestrator_with(tools.clone());

        orchestrator.replay_phrase("hola").await.unwrap();
        orchestrator.replay_phrase("hola").await.unwrap();

        assert_eq!(tools.calls.lock().unwrap().len(), 2);
    }
}
