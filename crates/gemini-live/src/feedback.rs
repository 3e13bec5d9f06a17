//! Structured pronunciation feedback parsed out of free-form model text.

use serde::{Deserialize, Serialize};

/// Canned feedback used when the model's reply carried no usable text.
pub const UNPARSEABLE_FEEDBACK: &str = "Unable to analyze pronunciation.";

/// Pronunciation assessment for one learner attempt.
///
/// Every field is always populated: a parse failure degrades to defaults, it
/// never produces a missing-field error. `is_correct` is supplied opaquely by
/// the model, not derived from `accuracy`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PronunciationFeedback {
    pub accuracy: f64,
    pub is_correct: bool,
    pub feedback: String,
    pub problematic_words: Vec<String>,
    pub suggestions: Vec<String>,
    pub transcription: String,
}

impl PronunciationFeedback {
    /// The default record carrying the raw model text as context.
    fn fallback(raw_text: &str) -> Self {
        Self {
            feedback: if raw_text.is_empty() {
                UNPARSEABLE_FEEDBACK.to_string()
            } else {
                raw_text.to_string()
            },
            ..Self::default()
        }
    }
}

/// Parses the model's feedback text.
///
/// The whole string must decode as a JSON record; anything else (decode
/// failure, a bare string or array, a mistyped record) degrades to the default
/// feedback carrying the raw text. No partial-field recovery is attempted.
pub fn parse_feedback(raw_text: &str) -> PronunciationFeedback {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw_text) {
        if value.is_object() {
            if let Ok(parsed) = serde_json::from_value::<PronunciationFeedback>(value) {
                return parsed;
            }
        }
    }
    PronunciationFeedback::fallback(raw_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_record_passes_through() {
        let raw = r#"{
            "accuracy": 0.85,
            "is_correct": false,
            "feedback": "Almost there",
            "problematic_words": ["gracias"],
            "suggestions": ["Roll the r"],
            "transcription": "gracias"
        }"#;
        let parsed = parse_feedback(raw);
        assert_eq!(
            parsed,
            PronunciationFeedback {
                accuracy: 0.85,
                is_correct: false,
                feedback: "Almost there".to_string(),
                problematic_words: vec!["gracias".to_string()],
                suggestions: vec!["Roll the r".to_string()],
                transcription: "gracias".to_string(),
            }
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed = parse_feedback(r#"{ "accuracy": 0.95, "is_correct": true }"#);
        assert_eq!(parsed.accuracy, 0.95);
        assert!(parsed.is_correct);
        assert!(parsed.feedback.is_empty());
        assert!(parsed.problematic_words.is_empty());
        assert!(parsed.transcription.is_empty());
    }

    #[test]
    fn plain_text_becomes_fallback_feedback() {
        let parsed = parse_feedback("I couldn't tell");
        assert_eq!(parsed.feedback, "I couldn't tell");
        assert_eq!(parsed.accuracy, 0.0);
        assert!(!parsed.is_correct);
        assert!(parsed.problematic_words.is_empty());
        assert!(parsed.suggestions.is_empty());
        assert!(parsed.transcription.is_empty());
    }

    #[test]
    fn empty_text_yields_canned_feedback() {
        let parsed = parse_feedback("");
        assert_eq!(parsed.feedback, UNPARSEABLE_FEEDBACK);
    }

    #[test]
    fn json_array_is_not_salvaged() {
        let raw = r#"["accuracy", 0.5]"#;
        let parsed = parse_feedback(raw);
        assert_eq!(parsed.feedback, raw);
        assert_eq!(parsed.accuracy, 0.0);
    }

    #[test]
    fn mistyped_record_degrades_to_fallback() {
        let raw = r#"{ "accuracy": "high" }"#;
        let parsed = parse_feedback(raw);
        assert_eq!(parsed.feedback, raw);
        assert_eq!(parsed.accuracy, 0.0);
    }
}
