//! Phrase and scenario generation against a local Ollama instance.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Failure of the generation HTTP call, kept distinguishable from other
/// errors so callers can tell "the endpoint failed" apart from everything
/// else in the loop.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("phrase generation request failed")]
    Request(#[from] reqwest::Error),
    #[error("phrase generation endpoint returned malformed JSON")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Phrases generated for one scenario.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioContent {
    pub scenario: String,
    pub phrases: Vec<String>,
}

/// Defines the contract for any service that can produce practice content.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generates a single phrase in the target language.
    async fn generate_phrase(
        &self,
        language: &str,
        difficulty: &str,
        scenario: Option<&str>,
    ) -> Result<String>;

    /// Generates several phrases for a specific scenario.
    async fn generate_scenario_content(
        &self,
        language: &str,
        difficulty: &str,
        scenario: &str,
    ) -> Result<ScenarioContent>;
}

/// [`ContentGenerator`] backed by Ollama's `/api/generate` endpoint.
pub struct OllamaGenerator {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaGenerator {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    async fn call_ollama(&self, prompt: &str) -> Result<String, ContentError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        Ok(parsed.response.trim().to_string())
    }
}

#[async_trait]
impl ContentGenerator for OllamaGenerator {
    async fn generate_phrase(
        &self,
        language: &str,
        difficulty: &str,
        scenario: Option<&str>,
    ) -> Result<String> {
        let prompt = phrase_prompt(language, difficulty, scenario);
        let phrase = self.call_ollama(&prompt).await?;
        debug!(%language, %difficulty, "generated practice phrase");
        Ok(phrase)
    }

    async fn generate_scenario_content(
        &self,
        language: &str,
        difficulty: &str,
        scenario: &str,
    ) -> Result<ScenarioContent> {
        let prompt = format!(
            "Generate 5-7 common {difficulty}-level {language} phrases for {scenario}. \
             Return them as a JSON array of strings. Example: [\"phrase1\", \"phrase2\", ...]"
        );
        let response = self.call_ollama(&prompt).await?;
        Ok(ScenarioContent {
            scenario: scenario.to_string(),
            phrases: extract_phrases(&response),
        })
    }
}

fn phrase_prompt(language: &str, difficulty: &str, scenario: Option<&str>) -> String {
    match scenario {
        Some(scenario) => format!(
            "Generate a single, common {difficulty}-level {language} phrase for {scenario}. \
             Return only the phrase, no explanation."
        ),
        None => format!(
            "Generate a single, common {difficulty}-level {language} phrase. \
             Return only the phrase, no explanation."
        ),
    }
}

/// Pulls a JSON string array out of the model's reply, falling back to
/// treating each non-empty line as one phrase when no array parses.
fn extract_phrases(response: &str) -> Vec<String> {
    if let (Some(start), Some(end)) = (response.find('['), response.rfind(']')) {
        if start < end {
            if let Ok(phrases) = serde_json::from_str::<Vec<String>>(&response[start..=end]) {
                return phrases;
            }
        }
    }
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// A deterministic [`ContentGenerator`] for development and testing.
pub struct CannedContentGenerator;

#[async_trait]
impl ContentGenerator for CannedContentGenerator {
    async fn generate_phrase(
        &self,
        language: &str,
        _difficulty: &str,
        _scenario: Option<&str>,
    ) -> Result<String> {
        Ok(format!("A practice phrase in {language}"))
    }

    async fn generate_scenario_content(
        &self,
        language: &str,
        _difficulty: &str,
        scenario: &str,
    ) -> Result<ScenarioContent> {
        Ok(ScenarioContent {
            scenario: scenario.to_string(),
            phrases: vec![
                format!("Greeting in {language}"),
                "Asking for help".to_string(),
                "Saying thanks".to_string(),
            ],
        })
    }
}
