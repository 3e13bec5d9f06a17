use tokio_tungstenite::tungstenite;

/// Errors produced by the live streaming client.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    #[error("an API key is required to open live sessions")]
    MissingApiKey,
    #[error("live stream transport failed during {0}")]
    Transport(&'static str, #[source] tungstenite::Error),
    #[error("failed to encode outbound live message")]
    Encode(#[from] serde_json::Error),
    #[error("live session returned no audio for phrase synthesis")]
    NoAudio,
    #[error("live session returned no textual feedback")]
    NoText,
    #[error("live stream closed before the operation completed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, LiveError>;
