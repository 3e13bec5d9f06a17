//! Per-turn operations over one open live stream.

use crate::error::Result;
use crate::protocol::{
    Blob, ClientMessage, Content, DEFAULT_AUDIO_MIME, InboundMessage, Role,
};
use crate::transport::LiveTransport;
use futures_util::{Stream, stream};
use tracing::warn;

/// One open conversational stream to the live model.
///
/// A session owns its transport exclusively and handles one turn sequence at a
/// time; callers must not issue overlapping operations on the same session.
/// Sessions must be torn down with [`LiveSession::close`] on every exit path,
/// since a leaked stream handle keeps a live remote connection open.
pub struct LiveSession {
    transport: Box<dyn LiveTransport>,
    chunk_size: usize,
    closed: bool,
}

impl LiveSession {
    /// Wraps an open transport. `chunk_size` bounds realtime audio fragments
    /// and must be non-zero.
    pub fn new(transport: Box<dyn LiveTransport>, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be non-zero");
        Self {
            transport,
            chunk_size,
            closed: false,
        }
    }

    /// Sends system instructions without completing the turn.
    pub async fn send_system_instructions(&mut self, text: &str) -> Result<()> {
        self.send_turn(Role::System, text, false).await
    }

    /// Sends user text, keeping the turn open.
    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.send_turn(Role::User, text, false).await
    }

    pub async fn send_turn(&mut self, role: Role, text: &str, turn_complete: bool) -> Result<()> {
        self.send_turns(vec![Content::text(role, text)], turn_complete)
            .await
    }

    pub async fn send_turns(&mut self, turns: Vec<Content>, turn_complete: bool) -> Result<()> {
        self.transport
            .send(ClientMessage::client_content(turns, turn_complete))
            .await
    }

    /// Streams audio over the realtime channel in default-MIME chunks and
    /// signals end-of-stream.
    pub async fn stream_audio(&mut self, audio: &[u8]) -> Result<()> {
        self.stream_audio_chunks(audio, DEFAULT_AUDIO_MIME, true).await
    }

    /// Streams audio split into fixed-size chunks over the realtime channel.
    ///
    /// A payload of length L yields ceil(L / chunk_size) chunks, all of
    /// chunk_size bytes except a final remainder; an empty payload yields no
    /// chunks at all. Chunks are transmitted in order, followed by an explicit
    /// audio-stream-end signal when `end_stream` is set.
    pub async fn stream_audio_chunks(
        &mut self,
        audio: &[u8],
        mime_type: &str,
        end_stream: bool,
    ) -> Result<()> {
        for chunk in audio.chunks(self.chunk_size) {
            self.transport
                .send(ClientMessage::realtime_audio(Blob::encode(chunk, mime_type)))
                .await?;
        }
        if end_stream {
            self.transport.send(ClientMessage::audio_stream_end()).await?;
        }
        Ok(())
    }

    /// Sends an empty completed turn, signalling the model may respond.
    pub async fn end_turn(&mut self) -> Result<()> {
        self.send_turns(Vec::new(), true).await
    }

    /// Pulls the next inbound message, suspending until one arrives.
    /// Returns `None` at the end of the current model turn; a subsequent call
    /// resumes from the live stream position.
    pub async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        self.transport.next_message().await
    }

    /// The inbound messages of the current turn as a lazy, single-pass stream.
    pub fn receive(&mut self) -> impl Stream<Item = Result<InboundMessage>> + '_ {
        stream::try_unfold(self, |session| async move {
            Ok(session
                .next_message()
                .await?
                .map(|message| (message, session)))
        })
    }

    /// Drains the current turn, concatenating audio payloads in arrival order.
    /// Non-audio messages are ignored.
    pub async fn collect_audio(&mut self) -> Result<Vec<u8>> {
        let mut audio = Vec::new();
        while let Some(message) = self.next_message().await? {
            if let InboundMessage::Audio(data) = message {
                audio.extend_from_slice(&data);
            }
        }
        Ok(audio)
    }

    /// Drains the current turn, concatenating text fragments in arrival order
    /// and trimming surrounding whitespace from the combined result.
    pub async fn collect_text(&mut self) -> Result<String> {
        let mut combined = String::new();
        while let Some(message) = self.next_message().await? {
            if let InboundMessage::Text(fragment) = message {
                combined.push_str(&fragment);
            }
        }
        Ok(combined.trim().to_string())
    }

    /// Closes the underlying stream. Must be called on every exit path.
    pub async fn close(mut self) -> Result<()> {
        self.closed = true;
        self.transport.close().await
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        if !self.closed {
            warn!("live session dropped without close; the remote stream may stay open");
        }
    }
}
