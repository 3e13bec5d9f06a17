//! WebSocket transport for the live endpoint.

use crate::error::{LiveError, Result};
use crate::protocol::{ClientMessage, InboundMessage, ServerEnvelope, StreamConfig};
use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use std::collections::VecDeque;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message as WsMessage,
};
use tracing::{info, warn};

const LIVE_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// A bidirectional stream to the live model.
///
/// `next_message` returns `Ok(None)` when the current model turn completes or
/// the remote side closes; calling it again resumes reading from the live
/// stream position, so each receive pass covers one turn.
#[async_trait]
pub trait LiveTransport: Send {
    async fn send(&mut self, message: ClientMessage) -> Result<()>;
    async fn next_message(&mut self) -> Result<Option<InboundMessage>>;
    async fn close(&mut self) -> Result<()>;
}

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

enum Decoded {
    Message(InboundMessage),
    TurnBoundary,
}

/// [`LiveTransport`] over tokio-tungstenite.
pub struct WsTransport {
    tx: WsSink,
    rx: WsSource,
    pending: VecDeque<Decoded>,
    closed: bool,
}

impl WsTransport {
    /// Connects to the live endpoint, sends the setup message, and waits for
    /// the server's `setupComplete` acknowledgement.
    pub async fn connect(api_key: &str, model: &str, config: &StreamConfig) -> Result<Self> {
        let url = format!("{LIVE_ENDPOINT}?key={api_key}");
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| LiveError::Transport("connect", e))?;
        info!(model, "connected to live websocket");

        let (tx, rx) = stream.split();
        let mut transport = Self {
            tx,
            rx,
            pending: VecDeque::new(),
            closed: false,
        };

        let model = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        transport
            .send(ClientMessage::setup(model, config.generation_config()))
            .await?;
        transport.await_setup().await?;
        Ok(transport)
    }

    async fn await_setup(&mut self) -> Result<()> {
        while let Some(frame) = self.rx.next().await {
            match frame.map_err(|e| LiveError::Transport("setup", e))? {
                WsMessage::Text(text) => match serde_json::from_str::<ServerEnvelope>(&text) {
                    Ok(envelope) if envelope.is_setup_complete() => {
                        info!("live session setup complete");
                        return Ok(());
                    }
                    Ok(_) => warn!("unexpected message before setup completion"),
                    Err(_) => warn!(raw = %text, "unparseable frame during setup"),
                },
                WsMessage::Close(frame) => {
                    warn!(?frame, "server closed connection during setup");
                    return Err(LiveError::Closed);
                }
                _ => {}
            }
        }
        Err(LiveError::Closed)
    }
}

#[async_trait]
impl LiveTransport for WsTransport {
    async fn send(&mut self, message: ClientMessage) -> Result<()> {
        let payload = serde_json::to_string(&message)?;
        self.tx
            .send(WsMessage::Text(payload.into()))
            .await
            .map_err(|e| LiveError::Transport("send", e))
    }

    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        loop {
            match self.pending.pop_front() {
                Some(Decoded::Message(message)) => return Ok(Some(message)),
                Some(Decoded::TurnBoundary) => return Ok(None),
                None => {}
            }
            let Some(frame) = self.rx.next().await else {
                return Ok(None);
            };
            match frame.map_err(|e| LiveError::Transport("receive", e))? {
                WsMessage::Text(text) => match serde_json::from_str::<ServerEnvelope>(&text) {
                    Ok(envelope) => {
                        let turn_complete = envelope.turn_complete();
                        self.pending
                            .extend(envelope.into_messages().into_iter().map(Decoded::Message));
                        if turn_complete {
                            self.pending.push_back(Decoded::TurnBoundary);
                        }
                    }
                    Err(error) => warn!(%error, "skipping unparseable live frame"),
                },
                WsMessage::Close(frame) => {
                    info!(?frame, "live websocket closed by server");
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.tx
            .close()
            .await
            .map_err(|e| LiveError::Transport("close", e))
    }
}
