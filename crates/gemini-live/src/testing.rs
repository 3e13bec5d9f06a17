//! Scripted transport double for exercising sessions without a network.

use crate::error::{LiveError, Result};
use crate::protocol::{ClientMessage, InboundMessage};
use crate::transport::LiveTransport;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_tungstenite::tungstenite;

/// Shared record of everything a [`ScriptedTransport`] saw.
#[derive(Default)]
pub(crate) struct TransportLog {
    /// Outbound messages, serialized to JSON for shape assertions.
    pub sent: Mutex<Vec<serde_json::Value>>,
    pub closes: AtomicUsize,
}

impl TransportLog {
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub(crate) struct ScriptedTransport {
    inbound: VecDeque<InboundMessage>,
    fail_send_at: Option<usize>,
    sends: usize,
    pub log: Arc<TransportLog>,
}

impl ScriptedTransport {
    pub fn new(inbound: Vec<InboundMessage>) -> Self {
        Self {
            inbound: inbound.into(),
            fail_send_at: None,
            sends: 0,
            log: Arc::default(),
        }
    }

    /// Makes the transport fail once `sends` messages have gone out.
    pub fn failing_after(mut self, sends: usize) -> Self {
        self.fail_send_at = Some(sends);
        self
    }
}

#[async_trait]
impl LiveTransport for ScriptedTransport {
    async fn send(&mut self, message: ClientMessage) -> Result<()> {
        if self.fail_send_at.is_some_and(|limit| self.sends >= limit) {
            return Err(LiveError::Transport("send", tungstenite::Error::AlreadyClosed));
        }
        self.sends += 1;
        self.log
            .sent
            .lock()
            .unwrap()
            .push(serde_json::to_value(&message)?);
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        Ok(self.inbound.pop_front())
    }

    async fn close(&mut self) -> Result<()> {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Decodes every realtime audio blob the transport sent, in order.
pub(crate) fn sent_audio_chunks(log: &TransportLog) -> Vec<Vec<u8>> {
    log.sent
        .lock()
        .unwrap()
        .iter()
        .filter_map(|message| message.get("realtimeInput")?.get("audio"))
        .map(|audio| STANDARD.decode(audio["data"].as_str().unwrap()).unwrap())
        .collect()
}
