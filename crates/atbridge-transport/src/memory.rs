use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Result, TransportError};
use crate::traits::Link;

type Responder = Box<dyn FnMut(&[u8]) -> Option<Vec<u8>> + Send>;

#[derive(Default)]
struct State {
    rx: VecDeque<u8>,
    written: Vec<u8>,
    replies: VecDeque<Vec<u8>>,
    responder: Option<Responder>,
    writes: usize,
    discards: usize,
    discarded_bytes: usize,
    hung_up: bool,
    closed: bool,
}

/// In-memory link that plays the bridge side of a conversation.
///
/// Clones share state, so a test can hand one clone to a client and keep
/// another to inject bytes and inspect traffic. Reads never block: asking for
/// more bytes than are available returns [`TransportError::Timeout`] with the
/// bytes that were there.
///
/// Replies become readable when the host writes, in this order of preference:
/// the next queued reply, then the responder closure (if any).
#[derive(Clone, Default)]
pub struct MemoryLink {
    state: Arc<Mutex<State>>,
}

impl MemoryLink {
    /// Create an empty link with no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a link whose replies are computed from each written request.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: FnMut(&[u8]) -> Option<Vec<u8>> + Send + 'static,
    {
        let link = Self::new();
        link.state().responder = Some(Box::new(responder));
        link
    }

    /// Make bytes readable immediately (late or unsolicited peer output).
    pub fn inject(&self, bytes: &[u8]) {
        self.state().rx.extend(bytes.iter().copied());
    }

    /// Simulate the peer closing its end: reads past the remaining bytes
    /// return [`TransportError::Truncated`] instead of timing out.
    pub fn hang_up(&self) {
        self.state().hung_up = true;
    }

    /// Queue bytes that become readable on the next host write.
    pub fn queue_reply(&self, bytes: impl Into<Vec<u8>>) {
        self.state().replies.push_back(bytes.into());
    }

    /// Everything the host has written so far.
    pub fn written(&self) -> Vec<u8> {
        self.state().written.clone()
    }

    /// Take and clear everything the host has written so far.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.state().written)
    }

    /// Number of readable bytes not yet consumed.
    pub fn pending(&self) -> usize {
        self.state().rx.len()
    }

    /// Number of `write_all` calls.
    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Number of `discard_pending_input` calls.
    pub fn discard_count(&self) -> usize {
        self.state().discards
    }

    /// Total bytes dropped by `discard_pending_input`.
    pub fn discarded_bytes(&self) -> usize {
        self.state().discarded_bytes
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Link for MemoryLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut state = self.state();
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.writes += 1;
        state.written.extend_from_slice(bytes);

        let queued = state.replies.pop_front();
        let reply = match queued {
            Some(reply) => Some(reply),
            None => state.responder.as_mut().and_then(|respond| respond(bytes)),
        };
        if let Some(reply) = reply {
            state.rx.extend(reply);
        }
        Ok(())
    }

    fn read_exact(&mut self, len: usize, _timeout: Duration) -> Result<Bytes> {
        let mut state = self.state();
        if state.closed {
            return Err(TransportError::Closed);
        }

        let available = len.min(state.rx.len());
        let data: Vec<u8> = state.rx.drain(..available).collect();
        if data.len() < len {
            let partial = Bytes::from(data);
            return Err(if state.hung_up {
                TransportError::Truncated {
                    expected: len,
                    partial,
                }
            } else {
                TransportError::Timeout {
                    expected: len,
                    partial,
                }
            });
        }
        Ok(Bytes::from(data))
    }

    fn discard_pending_input(&mut self) -> Result<()> {
        let mut state = self.state();
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.discards += 1;
        state.discarded_bytes += state.rx.len();
        state.rx.clear();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state().closed = true;
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "memory"
    }
}

impl fmt::Debug for MemoryLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("MemoryLink")
            .field("pending", &state.rx.len())
            .field("written", &state.written.len())
            .field("queued_replies", &state.replies.len())
            .field("closed", &state.closed)
            .finish()
    }
}
