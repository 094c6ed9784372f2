use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use atbridge_transport::{Link, SerialLink};
use bytes::Bytes;

use crate::client::BridgeClient;
use crate::error::Result;

/// A [`BridgeClient`] shared between threads.
///
/// Every transaction holds the lock for its whole duration, so concurrent
/// callers are serialized and never interleave frames on the link. Clones
/// refer to the same client.
pub struct SharedClient<L: Link = SerialLink> {
    inner: Arc<Mutex<BridgeClient<L>>>,
}

impl<L: Link> Clone for SharedClient<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: Link> SharedClient<L> {
    pub fn new(client: BridgeClient<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    /// Exclusive access for a sequence of operations, e.g.
    /// `shared.lock().udp().send(..)`.
    ///
    /// A panic in another holder does not poison the client: each
    /// transaction starts by discarding stale input anyway.
    pub fn lock(&self) -> MutexGuard<'_, BridgeClient<L>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn transceive(
        &self,
        command: impl Into<u8>,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Bytes> {
        self.lock().transceive(command, payload, timeout)
    }

    pub fn request(&self, command: impl Into<u8>, payload: &[u8]) -> Result<Bytes> {
        self.lock().request(command, payload)
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    pub fn close(&self) -> Result<()> {
        self.lock().close()
    }
}

impl<L: Link> From<BridgeClient<L>> for SharedClient<L> {
    fn from(client: BridgeClient<L>) -> Self {
        Self::new(client)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use atbridge_frame::{decode_frame, encode};
    use atbridge_transport::MemoryLink;
    use bytes::BytesMut;

    use super::*;
    use crate::error::BridgeError;

    #[test]
    fn concurrent_callers_get_their_own_replies() {
        // Echo the request payload back after an OK status.
        let link = MemoryLink::with_responder(|request| {
            let mut buf = BytesMut::from(request);
            let frame = decode_frame(&mut buf).ok()??;
            let mut body = vec![0x00];
            body.extend_from_slice(&frame.payload);
            Some(encode(frame.command | 0x80, &body).ok()?.to_vec())
        });
        let shared = SharedClient::new(BridgeClient::new(link.clone()));

        let handles: Vec<_> = (0..8u8)
            .map(|id| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        let reply = shared
                            .transceive(0x22, &[id], Duration::from_millis(50))
                            .unwrap();
                        assert_eq!(reply.as_ref(), &[0x00, id]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(link.write_count(), 200);
    }

    #[test]
    fn close_is_shared() {
        let shared = SharedClient::from(BridgeClient::new(MemoryLink::new()));
        let other = shared.clone();
        shared.close().unwrap();
        assert!(!other.is_open());
        assert!(matches!(
            other.request(0x00, &[]),
            Err(BridgeError::NotConnected)
        ));
    }

    #[test]
    fn lock_gives_facade_access() {
        let link = MemoryLink::new();
        link.queue_reply(encode(0x81, &[0x00, 2, 0, 1]).unwrap().to_vec());
        let shared = SharedClient::new(BridgeClient::new(link));

        let version = shared.lock().system().version().unwrap();
        assert_eq!(version.to_string(), "2.0.1");
    }
}
