//! UDP transport for landmark text frames.
//!
//! The receiver runs as its own tokio task and publishes every datagram into a
//! [`FrameSlot`]. The tick loop reads the slot once per tick; only the newest
//! frame is kept, so a slow tick never sees a backlog or a torn frame.

use crate::config::ReceiverConfig;
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct SlotInner {
    data: Option<String>,
    seq: u64,
}

/// Single-slot, latest-wins frame buffer shared by one writer and one reader.
#[derive(Clone, Debug, Default)]
pub struct FrameSlot {
    inner: Arc<Mutex<SlotInner>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored frame.
    pub fn publish(&self, data: String) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.data = Some(data);
        inner.seq += 1;
    }

    /// The newest frame, or an empty string before anything arrived.
    pub fn latest(&self) -> String {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.data.clone().unwrap_or_default()
    }

    /// The newest frame if it was published after `seen`, with its sequence.
    pub fn latest_since(&self, seen: u64) -> Option<(u64, String)> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.seq > seen {
            inner.data.clone().map(|d| (inner.seq, d))
        } else {
            None
        }
    }

    /// Number of frames published so far.
    pub fn seq(&self) -> u64 {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).seq
    }
}

/// Bound UDP socket feeding a [`FrameSlot`].
pub struct LandmarkReceiver {
    socket: UdpSocket,
    slot: FrameSlot,
    max_datagram: usize,
}

impl LandmarkReceiver {
    /// Bind the socket described by `config`.
    pub async fn bind(config: &ReceiverConfig) -> Result<Self> {
        let socket = UdpSocket::bind(config.bind).await?;
        tracing::info!("Listening for landmark frames on {}", socket.local_addr()?);
        Ok(Self {
            socket,
            slot: FrameSlot::new(),
            max_datagram: config.max_datagram.max(1),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Handle to the slot this receiver writes into.
    pub fn slot(&self) -> FrameSlot {
        self.slot.clone()
    }

    /// Receive datagrams until cancelled.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let mut buf = vec![0u8; self.max_datagram];
        let mut last_peer: Option<SocketAddr> = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.socket.recv_from(&mut buf) => {
                    let (n, peer) = result?;
                    if last_peer != Some(peer) {
                        tracing::info!("Receiving landmarks from {}", peer);
                        last_peer = Some(peer);
                    }
                    tracing::trace!("Datagram: {} bytes", n);
                    self.slot
                        .publish(String::from_utf8_lossy(&buf[..n]).into_owned());
                }
            }
        }

        tracing::debug!("Landmark receiver stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_slot_latest_wins() {
        let slot = FrameSlot::new();
        assert_eq!(slot.latest(), "");
        assert!(slot.latest_since(0).is_none());

        slot.publish("[1]".to_string());
        slot.publish("[2]".to_string());
        assert_eq!(slot.latest(), "[2]");
        assert_eq!(slot.seq(), 2);
        assert_eq!(slot.latest_since(0), Some((2, "[2]".to_string())));
        assert!(slot.latest_since(2).is_none());
    }

    #[test]
    fn test_slot_shared_between_threads() {
        let slot = FrameSlot::new();
        let writer = slot.clone();
        std::thread::spawn(move || {
            for i in 0..100 {
                writer.publish(format!("[{}]", i));
            }
        })
        .join()
        .unwrap();
        assert_eq!(slot.latest(), "[99]");
        assert_eq!(slot.seq(), 100);
    }

    #[tokio::test]
    async fn test_receiver_publishes_datagrams() {
        let config = ReceiverConfig {
            bind: "127.0.0.1:0".parse().unwrap(),
            max_datagram: 1024,
        };
        let receiver = LandmarkReceiver::bind(&config).await.unwrap();
        let addr = receiver.local_addr().unwrap();
        let slot = receiver.slot();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(receiver.run(cancel.clone()));

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(b"[1,2,3]", addr).await.unwrap();

        let mut received = String::new();
        for _ in 0..100 {
            received = slot.latest();
            if !received.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(received, "[1,2,3]");

        cancel.cancel();
        task.await.unwrap().unwrap();
    }
}
