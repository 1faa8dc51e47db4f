//! Observability events the core emits for callers who want them
//! (spec §5), grounded in `hr_common::events`'s tagged-enum style.
//!
//! The original exposes an unbuffered Go channel (`a.eventC <- ...`),
//! blocking the sender until a consumer is ready to receive; the nearest
//! tokio equivalent is an mpsc channel of capacity 1 (documented Open
//! Question, resolved in SPEC_FULL.md). `emit` blocks rather than
//! dropping on a full queue, matching that contract: a slow consumer
//! stalls the advertiser loop instead of silently losing events, which
//! matters for callers relying on `ReceivedPeerRa`/`InconsistentPeerRa`
//! ordering.

use std::net::Ipv6Addr;

use serde::Serialize;

/// One notable thing the advertiser observed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// A router advertisement from a peer was received and passed the
    /// hop-limit-255 authenticity check.
    ReceivedPeerRa { peer: Ipv6Addr },
    /// A peer's router advertisement disagreed with this router's own
    /// configuration on a field both should agree on (spec §4.7).
    InconsistentPeerRa { peer: Ipv6Addr, fields: Vec<String> },
}

pub type EventSender = tokio::sync::mpsc::Sender<Event>;
pub type EventReceiver = tokio::sync::mpsc::Receiver<Event>;

/// Capacity chosen to approximate the original's unbuffered channel: one
/// event may be in flight before a send starts blocking.
pub const EVENT_CHANNEL_CAPACITY: usize = 1;

pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Sends `event`, blocking until the consumer has room. A no-op if the
/// caller never asked for events.
pub async fn emit(sender: &Option<EventSender>, event: Event) {
    let Some(sender) = sender else { return };
    if sender.send(event).await.is_err() {
        tracing::debug!("event receiver dropped, discarding event");
    }
}
