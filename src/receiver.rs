//! The receiver task (spec §4.3), grounded in `advertise.go`'s `listen`
//! and `handle`.
//!
//! The original arms a short read deadline once `ctx.Done()` fires to
//! unblock a goroutine parked in a blocking read. Tokio's socket futures
//! are cancel-safe on drop, so the idiomatic replacement (already used
//! elsewhere in the teacher's workspace, e.g. `hr-cloud-relay`'s
//! `tokio::select!` over copy futures) is to race the read against the
//! cancellation token directly — no synthetic deadline needed.

use std::net::Ipv6Addr;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::advertisement::RouterAdvertisement;
use crate::constants::ND_HOP_LIMIT;
use crate::consistency::inconsistencies;
use crate::events::{emit, Event, EventSender};
use crate::metrics::Metrics;
use crate::queue::DestinationSender;
use crate::socket::{IcmpSocket, ALL_NODES};
use crate::wire::{decode, NdMessage};

/// Runs until `cancel` fires or the socket returns a fatal error.
pub async fn run(
    socket: &dyn IcmpSocket,
    local: &RouterAdvertisement,
    destinations: &DestinationSender,
    events: &Option<EventSender>,
    metrics: &Metrics,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let (data, hop_limit, src) = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            result = socket.recv_from() => match result {
                Ok(v) => v,
                Err(e) if is_temporary(&e) => {
                    debug!(error = %e, "temporary read error, retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            },
        };

        if hop_limit != ND_HOP_LIMIT {
            metrics
                .messages_received_invalid_total
                .with_label_values(&["hop_limit"])
                .inc();
            debug!(%src, hop_limit, "dropping message, hop limit is not 255");
            continue;
        }
        let message = match decode(&data) {
            Ok(m) => m,
            Err(e) => {
                metrics
                    .messages_received_invalid_total
                    .with_label_values(&["malformed"])
                    .inc();
                debug!(%src, error = %e, "dropping malformed message");
                continue;
            }
        };

        match message {
            NdMessage::RouterSolicitation => {
                metrics
                    .messages_received_total
                    .with_label_values(&["router_solicitation"])
                    .inc();
                // An unspecified source means the host can't yet form a
                // unicast reply to; fall back to a multicast response.
                let dst = if src.is_unspecified() { ALL_NODES } else { src };
                if destinations.try_send(dst).is_err() {
                    warn!("destination queue full, dropping router solicitation");
                }
            }
            NdMessage::RouterAdvertisement(peer) => {
                metrics
                    .messages_received_total
                    .with_label_values(&["router_advertisement"])
                    .inc();
                emit(events, Event::ReceivedPeerRa { peer: src }).await;
                handle_peer_ra(local, &peer, src, events, metrics).await;
            }
            NdMessage::Other(_) => {
                metrics
                    .messages_received_total
                    .with_label_values(&["other"])
                    .inc();
            }
        }
    }
}

async fn handle_peer_ra(
    local: &RouterAdvertisement,
    peer: &RouterAdvertisement,
    src: Ipv6Addr,
    events: &Option<EventSender>,
    metrics: &Metrics,
) {
    let fields = inconsistencies(local, peer);
    if fields.is_empty() {
        return;
    }

    metrics.ra_inconsistencies_total.inc();
    warn!(peer = %src, ?fields, "peer router advertisement is inconsistent with ours");
    emit(
        events,
        Event::InconsistentPeerRa {
            peer: src,
            fields,
        },
    )
    .await;
}

fn is_temporary(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted | std::io::ErrorKind::TimedOut
    )
}
