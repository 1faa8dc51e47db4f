//! The scheduler task (spec §4.4), grounded in `advertise.go`'s
//! `schedule`/`sendWorker`.
//!
//! Dequeues destinations pushed by the receiver, delays unicast replies
//! by a random amount up to `MAX_RA_DELAY`, and gates multicast sends to
//! at least `MIN_DELAY_BETWEEN_RAS` apart. `last_multicast_at` is
//! stamped at scheduling time, before the send worker actually transmits
//! — preserved as-is from the original rather than moved to after the
//! actual write, per the documented Open Question: under load this can
//! let two multicast sends land closer together than the minimum, and
//! that's a pre-existing quirk, not something this port silently fixes.
//! It starts initialized to "now", since the probe RA sent in
//! `advertise.rs` before this task is spawned counts as the initial
//! multicast (spec §4.1/§4.4).
//!
//! A worker's send error is fatal: it's pushed onto `errC`, a
//! capacity-1 channel mirroring the original's `errC := make(chan
//! error, 1)`, and the scheduler returns `SendFatal` to the caller
//! instead of continuing to schedule sends.

use std::time::Instant;

use rand::Rng;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::constants::MAX_RA_DELAY;
use crate::constants::MIN_DELAY_BETWEEN_RAS;
use crate::error::AdvertiseError;
use crate::queue::{is_multicast, DestinationReceiver};
use crate::sender::SendContext;

/// Runs until `cancel` fires, the destination channel closes, or a send
/// worker reports a fatal error.
pub async fn run(
    mut destinations: DestinationReceiver,
    send_ctx: SendContext,
    cancel: CancellationToken,
) -> Result<(), AdvertiseError> {
    let mut workers: JoinSet<()> = JoinSet::new();
    let mut last_multicast_at = Some(Instant::now());
    let (err_tx, mut err_rx) = tokio::sync::mpsc::channel::<anyhow::Error>(1);

    let result = loop {
        let dst = tokio::select! {
            _ = cancel.cancelled() => break Ok(()),
            err = err_rx.recv() => break Err(AdvertiseError::SendFatal(
                err.unwrap_or_else(|| anyhow::anyhow!("send worker errC closed")),
            )),
            dst = destinations.recv() => match dst {
                Some(dst) => dst,
                None => break Ok(()),
            },
        };

        let delay = if is_multicast(dst) {
            let now = Instant::now();
            let floor = last_multicast_at
                .map(|last| last + MIN_DELAY_BETWEEN_RAS)
                .unwrap_or(now);
            let wait = floor.saturating_duration_since(now);
            last_multicast_at = Some(now + wait);
            wait
        } else {
            let millis = rand::thread_rng().gen_range(0..=MAX_RA_DELAY.as_millis() as u64);
            std::time::Duration::from_millis(millis)
        };

        let ctx = send_ctx.clone();
        let err_tx = err_tx.clone();
        workers.spawn(async move {
            if delay > std::time::Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
            let ra = match ctx.build_ra().await {
                Ok(ra) => ra,
                Err(e) => {
                    warn!(error = %e, "failed to build router advertisement");
                    let _ = err_tx.try_send(e);
                    return;
                }
            };
            if let Err(e) = ctx.send(dst, &ra).await {
                warn!(%dst, error = %e, "failed to send router advertisement");
                let _ = err_tx.try_send(e);
            }
        });

        // Bound how many in-flight sends we track; finished ones are
        // reaped opportunistically so the set doesn't grow unbounded
        // under a burst of solicitations.
        while workers.try_join_next().is_some() {}
    };

    workers.shutdown().await;
    result
}
