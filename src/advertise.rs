//! Entry point: `advertise` runs one interface's full Neighbor Discovery
//! router advertisement lifecycle until canceled (spec §4.1), grounded
//! in `advertise.go`'s `Advertise`/`advertise`.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::InterfaceConfig;
use crate::error::AdvertiseError;
use crate::events::EventSender;
use crate::metrics::Metrics;
use crate::multicast_timer;
use crate::queue;
use crate::receiver;
use crate::scheduler;
use crate::sender::{build_ra, SendContext};
use crate::socket::{Dialer, ALL_NODES};
use crate::system::SystemState;

/// Runs the advertiser for one interface until `cancel` fires, then
/// sends a final lifetime-zero advertisement and returns `Ok(())`.
///
/// Any other outcome is a genuine failure (spec §4.1/§7): dialing,
/// preparing plugins, or the initial probe advertisement all have to
/// succeed before this function starts any background task.
pub async fn advertise(
    dialer: &dyn Dialer,
    cfg: InterfaceConfig,
    mut plugins: Vec<Box<dyn crate::plugins::Plugin>>,
    system: Arc<dyn SystemState>,
    metrics: Arc<Metrics>,
    events: Option<EventSender>,
    cancel: CancellationToken,
) -> Result<(), AdvertiseError> {
    let ctx = dialer.dial().await.map_err(|e| AdvertiseError::InitialSendFailed { cause: e })?;

    for plugin in &mut plugins {
        plugin
            .prepare(&ctx.facts)
            .map_err(|e| AdvertiseError::PluginPrepareFailed {
                plugin_name: plugin.name().to_string(),
                cause: e,
            })?;
        info!(plugin = plugin.name(), detail = %plugin.describe(), "plugin prepared");
    }

    let cfg = Arc::new(cfg);
    let plugins: Arc<Vec<Box<dyn crate::plugins::Plugin>>> = Arc::new(plugins);

    let send_ctx = SendContext {
        socket: ctx.socket.clone(),
        cfg: cfg.clone(),
        facts: ctx.facts,
        plugins: plugins.clone(),
        system: system.clone(),
        metrics: metrics.clone(),
    };

    // Probe: build and send one advertisement before starting any
    // background task, so a misconfigured interface fails loudly and
    // immediately rather than silently going quiet.
    let probe = build_ra(&cfg, &ctx.facts, &plugins, system.as_ref(), &metrics)
        .await
        .map_err(|e| AdvertiseError::InitialSendFailed { cause: e })?;
    send_ctx
        .send(ALL_NODES, &probe)
        .await
        .map_err(|e| AdvertiseError::InitialSendFailed { cause: e })?;

    let (dest_tx, dest_rx) = queue::channel();

    let mut tasks: JoinSet<Result<(), AdvertiseError>> = JoinSet::new();

    {
        // The receiver checks peer RAs against this snapshot for the
        // lifetime of the task rather than rebuilding it per message:
        // the fields it compares (hop limit, managed/other flags,
        // timers) come straight from configuration and don't change
        // between sends the way `router_lifetime` (forwarding-derived)
        // does.
        let socket = send_ctx.socket.clone();
        let local = probe.clone();
        let events = events.clone();
        let metrics = metrics.clone();
        let cancel = cancel.clone();
        let dest_tx = dest_tx.clone();
        tasks.spawn(async move {
            receiver::run(socket.as_ref(), &local, &dest_tx, &events, &metrics, &cancel)
                .await
                .map_err(AdvertiseError::ReceiverFatal)
        });
    }

    {
        let ctx = send_ctx.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move { scheduler::run(dest_rx, ctx, cancel).await });
    }

    if !cfg.unicast_only {
        let dest_tx = dest_tx.clone();
        let cancel = cancel.clone();
        let min = cfg.min_interval;
        let max = cfg.max_interval;
        tasks.spawn(async move {
            let mut i = 0usize;
            let mut rng = rand::thread_rng();
            loop {
                let delay = multicast_timer::choose_delay(&mut rng, i, min, max);
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(delay) => {}
                }
                if dest_tx.send(ALL_NODES).await.is_err() {
                    return Ok(());
                }
                i += 1;
            }
        });
    }

    drop(dest_tx);

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "background task failed, shutting down advertiser");
                cancel.cancel();
                send_ctx.shutdown().await;
                tasks.shutdown().await;
                return Err(e);
            }
            Err(join_err) => {
                warn!(error = %join_err, "background task panicked");
                cancel.cancel();
                send_ctx.shutdown().await;
                tasks.shutdown().await;
                return Err(AdvertiseError::ReceiverFatal(join_err.into()));
            }
        }
    }

    send_ctx.shutdown().await;
    Ok(())
}
