//! Building and sending one router advertisement (spec §4.5/§4.6),
//! grounded in `advertise.go`'s `send`/`buildRA`/`shutdown` and the
//! teacher's `build_ra_packet`.
//!
//! A source link-layer address option is appended to every advertisement
//! unconditionally, regardless of the configured plugin list (spec §9):
//! it isn't user-configurable data, it's a property of the interface the
//! core already knows from [`InterfaceFacts`].

use std::net::Ipv6Addr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::advertisement::{RaOption, RouterAdvertisement};
use crate::config::InterfaceConfig;
use crate::facts::InterfaceFacts;
use crate::metrics::Metrics;
use crate::plugins::Plugin;
use crate::socket::{IcmpSocket, ALL_NODES};
use crate::system::SystemState;
use crate::wire::encode_ra;

/// Builds a fresh [`RouterAdvertisement`] from current configuration and
/// system state. Never cached: `IPv6Forwarding` and plugin output can
/// both change between sends.
pub async fn build_ra(
    cfg: &InterfaceConfig,
    facts: &InterfaceFacts,
    plugins: &[Box<dyn Plugin>],
    system: &dyn SystemState,
    metrics: &Metrics,
) -> anyhow::Result<RouterAdvertisement> {
    let forwarding = system.ipv6_forwarding(&cfg.interface).await.map_err(|e| {
        metrics.errors_total.with_label_values(&["transmit"]).inc();
        e
    })?;
    let router_lifetime = if forwarding {
        cfg.default_lifetime
    } else {
        Duration::ZERO
    };

    let mut options: Vec<RaOption> = plugins.iter().flat_map(|p| p.build()).collect();
    options.push(RaOption::SourceLinkLayerAddress(facts.mac));

    Ok(RouterAdvertisement {
        current_hop_limit: 64,
        managed_config: cfg.managed_config,
        other_config: cfg.other_config,
        mobile_ipv6_home_agent: cfg.mobile_ipv6_home_agent,
        preference: cfg.preference,
        nd_proxy: cfg.nd_proxy,
        router_lifetime,
        reachable_time: cfg.reachable_time,
        retransmit_timer: cfg.retransmit_timer,
        options,
    })
}

/// Sends `ra` to `dst`. A no-op when `unicast_only` is set and `dst` is
/// multicast, matching the original's guard in `send`.
pub async fn send(
    socket: &dyn IcmpSocket,
    cfg: &InterfaceConfig,
    dst: Ipv6Addr,
    ra: &RouterAdvertisement,
    metrics: &Metrics,
) -> anyhow::Result<()> {
    if cfg.unicast_only && dst.is_multicast() {
        debug!(%dst, "skipping multicast send, unicast_only is set");
        return Ok(());
    }

    let bytes = encode_ra(ra);
    if let Err(e) = socket.send_to(&bytes, dst).await {
        metrics.errors_total.with_label_values(&["transmit"]).inc();
        return Err(e.into());
    }
    let kind = if dst.is_multicast() { "multicast" } else { "unicast" };
    metrics.router_advertisements_total.with_label_values(&[kind]).inc();
    if dst == ALL_NODES || dst.is_multicast() {
        metrics
            .last_multicast_time
            .set(unix_time_secs_best_effort());
    }
    for (prefix, len, _on_link, autonomous, _valid, _preferred) in ra.prefixes() {
        let key = RaOption::prefix_key(*prefix, len);
        metrics
            .ra_prefix_autonomous
            .with_label_values(&[&key])
            .set(if autonomous { 1.0 } else { 0.0 });
    }
    Ok(())
}

/// Sends a final router advertisement with `DefaultLifetime` zeroed so
/// hosts stop treating this router as a default immediately, instead of
/// waiting out the last advertised lifetime (spec §4.6). Failure is
/// logged, not propagated: shutdown continues regardless.
pub async fn shutdown_ra(
    socket: &dyn IcmpSocket,
    cfg: &InterfaceConfig,
    facts: &InterfaceFacts,
    plugins: &[Box<dyn Plugin>],
    system: &dyn SystemState,
    metrics: &Metrics,
) {
    let ra = match build_ra(cfg, facts, plugins, system, metrics).await {
        Ok(mut ra) => {
            ra.router_lifetime = Duration::ZERO;
            ra
        }
        Err(e) => {
            warn!(error = %e, "failed to build final shutdown advertisement");
            return;
        }
    };

    if let Err(e) = send(socket, cfg, ALL_NODES, &ra, metrics).await {
        warn!(error = %e, "failed to send final shutdown advertisement");
    }
}

fn unix_time_secs_best_effort() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Shared, cheaply-cloneable bundle the scheduler's send workers need.
/// Plugins are shared read-only: spec §9 requires them to be pure after
/// `prepare()`, so handing every send worker the same `Arc` is safe.
#[derive(Clone)]
pub struct SendContext {
    pub socket: Arc<dyn IcmpSocket>,
    pub cfg: Arc<InterfaceConfig>,
    pub facts: InterfaceFacts,
    pub plugins: Arc<Vec<Box<dyn Plugin>>>,
    pub system: Arc<dyn SystemState>,
    pub metrics: Arc<Metrics>,
}

impl SendContext {
    pub async fn build_ra(&self) -> anyhow::Result<RouterAdvertisement> {
        build_ra(&self.cfg, &self.facts, &self.plugins, self.system.as_ref(), &self.metrics).await
    }

    pub async fn send(&self, dst: Ipv6Addr, ra: &RouterAdvertisement) -> anyhow::Result<()> {
        send(self.socket.as_ref(), &self.cfg, dst, ra, &self.metrics).await
    }

    pub async fn shutdown(&self) {
        shutdown_ra(
            self.socket.as_ref(),
            &self.cfg,
            &self.facts,
            &self.plugins,
            self.system.as_ref(),
            &self.metrics,
        )
        .await
    }
}
