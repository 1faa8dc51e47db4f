//! Prometheus metrics (spec §6.3), grounded in `bluecatengineering-dora`'s
//! use of the `prometheus` crate — no crate in the teacher workspace
//! carries a metrics stack of its own, so this is brought in from the
//! wider example pack rather than the chosen teacher.

use prometheus::{Counter, CounterVec, Gauge, GaugeVec, Opts, Registry};

/// All series this daemon exports, registered against one [`Registry`]
/// so a caller can mount it under their own `/metrics` endpoint.
pub struct Metrics {
    pub messages_received_total: CounterVec,
    pub messages_received_invalid_total: CounterVec,
    pub router_advertisements_total: CounterVec,
    pub ra_inconsistencies_total: Counter,
    pub errors_total: CounterVec,
    pub last_multicast_time: Gauge,
    pub ra_prefix_autonomous: GaugeVec,
}

impl Metrics {
    pub fn new(registry: &Registry) -> anyhow::Result<Self> {
        let messages_received_total = CounterVec::new(
            Opts::new(
                "radv6_messages_received_total",
                "ND messages received on the advertising interface, by type.",
            ),
            &["type"],
        )?;
        let messages_received_invalid_total = CounterVec::new(
            Opts::new(
                "radv6_messages_received_invalid_total",
                "ND messages dropped before processing, by reason.",
            ),
            &["reason"],
        )?;
        let router_advertisements_total = CounterVec::new(
            Opts::new(
                "radv6_router_advertisements_total",
                "Router advertisements sent, by kind (unicast or multicast).",
            ),
            &["kind"],
        )?;
        let ra_inconsistencies_total = Counter::new(
            "radv6_ra_inconsistencies_total",
            "Peer router advertisements that disagreed with this router's own.",
        )?;
        let errors_total = CounterVec::new(
            Opts::new("radv6_errors_total", "Errors encountered, by task."),
            &["task"],
        )?;
        let last_multicast_time = Gauge::new(
            "radv6_last_multicast_time_seconds",
            "Unix time of the last multicast router advertisement sent.",
        )?;
        let ra_prefix_autonomous = GaugeVec::new(
            Opts::new(
                "radv6_ra_prefix_autonomous",
                "Whether an advertised prefix carries the autonomous flag.",
            ),
            &["prefix"],
        )?;

        registry.register(Box::new(messages_received_total.clone()))?;
        registry.register(Box::new(messages_received_invalid_total.clone()))?;
        registry.register(Box::new(router_advertisements_total.clone()))?;
        registry.register(Box::new(ra_inconsistencies_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(last_multicast_time.clone()))?;
        registry.register(Box::new(ra_prefix_autonomous.clone()))?;

        Ok(Self {
            messages_received_total,
            messages_received_invalid_total,
            router_advertisements_total,
            ra_inconsistencies_total,
            errors_total,
            last_multicast_time,
            ra_prefix_autonomous,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_without_collision() {
        let registry = Registry::new();
        Metrics::new(&registry).expect("distinct metric names");
    }
}
