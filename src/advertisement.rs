use std::net::Ipv6Addr;
use std::time::Duration;

use serde::Serialize;

use crate::config::RouterPreference;

/// A single RA option, as produced by a plugin's `build()` and consumed
/// by the wire encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum RaOption {
    PrefixInformation {
        prefix: Ipv6Addr,
        prefix_length: u8,
        on_link: bool,
        autonomous: bool,
        valid_lifetime: Duration,
        preferred_lifetime: Duration,
    },
    Mtu(u32),
    SourceLinkLayerAddress([u8; 6]),
    Rdnss {
        lifetime: Duration,
        servers: Vec<Ipv6Addr>,
    },
    Dnssl {
        lifetime: Duration,
        suffixes: Vec<String>,
    },
}

impl RaOption {
    /// Key used to match Prefix Information options across two
    /// advertisements when checking consistency: `"<prefix>/<length>"`.
    pub fn prefix_key(prefix: Ipv6Addr, prefix_length: u8) -> String {
        format!("{prefix}/{prefix_length}")
    }
}

/// A router advertisement built fresh for a single send. Never cached
/// across sends: configuration or forwarding state may change between
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterAdvertisement {
    pub current_hop_limit: u8,
    pub managed_config: bool,
    pub other_config: bool,
    pub mobile_ipv6_home_agent: bool,
    pub preference: RouterPreference,
    pub nd_proxy: bool,
    pub router_lifetime: Duration,
    pub reachable_time: Duration,
    pub retransmit_timer: Duration,
    pub options: Vec<RaOption>,
}

impl RouterAdvertisement {
    pub fn mtu(&self) -> Option<u32> {
        self.options.iter().find_map(|o| match o {
            RaOption::Mtu(m) => Some(*m),
            _ => None,
        })
    }

    pub fn prefixes(&self) -> impl Iterator<Item = (&Ipv6Addr, u8, bool, bool, Duration, Duration)> {
        self.options.iter().filter_map(|o| match o {
            RaOption::PrefixInformation {
                prefix,
                prefix_length,
                on_link,
                autonomous,
                valid_lifetime,
                preferred_lifetime,
            } => Some((
                prefix,
                *prefix_length,
                *on_link,
                *autonomous,
                *valid_lifetime,
                *preferred_lifetime,
            )),
            _ => None,
        })
    }

    pub fn source_link_layer_address(&self) -> Option<[u8; 6]> {
        self.options.iter().find_map(|o| match o {
            RaOption::SourceLinkLayerAddress(mac) => Some(*mac),
            _ => None,
        })
    }
}

/// JSON projection of a [`RouterAdvertisement`] for the debug API
/// (spec §6.4). Owned only by this core; the HTTP surface that serves
/// it is out of scope.
#[derive(Debug, Clone, Serialize)]
pub struct DebugRouterAdvertisement {
    pub current_hop_limit: u8,
    pub managed_configuration: bool,
    pub other_configuration: bool,
    pub mobile_ipv6_home_agent: bool,
    pub router_selection_preference: &'static str,
    pub neighbor_discovery_proxy: bool,
    pub router_lifetime_seconds: u64,
    pub reachable_time_milliseconds: u64,
    pub retransmit_timer_milliseconds: u64,
    pub options: DebugOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugOptions {
    pub mtu: u32,
    pub source_link_layer_address: String,
}

fn preference_str(p: RouterPreference) -> &'static str {
    match p {
        RouterPreference::Low => "low",
        RouterPreference::Medium => "medium",
        RouterPreference::High => "high",
    }
}

impl From<&RouterAdvertisement> for DebugRouterAdvertisement {
    fn from(ra: &RouterAdvertisement) -> Self {
        let mac = ra
            .source_link_layer_address()
            .map(|m| {
                m.iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<Vec<_>>()
                    .join(":")
            })
            .unwrap_or_default();

        DebugRouterAdvertisement {
            current_hop_limit: ra.current_hop_limit,
            managed_configuration: ra.managed_config,
            other_configuration: ra.other_config,
            mobile_ipv6_home_agent: ra.mobile_ipv6_home_agent,
            router_selection_preference: preference_str(ra.preference),
            neighbor_discovery_proxy: ra.nd_proxy,
            router_lifetime_seconds: ra.router_lifetime.as_secs(),
            reachable_time_milliseconds: ra.reachable_time.as_millis() as u64,
            retransmit_timer_milliseconds: ra.retransmit_timer.as_millis() as u64,
            options: DebugOptions {
                mtu: ra.mtu().unwrap_or(0),
                source_link_layer_address: mac,
            },
        }
    }
}
