//! RA option plugins.
//!
//! Each plugin is a small capability with three operations: `prepare`
//! resolves dynamic values once the interface is known, `describe`
//! renders a log line, `build` produces the option set for an
//! outgoing RA. Modeled as a tagged enum deserialized from
//! configuration plus a trait object for dispatch, per spec §9 —
//! "avoid inheritance hierarchies".

mod dnssl;
mod mtu;
mod prefix;
mod rdnss;
mod source_ll;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::advertisement::RaOption;
use crate::facts::InterfaceFacts;

pub use dnssl::DnsslPlugin;
pub use mtu::MtuPlugin;
pub use prefix::PrefixPlugin;
pub use rdnss::RdnssPlugin;
pub use source_ll::SourceLinkLayerPlugin;

/// A plugin contributes one or more options to every outgoing RA.
/// Pure after `prepare` has run once.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn prepare(&mut self, facts: &InterfaceFacts) -> Result<()>;
    fn describe(&self) -> String;
    fn build(&self) -> Vec<RaOption>;
}

/// Serde-facing configuration for a plugin, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PluginConfig {
    Prefix {
        prefix: String,
        on_link: bool,
        autonomous: bool,
        #[serde(with = "crate::serde_util::config_duration_secs")]
        valid_lifetime: std::time::Duration,
        #[serde(with = "crate::serde_util::config_duration_secs")]
        preferred_lifetime: std::time::Duration,
    },
    Mtu {
        #[serde(default)]
        value: Option<u32>,
    },
    SourceLinkLayerAddress,
    Rdnss {
        #[serde(with = "crate::serde_util::config_duration_secs")]
        lifetime: std::time::Duration,
        servers: Vec<std::net::Ipv6Addr>,
    },
    Dnssl {
        #[serde(with = "crate::serde_util::config_duration_secs")]
        lifetime: std::time::Duration,
        suffixes: Vec<String>,
    },
}

/// Conversion surface from a [`PluginConfig`] to a live [`Plugin`].
pub trait PluginSpec {
    fn instantiate(&self) -> Box<dyn Plugin>;
}

impl PluginSpec for PluginConfig {
    fn instantiate(&self) -> Box<dyn Plugin> {
        match self {
            PluginConfig::Prefix {
                prefix,
                on_link,
                autonomous,
                valid_lifetime,
                preferred_lifetime,
            } => Box::new(PrefixPlugin::new(
                prefix.clone(),
                *on_link,
                *autonomous,
                *valid_lifetime,
                *preferred_lifetime,
            )),
            PluginConfig::Mtu { value } => Box::new(MtuPlugin::new(*value)),
            PluginConfig::SourceLinkLayerAddress => Box::new(SourceLinkLayerPlugin::new()),
            PluginConfig::Rdnss { lifetime, servers } => {
                Box::new(RdnssPlugin::new(*lifetime, servers.clone()))
            }
            PluginConfig::Dnssl { lifetime, suffixes } => {
                Box::new(DnsslPlugin::new(*lifetime, suffixes.clone()))
            }
        }
    }
}
