use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::plugins::{PluginConfig, PluginSpec};

/// Router selection preference advertised in the RA flags, RFC 4191.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouterPreference {
    Low,
    Medium,
    High,
}

impl Default for RouterPreference {
    fn default() -> Self {
        RouterPreference::Medium
    }
}

/// Immutable configuration for a single advertised interface.
///
/// Stays immutable for the lifetime of a single `advertise()` call; a
/// reconfigure is a fresh `advertise()` call in the supervisor above
/// this core (out of scope per spec §1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub interface: String,

    #[serde(default)]
    pub unicast_only: bool,

    #[serde(default = "default_min_interval", with = "crate::serde_util::config_duration_secs")]
    pub min_interval: Duration,

    #[serde(default = "default_max_interval", with = "crate::serde_util::config_duration_secs")]
    pub max_interval: Duration,

    #[serde(default = "default_lifetime", with = "crate::serde_util::config_duration_secs")]
    pub default_lifetime: Duration,

    #[serde(default)]
    pub managed_config: bool,

    #[serde(default)]
    pub other_config: bool,

    #[serde(default)]
    pub mobile_ipv6_home_agent: bool,

    #[serde(default)]
    pub nd_proxy: bool,

    #[serde(default)]
    pub preference: RouterPreference,

    #[serde(default, with = "crate::serde_util::config_duration_millis")]
    pub reachable_time: Duration,

    #[serde(default, with = "crate::serde_util::config_duration_millis")]
    pub retransmit_timer: Duration,

    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

fn default_min_interval() -> Duration {
    Duration::from_secs(200)
}

fn default_max_interval() -> Duration {
    Duration::from_secs(600)
}

fn default_lifetime() -> Duration {
    // RFC 4861 §6.2.1: SHOULD be 3 * MaxRtrAdvInterval, capped at 9000s.
    (default_max_interval() * 3).min(Duration::from_secs(9000))
}

impl InterfaceConfig {
    /// Instantiate the plugin trait objects described by `self.plugins`,
    /// in configuration order. The source link-layer address option is
    /// appended by the sender unconditionally (spec §9), so a
    /// `SourceLinkLayerAddress` entry here would only duplicate it.
    pub fn build_plugins(&self) -> Vec<Box<dyn crate::plugins::Plugin>> {
        self.plugins
            .iter()
            .filter(|p| !matches!(p, PluginConfig::SourceLinkLayerAddress))
            .map(PluginSpec::instantiate)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_rfc4861() {
        let cfg: InterfaceConfig = serde_json::from_str(r#"{"interface": "eth0"}"#).unwrap();
        assert_eq!(cfg.min_interval, Duration::from_secs(200));
        assert_eq!(cfg.max_interval, Duration::from_secs(600));
        assert_eq!(cfg.default_lifetime, Duration::from_secs(1800));
        assert!(!cfg.unicast_only);
        assert_eq!(cfg.preference, RouterPreference::Medium);
    }
}
