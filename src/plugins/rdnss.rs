use std::net::Ipv6Addr;
use std::time::Duration;

use anyhow::Result;

use crate::advertisement::RaOption;
use crate::facts::InterfaceFacts;

use super::Plugin;

/// Announces Recursive DNS Server options, RFC 8106.
pub struct RdnssPlugin {
    lifetime: Duration,
    servers: Vec<Ipv6Addr>,
}

impl RdnssPlugin {
    pub fn new(lifetime: Duration, servers: Vec<Ipv6Addr>) -> Self {
        Self { lifetime, servers }
    }
}

impl Plugin for RdnssPlugin {
    fn name(&self) -> &'static str {
        "rdnss"
    }

    fn prepare(&mut self, _facts: &InterfaceFacts) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("rdnss {:?} lifetime={:?}", self.servers, self.lifetime)
    }

    fn build(&self) -> Vec<RaOption> {
        if self.servers.is_empty() {
            return Vec::new();
        }
        vec![RaOption::Rdnss {
            lifetime: self.lifetime,
            servers: self.servers.clone(),
        }]
    }
}
