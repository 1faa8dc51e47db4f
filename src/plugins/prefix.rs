use std::net::Ipv6Addr;
use std::time::Duration;

use anyhow::{Context, Result};
use ipnet::Ipv6Net;

use crate::advertisement::RaOption;
use crate::facts::InterfaceFacts;

use super::Plugin;

/// Announces a Prefix Information option (RFC 4861 §4.6.2).
pub struct PrefixPlugin {
    raw: String,
    on_link: bool,
    autonomous: bool,
    valid_lifetime: Duration,
    preferred_lifetime: Duration,
    resolved: Option<(Ipv6Addr, u8)>,
}

impl PrefixPlugin {
    pub fn new(
        raw: String,
        on_link: bool,
        autonomous: bool,
        valid_lifetime: Duration,
        preferred_lifetime: Duration,
    ) -> Self {
        Self {
            raw,
            on_link,
            autonomous,
            valid_lifetime,
            preferred_lifetime,
            resolved: None,
        }
    }

    fn parse(raw: &str) -> Result<(Ipv6Addr, u8)> {
        let net: Ipv6Net = raw.parse().with_context(|| format!("invalid prefix {raw:?}"))?;
        Ok((net.addr(), net.prefix_len()))
    }
}

impl Plugin for PrefixPlugin {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn prepare(&mut self, _facts: &InterfaceFacts) -> Result<()> {
        self.resolved = Some(Self::parse(&self.raw)?);
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "prefix {} (on-link={}, autonomous={}, valid={:?}, preferred={:?})",
            self.raw, self.on_link, self.autonomous, self.valid_lifetime, self.preferred_lifetime
        )
    }

    fn build(&self) -> Vec<RaOption> {
        let Some((prefix, prefix_length)) = self.resolved else {
            return Vec::new();
        };
        vec![RaOption::PrefixInformation {
            prefix,
            prefix_length,
            on_link: self.on_link,
            autonomous: self.autonomous,
            valid_lifetime: self.valid_lifetime,
            preferred_lifetime: self.preferred_lifetime,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefix_and_length() {
        assert_eq!(
            PrefixPlugin::parse("2001:db8::/64").unwrap(),
            ("2001:db8::".parse().unwrap(), 64)
        );
        assert!(PrefixPlugin::parse("not-a-prefix").is_err());
    }

    #[test]
    fn build_before_prepare_is_empty() {
        let p = PrefixPlugin::new(
            "2001:db8::/64".into(),
            true,
            true,
            Duration::from_secs(86400),
            Duration::from_secs(14400),
        );
        assert!(p.build().is_empty());
    }
}
