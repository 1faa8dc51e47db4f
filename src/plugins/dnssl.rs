use std::time::Duration;

use anyhow::Result;

use crate::advertisement::RaOption;
use crate::facts::InterfaceFacts;

use super::Plugin;

/// Announces DNS Search List options, RFC 8106.
pub struct DnsslPlugin {
    lifetime: Duration,
    suffixes: Vec<String>,
}

impl DnsslPlugin {
    pub fn new(lifetime: Duration, suffixes: Vec<String>) -> Self {
        Self { lifetime, suffixes }
    }
}

impl Plugin for DnsslPlugin {
    fn name(&self) -> &'static str {
        "dnssl"
    }

    fn prepare(&mut self, _facts: &InterfaceFacts) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("dnssl {:?} lifetime={:?}", self.suffixes, self.lifetime)
    }

    fn build(&self) -> Vec<RaOption> {
        if self.suffixes.is_empty() {
            return Vec::new();
        }
        vec![RaOption::Dnssl {
            lifetime: self.lifetime,
            suffixes: self.suffixes.clone(),
        }]
    }
}
