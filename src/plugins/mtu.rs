use anyhow::Result;

use crate::advertisement::RaOption;
use crate::facts::InterfaceFacts;

use super::Plugin;

/// Announces the link MTU option. If no explicit value is configured,
/// resolves to the interface's actual MTU at `prepare` time.
pub struct MtuPlugin {
    configured: Option<u32>,
    resolved: u32,
}

impl MtuPlugin {
    pub fn new(configured: Option<u32>) -> Self {
        Self {
            configured,
            resolved: 0,
        }
    }
}

impl Plugin for MtuPlugin {
    fn name(&self) -> &'static str {
        "mtu"
    }

    fn prepare(&mut self, facts: &InterfaceFacts) -> Result<()> {
        self.resolved = self.configured.unwrap_or(facts.mtu);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("mtu {}", self.resolved)
    }

    fn build(&self) -> Vec<RaOption> {
        vec![RaOption::Mtu(self.resolved)]
    }
}
