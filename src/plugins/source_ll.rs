use anyhow::Result;

use crate::advertisement::RaOption;
use crate::facts::InterfaceFacts;

use super::Plugin;

/// Appends the interface's source link-layer address. Per spec §9 this
/// is required for hosts to learn the router's L2 address and must not
/// be made optional — it is wired in unconditionally by
/// [`crate::sender::send`], not driven by `InterfaceConfig::plugins`.
pub struct SourceLinkLayerPlugin {
    mac: [u8; 6],
}

impl SourceLinkLayerPlugin {
    pub fn new() -> Self {
        Self { mac: [0; 6] }
    }
}

impl Default for SourceLinkLayerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SourceLinkLayerPlugin {
    fn name(&self) -> &'static str {
        "source_link_layer_address"
    }

    fn prepare(&mut self, facts: &InterfaceFacts) -> Result<()> {
        self.mac = facts.mac;
        Ok(())
    }

    fn describe(&self) -> String {
        let mac = self
            .mac
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":");
        format!("source link-layer address {mac}")
    }

    fn build(&self) -> Vec<RaOption> {
        vec![RaOption::SourceLinkLayerAddress(self.mac)]
    }
}
