//! Host system facts the core needs but cannot discover itself (spec §6.2).
//!
//! Whether the kernel is forwarding IPv6 on an interface changes what a
//! router advertisement is allowed to claim (a host that isn't forwarding
//! must not advertise itself as a default router with a non-zero
//! lifetime). Reading `/proc` is a Linux-specific concern kept behind a
//! trait so the core can be tested without a real proc filesystem,
//! mirroring `hr_common`'s pattern of trait-gating anything that touches
//! the host.

use std::path::PathBuf;

use async_trait::async_trait;

/// Host facts that can change while the daemon is running.
#[async_trait]
pub trait SystemState: Send + Sync {
    /// Whether the kernel is forwarding IPv6 packets on `interface`.
    async fn ipv6_forwarding(&self, interface: &str) -> anyhow::Result<bool>;
}

/// Reads `<proc_root>/sys/net/ipv6/conf/<interface>/forwarding`.
/// `proc_root` defaults to `/proc` and is only overridden in tests.
pub struct LinuxSystemState {
    proc_root: PathBuf,
}

impl LinuxSystemState {
    pub fn new() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
        }
    }

    fn with_proc_root(proc_root: PathBuf) -> Self {
        Self { proc_root }
    }
}

impl Default for LinuxSystemState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemState for LinuxSystemState {
    async fn ipv6_forwarding(&self, interface: &str) -> anyhow::Result<bool> {
        let path = self
            .proc_root
            .join("sys/net/ipv6/conf")
            .join(interface)
            .join("forwarding");
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        Ok(contents.trim() == "1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedForwarding(bool);

    #[async_trait]
    impl SystemState for FixedForwarding {
        async fn ipv6_forwarding(&self, _interface: &str) -> anyhow::Result<bool> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn fake_reports_configured_value() {
        let state = FixedForwarding(true);
        assert!(state.ipv6_forwarding("eth0").await.unwrap());
    }

    #[tokio::test]
    async fn reads_forwarding_flag_from_proc_like_tree() {
        let dir = tempfile::tempdir().unwrap();
        let iface_dir = dir.path().join("sys/net/ipv6/conf/eth0");
        tokio::fs::create_dir_all(&iface_dir).await.unwrap();
        tokio::fs::write(iface_dir.join("forwarding"), "1\n").await.unwrap();

        let state = LinuxSystemState::with_proc_root(dir.path().to_path_buf());
        assert!(state.ipv6_forwarding("eth0").await.unwrap());
    }

    #[tokio::test]
    async fn disabled_forwarding_reads_as_false() {
        let dir = tempfile::tempdir().unwrap();
        let iface_dir = dir.path().join("sys/net/ipv6/conf/eth0");
        tokio::fs::create_dir_all(&iface_dir).await.unwrap();
        tokio::fs::write(iface_dir.join("forwarding"), "0\n").await.unwrap();

        let state = LinuxSystemState::with_proc_root(dir.path().to_path_buf());
        assert!(!state.ipv6_forwarding("eth0").await.unwrap());
    }
}
