//! Socket and dialer contracts (spec §6.1): external collaborators.
//!
//! Acquiring a raw ICMPv6 socket bound to the link-local address of the
//! interface, setting the outgoing/incoming hop limit to 255, and
//! joining the all-routers multicast group are the dialer's job and
//! out of scope for this core (spec §1) — reconnect-on-link-loss lives
//! there too. This module only states the contract the core depends
//! on, plus a Linux production implementation so the crate is usable
//! standalone, grounded in `hr_ipv6::ra::run_ra_sender`'s socket2 setup
//! and `rsadv_server`'s `AsyncFd`-driven non-blocking read loop.

use std::io::IoSliceMut;
use std::net::Ipv6Addr;
use std::os::fd::{AsFd, AsRawFd};

use async_trait::async_trait;
use nix::cmsg_space;
use nix::sys::socket::sockopt::Ipv6RecvHopLimit;
use nix::sys::socket::{recvmsg, setsockopt, ControlMessageOwned, MsgFlags, SockaddrIn6};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::unix::AsyncFd;

use crate::facts::InterfaceFacts;

/// The all-nodes link-local multicast address, RFC 4291 §2.7.1.
pub const ALL_NODES: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1);
/// The all-routers link-local multicast address.
pub const ALL_ROUTERS: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 2);

/// A ready-to-use ICMPv6 socket, already bound and joined to the
/// all-routers group by the dialer.
#[async_trait]
pub trait IcmpSocket: Send + Sync {
    /// Read one datagram. Returns the payload, the IPv6 hop limit it
    /// arrived with, and the source address.
    async fn recv_from(&self) -> std::io::Result<(Vec<u8>, u8, Ipv6Addr)>;

    /// Write `data` to `dst`.
    async fn send_to(&self, data: &[u8], dst: Ipv6Addr) -> std::io::Result<()>;
}

/// Everything the dialer hands the core once it has a usable socket.
pub struct DialContext {
    pub socket: std::sync::Arc<dyn IcmpSocket>,
    pub facts: InterfaceFacts,
}

/// Acquires a socket and interface facts for one interface. Reconnect
/// on recoverable interface loss is the dialer's job; this core only
/// ever sees successful [`DialContext`]s (spec §6.1).
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self) -> anyhow::Result<DialContext>;
}

/// Linux production socket: a raw ICMPv6 socket bound to `facts.link_local`,
/// with hop limit 255 on outgoing packets and hop-limit reporting on
/// incoming ones.
pub struct LinuxIcmpSocket {
    inner: AsyncFd<Socket>,
    scope_id: u32,
}

impl LinuxIcmpSocket {
    pub fn bind(interface: &str, link_local: Ipv6Addr, scope_id: u32) -> anyhow::Result<Self> {
        let socket = Socket::new(Domain::IPV6, Type::RAW, Some(Protocol::ICMPV6))?;
        socket.set_nonblocking(true)?;
        socket.set_multicast_hops_v6(255)?;
        socket.set_unicast_hops_v6(255)?;
        setsockopt(&socket, Ipv6RecvHopLimit, &true)?;

        #[cfg(target_os = "linux")]
        if !interface.is_empty() {
            socket.bind_device(Some(interface.as_bytes()))?;
        }

        let addr = std::net::SocketAddrV6::new(link_local, 0, 0, scope_id);
        socket.bind(&addr.into())?;

        // Join the all-routers multicast group so the OS delivers RS
        // traffic addressed to it. (Dialer responsibility in spirit;
        // kept here because it is inseparable from socket creation on
        // this platform.)
        let _ = socket.join_multicast_v6(&ALL_ROUTERS, scope_id);

        Ok(Self {
            inner: AsyncFd::new(socket)?,
            scope_id,
        })
    }

    pub fn raw_fd(&self) -> i32 {
        self.inner.get_ref().as_raw_fd()
    }
}

#[async_trait]
impl IcmpSocket for LinuxIcmpSocket {
    async fn recv_from(&self) -> std::io::Result<(Vec<u8>, u8, Ipv6Addr)> {
        loop {
            let mut guard = self.inner.readable().await?;

            let result = guard.try_io(|socket| {
                let fd = socket.get_ref().as_fd();
                let mut raw = [0u8; 1500];
                let mut iov = [IoSliceMut::new(&mut raw)];
                let mut cmsg_buf = cmsg_space!(i32);

                let msg = recvmsg::<SockaddrIn6>(
                    fd.as_raw_fd(),
                    &mut iov,
                    Some(&mut cmsg_buf),
                    MsgFlags::empty(),
                )
                .map_err(std::io::Error::from)?;

                let mut hop_limit = 0u8;
                for cmsg in msg.cmsgs().map_err(std::io::Error::from)? {
                    if let ControlMessageOwned::Ipv6HopLimit(hl) = cmsg {
                        hop_limit = hl as u8;
                    }
                }

                let src = msg
                    .address
                    .map(|a| a.ip())
                    .unwrap_or(Ipv6Addr::UNSPECIFIED);
                let len = msg.bytes;
                let data = raw[..len].to_vec();

                Ok((data, hop_limit, src))
            });

            match result {
                Ok(inner) => return inner,
                Err(_would_block) => continue,
            }
        }
    }

    async fn send_to(&self, data: &[u8], dst: Ipv6Addr) -> std::io::Result<()> {
        loop {
            let mut guard = self.inner.writable().await?;
            let addr = std::net::SocketAddrV6::new(dst, 0, 0, self.scope_id);

            match guard.try_io(|socket| socket.get_ref().send_to(data, &addr.into())) {
                Ok(result) => return result.map(|_| ()),
                Err(_would_block) => continue,
            }
        }
    }
}
