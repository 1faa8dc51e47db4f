use std::net::Ipv6Addr;

/// Facts about the interface the core advertises on, resolved once by
/// the dialer before `Advertise` starts any background activity.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceFacts {
    pub mac: [u8; 6],
    pub link_local: Ipv6Addr,
    pub mtu: u32,
    pub index: u32,
}
