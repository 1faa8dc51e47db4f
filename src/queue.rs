//! The pending-destination queue threaded between the receiver and the
//! scheduler (spec §4.2/§4.4), grounded in the original's
//! `ipC := make(chan netaddr.IP, 16)`. Tokio's mpsc has no truly
//! unbounded-capacity-zero variant, so `QUEUE_CAPACITY` (16, matching the
//! original) is used directly as the channel bound.

use std::net::Ipv6Addr;

use crate::constants::QUEUE_CAPACITY;

pub type DestinationSender = tokio::sync::mpsc::Sender<Ipv6Addr>;
pub type DestinationReceiver = tokio::sync::mpsc::Receiver<Ipv6Addr>;

/// Builds the bounded destination queue shared between tasks.
pub fn channel() -> (DestinationSender, DestinationReceiver) {
    tokio::sync::mpsc::channel(QUEUE_CAPACITY)
}

/// Whether a destination should be serviced by the multicast path or the
/// unicast path (spec §4.4).
pub fn is_multicast(dst: Ipv6Addr) -> bool {
    dst.is_multicast()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_multicast_and_unicast() {
        assert!(is_multicast(crate::socket::ALL_NODES));
        assert!(!is_multicast("fe80::1".parse().unwrap()));
    }
}
