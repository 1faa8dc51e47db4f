//! ICMPv6 Neighbor Discovery wire encode/decode.
//!
//! Message type codes and NDP option type codes are sourced from
//! `pnet_packet::icmpv6`, the ND/ICMPv6 wire library this core treats
//! as an available dependency (spec §1). Byte layout is built and
//! parsed by hand in the style already established by
//! `hr_ipv6::ra::build_ra_packet` and `hr_dhcp::packet`, now driven by
//! those type constants instead of bare magic numbers. RDNSS (25) and
//! DNSSL (31) predate `pnet_packet`'s NDP option set (RFC 8106) and are
//! packed/parsed as raw TLVs the same way the teacher's `ra.rs` already
//! did.

use std::net::Ipv6Addr;
use std::time::Duration;

use anyhow::{bail, ensure, Result};
use pnet_packet::icmpv6::ndp::NdpOptionTypes;
use pnet_packet::icmpv6::Icmpv6Types;

use crate::advertisement::{RaOption, RouterAdvertisement};

const OPT_RDNSS: u8 = 25;
const OPT_DNSSL: u8 = 31;

/// A decoded inbound Neighbor Discovery message.
#[derive(Debug, Clone)]
pub enum NdMessage {
    RouterSolicitation,
    RouterAdvertisement(RouterAdvertisement),
    Other(u8),
}

/// Encode `ra` to its ICMPv6 wire representation. Checksum is left zero:
/// Linux raw ICMPv6 sockets compute it in-kernel for the payload,
/// matching the comment already present in `hr_ipv6::ra::build_ra_packet`.
pub fn encode_ra(ra: &RouterAdvertisement) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);

    buf.push(Icmpv6Types::RouterAdvert.0);
    buf.push(0); // code
    buf.extend_from_slice(&[0, 0]); // checksum, kernel-computed

    buf.push(ra.current_hop_limit);

    let mut flags: u8 = 0;
    if ra.managed_config {
        flags |= 0x80;
    }
    if ra.other_config {
        flags |= 0x40;
    }
    if ra.mobile_ipv6_home_agent {
        flags |= 0x20;
    }
    flags |= match ra.preference {
        crate::config::RouterPreference::Medium => 0x00,
        crate::config::RouterPreference::Low => 0x18, // 11, RFC 4191
        crate::config::RouterPreference::High => 0x08, // 01
    };
    if ra.nd_proxy {
        flags |= 0x04;
    }
    buf.push(flags);

    buf.extend_from_slice(&(ra.router_lifetime.as_secs() as u16).to_be_bytes());
    buf.extend_from_slice(&(ra.reachable_time.as_millis() as u32).to_be_bytes());
    buf.extend_from_slice(&(ra.retransmit_timer.as_millis() as u32).to_be_bytes());

    for opt in &ra.options {
        encode_option(&mut buf, opt);
    }

    buf
}

fn pad8(len: usize) -> u8 {
    debug_assert_eq!(len % 8, 0);
    (len / 8) as u8
}

fn encode_option(buf: &mut Vec<u8>, opt: &RaOption) {
    match opt {
        RaOption::PrefixInformation {
            prefix,
            prefix_length,
            on_link,
            autonomous,
            valid_lifetime,
            preferred_lifetime,
        } => {
            buf.push(NdpOptionTypes::PrefixInformation.0);
            buf.push(4); // 32 bytes
            buf.push(*prefix_length);
            let mut flags = 0u8;
            if *on_link {
                flags |= 0x80;
            }
            if *autonomous {
                flags |= 0x40;
            }
            buf.push(flags);
            buf.extend_from_slice(&(valid_lifetime.as_secs() as u32).to_be_bytes());
            buf.extend_from_slice(&(preferred_lifetime.as_secs() as u32).to_be_bytes());
            buf.extend_from_slice(&0u32.to_be_bytes()); // reserved2
            buf.extend_from_slice(&prefix.octets());
        }
        RaOption::Mtu(mtu) => {
            buf.push(NdpOptionTypes::MTU.0);
            buf.push(1); // 8 bytes
            buf.extend_from_slice(&[0, 0]); // reserved
            buf.extend_from_slice(&mtu.to_be_bytes());
        }
        RaOption::SourceLinkLayerAddress(mac) => {
            buf.push(NdpOptionTypes::SourceLLAddr.0);
            buf.push(1); // 8 bytes
            buf.extend_from_slice(mac);
        }
        RaOption::Rdnss { lifetime, servers } => {
            let len_units = 1 + 2 * servers.len();
            buf.push(OPT_RDNSS);
            buf.push(pad8(len_units * 8));
            buf.extend_from_slice(&[0, 0]); // reserved
            buf.extend_from_slice(&(lifetime.as_secs() as u32).to_be_bytes());
            for server in servers {
                buf.extend_from_slice(&server.octets());
            }
        }
        RaOption::Dnssl { lifetime, suffixes } => {
            let encoded = encode_search_list(suffixes);
            let total = 8 + encoded.len();
            let padded = total.div_ceil(8) * 8;
            buf.push(OPT_DNSSL);
            buf.push(pad8(padded));
            buf.extend_from_slice(&[0, 0]); // reserved
            buf.extend_from_slice(&(lifetime.as_secs() as u32).to_be_bytes());
            buf.extend_from_slice(&encoded);
            buf.resize(buf.len() + (padded - total), 0);
        }
    }
}

/// DNS search-list encoding (RFC 1035 §3.1 labels, zero-terminated,
/// one after another with no trailing separator between suffixes).
fn encode_search_list(suffixes: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    for suffix in suffixes {
        for label in suffix.split('.') {
            if label.is_empty() {
                continue;
            }
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
        out.push(0);
    }
    out
}

/// Decode an inbound ICMPv6 payload (the bytes after the IPv6 header;
/// the hop-limit check against the ND authenticity sentinel happens in
/// the caller using out-of-band control information, spec §4.3 step 2).
pub fn decode(data: &[u8]) -> Result<NdMessage> {
    ensure!(data.len() >= 4, "icmpv6 message too short");
    let icmp_type = data[0];

    if icmp_type == Icmpv6Types::RouterSolicit.0 {
        return Ok(NdMessage::RouterSolicitation);
    }

    if icmp_type == Icmpv6Types::RouterAdvert.0 {
        return Ok(NdMessage::RouterAdvertisement(decode_ra(data)?));
    }

    Ok(NdMessage::Other(icmp_type))
}

fn decode_ra(data: &[u8]) -> Result<RouterAdvertisement> {
    ensure!(data.len() >= 16, "router advertisement too short");

    let current_hop_limit = data[4];
    let flags = data[5];
    let router_lifetime = Duration::from_secs(u16::from_be_bytes([data[6], data[7]]) as u64);
    let reachable_time =
        Duration::from_millis(u32::from_be_bytes([data[8], data[9], data[10], data[11]]) as u64);
    let retransmit_timer =
        Duration::from_millis(u32::from_be_bytes([data[12], data[13], data[14], data[15]]) as u64);

    let preference = match (flags & 0x18) >> 3 {
        0b01 => crate::config::RouterPreference::High,
        0b00 => crate::config::RouterPreference::Medium,
        _ => crate::config::RouterPreference::Low,
    };

    let options = decode_options(&data[16..])?;

    Ok(RouterAdvertisement {
        current_hop_limit,
        managed_config: flags & 0x80 != 0,
        other_config: flags & 0x40 != 0,
        mobile_ipv6_home_agent: flags & 0x20 != 0,
        preference,
        nd_proxy: flags & 0x04 != 0,
        router_lifetime,
        reachable_time,
        retransmit_timer,
        options,
    })
}

fn decode_options(mut data: &[u8]) -> Result<Vec<RaOption>> {
    let mut out = Vec::new();

    while data.len() >= 2 {
        let opt_type = data[0];
        let len_units = data[1] as usize;
        if len_units == 0 {
            bail!("ndp option with zero length");
        }
        let total = len_units * 8;
        ensure!(data.len() >= total, "truncated ndp option");
        let body = &data[2..total];

        if opt_type == NdpOptionTypes::PrefixInformation.0 {
            ensure!(body.len() >= 30, "truncated prefix information option");
            let prefix_length = body[0];
            let flags = body[1];
            let valid_lifetime =
                Duration::from_secs(u32::from_be_bytes([body[2], body[3], body[4], body[5]]) as u64);
            let preferred_lifetime =
                Duration::from_secs(u32::from_be_bytes([body[6], body[7], body[8], body[9]]) as u64);
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&body[14..30]);
            out.push(RaOption::PrefixInformation {
                prefix: Ipv6Addr::from(octets),
                prefix_length,
                on_link: flags & 0x80 != 0,
                autonomous: flags & 0x40 != 0,
                valid_lifetime,
                preferred_lifetime,
            });
        } else if opt_type == NdpOptionTypes::MTU.0 {
            ensure!(body.len() >= 6, "truncated mtu option");
            out.push(RaOption::Mtu(u32::from_be_bytes([
                body[2], body[3], body[4], body[5],
            ])));
        } else if opt_type == NdpOptionTypes::SourceLLAddr.0 {
            ensure!(body.len() >= 6, "truncated source link-layer option");
            let mut mac = [0u8; 6];
            mac.copy_from_slice(&body[0..6]);
            out.push(RaOption::SourceLinkLayerAddress(mac));
        } else if opt_type == OPT_RDNSS {
            ensure!(body.len() >= 6, "truncated rdnss option");
            let lifetime =
                Duration::from_secs(u32::from_be_bytes([body[2], body[3], body[4], body[5]]) as u64);
            let mut servers = Vec::new();
            let mut rest = &body[6..];
            while rest.len() >= 16 {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(&rest[..16]);
                servers.push(Ipv6Addr::from(octets));
                rest = &rest[16..];
            }
            out.push(RaOption::Rdnss { lifetime, servers });
        } else if opt_type == OPT_DNSSL {
            ensure!(body.len() >= 6, "truncated dnssl option");
            let lifetime =
                Duration::from_secs(u32::from_be_bytes([body[2], body[3], body[4], body[5]]) as u64);
            let suffixes = decode_search_list(&body[6..]);
            out.push(RaOption::Dnssl { lifetime, suffixes });
        }
        // Unknown option types are silently skipped, per RFC 4861 §4.6.

        data = &data[total..];
    }

    Ok(out)
}

fn decode_search_list(mut data: &[u8]) -> Vec<String> {
    let mut suffixes = Vec::new();
    let mut current = String::new();

    while !data.is_empty() {
        let label_len = data[0] as usize;
        data = &data[1..];
        if label_len == 0 {
            if !current.is_empty() {
                suffixes.push(std::mem::take(&mut current));
            }
            continue;
        }
        if data.len() < label_len {
            break;
        }
        if !current.is_empty() {
            current.push('.');
        }
        current.push_str(&String::from_utf8_lossy(&data[..label_len]));
        data = &data[label_len..];
    }

    suffixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterPreference;

    fn sample_ra() -> RouterAdvertisement {
        RouterAdvertisement {
            current_hop_limit: 64,
            managed_config: true,
            other_config: false,
            mobile_ipv6_home_agent: false,
            preference: RouterPreference::High,
            nd_proxy: false,
            router_lifetime: Duration::from_secs(1800),
            reachable_time: Duration::from_millis(0),
            retransmit_timer: Duration::from_millis(0),
            options: vec![
                RaOption::PrefixInformation {
                    prefix: "2001:db8::".parse().unwrap(),
                    prefix_length: 64,
                    on_link: true,
                    autonomous: true,
                    valid_lifetime: Duration::from_secs(86400),
                    preferred_lifetime: Duration::from_secs(14400),
                },
                RaOption::Mtu(1500),
                RaOption::Rdnss {
                    lifetime: Duration::from_secs(3600),
                    servers: vec!["2001:db8::53".parse().unwrap()],
                },
                RaOption::Dnssl {
                    lifetime: Duration::from_secs(3600),
                    suffixes: vec!["example.com".to_string()],
                },
                RaOption::SourceLinkLayerAddress([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            ],
        }
    }

    #[test]
    fn round_trips_through_wire_format() {
        let ra = sample_ra();
        let bytes = encode_ra(&ra);
        let decoded = match decode(&bytes).unwrap() {
            NdMessage::RouterAdvertisement(ra) => ra,
            other => panic!("unexpected decode result: {other:?}"),
        };

        assert_eq!(decoded.current_hop_limit, ra.current_hop_limit);
        assert_eq!(decoded.managed_config, ra.managed_config);
        assert_eq!(decoded.preference, ra.preference);
        assert_eq!(decoded.router_lifetime, ra.router_lifetime);
        assert_eq!(decoded.mtu(), Some(1500));
        assert_eq!(decoded.source_link_layer_address(), ra.source_link_layer_address());
        assert_eq!(decoded.prefixes().count(), 1);
    }

    #[test]
    fn decodes_router_solicitation_type() {
        let bytes = vec![Icmpv6Types::RouterSolicit.0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(decode(&bytes).unwrap(), NdMessage::RouterSolicitation));
    }

    #[test]
    fn unknown_type_is_other() {
        let bytes = vec![200, 0, 0, 0];
        assert!(matches!(decode(&bytes).unwrap(), NdMessage::Other(200)));
    }
}
