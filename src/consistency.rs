//! Cross-checking a peer's router advertisement against this router's own
//! (spec §4.7), grounded in `advertise.go`'s `handle` function (the
//! `verifyRAs` call and the fields it compares).
//!
//! Two routers on the same link are expected to agree on the facts that
//! describe the link itself — whether it's managed, the hop limit hosts
//! should use, the reachable/retransmit timers — even though each may
//! advertise different prefixes or a different router lifetime.

use std::collections::HashMap;

use crate::advertisement::{RaOption, RouterAdvertisement};

/// Returns the field names where `peer` disagrees with `local`. Empty
/// means consistent. Per-prefix disagreements are reported as
/// `"prefix:<prefix>/<length>:<field>"`, keyed the same way
/// `RaOption::prefix_key` keys a Prefix Information option.
pub fn inconsistencies(local: &RouterAdvertisement, peer: &RouterAdvertisement) -> Vec<String> {
    let mut fields = Vec::new();

    if local.current_hop_limit != 0
        && peer.current_hop_limit != 0
        && local.current_hop_limit != peer.current_hop_limit
    {
        fields.push("current_hop_limit".to_string());
    }
    if local.managed_config != peer.managed_config {
        fields.push("managed_config".to_string());
    }
    if local.other_config != peer.other_config {
        fields.push("other_config".to_string());
    }
    if local.reachable_time.as_millis() != 0
        && peer.reachable_time.as_millis() != 0
        && local.reachable_time != peer.reachable_time
    {
        fields.push("reachable_time".to_string());
    }
    if local.retransmit_timer.as_millis() != 0
        && peer.retransmit_timer.as_millis() != 0
        && local.retransmit_timer != peer.retransmit_timer
    {
        fields.push("retransmit_timer".to_string());
    }
    if let (Some(local_mtu), Some(peer_mtu)) = (local.mtu(), peer.mtu()) {
        if local_mtu != peer_mtu {
            fields.push("mtu".to_string());
        }
    }

    let peer_prefixes: HashMap<String, _> = peer
        .prefixes()
        .map(|(prefix, len, on_link, autonomous, valid, preferred)| {
            (RaOption::prefix_key(*prefix, len), (on_link, autonomous, valid, preferred))
        })
        .collect();

    for (prefix, len, on_link, autonomous, valid_lifetime, preferred_lifetime) in local.prefixes() {
        let key = RaOption::prefix_key(*prefix, len);
        let Some(&(peer_on_link, peer_autonomous, peer_valid, peer_preferred)) = peer_prefixes.get(&key) else {
            continue;
        };

        if on_link != peer_on_link {
            fields.push(format!("prefix:{key}:on_link"));
        }
        if autonomous != peer_autonomous {
            fields.push(format!("prefix:{key}:autonomous"));
        }
        if valid_lifetime != peer_valid {
            fields.push(format!("prefix:{key}:valid_lifetime"));
        }
        if preferred_lifetime != peer_preferred {
            fields.push(format!("prefix:{key}:preferred_lifetime"));
        }
    }

    fields
}

/// `true` if `local` and `peer` agree on every field both take a
/// position on.
pub fn is_consistent(local: &RouterAdvertisement, peer: &RouterAdvertisement) -> bool {
    inconsistencies(local, peer).is_empty()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::RouterPreference;

    fn ra() -> RouterAdvertisement {
        RouterAdvertisement {
            current_hop_limit: 64,
            managed_config: false,
            other_config: false,
            mobile_ipv6_home_agent: false,
            preference: RouterPreference::Medium,
            nd_proxy: false,
            router_lifetime: Duration::from_secs(1800),
            reachable_time: Duration::from_millis(0),
            retransmit_timer: Duration::from_millis(0),
            options: Vec::new(),
        }
    }

    #[test]
    fn identical_ras_are_consistent_with_themselves() {
        let a = ra();
        assert!(is_consistent(&a, &a));
    }

    #[test]
    fn consistency_is_symmetric() {
        let mut a = ra();
        let mut b = ra();
        a.managed_config = true;
        b.current_hop_limit = 32;

        assert_eq!(is_consistent(&a, &b), is_consistent(&b, &a));
    }

    #[test]
    fn disagreeing_managed_flag_is_flagged() {
        let a = ra();
        let mut b = ra();
        b.managed_config = true;

        assert_eq!(inconsistencies(&a, &b), vec!["managed_config".to_string()]);
    }

    #[test]
    fn disagreeing_mtu_is_flagged() {
        let mut a = ra();
        let mut b = ra();
        a.options.push(RaOption::Mtu(1500));
        b.options.push(RaOption::Mtu(1280));

        assert_eq!(inconsistencies(&a, &b), vec!["mtu".to_string()]);
    }

    #[test]
    fn mtu_absent_on_one_side_is_not_flagged() {
        let mut a = ra();
        a.options.push(RaOption::Mtu(1500));
        let b = ra();

        assert!(is_consistent(&a, &b));
    }

    fn prefix_option(
        prefix: &str,
        on_link: bool,
        autonomous: bool,
        valid_secs: u64,
        preferred_secs: u64,
    ) -> RaOption {
        RaOption::PrefixInformation {
            prefix: prefix.parse().unwrap(),
            prefix_length: 64,
            on_link,
            autonomous,
            valid_lifetime: Duration::from_secs(valid_secs),
            preferred_lifetime: Duration::from_secs(preferred_secs),
        }
    }

    #[test]
    fn disagreeing_prefix_autonomous_flag_is_flagged() {
        let mut a = ra();
        let mut b = ra();
        a.options.push(prefix_option("2001:db8::", true, true, 86400, 14400));
        b.options.push(prefix_option("2001:db8::", true, false, 86400, 14400));

        assert_eq!(
            inconsistencies(&a, &b),
            vec!["prefix:2001:db8::/64:autonomous".to_string()]
        );
    }

    #[test]
    fn disagreeing_prefix_lifetimes_are_flagged() {
        let mut a = ra();
        let mut b = ra();
        a.options.push(prefix_option("2001:db8::", true, true, 86400, 14400));
        b.options.push(prefix_option("2001:db8::", true, true, 3600, 1800));

        let found = inconsistencies(&a, &b);
        assert!(found.contains(&"prefix:2001:db8::/64:valid_lifetime".to_string()));
        assert!(found.contains(&"prefix:2001:db8::/64:preferred_lifetime".to_string()));
    }

    #[test]
    fn unmatched_prefixes_are_not_flagged() {
        let mut a = ra();
        let mut b = ra();
        a.options.push(prefix_option("2001:db8:1::", true, true, 86400, 14400));
        b.options.push(prefix_option("2001:db8:2::", true, true, 86400, 14400));

        assert!(is_consistent(&a, &b));
    }
}
