//! Wire-exact constants from RFC 4861 §10 and §6.2.

use std::time::Duration;

/// Upper bound on the interval between the first few unsolicited
/// multicast router advertisements after startup.
pub const MAX_INITIAL_ADV_INTERVAL: Duration = Duration::from_secs(16);

/// Number of unsolicited multicast advertisements subject to
/// `MAX_INITIAL_ADV_INTERVAL` after startup.
pub const MAX_INITIAL_ADV: usize = 3;

/// Minimum spacing enforced between any two multicast router
/// advertisements leaving the socket.
pub const MIN_DELAY_BETWEEN_RAS: Duration = Duration::from_secs(3);

/// Upper bound on the random delay applied before a solicited
/// (unicast) router advertisement is sent.
pub const MAX_RA_DELAY: Duration = Duration::from_millis(500);

/// The only hop limit Neighbor Discovery messages are sent and
/// accepted with; the sole on-link authenticity check ND provides.
pub const ND_HOP_LIMIT: u8 = 255;

/// Depth of the bounded destination queue shared by all producers.
pub const QUEUE_CAPACITY: usize = 16;
