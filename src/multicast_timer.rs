//! The periodic multicast RA timer (spec §4.4, RFC 4861 §6.2.4), grounded
//! in `advertise.go`'s `multicastDelay` function: pick a uniformly random
//! interval in `[min, max]` and clamp the first few sends to
//! `MAX_INITIAL_ADV_INTERVAL` so a freshly started router doesn't make
//! hosts wait a full interval to learn about it.

use std::time::Duration;

use rand::Rng;

use crate::constants::{MAX_INITIAL_ADV, MAX_INITIAL_ADV_INTERVAL};

/// Chooses the delay before the `i`th (0-indexed) periodic multicast RA,
/// given the configured `[min, max]` interval.
pub fn choose_delay<R: Rng + ?Sized>(rng: &mut R, i: usize, min: Duration, max: Duration) -> Duration {
    let delay = if min == max {
        min
    } else {
        let lo = min.as_secs_f64();
        let hi = max.as_secs_f64();
        let secs = rng.gen_range(lo..=hi).round();
        Duration::from_secs_f64(secs)
    };

    if i < MAX_INITIAL_ADV && delay > MAX_INITIAL_ADV_INTERVAL {
        MAX_INITIAL_ADV_INTERVAL
    } else {
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equal_bounds_are_static() {
        let mut rng = rand::thread_rng();
        let d = Duration::from_secs(600);
        assert_eq!(choose_delay(&mut rng, 10, d, d), d);
    }

    #[test]
    fn early_sends_are_clamped_to_initial_interval() {
        let mut rng = rand::thread_rng();
        let d = choose_delay(&mut rng, 0, Duration::from_secs(200), Duration::from_secs(1800));
        assert!(d <= MAX_INITIAL_ADV_INTERVAL);
    }

    #[test]
    fn late_sends_respect_configured_bounds() {
        let mut rng = rand::thread_rng();
        for i in MAX_INITIAL_ADV..MAX_INITIAL_ADV + 20 {
            let d = choose_delay(&mut rng, i, Duration::from_secs(200), Duration::from_secs(600));
            assert!(d >= Duration::from_secs(200) && d <= Duration::from_secs(600));
        }
    }

    proptest! {
        #[test]
        fn delay_is_always_within_effective_bounds(
            min_secs in 4u64..1800,
            spread in 0u64..1800,
            i in 0usize..10,
        ) {
            let min = Duration::from_secs(min_secs);
            let max = min + Duration::from_secs(spread);
            let mut rng = rand::thread_rng();
            let d = choose_delay(&mut rng, i, min, max);

            // Either it's a legal pick from [min, max], or it was clamped
            // down to the initial-advertisement interval.
            let within_configured = d >= min && d <= max;
            let clamped = i < MAX_INITIAL_ADV && d == MAX_INITIAL_ADV_INTERVAL;
            prop_assert!(within_configured || clamped);
        }
    }
}
