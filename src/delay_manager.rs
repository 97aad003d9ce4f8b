use std::time::Duration;
use std::thread;
use rand::Rng;
use log::info;

/// Picks a delay in `[min, max]` seconds; `None` when the range is zero.
pub fn pick_delay((min, max): (u64, u64)) -> Option<Duration> {
    if max == 0 {
        return None;
    }
    let mut rng = rand::thread_rng();
    let delay_secs = rng.gen_range(min.min(max)..=max);
    Some(Duration::from_secs(delay_secs))
}

pub fn random_address_delay(range: (u64, u64)) {
    if let Some(delay) = pick_delay(range) {
        info!("Waiting for {} seconds (Address Delay)...", delay.as_secs());
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_range_disables_delay() {
        assert_eq!(pick_delay((0, 0)), None);
    }

    #[test]
    fn delay_stays_in_range() {
        for _ in 0..50 {
            let d = pick_delay((2, 5)).unwrap().as_secs();
            assert!((2..=5).contains(&d));
        }
    }
}
