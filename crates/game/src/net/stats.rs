use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkConditions {
    pub enabled: bool,
    pub loss_percent: f32,
    pub min_latency_ms: u32,
    pub max_latency_ms: u32,
    pub jitter_ms: u32,
}

impl LinkConditions {
    pub fn perfect() -> Self {
        Self::default()
    }

    pub fn with_latency(latency_ms: u32) -> Self {
        Self {
            enabled: true,
            min_latency_ms: latency_ms,
            max_latency_ms: latency_ms,
            ..Default::default()
        }
    }

    pub fn should_drop(&self, rng: &mut impl Rng) -> bool {
        if !self.enabled || self.loss_percent <= 0.0 {
            return false;
        }
        rng.gen_range(0.0..100.0) < self.loss_percent
    }

    pub fn delay(&self, rng: &mut impl Rng) -> Duration {
        if !self.enabled || (self.max_latency_ms == 0 && self.jitter_ms == 0) {
            return Duration::ZERO;
        }
        let base = self.min_latency_ms;
        let range = self.max_latency_ms.saturating_sub(self.min_latency_ms);
        let spread = if range > 0 { rng.gen_range(0..=range) } else { 0 };
        let jitter = if self.jitter_ms > 0 {
            rng.gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(u64::from(base + spread + jitter))
    }
}

#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_dropped: u64,
    pub send_failures: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl NetworkStats {
    pub fn record_sent(&mut self, bytes: usize) {
        self.packets_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    pub fn record_received(&mut self, bytes: usize) {
        self.packets_received += 1;
        self.bytes_received += bytes as u64;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_disabled_link_is_perfect() {
        let mut rng = StdRng::seed_from_u64(7);
        let link = LinkConditions {
            enabled: false,
            loss_percent: 100.0,
            min_latency_ms: 50,
            max_latency_ms: 80,
            jitter_ms: 10,
        };

        assert!(!link.should_drop(&mut rng));
        assert_eq!(link.delay(&mut rng), Duration::ZERO);
    }

    #[test]
    fn test_delay_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let link = LinkConditions {
            enabled: true,
            loss_percent: 0.0,
            min_latency_ms: 40,
            max_latency_ms: 60,
            jitter_ms: 5,
        };

        for _ in 0..200 {
            let delay = link.delay(&mut rng).as_millis();
            assert!((40..=65).contains(&delay));
        }
        assert_eq!(
            LinkConditions::with_latency(30).delay(&mut rng),
            Duration::from_millis(30)
        );
    }

    #[test]
    fn test_jitter_without_base_latency() {
        let mut rng = StdRng::seed_from_u64(9);
        let link = LinkConditions {
            enabled: true,
            jitter_ms: 20,
            ..Default::default()
        };

        let delays: Vec<u128> = (0..200).map(|_| link.delay(&mut rng).as_millis()).collect();
        assert!(delays.iter().all(|d| *d <= 20));
        assert!(delays.iter().any(|d| *d > 0));
    }

    #[test]
    fn test_full_loss_drops_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let link = LinkConditions {
            enabled: true,
            loss_percent: 100.0,
            ..Default::default()
        };
        assert!((0..50).all(|_| link.should_drop(&mut rng)));
    }
}
