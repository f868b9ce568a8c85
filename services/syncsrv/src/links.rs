//! Simulated database-link heartbeat
//!
//! One sample per link. Every tick latency and success rate take a small
//! random step; the Kenya link occasionally drops (latency 0).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::Rng;
use serde::Serialize;
use syncmon_model::NodeId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Minimum latency of a live link, in ms
pub const MIN_LATENCY_MS: f64 = 10.0;
pub const MIN_SUCCESS_RATE: f64 = 90.0;
pub const MAX_SUCCESS_RATE: f64 = 100.0;
/// Chance per tick that a flaky link drops
pub const DROP_PROBABILITY: f64 = 0.02;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkSample {
    pub node: NodeId,
    pub link_name: String,
    /// 0 means the link is down
    pub latency_ms: f64,
    pub success_rate: f64,
    pub last_seen: DateTime<Utc>,
    #[serde(skip)]
    flaky: bool,
}

impl LinkSample {
    fn new(node: &str, link_name: &str, latency_ms: f64, success_rate: f64, flaky: bool) -> Self {
        Self {
            node: NodeId::new(node),
            link_name: link_name.to_string(),
            latency_ms,
            success_rate,
            last_seen: Utc::now(),
            flaky,
        }
    }

    pub fn is_down(&self) -> bool {
        self.latency_ms == 0.0
    }

    /// Next sample after one random-walk step
    fn step<R: Rng>(&self, rng: &mut R, now: DateTime<Utc>) -> Self {
        let dropped = self.flaky && rng.gen_bool(DROP_PROBABILITY);
        // a dropped link comes back from the floor
        let base = if self.is_down() { MIN_LATENCY_MS } else { self.latency_ms };
        let latency_ms = if dropped {
            0.0
        } else {
            (base + rng.gen_range(-10.0..10.0)).max(MIN_LATENCY_MS)
        };
        let success_rate = (self.success_rate + rng.gen_range(-0.2..0.2))
            .clamp(MIN_SUCCESS_RATE, MAX_SUCCESS_RATE);

        Self {
            latency_ms,
            success_rate,
            last_seen: now,
            ..self.clone()
        }
    }
}

/// Current sample of every link
pub struct LinkMonitor {
    samples: RwLock<Vec<LinkSample>>,
}

impl LinkMonitor {
    pub fn new(samples: Vec<LinkSample>) -> Self {
        Self {
            samples: RwLock::new(samples),
        }
    }

    /// The four site links with their nominal starting values
    pub fn standard() -> Self {
        Self::new(vec![
            LinkSample::new("DM", "LOCAL_DM", 12.0, 100.0, false),
            LinkSample::new("DS", "DL_DUBAI_STAT", 45.0, 99.8, false),
            LinkSample::new("TS", "DL_TANZANIA_PORT", 185.0, 98.2, false),
            LinkSample::new("KS", "DL_KENYA_PORT", 215.0, 97.5, true),
        ])
    }

    pub fn samples(&self) -> Vec<LinkSample> {
        self.samples.read().clone()
    }

    pub fn tick<R: Rng>(&self, rng: &mut R) {
        let now = Utc::now();
        let mut samples = self.samples.write();
        for sample in samples.iter_mut() {
            let next = sample.step(rng, now);
            if next.is_down() && !sample.is_down() {
                warn!("Link {} ({}) dropped", next.link_name, next.node);
            } else if sample.is_down() && !next.is_down() {
                info!("Link {} ({}) restored", next.link_name, next.node);
            }
            *sample = next;
        }
    }
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::standard()
    }
}

/// Tick the monitor every `interval` until `token` is cancelled
pub fn spawn_link_heartbeat(
    monitor: Arc<LinkMonitor>,
    interval: std::time::Duration,
    token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Link heartbeat stopped");
                    break;
                },
                _ = ticker.tick() => {
                    let mut rng = rand::thread_rng();
                    monitor.tick(&mut rng);
                },
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_standard_links() {
        let samples = LinkMonitor::standard().samples();
        let names: Vec<_> = samples.iter().map(|s| s.link_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["LOCAL_DM", "DL_DUBAI_STAT", "DL_TANZANIA_PORT", "DL_KENYA_PORT"]
        );
        assert_eq!(samples[3].latency_ms, 215.0);
        assert!(samples.iter().all(|s| !s.is_down()));
    }

    #[test]
    fn test_random_walk_stays_in_bounds() {
        let monitor = LinkMonitor::standard();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            monitor.tick(&mut rng);
            for sample in monitor.samples() {
                assert!(sample.is_down() || sample.latency_ms >= MIN_LATENCY_MS);
                assert!((MIN_SUCCESS_RATE..=MAX_SUCCESS_RATE).contains(&sample.success_rate));
            }
        }
    }

    #[test]
    fn test_only_kenya_drops() {
        let monitor = LinkMonitor::standard();
        let mut rng = StdRng::seed_from_u64(11);
        let mut kenya_drops = 0;
        for _ in 0..2000 {
            monitor.tick(&mut rng);
            let samples = monitor.samples();
            assert!(samples[..3].iter().all(|s| !s.is_down()));
            if samples[3].is_down() {
                kenya_drops += 1;
            }
        }
        // roughly 2% of 2000 ticks
        assert!(kenya_drops > 0);
        assert!(kenya_drops < 200);
    }

    #[test]
    fn test_serialized_sample_hides_internal_flag() {
        let json = serde_json::to_value(&LinkMonitor::standard().samples()[0]).unwrap();
        assert_eq!(json["link_name"], "LOCAL_DM");
        assert!(json.get("flaky").is_none());
    }

    #[tokio::test]
    async fn test_heartbeat_task_stops_on_cancel() {
        let token = CancellationToken::new();
        let handle = spawn_link_heartbeat(
            Arc::new(LinkMonitor::standard()),
            std::time::Duration::from_millis(10),
            token.clone(),
        );
        token.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
