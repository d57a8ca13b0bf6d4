use std::time::Duration;

use rally::{HostReelection, LinkConditions, SyncConfig};

use crate::Args;

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub duration: Duration,
    pub frame_rate: u32,
    pub report_interval: Duration,
    pub seed: Option<u64>,
    pub conditions: LinkConditions,
    pub sync: SyncConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
            frame_rate: 144,
            report_interval: Duration::from_secs(1),
            seed: None,
            conditions: LinkConditions::with_latency(50),
            sync: SyncConfig::default(),
        }
    }
}

impl DriverConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        anyhow::ensure!(args.seconds > 0.0, "--seconds must be positive");
        anyhow::ensure!(args.frame_rate > 0, "--frame-rate must be positive");
        anyhow::ensure!(args.tick_rate > 0, "--tick-rate must be positive");
        anyhow::ensure!(args.broadcast_rate > 0, "--broadcast-rate must be positive");
        anyhow::ensure!(
            (0.0..=100.0).contains(&args.loss_percent),
            "--loss-percent must be within 0-100"
        );

        let defaults = Self::default();
        let mut sync = SyncConfig {
            tick_rate: args.tick_rate,
            broadcast_rate: args.broadcast_rate,
            baseline_latency_secs: args.baseline_latency_ms as f32 / 1000.0,
            ..defaults.sync
        };
        sync.options.enable_prediction = !args.no_prediction;
        sync.options.enable_smoothing = !args.no_smoothing;
        if args.greatest_reelection {
            sync.reelection = HostReelection::Greatest;
        }

        let conditions = LinkConditions {
            enabled: args.latency > 0 || args.jitter > 0 || args.loss_percent > 0.0,
            loss_percent: args.loss_percent,
            min_latency_ms: args.latency,
            max_latency_ms: args.latency,
            jitter_ms: args.jitter,
        };

        Ok(Self {
            duration: Duration::from_secs_f32(args.seconds),
            frame_rate: args.frame_rate,
            seed: args.seed,
            conditions,
            sync,
            ..defaults
        })
    }
}
