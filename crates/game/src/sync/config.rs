use serde::{Deserialize, Serialize};

use crate::net::{DEFAULT_BROADCAST_RATE, DEFAULT_CLOCK_WINDOW, DEFAULT_TICK_RATE};
use crate::player::{FieldConfig, PaddleConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkOptions {
    pub enable_prediction: bool,
    pub enable_smoothing: bool,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            enable_prediction: true,
            enable_smoothing: true,
        }
    }
}

// Match formation always elects the greatest session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HostReelection {
    #[default]
    Smallest,
    Greatest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub tick_rate: u32,

    pub broadcast_rate: u32,

    pub baseline_latency_secs: f32,

    pub clock_window: usize,

    pub options: NetworkOptions,
    pub paddle: PaddleConfig,
    pub field: FieldConfig,
    pub reelection: HostReelection,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            broadcast_rate: DEFAULT_BROADCAST_RATE,
            baseline_latency_secs: 1.0 / 20.0,
            clock_window: DEFAULT_CLOCK_WINDOW,
            options: NetworkOptions::default(),
            paddle: PaddleConfig::default(),
            field: FieldConfig::default(),
            reelection: HostReelection::default(),
        }
    }
}

impl SyncConfig {
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    pub fn broadcast_interval(&self) -> f32 {
        1.0 / self.broadcast_rate.max(1) as f32
    }

    pub fn smoothing_decay(&self) -> f32 {
        self.tick_duration() * self.broadcast_rate as f32
    }
}
