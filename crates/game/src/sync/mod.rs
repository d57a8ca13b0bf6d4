mod broadcaster;
mod config;
mod prediction;
mod smoothing;

pub use broadcaster::LocalStateBroadcaster;
pub use config::{HostReelection, NetworkOptions, SyncConfig};
pub use prediction::{MAX_CATCH_UP_TICKS, Predictor, catch_up_ticks};
pub use smoothing::RemotePaddle;
