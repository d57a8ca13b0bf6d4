use std::collections::HashMap;

use crate::net::{PaddlePacket, RollingAverage};
use crate::player::{PaddleState, step_in_place};
use crate::snapshot::EntityHandle;

use super::{RemotePaddle, SyncConfig};

// A latency within this fraction of a tick below a whole number of ticks
// counts as that many ticks, so 0.05s at 60Hz is 3 steps and not 2.
const CATCH_UP_EPSILON: f32 = 1e-3;

// Catch-up stops here: a packet more than a second late at 60Hz only
// advances one second.
pub const MAX_CATCH_UP_TICKS: u32 = 60;

#[derive(Debug)]
pub struct Predictor {
    clock_deltas: HashMap<EntityHandle, RollingAverage>,
    clock_window: usize,
    baseline_latency: f32,
}

impl Predictor {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            clock_deltas: HashMap::new(),
            clock_window: config.clock_window.max(1),
            baseline_latency: config.baseline_latency_secs,
        }
    }

    // Peers never share a clock. A packet whose `local - remote` delta sits
    // above the entity's average took longer than usual. May be negative.
    pub fn estimate_latency(
        &mut self,
        entity: EntityHandle,
        local_clock: f32,
        remote_timestamp: f32,
    ) -> f32 {
        let window = self.clock_window;
        let clock_delta = self
            .clock_deltas
            .entry(entity)
            .or_insert_with(|| RollingAverage::new(window));

        let time_delta = local_clock - remote_timestamp;
        clock_delta.add_value(time_delta);
        let deviation = time_delta - clock_delta.average_value();

        self.baseline_latency + deviation
    }

    // Overwrites the simulation state and fast-forwards it by the packet's
    // estimated latency. Returns the number of catch-up steps taken.
    pub fn apply_packet(
        &mut self,
        entity: EntityHandle,
        remote: &mut RemotePaddle,
        packet: &PaddlePacket,
        local_clock: f32,
        config: &SyncConfig,
    ) -> u32 {
        remote.reset_smoothing(config.options.enable_smoothing);
        remote.simulation = PaddleState::from_packet(packet);

        let latency = self.estimate_latency(entity, local_clock, packet.elapsed_seconds);
        self.catch_up(entity, remote, latency, config)
    }

    // State without a send time: assumes the baseline latency and leaves the
    // clock average untouched.
    pub fn apply_untimed(
        &mut self,
        entity: EntityHandle,
        remote: &mut RemotePaddle,
        state: PaddleState,
        config: &SyncConfig,
    ) -> u32 {
        remote.reset_smoothing(config.options.enable_smoothing);
        remote.simulation = state;

        self.catch_up(entity, remote, self.baseline_latency, config)
    }

    fn catch_up(
        &self,
        entity: EntityHandle,
        remote: &mut RemotePaddle,
        latency: f32,
        config: &SyncConfig,
    ) -> u32 {
        if !config.options.enable_prediction {
            return 0;
        }

        let dt = config.tick_duration();
        let steps = catch_up_ticks(latency, dt);
        for _ in 0..steps {
            step_in_place(&mut remote.simulation, dt, &config.paddle, &config.field);
        }

        log::trace!(
            "entity {:?}: latency {:.4}s, {} catch-up steps",
            entity,
            latency,
            steps
        );
        steps
    }

    pub fn clock_average(&self, entity: EntityHandle) -> Option<f32> {
        self.clock_deltas
            .get(&entity)
            .map(RollingAverage::average_value)
    }

    pub fn forget(&mut self, entity: EntityHandle) {
        self.clock_deltas.remove(&entity);
    }

    pub fn clear(&mut self) {
        self.clock_deltas.clear();
    }

    pub fn tracked(&self) -> usize {
        self.clock_deltas.len()
    }
}

// Whole ticks of `dt` that fit in `latency`, as counted by
// `while latency >= dt { latency -= dt }` without the float drift.
pub fn catch_up_ticks(latency: f32, dt: f32) -> u32 {
    if dt <= 0.0 || latency < dt * (1.0 - CATCH_UP_EPSILON) {
        return 0;
    }
    let ticks = (latency / dt + CATCH_UP_EPSILON).floor();
    (ticks as u32).min(MAX_CATCH_UP_TICKS)
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::player::{PaddleInput, advance};

    fn packet(elapsed_seconds: f32, y: f32) -> PaddlePacket {
        PaddlePacket {
            elapsed_seconds,
            position: Vec2::new(608.0, y),
            velocity: Vec2::new(0.0, -200.0),
            move_up: true,
            move_down: false,
        }
    }

    #[test]
    fn test_catch_up_ticks() {
        let dt = 1.0 / 60.0;
        assert_eq!(catch_up_ticks(3.0 * dt, dt), 3);
        assert_eq!(catch_up_ticks(0.05, dt), 3);
        assert_eq!(catch_up_ticks(dt * 0.5, dt), 0);
        assert_eq!(catch_up_ticks(-1.0, dt), 0);
        assert_eq!(catch_up_ticks(100.0, dt), MAX_CATCH_UP_TICKS);
    }

    #[test]
    fn test_catch_up_tolerance_and_cap() {
        let dt = 1.0 / 60.0;
        assert_eq!(catch_up_ticks(dt * 0.9995, dt), 1);
        assert_eq!(catch_up_ticks(dt * 0.99, dt), 0);
        assert_eq!(catch_up_ticks(dt * 2.5, dt), 2);
        assert_eq!(catch_up_ticks(dt * 60.0, dt), 60);
        assert_eq!(catch_up_ticks(2.0, dt), MAX_CATCH_UP_TICKS);
    }

    #[test]
    fn test_catch_up_matches_manual_steps() {
        let config = SyncConfig {
            baseline_latency_secs: 3.0 / 60.0,
            ..SyncConfig::default()
        };
        let mut predictor = Predictor::new(&config);
        let entity = EntityHandle(7);
        let received = packet(1.0, 200.0);
        let mut remote = RemotePaddle::new(PaddleState::at(Vec2::new(608.0, 180.0)));

        // First packet: the average equals the sample, so latency == baseline.
        let steps = predictor.apply_packet(entity, &mut remote, &received, 1.05, &config);
        assert_eq!(steps, 3);

        let dt = config.tick_duration();
        let mut expected = PaddleState::from_packet(&received);
        for _ in 0..3 {
            expected = advance(&expected, PaddleInput::MOVE_UP, dt, &config.paddle, &config.field);
        }
        assert_eq!(remote.simulation, expected);
        assert_eq!(remote.smoothing, 1.0);
    }

    #[test]
    fn test_late_packet_adds_latency() {
        let config = SyncConfig::default();
        let mut predictor = Predictor::new(&config);
        let entity = EntityHandle(1);

        for i in 0..10 {
            let sent = i as f32 * 0.1;
            let latency = predictor.estimate_latency(entity, sent + 5.0, sent);
            assert!((latency - config.baseline_latency_secs).abs() < 1e-4);
        }

        // Arrives 100ms later than the usual cadence.
        let latency = predictor.estimate_latency(entity, 1.0 + 5.1, 1.0);
        assert!(latency > config.baseline_latency_secs + 0.08);
        assert!(predictor.clock_average(entity).is_some());
    }

    #[test]
    fn test_prediction_disabled_only_overwrites() {
        let mut config = SyncConfig::default();
        config.options.enable_prediction = false;
        let mut predictor = Predictor::new(&config);
        let received = packet(0.0, 120.0);
        let mut remote = RemotePaddle::new(PaddleState::default());

        let steps = predictor.apply_packet(EntityHandle(2), &mut remote, &received, 0.0, &config);
        assert_eq!(steps, 0);
        assert_eq!(remote.simulation, PaddleState::from_packet(&received));
    }

    #[test]
    fn test_forget_drops_clock_history() {
        let config = SyncConfig::default();
        let mut predictor = Predictor::new(&config);
        predictor.estimate_latency(EntityHandle(1), 1.0, 0.5);
        predictor.estimate_latency(EntityHandle(2), 1.0, 0.5);
        assert_eq!(predictor.tracked(), 2);

        predictor.forget(EntityHandle(1));
        assert_eq!(predictor.clock_average(EntityHandle(1)), None);
        predictor.clear();
        assert_eq!(predictor.tracked(), 0);
    }

    #[test]
    fn test_untimed_state_keeps_clock_average() {
        let config = SyncConfig::default();
        let mut predictor = Predictor::new(&config);
        let entity = EntityHandle(3);
        let mut remote = RemotePaddle::new(PaddleState::at(Vec2::new(608.0, 180.0)));

        // Remote clock runs 100s behind ours.
        for i in 0..50 {
            let sent = i as f32 * 0.125;
            predictor.apply_packet(entity, &mut remote, &packet(sent, 180.0), sent + 100.0, &config);
        }
        let average = predictor.clock_average(entity);

        let text_state = PaddleState::at(Vec2::new(608.0, 150.0));
        let steps = predictor.apply_untimed(entity, &mut remote, text_state, &config);
        assert_eq!(steps, 3);
        assert_eq!(predictor.clock_average(entity), average);

        let steps = predictor.apply_packet(entity, &mut remote, &packet(6.5, 180.0), 106.5, &config);
        assert_eq!(steps, 3);
    }

    #[test]
    fn test_untimed_state_without_prediction() {
        let mut config = SyncConfig::default();
        config.options.enable_prediction = false;
        let mut predictor = Predictor::new(&config);
        let mut remote = RemotePaddle::new(PaddleState::default());
        let state = PaddleState::at(Vec2::new(32.0, 90.0));

        assert_eq!(predictor.apply_untimed(EntityHandle(4), &mut remote, state, &config), 0);
        assert_eq!(remote.simulation, state);
        assert_eq!(predictor.tracked(), 0);
    }
}
