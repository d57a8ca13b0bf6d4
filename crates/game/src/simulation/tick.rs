// Frame time beyond this is dropped so a stalled frame cannot queue up
// a burst of ticks.
const MAX_FRAME_DELTA: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f32,
    pending: f32,
}

impl FixedTimestep {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            dt: 1.0 / tick_rate.max(1) as f32,
            pending: 0.0,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn accumulate(&mut self, frame_delta: f32) {
        self.pending += frame_delta.clamp(0.0, MAX_FRAME_DELTA);
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.pending < self.dt {
            return false;
        }
        self.pending -= self.dt;
        true
    }
}
