use crate::player::{FieldConfig, PaddleConfig, PaddleState, advance, step_in_place};

const SMOOTHING_EPSILON: f32 = 1e-4;

// `previous` is the display value captured when the last packet arrived.
// Once `smoothing` is exactly zero, `display == simulation`.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePaddle {
    pub simulation: PaddleState,
    pub previous: PaddleState,
    pub display: PaddleState,
    pub smoothing: f32,
}

impl RemotePaddle {
    pub fn new(state: PaddleState) -> Self {
        Self {
            simulation: state,
            previous: state,
            display: state,
            smoothing: 0.0,
        }
    }

    pub fn reset_smoothing(&mut self, enabled: bool) {
        if enabled {
            self.previous = self.display;
            self.smoothing = 1.0;
        } else {
            self.smoothing = 0.0;
        }
    }

    pub fn update(
        &mut self,
        decay: f32,
        predict: bool,
        dt: f32,
        paddle: &PaddleConfig,
        field: &FieldConfig,
    ) {
        self.smoothing -= decay;
        if self.smoothing < SMOOTHING_EPSILON {
            self.smoothing = 0.0;
        }

        if predict {
            step_in_place(&mut self.simulation, dt, paddle, field);
            // The blend origin moves with the simulation's current input.
            if self.smoothing > 0.0 {
                self.previous = advance(&self.previous, self.simulation.input(), dt, paddle, field);
            }
        }

        self.display = if self.smoothing == 0.0 {
            self.simulation
        } else {
            self.previous.lerp(&self.simulation, 1.0 - self.smoothing)
        };
    }

    pub fn display_error(&self) -> f32 {
        self.display.position.distance(self.simulation.position)
    }
}
