use std::f32::consts::{FRAC_PI_4, PI, TAU};

use glam::Vec2;
use rand::Rng;

use crate::net::{BallPacket, DirectionAndPosition};
use crate::player::{FieldConfig, PaddleConfig, PaddleState};

use super::GoalScored;

pub const BALL_FOLLOW_RATE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallState {
    pub position: Vec2,
    pub direction: f32,
}

impl BallState {
    pub fn centered(field: &FieldConfig, direction: f32) -> Self {
        Self {
            position: field.center(),
            direction: normalize_angle(direction),
        }
    }

    pub fn velocity(&self, speed: f32) -> Vec2 {
        Vec2::from_angle(self.direction) * speed
    }

    pub fn advance(&mut self, dt: f32, field: &FieldConfig) -> Option<GoalScored> {
        self.position += self.velocity(field.ball_speed) * dt;

        let half = field.ball_size * 0.5;
        let (sin, _) = self.direction.sin_cos();
        if self.position.y < half {
            self.position.y = half;
            if sin < 0.0 {
                self.direction = normalize_angle(-self.direction);
            }
        } else if self.position.y > field.height - half {
            self.position.y = field.height - half;
            if sin > 0.0 {
                self.direction = normalize_angle(-self.direction);
            }
        }

        if self.position.x < 0.0 {
            Some(GoalScored::player2())
        } else if self.position.x > field.width {
            Some(GoalScored::player1())
        } else {
            None
        }
    }

    pub fn bounce_off(
        &mut self,
        paddle: &PaddleState,
        paddle_config: &PaddleConfig,
        field: &FieldConfig,
    ) -> bool {
        let half_ball = field.ball_size * 0.5;
        let offset = paddle.position - self.position;
        let reach = Vec2::new(
            paddle_config.width * 0.5 + half_ball,
            paddle_config.height * 0.5 + half_ball,
        );
        if offset.x.abs() > reach.x || offset.y.abs() > reach.y {
            return false;
        }

        let heading_x = self.direction.cos();
        if heading_x * offset.x <= 0.0 {
            return false;
        }

        self.direction = normalize_angle(PI - self.direction);
        true
    }

    pub fn to_packet(&self) -> BallPacket {
        BallPacket {
            direction: self.direction,
            position: self.position,
        }
    }

    pub fn from_packet(packet: &BallPacket) -> Self {
        Self {
            position: packet.position,
            direction: packet.direction,
        }
    }

    pub fn from_message(message: &DirectionAndPosition) -> Self {
        Self {
            position: message.position,
            direction: message.direction,
        }
    }
}

pub fn serve_direction(rng: &mut impl Rng, toward_right: bool) -> f32 {
    let angle = rng.gen_range(-FRAC_PI_4..FRAC_PI_4);
    if toward_right { angle } else { PI - angle }
}

// Wraps into [-PI, PI).
pub fn normalize_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[derive(Debug, Clone)]
pub struct Ball {
    pub state: BallState,
    pub display: Vec2,
    in_play: bool,
}

impl Ball {
    pub fn new(field: &FieldConfig) -> Self {
        let state = BallState::centered(field, 0.0);
        Self {
            display: state.position,
            state,
            in_play: false,
        }
    }

    pub fn in_play(&self) -> bool {
        self.in_play
    }

    pub fn serve(&mut self, field: &FieldConfig, direction: f32) {
        self.state = BallState::centered(field, direction);
        self.display = self.state.position;
        self.in_play = true;
    }

    pub fn host_step<I>(
        &mut self,
        dt: f32,
        paddles: I,
        paddle_config: &PaddleConfig,
        field: &FieldConfig,
    ) -> Option<GoalScored>
    where
        I: IntoIterator<Item = PaddleState>,
    {
        if !self.in_play {
            return None;
        }
        for paddle in paddles {
            if self.state.bounce_off(&paddle, paddle_config, field) {
                break;
            }
        }
        let goal = self.state.advance(dt, field);
        self.display = self.state.position;
        goal
    }

    pub fn apply_remote(&mut self, state: BallState) {
        self.state = state;
        self.in_play = true;
    }

    pub fn follow_step(&mut self, dt: f32, field: &FieldConfig) {
        if !self.in_play {
            return;
        }
        // The owner decides goals; hold at the line until it says otherwise.
        if self.state.advance(dt, field).is_some() {
            self.state.position.x = self.state.position.x.clamp(0.0, field.width);
        }
        self.display = self.display.lerp(self.state.position, BALL_FOLLOW_RATE);
    }

    pub fn reset(&mut self, field: &FieldConfig) {
        *self = Self::new(field);
    }
}
