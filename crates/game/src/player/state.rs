use glam::Vec2;

use crate::net::PaddlePacket;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PaddleInput: u8 {
        const MOVE_UP = 0b0000_0001;
        const MOVE_DOWN = 0b0000_0010;
    }
}

impl Default for PaddleInput {
    fn default() -> Self {
        PaddleInput::empty()
    }
}

impl PaddleInput {
    pub fn from_flags(move_up: bool, move_down: bool) -> Self {
        let mut input = Self::empty();
        input.set(Self::MOVE_UP, move_up);
        input.set(Self::MOVE_DOWN, move_down);
        input
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaddleState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub move_up: bool,
    pub move_down: bool,
}

impl PaddleState {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn input(&self) -> PaddleInput {
        PaddleInput::from_flags(self.move_up, self.move_down)
    }

    pub fn set_input(&mut self, input: PaddleInput) {
        self.move_up = input.contains(PaddleInput::MOVE_UP);
        self.move_down = input.contains(PaddleInput::MOVE_DOWN);
    }

    pub fn to_packet(&self, elapsed_seconds: f32) -> PaddlePacket {
        PaddlePacket {
            elapsed_seconds,
            position: self.position,
            velocity: self.velocity,
            move_up: self.move_up,
            move_down: self.move_down,
        }
    }

    pub fn from_packet(packet: &PaddlePacket) -> Self {
        Self {
            position: packet.position,
            velocity: packet.velocity,
            move_up: packet.move_up,
            move_down: packet.move_down,
        }
    }

    // Input flags follow `target`.
    pub fn lerp(&self, target: &PaddleState, t: f32) -> PaddleState {
        PaddleState {
            position: self.position.lerp(target.position, t),
            velocity: self.velocity.lerp(target.velocity, t),
            move_up: target.move_up,
            move_down: target.move_down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_flags_round_trip_through_state() {
        let mut state = PaddleState::default();
        state.set_input(PaddleInput::MOVE_DOWN);
        assert!(!state.move_up);
        assert!(state.move_down);
        assert_eq!(state.input(), PaddleInput::MOVE_DOWN);
        assert_eq!(PaddleInput::from_flags(true, true), PaddleInput::all());
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = PaddleState::at(Vec2::new(0.0, 0.0));
        let mut b = PaddleState::at(Vec2::new(10.0, 20.0));
        b.move_up = true;

        assert_eq!(a.lerp(&b, 0.0).position, a.position);
        assert_eq!(a.lerp(&b, 1.0).position, b.position);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.position, Vec2::new(5.0, 10.0));
        assert!(mid.move_up);
    }
}
