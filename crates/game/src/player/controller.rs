use glam::Vec2;

use super::{FieldConfig, PaddleConfig, PaddleInput, PaddleState};

// Up is toward smaller y. Velocity reads zero while pinned to an edge.
pub fn advance(
    state: &PaddleState,
    input: PaddleInput,
    dt: f32,
    paddle: &PaddleConfig,
    field: &FieldConfig,
) -> PaddleState {
    let mut next = *state;
    next.set_input(input);

    let mut direction = 0.0;
    if input.contains(PaddleInput::MOVE_UP) {
        direction -= 1.0;
    }
    if input.contains(PaddleInput::MOVE_DOWN) {
        direction += 1.0;
    }

    if dt <= 0.0 {
        next.velocity = Vec2::ZERO;
        return next;
    }

    let half_height = paddle.height * 0.5;
    let min_y = half_height.min(field.height * 0.5);
    let max_y = (field.height - half_height).max(min_y);

    let target_y = state.position.y + direction * paddle.speed * dt;
    next.position.y = target_y.clamp(min_y, max_y);
    next.velocity = Vec2::new(0.0, (next.position.y - state.position.y) / dt);
    next
}

pub fn step_in_place(state: &mut PaddleState, dt: f32, paddle: &PaddleConfig, field: &FieldConfig) {
    *state = advance(state, state.input(), dt, paddle, field);
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn mid_field() -> PaddleState {
        PaddleState::at(FieldConfig::default().spawn_point(0))
    }

    #[test]
    fn test_advance_is_bit_identical() {
        let paddle = PaddleConfig::default();
        let field = FieldConfig::default();
        let mut a = mid_field();
        let mut b = mid_field();

        for i in 0..240 {
            let input = if i % 50 < 25 {
                PaddleInput::MOVE_UP
            } else {
                PaddleInput::MOVE_DOWN
            };
            a = advance(&a, input, DT, &paddle, &field);
            b = advance(&b, input, DT, &paddle, &field);
            assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
            assert_eq!(a.velocity.y.to_bits(), b.velocity.y.to_bits());
        }
    }

    #[test]
    fn test_up_moves_toward_smaller_y() {
        let paddle = PaddleConfig::default();
        let field = FieldConfig::default();
        let start = mid_field();

        let up = advance(&start, PaddleInput::MOVE_UP, DT, &paddle, &field);
        assert!(up.position.y < start.position.y);
        assert!((up.velocity.y + paddle.speed).abs() < 0.01);
        assert!(up.move_up && !up.move_down);

        let down = advance(&start, PaddleInput::MOVE_DOWN, DT, &paddle, &field);
        assert!(down.position.y > start.position.y);

        let idle = advance(&start, PaddleInput::all(), DT, &paddle, &field);
        assert_eq!(idle.position, start.position);
        assert_eq!(idle.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_paddle_stays_inside_field() {
        let paddle = PaddleConfig::default();
        let field = FieldConfig::default();
        let mut state = mid_field();

        for _ in 0..600 {
            state = advance(&state, PaddleInput::MOVE_UP, DT, &paddle, &field);
        }
        assert_eq!(state.position.y, paddle.height * 0.5);
        assert_eq!(state.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let paddle = PaddleConfig::default();
        let field = FieldConfig::default();
        let start = mid_field();
        let next = advance(&start, PaddleInput::MOVE_DOWN, 0.0, &paddle, &field);
        assert_eq!(next.position, start.position);
        assert!(next.move_down);
    }
}
