mod ball;
mod score;
mod session;
mod signal;
mod tick;

pub use ball::{BALL_FOLLOW_RATE, Ball, BallState, normalize_angle, serve_direction};
pub use score::{GoalScored, ScoreBoard};
pub use session::{NetworkSession, PayloadError};
pub use signal::SessionSignal;
pub use tick::FixedTimestep;
