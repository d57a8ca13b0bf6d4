mod config;
mod controller;
mod state;

pub use config::{FieldConfig, PaddleConfig};
pub use controller::{advance, step_in_place};
pub use state::{PaddleInput, PaddleState};
