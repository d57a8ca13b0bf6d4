use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaddleConfig {
    pub speed: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            speed: 200.0,
            width: 16.0,
            height: 64.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,

    pub paddle_offset_x: f32,

    pub ball_speed: f32,
    pub ball_size: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 360.0,

            paddle_offset_x: 32.0,

            ball_speed: 180.0,
            ball_size: 8.0,
        }
    }
}

impl FieldConfig {
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn spawn_point(&self, index: usize) -> glam::Vec2 {
        let x = if index % 2 == 0 {
            self.paddle_offset_x
        } else {
            self.width - self.paddle_offset_x
        };
        glam::Vec2::new(x, self.height * 0.5)
    }
}
