use std::collections::BTreeMap;

use glam::Vec2;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("malformed json message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message is missing key `{0}`")]
    MissingKey(&'static str),
    #[error("value for `{key}` is not a number: {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

const VELOCITY_X: &str = "velocity.x";
const VELOCITY_Y: &str = "velocity.y";
const POSITION_X: &str = "position.x";
const POSITION_Y: &str = "position.y";
const DIRECTION: &str = "direction";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityAndPosition {
    pub velocity: Vec2,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionAndPosition {
    pub direction: f32,
    pub position: Vec2,
}

impl VelocityAndPosition {
    pub fn to_json(&self) -> String {
        to_json(&[
            (VELOCITY_X, self.velocity.x),
            (VELOCITY_Y, self.velocity.y),
            (POSITION_X, self.position.x),
            (POSITION_Y, self.position.y),
        ])
    }

    pub fn from_json(text: &str) -> Result<Self, MessageError> {
        let values = parse(text)?;
        Ok(Self {
            velocity: Vec2::new(
                number(&values, VELOCITY_X)?,
                number(&values, VELOCITY_Y)?,
            ),
            position: Vec2::new(
                number(&values, POSITION_X)?,
                number(&values, POSITION_Y)?,
            ),
        })
    }
}

impl DirectionAndPosition {
    pub fn to_json(&self) -> String {
        to_json(&[
            (DIRECTION, self.direction),
            (POSITION_X, self.position.x),
            (POSITION_Y, self.position.y),
        ])
    }

    pub fn from_json(text: &str) -> Result<Self, MessageError> {
        let values = parse(text)?;
        Ok(Self {
            direction: number(&values, DIRECTION)?,
            position: Vec2::new(
                number(&values, POSITION_X)?,
                number(&values, POSITION_Y)?,
            ),
        })
    }
}

fn to_json(fields: &[(&'static str, f32)]) -> String {
    let values: BTreeMap<&str, String> = fields
        .iter()
        .map(|(key, value)| (*key, value.to_string()))
        .collect();
    // A map of strings always serializes.
    serde_json::to_string(&values).unwrap_or_default()
}

fn parse(text: &str) -> Result<BTreeMap<String, String>, MessageError> {
    Ok(serde_json::from_str(text)?)
}

fn number(values: &BTreeMap<String, String>, key: &'static str) -> Result<f32, MessageError> {
    let raw = values.get(key).ok_or(MessageError::MissingKey(key))?;
    raw.trim()
        .parse()
        .map_err(|_| MessageError::InvalidNumber {
            key,
            value: raw.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_and_position_uses_fixed_keys() {
        let message = VelocityAndPosition {
            velocity: Vec2::new(0.0, -200.0),
            position: Vec2::new(32.0, 180.5),
        };

        let json = message.to_json();
        let raw: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(raw["velocity.y"], "-200");
        assert_eq!(raw["position.y"], "180.5");

        assert_eq!(VelocityAndPosition::from_json(&json).unwrap(), message);
    }

    #[test]
    fn test_direction_and_position_parses() {
        let json = r#"{"direction":"1.25","position.x":"320","position.y":"180"}"#;
        let message = DirectionAndPosition::from_json(json).unwrap();
        assert_eq!(message.direction, 1.25);
        assert_eq!(message.position, Vec2::new(320.0, 180.0));
    }

    #[test]
    fn test_missing_and_invalid_fields_are_errors() {
        let missing = r#"{"direction":"1.25","position.x":"320"}"#;
        assert!(matches!(
            DirectionAndPosition::from_json(missing),
            Err(MessageError::MissingKey("position.y"))
        ));

        let invalid = r#"{"direction":"left","position.x":"320","position.y":"1"}"#;
        assert!(matches!(
            DirectionAndPosition::from_json(invalid),
            Err(MessageError::InvalidNumber { key: "direction", .. })
        ));

        assert!(matches!(
            DirectionAndPosition::from_json("not json"),
            Err(MessageError::Json(_))
        ));
    }
}
