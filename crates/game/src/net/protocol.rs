use glam::Vec2;

use super::codec::{CodecError, PacketReader, PacketWriter};

pub const DEFAULT_TICK_RATE: u32 = 60;
pub const DEFAULT_BROADCAST_RATE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum OpCode {
    PaddlePacket = 1,
    BallPacket = 2,
    ScoreEvent = 3,
}

impl OpCode {
    pub fn from_raw(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::PaddlePacket),
            2 => Some(Self::BallPacket),
            3 => Some(Self::ScoreEvent),
            _ => None,
        }
    }

    pub fn raw(self) -> i64 {
        self as i64
    }
}

pub trait WirePacket: Sized {
    const OP_CODE: OpCode;

    fn encode(&self, writer: &mut PacketWriter) -> Result<(), CodecError>;

    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, CodecError>;

    fn write_to(&self, writer: &mut PacketWriter) -> Result<(), CodecError> {
        writer.reset();
        self.encode(writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddlePacket {
    pub elapsed_seconds: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub move_up: bool,
    pub move_down: bool,
}

impl PaddlePacket {
    pub const SIZE: usize = 4 + 8 + 8 + 1 + 1;
}

impl WirePacket for PaddlePacket {
    const OP_CODE: OpCode = OpCode::PaddlePacket;

    fn encode(&self, writer: &mut PacketWriter) -> Result<(), CodecError> {
        writer.write_f32(self.elapsed_seconds)?;
        writer.write_vec2(self.position)?;
        writer.write_vec2(self.velocity)?;
        writer.write_bool(self.move_up)?;
        writer.write_bool(self.move_down)
    }

    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            elapsed_seconds: reader.read_f32()?,
            position: reader.read_vec2()?,
            velocity: reader.read_vec2()?,
            move_up: reader.read_bool()?,
            move_down: reader.read_bool()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallPacket {
    pub direction: f32,
    pub position: Vec2,
}

impl WirePacket for BallPacket {
    const OP_CODE: OpCode = OpCode::BallPacket;

    fn encode(&self, writer: &mut PacketWriter) -> Result<(), CodecError> {
        writer.write_f32(self.direction)?;
        writer.write_vec2(self.position)
    }

    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            direction: reader.read_f32()?,
            position: reader.read_vec2()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScorePacket {
    pub player1_score: i32,
    pub player2_score: i32,
}

impl WirePacket for ScorePacket {
    const OP_CODE: OpCode = OpCode::ScoreEvent;

    fn encode(&self, writer: &mut PacketWriter) -> Result<(), CodecError> {
        writer.write_i32(self.player1_score)?;
        writer.write_i32(self.player2_score)
    }

    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            player1_score: reader.read_i32()?,
            player2_score: reader.read_i32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_code_mapping() {
        for op in [OpCode::PaddlePacket, OpCode::BallPacket, OpCode::ScoreEvent] {
            assert_eq!(OpCode::from_raw(op.raw()), Some(op));
        }
        assert_eq!(OpCode::from_raw(0), None);
        assert_eq!(OpCode::from_raw(99), None);
    }

    #[test]
    fn test_paddle_packet_layout() {
        let packet = PaddlePacket {
            elapsed_seconds: 0.0167,
            position: Vec2::new(120.5, 64.0),
            velocity: Vec2::new(0.0, -200.0),
            move_up: false,
            move_down: true,
        };

        let mut writer = PacketWriter::new();
        packet.write_to(&mut writer).unwrap();
        assert_eq!(writer.len(), PaddlePacket::SIZE);

        let bytes = writer.as_bytes();
        assert_eq!(&bytes[0..4], &0.0167f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &120.5f32.to_le_bytes());
        assert_eq!(bytes[20], 0);
        assert_eq!(bytes[21], 1);

        let decoded = PaddlePacket::decode(&mut PacketReader::new(bytes)).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_ball_and_score_packets() {
        let mut writer = PacketWriter::new();

        let ball = BallPacket {
            direction: 2.5,
            position: Vec2::new(320.0, 180.0),
        };
        ball.write_to(&mut writer).unwrap();
        assert_eq!(writer.len(), 12);
        let decoded = BallPacket::decode(&mut PacketReader::new(writer.as_bytes())).unwrap();
        assert_eq!(decoded, ball);

        let score = ScorePacket {
            player1_score: 3,
            player2_score: 11,
        };
        score.write_to(&mut writer).unwrap();
        assert_eq!(writer.len(), 8);
        let decoded = ScorePacket::decode(&mut PacketReader::new(writer.as_bytes())).unwrap();
        assert_eq!(decoded, score);
    }

    #[test]
    fn test_undersized_paddle_packet_is_rejected() {
        let mut writer = PacketWriter::new();
        PaddlePacket {
            elapsed_seconds: 1.0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            move_up: true,
            move_down: false,
        }
        .write_to(&mut writer)
        .unwrap();

        let truncated = &writer.as_bytes()[..PaddlePacket::SIZE - 1];
        let result = PaddlePacket::decode(&mut PacketReader::new(truncated));
        assert!(matches!(result, Err(CodecError::UnexpectedEnd { .. })));
    }
}
