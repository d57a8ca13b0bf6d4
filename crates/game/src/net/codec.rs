use glam::Vec2;

// Paddle packets use 22 bytes.
pub const MAX_PAYLOAD_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("payload truncated: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },
    #[error("payload buffer full: needed {needed} bytes, {remaining} remaining")]
    BufferFull { needed: usize, remaining: usize },
}

#[derive(Debug, Clone)]
pub struct PacketWriter {
    buffer: [u8; MAX_PAYLOAD_SIZE],
    len: usize,
}

impl Default for PacketWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketWriter {
    pub fn new() -> Self {
        Self {
            buffer: [0; MAX_PAYLOAD_SIZE],
            len: 0,
        }
    }

    pub fn reset(&mut self) {
        self.len = 0;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), CodecError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), CodecError> {
        self.write_bytes(&[u8::from(value)])
    }

    pub fn write_vec2(&mut self, value: Vec2) -> Result<(), CodecError> {
        self.write_f32(value.x)?;
        self.write_f32(value.y)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let remaining = MAX_PAYLOAD_SIZE - self.len;
        if bytes.len() > remaining {
            return Err(CodecError::BufferFull {
                needed: bytes.len(),
                remaining,
            });
        }
        self.buffer[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    pub fn set_state(&mut self, data: &'a [u8]) {
        self.data = data;
        self.cursor = 0;
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        self.read_array().map(f32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        self.read_array::<1>().map(|[byte]| byte != 0)
    }

    pub fn read_vec2(&mut self) -> Result<Vec2, CodecError> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        Ok(Vec2::new(x, y))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let remaining = self.remaining();
        if N > remaining {
            return Err(CodecError::UnexpectedEnd {
                needed: N,
                remaining,
            });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.cursor..self.cursor + N]);
        self.cursor += N;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_reuses_buffer_after_reset() {
        let mut writer = PacketWriter::new();
        writer.write_i32(7).unwrap();
        writer.write_bool(true).unwrap();
        assert_eq!(writer.len(), 5);

        writer.reset();
        assert!(writer.is_empty());
        writer.write_f32(1.5).unwrap();
        assert_eq!(writer.as_bytes(), &1.5f32.to_le_bytes());
    }

    #[test]
    fn test_primitives_read_back_in_order() {
        let mut writer = PacketWriter::new();
        writer.write_f32(-3.25).unwrap();
        writer.write_i32(-42).unwrap();
        writer.write_bool(false).unwrap();
        writer.write_vec2(Vec2::new(1.0, -2.0)).unwrap();

        let mut reader = PacketReader::new(writer.as_bytes());
        assert_eq!(reader.read_f32().unwrap(), -3.25);
        assert_eq!(reader.read_i32().unwrap(), -42);
        assert!(!reader.read_bool().unwrap());
        assert_eq!(reader.read_vec2().unwrap(), Vec2::new(1.0, -2.0));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_fails_without_advancing() {
        let data = [0u8; 3];
        let mut reader = PacketReader::new(&data);

        assert_eq!(
            reader.read_f32(),
            Err(CodecError::UnexpectedEnd {
                needed: 4,
                remaining: 3
            })
        );
        assert_eq!(reader.remaining(), 3);
    }

    #[test]
    fn test_set_state_rewinds_cursor() {
        let first = 9i32.to_le_bytes();
        let second = 11i32.to_le_bytes();

        let mut reader = PacketReader::new(&first);
        assert_eq!(reader.read_i32().unwrap(), 9);
        assert!(reader.read_i32().is_err());

        reader.set_state(&second);
        assert_eq!(reader.read_i32().unwrap(), 11);
    }

    #[test]
    fn test_writer_refuses_overflow() {
        let mut writer = PacketWriter::new();
        for _ in 0..MAX_PAYLOAD_SIZE / 4 {
            writer.write_f32(0.0).unwrap();
        }
        assert!(matches!(
            writer.write_bool(true),
            Err(CodecError::BufferFull { .. })
        ));
        assert_eq!(writer.len(), MAX_PAYLOAD_SIZE);
    }
}
