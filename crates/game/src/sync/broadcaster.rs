use crate::net::{CodecError, PacketWriter, WirePacket};

#[derive(Debug, Clone)]
pub struct LocalStateBroadcaster {
    interval: f32,
    timer: f32,
    writer: PacketWriter,
}

impl LocalStateBroadcaster {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            interval: 1.0 / rate_hz.max(1) as f32,
            timer: 0.0,
            writer: PacketWriter::new(),
        }
    }

    pub fn update<P: WirePacket>(
        &mut self,
        dt: f32,
        sample: impl FnOnce() -> P,
    ) -> Result<Option<&[u8]>, CodecError> {
        let mut sent = false;
        if self.timer <= 0.0 {
            sample().write_to(&mut self.writer)?;
            self.timer = self.interval;
            sent = true;
        }
        self.timer -= dt;

        Ok(sent.then(|| self.writer.as_bytes()))
    }

    pub fn reset(&mut self) {
        self.timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::net::{PaddlePacket, PacketReader};
    use crate::player::PaddleState;

    #[test]
    fn test_sends_at_fixed_rate() {
        let mut broadcaster = LocalStateBroadcaster::new(10);
        let state = PaddleState::at(Vec2::new(32.0, 180.0));
        let dt = 1.0 / 60.0;

        let mut sends = 0;
        for tick in 0..120 {
            let clock = tick as f32 * dt;
            if broadcaster
                .update(dt, || state.to_packet(clock))
                .unwrap()
                .is_some()
            {
                sends += 1;
            }
        }
        assert!((17..=21).contains(&sends), "sent {sends} times");
    }

    #[test]
    fn test_first_update_sends_encoded_paddle() {
        let mut broadcaster = LocalStateBroadcaster::new(10);
        let mut state = PaddleState::at(Vec2::new(32.0, 100.0));
        state.move_down = true;

        let payload = broadcaster
            .update(0.016, || state.to_packet(2.5))
            .unwrap()
            .map(<[u8]>::to_vec)
            .unwrap();
        assert_eq!(payload.len(), PaddlePacket::SIZE);

        let decoded = PaddlePacket::decode(&mut PacketReader::new(&payload)).unwrap();
        assert_eq!(decoded.elapsed_seconds, 2.5);
        assert_eq!(decoded.position, state.position);
        assert!(decoded.move_down);

        assert!(broadcaster.update(0.016, || state.to_packet(2.516)).unwrap().is_none());
    }

    #[test]
    fn test_jitter_keeps_long_run_rate() {
        let mut broadcaster = LocalStateBroadcaster::new(10);
        let state = PaddleState::default();
        let mut sends = 0;
        let mut elapsed = 0.0;
        for i in 0..600 {
            let dt = if i % 2 == 0 { 0.010 } else { 0.0233 };
            elapsed += dt;
            if broadcaster.update(dt, || state.to_packet(elapsed)).unwrap().is_some() {
                sends += 1;
            }
        }
        let expected = elapsed * 10.0;
        assert!((sends as f32 - expected).abs() <= expected * 0.15 + 1.0);
    }
}
