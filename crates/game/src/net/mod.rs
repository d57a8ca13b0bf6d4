mod codec;
mod loopback;
mod message;
mod protocol;
mod rolling;
mod stats;
mod transport;

pub use codec::{CodecError, MAX_PAYLOAD_SIZE, PacketReader, PacketWriter};
pub use loopback::{LoopbackHub, LoopbackTransport};
pub use message::{DirectionAndPosition, MessageError, VelocityAndPosition};
pub use protocol::{
    BallPacket, DEFAULT_BROADCAST_RATE, DEFAULT_TICK_RATE, OpCode, PaddlePacket, ScorePacket,
    WirePacket,
};
pub use rolling::{DEFAULT_CLOCK_WINDOW, RollingAverage};
pub use stats::{LinkConditions, NetworkStats};
pub use transport::{
    InboundPayload, MatchId, MatchToken, Operation, Payload, SessionId, Transport,
    TransportError,
};
