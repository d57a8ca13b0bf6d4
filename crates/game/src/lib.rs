pub mod event;
pub mod net;
pub mod player;
pub mod session;
pub mod simulation;
pub mod snapshot;
pub mod sync;

pub use event::{DispatchSender, Dispatcher, NetworkEvent};
pub use net::{
    BallPacket, CodecError, DEFAULT_BROADCAST_RATE, DEFAULT_TICK_RATE, DirectionAndPosition,
    InboundPayload, LinkConditions, LoopbackHub, LoopbackTransport, MatchId, MatchToken,
    MessageError, NetworkStats, OpCode, Operation, PacketReader, PacketWriter, PaddlePacket,
    Payload, RollingAverage, ScorePacket, SessionId, Transport, TransportError,
    VelocityAndPosition, WirePacket,
};
pub use player::{FieldConfig, PaddleConfig, PaddleInput, PaddleState};
pub use session::{PeerEntityMap, SessionResolver};
pub use simulation::{
    Ball, BallState, FixedTimestep, GoalScored, NetworkSession, ScoreBoard, SessionSignal,
};
pub use snapshot::{Entity, EntityHandle, EntityKind, World};
pub use sync::{
    HostReelection, LocalStateBroadcaster, NetworkOptions, Predictor, RemotePaddle, SyncConfig,
};
