use crate::net::{MatchId, Operation, SessionId, TransportError};
use crate::snapshot::EntityHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionSignal {
    Connected {
        session: SessionId,
    },
    MatchJoined {
        match_id: MatchId,
    },
    LocalPlayerSpawned {
        session: SessionId,
        entity: EntityHandle,
    },
    RemotePlayerSpawned {
        session: SessionId,
        entity: EntityHandle,
    },
    PlayerRemoved {
        session: SessionId,
        entity: EntityHandle,
    },
    HostChanged {
        host: Option<SessionId>,
    },
    ScoreChanged {
        player1: i32,
        player2: i32,
    },
    MatchLeft {
        match_id: MatchId,
    },
    OperationFailed {
        operation: Operation,
        error: TransportError,
    },
}
