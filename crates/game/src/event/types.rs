use crate::net::{InboundPayload, MatchId, MatchToken, Operation, SessionId, TransportError};

#[derive(Debug, Clone)]
pub enum NetworkEvent {
    Connected {
        session: SessionId,
    },
    MatchmakerMatched {
        token: MatchToken,
        self_session: SessionId,
        users: Vec<SessionId>,
    },
    MatchJoined {
        match_id: MatchId,
        self_session: SessionId,
        presences: Vec<SessionId>,
    },
    PresenceChanged {
        match_id: MatchId,
        joins: Vec<SessionId>,
        leaves: Vec<SessionId>,
    },
    StateReceived {
        sender: SessionId,
        op_code: i64,
        payload: InboundPayload,
    },
    OperationFailed {
        operation: Operation,
        error: TransportError,
    },
}

