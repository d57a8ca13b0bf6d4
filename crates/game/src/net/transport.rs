use std::fmt;
use std::sync::Arc;

use super::protocol::OpCode;

// Host election relies on the lexicographic ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(Arc<str>);

impl SessionId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchToken(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    Binary(&'a [u8]),
    Text(&'a str),
}

impl Payload<'_> {
    pub fn len(&self) -> usize {
        match self {
            Payload::Binary(bytes) => bytes.len(),
            Payload::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_inbound(&self) -> InboundPayload {
        match self {
            Payload::Binary(bytes) => InboundPayload::Binary(bytes.to_vec()),
            Payload::Text(text) => InboundPayload::Text((*text).to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    Binary(Vec<u8>),
    Text(String),
}

impl InboundPayload {
    pub fn len(&self) -> usize {
        match self {
            InboundPayload::Binary(bytes) => bytes.len(),
            InboundPayload::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    FindMatch,
    JoinMatch,
    SendState,
    LeaveMatch,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Connect => "connect",
            Operation::FindMatch => "find match",
            Operation::JoinMatch => "join match",
            Operation::SendState => "send state",
            Operation::LeaveMatch => "leave match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,
    #[error("no match is active")]
    NoMatch,
    #[error("unknown match `{0}`")]
    UnknownMatch(String),
    #[error("transport has shut down")]
    Closed,
    #[error("request rejected: {0}")]
    Rejected(String),
}

pub trait Transport {
    fn connect(&mut self) -> Result<(), TransportError>;

    fn find_match(&mut self) -> Result<(), TransportError>;

    fn cancel_matchmaking(&mut self) -> Result<(), TransportError>;

    fn join_match(&mut self, token: &MatchToken) -> Result<(), TransportError>;

    fn send_state(
        &mut self,
        match_id: &MatchId,
        op_code: OpCode,
        payload: Payload<'_>,
    ) -> Result<(), TransportError>;

    fn leave_match(&mut self, match_id: &MatchId) -> Result<(), TransportError>;
}
