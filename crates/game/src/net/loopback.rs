use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::protocol::OpCode;
use super::stats::LinkConditions;
use super::transport::{
    MatchId, MatchToken, Payload, SessionId, Transport, TransportError,
};
use crate::event::{DispatchSender, NetworkEvent};

#[derive(Debug)]
struct Delivery {
    release_at: Duration,
    sequence: u64,
    recipient: SessionId,
    event: NetworkEvent,
}

impl PartialEq for Delivery {
    fn eq(&self, other: &Self) -> bool {
        self.release_at == other.release_at && self.sequence == other.sequence
    }
}

impl Eq for Delivery {}

impl PartialOrd for Delivery {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Delivery {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .release_at
            .cmp(&self.release_at)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Debug)]
struct Peer {
    sender: DispatchSender,
    conditions: LinkConditions,
    connected: bool,
}

#[derive(Debug)]
struct HubState {
    clock: Duration,
    rng: StdRng,
    match_size: usize,
    next_match: u32,
    next_sequence: u64,
    peers: HashMap<SessionId, Peer>,
    matchmaking: Vec<SessionId>,
    tickets: HashMap<MatchToken, MatchId>,
    matches: HashMap<MatchId, Vec<SessionId>>,
    in_flight: BinaryHeap<Delivery>,
}

impl HubState {
    fn notify(&self, recipient: &SessionId, event: NetworkEvent) {
        if let Some(peer) = self.peers.get(recipient) {
            peer.sender.send(event);
        }
    }

    fn require_connected(&self, session: &SessionId) -> Result<(), TransportError> {
        match self.peers.get(session) {
            Some(peer) if peer.connected => Ok(()),
            Some(_) => Err(TransportError::NotConnected),
            None => Err(TransportError::Closed),
        }
    }

    fn remove_from_match(&mut self, match_id: &MatchId, session: &SessionId) -> bool {
        let Some(members) = self.matches.get_mut(match_id) else {
            return false;
        };
        let Some(index) = members.iter().position(|m| m == session) else {
            return false;
        };
        members.remove(index);

        let remaining = members.clone();
        if remaining.is_empty() {
            self.matches.remove(match_id);
        }
        for member in &remaining {
            self.notify(
                member,
                NetworkEvent::PresenceChanged {
                    match_id: match_id.clone(),
                    joins: Vec::new(),
                    leaves: vec![session.clone()],
                },
            );
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct LoopbackHub {
    state: Arc<Mutex<HubState>>,
}

impl LoopbackHub {
    pub fn new(match_size: usize) -> Self {
        Self::with_rng(match_size, StdRng::from_entropy())
    }

    pub fn with_seed(match_size: usize, seed: u64) -> Self {
        Self::with_rng(match_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(match_size: usize, rng: StdRng) -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                clock: Duration::ZERO,
                rng,
                match_size: match_size.max(1),
                next_match: 1,
                next_sequence: 0,
                peers: HashMap::new(),
                matchmaking: Vec::new(),
                tickets: HashMap::new(),
                matches: HashMap::new(),
                in_flight: BinaryHeap::new(),
            })),
        }
    }

    pub fn transport(&self, session: impl Into<SessionId>, sender: DispatchSender) -> LoopbackTransport {
        let session = session.into();
        self.lock().peers.insert(
            session.clone(),
            Peer {
                sender,
                conditions: LinkConditions::perfect(),
                connected: false,
            },
        );
        LoopbackTransport {
            hub: self.clone(),
            session,
        }
    }

    pub fn set_conditions(&self, session: &SessionId, conditions: LinkConditions) {
        if let Some(peer) = self.lock().peers.get_mut(session) {
            peer.conditions = conditions;
        }
    }

    pub fn pump(&self, elapsed: Duration) -> usize {
        let mut state = self.lock();
        state.clock += elapsed;

        let mut delivered = 0;
        while state
            .in_flight
            .peek()
            .is_some_and(|d| d.release_at <= state.clock)
        {
            let Some(delivery) = state.in_flight.pop() else {
                break;
            };
            state.notify(&delivery.recipient, delivery.event);
            delivered += 1;
        }
        delivered
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight.len()
    }

    pub fn disconnect(&self, session: &SessionId) {
        let mut state = self.lock();
        state.matchmaking.retain(|s| s != session);

        let joined: Vec<MatchId> = state
            .matches
            .iter()
            .filter(|(_, members)| members.contains(session))
            .map(|(id, _)| id.clone())
            .collect();
        for match_id in joined {
            state.remove_from_match(&match_id, session);
        }

        if let Some(peer) = state.peers.get_mut(session) {
            peer.connected = false;
        }
        log::debug!("loopback: {} disconnected", session);
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    hub: LoopbackHub,
    session: SessionId,
}

impl LoopbackTransport {
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn hub(&self) -> &LoopbackHub {
        &self.hub
    }
}

impl Transport for LoopbackTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        let mut state = self.hub.lock();
        let peer = state
            .peers
            .get_mut(&self.session)
            .ok_or(TransportError::Closed)?;
        peer.connected = true;
        peer.sender.send(NetworkEvent::Connected {
            session: self.session.clone(),
        });
        Ok(())
    }

    fn find_match(&mut self) -> Result<(), TransportError> {
        let mut state = self.hub.lock();
        state.require_connected(&self.session)?;

        if !state.matchmaking.contains(&self.session) {
            state.matchmaking.push(self.session.clone());
        }
        if state.matchmaking.len() < state.match_size {
            return Ok(());
        }

        let size = state.match_size;
        let users: Vec<SessionId> = state.matchmaking.drain(..size).collect();
        let match_id = MatchId(format!("match-{}", state.next_match));
        let token = MatchToken(format!("ticket-{}", state.next_match));
        state.next_match += 1;

        state.tickets.insert(token.clone(), match_id.clone());
        state.matches.insert(match_id, Vec::new());

        for user in &users {
            state.notify(
                user,
                NetworkEvent::MatchmakerMatched {
                    token: token.clone(),
                    self_session: user.clone(),
                    users: users.clone(),
                },
            );
        }
        Ok(())
    }

    fn cancel_matchmaking(&mut self) -> Result<(), TransportError> {
        let mut state = self.hub.lock();
        state.matchmaking.retain(|s| s != &self.session);
        Ok(())
    }

    fn join_match(&mut self, token: &MatchToken) -> Result<(), TransportError> {
        let mut state = self.hub.lock();
        state.require_connected(&self.session)?;

        let match_id = state
            .tickets
            .get(token)
            .cloned()
            .ok_or_else(|| TransportError::UnknownMatch(token.0.clone()))?;
        let members = state
            .matches
            .get_mut(&match_id)
            .ok_or_else(|| TransportError::UnknownMatch(match_id.0.clone()))?;

        if !members.contains(&self.session) {
            members.push(self.session.clone());
        }
        let presences = members.clone();

        for member in presences.iter().filter(|m| **m != self.session) {
            state.notify(
                member,
                NetworkEvent::PresenceChanged {
                    match_id: match_id.clone(),
                    joins: vec![self.session.clone()],
                    leaves: Vec::new(),
                },
            );
        }
        state.notify(
            &self.session,
            NetworkEvent::MatchJoined {
                match_id,
                self_session: self.session.clone(),
                presences,
            },
        );
        Ok(())
    }

    fn send_state(
        &mut self,
        match_id: &MatchId,
        op_code: OpCode,
        payload: Payload<'_>,
    ) -> Result<(), TransportError> {
        let mut state = self.hub.lock();
        state.require_connected(&self.session)?;

        let recipients: Vec<SessionId> = state
            .matches
            .get(match_id)
            .ok_or_else(|| TransportError::UnknownMatch(match_id.0.clone()))?
            .iter()
            .filter(|m| **m != self.session)
            .cloned()
            .collect();

        let HubState {
            clock,
            rng,
            peers,
            in_flight,
            next_sequence,
            ..
        } = &mut *state;

        for recipient in recipients {
            let Some(peer) = peers.get(&recipient) else {
                continue;
            };
            if peer.conditions.should_drop(rng) {
                log::trace!("loopback: dropped {:?} for {}", op_code, recipient);
                continue;
            }
            let release_at = *clock + peer.conditions.delay(rng);
            in_flight.push(Delivery {
                release_at,
                sequence: *next_sequence,
                recipient,
                event: NetworkEvent::StateReceived {
                    sender: self.session.clone(),
                    op_code: op_code.raw(),
                    payload: payload.to_inbound(),
                },
            });
            *next_sequence += 1;
        }
        Ok(())
    }

    fn leave_match(&mut self, match_id: &MatchId) -> Result<(), TransportError> {
        let mut state = self.hub.lock();
        if state.remove_from_match(match_id, &self.session) {
            Ok(())
        } else {
            Err(TransportError::UnknownMatch(match_id.0.clone()))
        }
    }
}
