use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::ball::{Ball, BallState, serve_direction};
use super::score::{GoalScored, ScoreBoard};
use super::signal::SessionSignal;
use super::tick::FixedTimestep;
use crate::event::{Dispatcher, NetworkEvent};
use crate::net::{
    BallPacket, CodecError, DirectionAndPosition, InboundPayload, MatchId, MessageError,
    NetworkStats, OpCode, Operation, PacketReader, PaddlePacket, Payload, ScorePacket, SessionId,
    Transport, TransportError, VelocityAndPosition, WirePacket,
};
use crate::player::{PaddleInput, PaddleState, advance};
use crate::session::{PeerEntityMap, SessionResolver};
use crate::snapshot::{EntityHandle, World};
use crate::sync::{LocalStateBroadcaster, Predictor, RemotePaddle, SyncConfig};

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error("text payloads are not accepted for {0:?}")]
    UnsupportedText(OpCode),
}

// Paddle state waiting for the apply phase of the tick.
#[derive(Debug, Clone, Copy)]
enum PaddleUpdate {
    Timed(PaddlePacket),
    Untimed(PaddleState),
}

pub struct NetworkSession<T: Transport> {
    config: SyncConfig,
    transport: T,
    dispatcher: Dispatcher,
    inbox: VecDeque<NetworkEvent>,

    resolver: SessionResolver,
    peers: PeerEntityMap,
    world: World,
    match_id: Option<MatchId>,

    predictor: Predictor,
    pending_paddles: Vec<(EntityHandle, PaddleUpdate)>,
    paddle_broadcaster: LocalStateBroadcaster,
    ball_broadcaster: LocalStateBroadcaster,
    local_input: PaddleInput,

    ball: Ball,
    score: ScoreBoard,
    pending_goals: Vec<GoalScored>,
    rng: StdRng,

    timestep: FixedTimestep,
    clock: f32,

    signals: Vec<SessionSignal>,
    stats: NetworkStats,
}

impl<T: Transport> NetworkSession<T> {
    pub fn new(config: SyncConfig, dispatcher: Dispatcher, transport: T) -> Self {
        Self::with_rng(config, dispatcher, transport, StdRng::from_entropy())
    }

    pub fn with_seed(config: SyncConfig, dispatcher: Dispatcher, transport: T, seed: u64) -> Self {
        Self::with_rng(config, dispatcher, transport, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SyncConfig, dispatcher: Dispatcher, transport: T, rng: StdRng) -> Self {
        Self {
            resolver: SessionResolver::new(config.reelection),
            peers: PeerEntityMap::new(),
            world: World::new(),
            match_id: None,

            predictor: Predictor::new(&config),
            pending_paddles: Vec::new(),
            paddle_broadcaster: LocalStateBroadcaster::new(config.broadcast_rate),
            ball_broadcaster: LocalStateBroadcaster::new(config.broadcast_rate),
            local_input: PaddleInput::empty(),

            ball: Ball::new(&config.field),
            score: ScoreBoard::default(),
            pending_goals: Vec::new(),
            rng,

            timestep: FixedTimestep::new(config.tick_rate),
            clock: 0.0,

            signals: Vec::new(),
            stats: NetworkStats::default(),

            inbox: VecDeque::new(),
            dispatcher,
            transport,
            config,
        }
    }

    pub fn connect(&mut self) -> Result<(), TransportError> {
        self.transport.connect()
    }

    pub fn find_match(&mut self) -> Result<(), TransportError> {
        self.transport.find_match()
    }

    pub fn cancel_matchmaking(&mut self) -> Result<(), TransportError> {
        log::info!("Cancelling matchmaking");
        self.transport.cancel_matchmaking()
    }

    // Per-peer state is dropped before this returns.
    pub fn leave_match(&mut self) -> Result<(), TransportError> {
        let match_id = self.match_id.take().ok_or(TransportError::NoMatch)?;
        let result = self.transport.leave_match(&match_id);

        self.reset_match_state();
        self.resolver.clear();

        log::info!("Left match {}", match_id.0);
        self.signals.push(SessionSignal::MatchLeft { match_id });
        result
    }

    pub fn set_local_input(&mut self, input: PaddleInput) {
        self.local_input = input;
    }

    pub fn record_goal(&mut self, goal: GoalScored) -> bool {
        if !self.resolver.is_host() {
            log::debug!("Ignoring goal reported on a non-host peer");
            return false;
        }
        self.pending_goals.push(goal);
        true
    }

    pub fn toggle_prediction(&mut self) -> bool {
        let options = &mut self.config.options;
        options.enable_prediction = !options.enable_prediction;
        log::info!("Prediction {}", on_off(options.enable_prediction));
        options.enable_prediction
    }

    pub fn toggle_smoothing(&mut self) -> bool {
        let options = &mut self.config.options;
        options.enable_smoothing = !options.enable_smoothing;
        log::info!("Smoothing {}", on_off(options.enable_smoothing));
        options.enable_smoothing
    }

    pub fn drain_signals(&mut self) -> Vec<SessionSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn update(&mut self, frame_delta: f32) -> u32 {
        self.timestep.accumulate(frame_delta);

        let mut ticks_run = 0;
        while self.timestep.consume_tick() {
            self.tick();
            ticks_run += 1;
        }
        ticks_run
    }

    pub fn tick(&mut self) {
        let dt = self.timestep.dt();

        self.process_events();
        self.step_local_paddle(dt);
        self.update_shared_state(dt);
        self.broadcast_local_state(dt);
        self.apply_remote_packets();
        self.update_remote_paddles(dt);

        self.clock += dt;
        self.world.advance_tick();
    }

    fn process_events(&mut self) {
        self.dispatcher.drain_into(&mut self.inbox);
        while let Some(event) = self.inbox.pop_front() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Connected { session } => {
                log::info!("Connected as {}", session);
                self.resolver.set_local(session.clone());
                self.signals.push(SessionSignal::Connected { session });
            }
            NetworkEvent::MatchmakerMatched {
                token,
                self_session,
                users,
            } => self.handle_matchmaker_matched(&token, self_session, users),
            NetworkEvent::MatchJoined {
                match_id,
                self_session,
                presences,
            } => self.handle_match_joined(match_id, self_session, presences),
            NetworkEvent::PresenceChanged {
                match_id,
                joins,
                leaves,
            } => self.handle_presence_changed(&match_id, joins, leaves),
            NetworkEvent::StateReceived {
                sender,
                op_code,
                payload,
            } => self.handle_state(&sender, op_code, &payload),
            NetworkEvent::OperationFailed { operation, error } => {
                log::warn!("{} failed: {}", operation.as_str(), error);
                self.signals
                    .push(SessionSignal::OperationFailed { operation, error });
            }
        }
    }

    fn handle_matchmaker_matched(
        &mut self,
        token: &crate::net::MatchToken,
        self_session: SessionId,
        users: Vec<SessionId>,
    ) {
        log::info!("Matched with {} users", users.len());

        self.resolver.set_local(self_session);
        let host = self.resolver.elect_on_match(users).cloned();
        log::info!("Host is {}", host.as_ref().map_or("nobody", SessionId::as_str));
        self.signals.push(SessionSignal::HostChanged { host });

        if let Err(error) = self.transport.join_match(token) {
            log::warn!("Joining match failed: {}", error);
            self.signals.push(SessionSignal::OperationFailed {
                operation: Operation::JoinMatch,
                error,
            });
        }
    }

    fn handle_match_joined(
        &mut self,
        match_id: MatchId,
        self_session: SessionId,
        presences: Vec<SessionId>,
    ) {
        log::info!("Joined match {} with {} present", match_id.0, presences.len());

        self.resolver.set_local(self_session);
        self.match_id = Some(match_id.clone());
        self.signals.push(SessionSignal::MatchJoined { match_id });

        for session in presences {
            self.add_peer(session);
        }
    }

    fn handle_presence_changed(
        &mut self,
        match_id: &MatchId,
        joins: Vec<SessionId>,
        leaves: Vec<SessionId>,
    ) {
        if self.match_id.as_ref() != Some(match_id) {
            log::debug!("Ignoring presence for stale match {}", match_id.0);
            return;
        }

        for session in &leaves {
            if self.resolver.peer_left(session) {
                let host = self.resolver.host().cloned();
                log::info!(
                    "Host {} left, new host is {}",
                    session,
                    host.as_ref().map_or("nobody", SessionId::as_str)
                );
                self.signals.push(SessionSignal::HostChanged { host });
            }
        }
        for session in joins {
            self.add_peer(session);
        }
        for session in &leaves {
            self.remove_player(session);
        }
    }

    fn add_peer(&mut self, session: SessionId) {
        let had_host = self.resolver.host().is_some();
        self.resolver.peer_joined(session.clone());
        if !had_host && self.resolver.host().is_some() {
            let host = self.resolver.host().cloned();
            self.signals.push(SessionSignal::HostChanged { host });
        }
        self.spawn_player(session);
    }

    fn spawn_player(&mut self, session: SessionId) {
        if self.peers.contains(&session) {
            return;
        }

        let is_local = self.resolver.is_local(&session);
        let entity = self
            .world
            .spawn_paddle(session.clone(), is_local, &self.config.field);
        self.peers.insert(session.clone(), entity);

        if is_local {
            log::info!("Spawned local player {}", session);
            self.paddle_broadcaster.reset();
            self.signals
                .push(SessionSignal::LocalPlayerSpawned { session, entity });
        } else {
            log::info!("Spawned remote player {}", session);
            self.signals
                .push(SessionSignal::RemotePlayerSpawned { session, entity });
        }
    }

    fn remove_player(&mut self, session: &SessionId) {
        let Some(entity) = self.peers.remove(session) else {
            return;
        };

        self.world.despawn(entity);
        self.predictor.forget(entity);
        self.pending_paddles.retain(|(e, _)| *e != entity);

        log::info!("Removed player {}", session);
        self.signals.push(SessionSignal::PlayerRemoved {
            session: session.clone(),
            entity,
        });
    }

    fn handle_state(&mut self, sender: &SessionId, op_code: i64, payload: &InboundPayload) {
        self.stats.record_received(payload.len());

        let Some(entity) = self.peers.entity(sender) else {
            log::trace!("Dropping state from unknown session {}", sender);
            return;
        };
        if self.resolver.is_local(sender) {
            return;
        }
        let Some(op_code) = OpCode::from_raw(op_code) else {
            log::trace!("Ignoring unknown op code {}", op_code);
            return;
        };

        let result = match op_code {
            OpCode::PaddlePacket => decode_paddle(payload).map(|update| {
                self.pending_paddles.push((entity, update));
            }),
            OpCode::BallPacket => decode_ball(payload).map(|state| {
                if !self.resolver.is_host() {
                    self.ball.apply_remote(state);
                }
            }),
            OpCode::ScoreEvent => decode_binary::<ScorePacket>(op_code, payload).map(|packet| {
                if !self.resolver.is_host() && self.score.set_from_packet(&packet) {
                    self.signals.push(SessionSignal::ScoreChanged {
                        player1: self.score.player1,
                        player2: self.score.player2,
                    });
                }
            }),
        };

        if let Err(err) = result {
            self.stats.packets_dropped += 1;
            log::warn!("Dropping {:?} from {}: {}", op_code, sender, err);
        }
    }

    fn step_local_paddle(&mut self, dt: f32) {
        let input = self.local_input;
        let config = &self.config;
        if let Some(state) = self.world.local_paddle_mut() {
            *state = advance(state, input, dt, &config.paddle, &config.field);
        }
    }

    // The host simulates and publishes; everyone else follows.
    fn update_shared_state(&mut self, dt: f32) {
        let Some(match_id) = self.match_id.as_ref() else {
            return;
        };

        if !self.resolver.is_host() {
            self.pending_goals.clear();
            self.ball.follow_step(dt, &self.config.field);
            return;
        }

        if !self.ball.in_play() && self.world.entity_count() >= 2 {
            let direction = serve_direction(&mut self.rng, true);
            self.ball.serve(&self.config.field, direction);
            self.ball_broadcaster.reset();
        }

        let goal = self.ball.host_step(
            dt,
            self.world.entities().map(|e| *e.display_state()),
            &self.config.paddle,
            &self.config.field,
        );
        if let Some(goal) = goal {
            log::debug!("Goal {:?}", goal);
            self.pending_goals.push(goal);
            let direction = serve_direction(&mut self.rng, goal.player1_increment > 0);
            self.ball.serve(&self.config.field, direction);
            self.ball_broadcaster.reset();
        }

        if !self.pending_goals.is_empty() {
            for goal in self.pending_goals.drain(..) {
                self.score.apply(goal);
            }
            log::info!("Score {} - {}", self.score.player1, self.score.player2);
            self.signals.push(SessionSignal::ScoreChanged {
                player1: self.score.player1,
                player2: self.score.player2,
            });

            let packet = self.score.to_packet();
            let mut writer = crate::net::PacketWriter::new();
            match packet.write_to(&mut writer) {
                Ok(()) => publish(
                    &mut self.transport,
                    &mut self.stats,
                    &mut self.signals,
                    match_id,
                    OpCode::ScoreEvent,
                    Payload::Binary(writer.as_bytes()),
                ),
                Err(err) => log::warn!("Encoding score failed: {}", err),
            }
        }

        if !self.ball.in_play() {
            return;
        }
        let state = self.ball.state;
        match self.ball_broadcaster.update(dt, || state.to_packet()) {
            Ok(Some(bytes)) => publish(
                &mut self.transport,
                &mut self.stats,
                &mut self.signals,
                match_id,
                OpCode::BallPacket,
                Payload::Binary(bytes),
            ),
            Ok(None) => {}
            Err(err) => log::warn!("Encoding ball state failed: {}", err),
        }
    }

    fn broadcast_local_state(&mut self, dt: f32) {
        let (Some(match_id), Some(state)) = (self.match_id.as_ref(), self.world.local_paddle())
        else {
            return;
        };

        let state = *state;
        let clock = self.clock;
        match self.paddle_broadcaster.update(dt, || state.to_packet(clock)) {
            Ok(Some(bytes)) => publish(
                &mut self.transport,
                &mut self.stats,
                &mut self.signals,
                match_id,
                OpCode::PaddlePacket,
                Payload::Binary(bytes),
            ),
            Ok(None) => {}
            Err(err) => log::warn!("Encoding paddle state failed: {}", err),
        }
    }

    fn apply_remote_packets(&mut self) {
        let clock = self.clock;
        for (entity, update) in self.pending_paddles.drain(..) {
            let Some(remote) = self.world.remote_paddle_mut(entity) else {
                continue;
            };
            match update {
                PaddleUpdate::Timed(packet) => {
                    self.predictor
                        .apply_packet(entity, remote, &packet, clock, &self.config);
                }
                PaddleUpdate::Untimed(state) => {
                    self.predictor
                        .apply_untimed(entity, remote, state, &self.config);
                }
            }
        }
    }

    fn update_remote_paddles(&mut self, dt: f32) {
        let decay = self.config.smoothing_decay();
        let predict = self.config.options.enable_prediction;
        let config = &self.config;
        for (_, remote) in self.world.remote_paddles_mut() {
            remote.update(decay, predict, dt, &config.paddle, &config.field);
        }
    }

    fn reset_match_state(&mut self) {
        self.peers.clear();
        self.world.clear();
        self.predictor.clear();
        self.pending_paddles.clear();
        self.pending_goals.clear();
        self.ball.reset(&self.config.field);
        self.score.reset();
        self.paddle_broadcaster.reset();
        self.ball_broadcaster.reset();
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn local_session(&self) -> Option<&SessionId> {
        self.resolver.local()
    }

    pub fn host(&self) -> Option<&SessionId> {
        self.resolver.host()
    }

    pub fn is_host(&self) -> bool {
        self.resolver.is_host()
    }

    pub fn match_id(&self) -> Option<&MatchId> {
        self.match_id.as_ref()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn peer_entity(&self, session: &SessionId) -> Option<EntityHandle> {
        self.peers.entity(session)
    }

    pub fn local_paddle(&self) -> Option<&PaddleState> {
        self.world.local_paddle()
    }

    pub fn remote_paddle(&self, session: &SessionId) -> Option<&RemotePaddle> {
        self.world.get(self.peers.entity(session)?)?.remote()
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn score(&self) -> ScoreBoard {
        self.score
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }
}

fn publish<T: Transport>(
    transport: &mut T,
    stats: &mut NetworkStats,
    signals: &mut Vec<SessionSignal>,
    match_id: &MatchId,
    op_code: OpCode,
    payload: Payload<'_>,
) {
    match transport.send_state(match_id, op_code, payload) {
        Ok(()) => stats.record_sent(payload.len()),
        Err(error) => {
            stats.send_failures += 1;
            log::warn!("Sending {:?} failed: {}", op_code, error);
            signals.push(SessionSignal::OperationFailed {
                operation: Operation::SendState,
                error,
            });
        }
    }
}

fn decode_binary<P: WirePacket>(op_code: OpCode, payload: &InboundPayload) -> Result<P, PayloadError> {
    match payload {
        InboundPayload::Binary(bytes) => Ok(P::decode(&mut PacketReader::new(bytes))?),
        InboundPayload::Text(_) => Err(PayloadError::UnsupportedText(op_code)),
    }
}

// Text paddle messages carry no input flags and no send time.
fn decode_paddle(payload: &InboundPayload) -> Result<PaddleUpdate, PayloadError> {
    match payload {
        InboundPayload::Binary(bytes) => Ok(PaddleUpdate::Timed(PaddlePacket::decode(
            &mut PacketReader::new(bytes),
        )?)),
        InboundPayload::Text(text) => {
            let message = VelocityAndPosition::from_json(text)?;
            Ok(PaddleUpdate::Untimed(PaddleState {
                position: message.position,
                velocity: message.velocity,
                move_up: false,
                move_down: false,
            }))
        }
    }
}

fn decode_ball(payload: &InboundPayload) -> Result<BallState, PayloadError> {
    match payload {
        InboundPayload::Binary(bytes) => {
            let packet = BallPacket::decode(&mut PacketReader::new(bytes))?;
            Ok(BallState::from_packet(&packet))
        }
        InboundPayload::Text(text) => {
            let message = DirectionAndPosition::from_json(text)?;
            Ok(BallState::from_message(&message))
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
