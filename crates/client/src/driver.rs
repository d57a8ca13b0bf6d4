use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use glam::Vec2;
use rally::{
    Dispatcher, LoopbackHub, LoopbackTransport, NetworkSession, NetworkStats, PaddleInput,
    RollingAverage, ScoreBoard, SessionId, SessionSignal, TransportError,
};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::DriverConfig;

const PEER_NAMES: [&str; 2] = ["peer-a", "peer-b"];

/// Dead zone for the paddle bot, in field units.
const CHASE_DEADBAND: f32 = 6.0;

/// Samples kept for the windowed display-error mean.
const ERROR_WINDOW: usize = 600;

#[derive(Debug)]
pub struct PeerReport {
    pub name: &'static str,
    pub ticks: u64,
    pub mean_error: f32,
    pub max_error: f32,
    pub was_host: bool,
    pub score: ScoreBoard,
    pub stats: NetworkStats,
}

/// How far this peer's view of the remote paddle is from where the remote
/// peer actually has it.
struct TrackingError {
    window: RollingAverage,
    max: f32,
}

impl TrackingError {
    fn new() -> Self {
        Self {
            window: RollingAverage::new(ERROR_WINDOW),
            max: 0.0,
        }
    }

    fn record(&mut self, error: f32) {
        self.window.add_value(error);
        self.max = self.max.max(error);
    }
}

pub async fn run(config: DriverConfig) -> anyhow::Result<Vec<PeerReport>> {
    let hub = match config.seed {
        Some(seed) => LoopbackHub::with_seed(PEER_NAMES.len(), seed),
        None => LoopbackHub::new(PEER_NAMES.len()),
    };

    let running = Arc::new(AtomicBool::new(true));
    let pump = tokio::spawn(pump_hub(hub.clone(), Arc::clone(&running)));

    let (a_tx, a_rx) = watch::channel(None);
    let (b_tx, b_rx) = watch::channel(None);
    let channels = [(a_tx, b_rx), (b_tx, a_rx)];

    let mut peers = Vec::with_capacity(PEER_NAMES.len());
    for ((name, (own, other)), index) in PEER_NAMES.into_iter().zip(channels).zip(0u64..) {
        let dispatcher = Dispatcher::new();
        let transport = hub.transport(name, dispatcher.sender());
        hub.set_conditions(&SessionId::from(name), config.conditions.clone());

        let session = match config.seed {
            Some(seed) => NetworkSession::with_seed(
                config.sync.clone(),
                dispatcher,
                transport,
                seed.wrapping_add(index),
            ),
            None => NetworkSession::new(config.sync.clone(), dispatcher, transport),
        };
        peers.push(tokio::spawn(run_peer(
            name,
            session,
            own,
            other,
            config.clone(),
        )));
    }

    let mut reports = Vec::with_capacity(peers.len());
    for peer in peers {
        reports.push(peer.await??);
    }

    running.store(false, Ordering::SeqCst);
    pump.await?;
    Ok(reports)
}

/// Releases in-flight relay traffic in real time, off the peers' threads.
async fn pump_hub(hub: LoopbackHub, running: Arc<AtomicBool>) {
    let mut interval = tokio::time::interval(Duration::from_millis(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    while running.load(Ordering::SeqCst) {
        interval.tick().await;
        let now = Instant::now();
        hub.pump(now - last);
        last = now;
    }
}

async fn run_peer(
    name: &'static str,
    mut session: NetworkSession<LoopbackTransport>,
    own_position: watch::Sender<Option<Vec2>>,
    remote_truth: watch::Receiver<Option<Vec2>>,
    config: DriverConfig,
) -> anyhow::Result<PeerReport> {
    session.connect()?;
    session.find_match()?;

    let mut interval = tokio::time::interval(Duration::from_secs_f32(1.0 / config.frame_rate as f32));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let start = Instant::now();
    let mut last = start;
    let mut last_report = start;
    let mut ticks = 0u64;
    let mut was_host = false;
    let mut tracking = TrackingError::new();

    loop {
        interval.tick().await;
        let now = Instant::now();

        session.set_local_input(chase_ball(&session));
        ticks += u64::from(session.update((now - last).as_secs_f32()));
        last = now;

        for signal in session.drain_signals() {
            log_signal(name, &signal);
        }
        was_host |= session.is_host();

        if let Some(paddle) = session.local_paddle() {
            own_position.send_replace(Some(paddle.position));
        }
        let truth = *remote_truth.borrow();
        if let (Some(truth), Some(display)) = (truth, remote_display(&session)) {
            tracking.record(display.distance(truth));
        }

        if now - last_report >= config.report_interval {
            last_report = now;
            log::info!(
                "{}: display error {:.2} (max {:.2}), score {}-{}",
                name,
                tracking.window.average_value(),
                tracking.max,
                session.score().player1,
                session.score().player2
            );
        }

        if now - start >= config.duration {
            break;
        }
    }

    match session.leave_match() {
        Ok(()) | Err(TransportError::NoMatch) => {}
        Err(err) => log::warn!("{}: leaving match failed: {}", name, err),
    }

    Ok(PeerReport {
        name,
        ticks,
        mean_error: tracking.window.average_value(),
        max_error: tracking.max,
        was_host,
        score: session.score(),
        stats: session.stats().clone(),
    })
}

fn remote_display(session: &NetworkSession<LoopbackTransport>) -> Option<Vec2> {
    session
        .world()
        .entities()
        .find_map(|e| e.remote())
        .map(|remote| remote.display.position)
}

/// Follows the ball while it is heading toward this peer's side.
fn chase_ball(session: &NetworkSession<LoopbackTransport>) -> PaddleInput {
    let Some(paddle) = session.local_paddle() else {
        return PaddleInput::empty();
    };
    let ball = session.ball();
    let field = &session.config().field;

    let on_left = paddle.position.x < field.width * 0.5;
    let heading_left = ball.state.direction.cos() < 0.0;
    let target = if ball.in_play() && on_left == heading_left {
        ball.display.y
    } else {
        field.height * 0.5
    };

    let gap = target - paddle.position.y;
    if gap < -CHASE_DEADBAND {
        PaddleInput::MOVE_UP
    } else if gap > CHASE_DEADBAND {
        PaddleInput::MOVE_DOWN
    } else {
        PaddleInput::empty()
    }
}

fn log_signal(name: &str, signal: &SessionSignal) {
    match signal {
        SessionSignal::HostChanged { host } => log::info!(
            "{}: host is {}",
            name,
            host.as_ref().map_or("nobody", SessionId::as_str)
        ),
        SessionSignal::ScoreChanged { player1, player2 } => {
            log::info!("{}: score {}-{}", name, player1, player2)
        }
        SessionSignal::OperationFailed { operation, error } => {
            log::warn!("{}: {} failed: {}", name, operation.as_str(), error)
        }
        other => log::debug!("{}: {:?}", name, other),
    }
}
