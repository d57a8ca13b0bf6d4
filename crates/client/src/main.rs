mod config;
mod driver;

use anyhow::Result;
use clap::Parser;

use config::DriverConfig;

#[derive(Parser)]
#[command(name = "rally")]
#[command(about = "Runs two paddle peers against an in-process relay and reports sync quality")]
pub struct Args {
    #[arg(short, long, default_value_t = 10.0, help = "Seconds to run")]
    seconds: f32,

    #[arg(long, default_value_t = 144, help = "Frames per second each peer renders")]
    frame_rate: u32,

    #[arg(short, long, default_value_t = rally::DEFAULT_TICK_RATE)]
    tick_rate: u32,

    #[arg(short, long, default_value_t = rally::DEFAULT_BROADCAST_RATE, help = "State packets per second")]
    broadcast_rate: u32,

    #[arg(long, default_value_t = 50, help = "Assumed one-way latency in ms")]
    baseline_latency_ms: u32,

    #[arg(long, default_value_t = 50, help = "Simulated one-way latency in ms")]
    latency: u32,

    #[arg(long, default_value_t = 0, help = "Jitter in ms")]
    jitter: u32,

    #[arg(long, default_value_t = 0.0, help = "Packet loss percentage (0-100)")]
    loss_percent: f32,

    #[arg(long)]
    no_prediction: bool,

    #[arg(long)]
    no_smoothing: bool,

    #[arg(long, help = "Re-elect the greatest session id when the host leaves")]
    greatest_reelection: bool,

    #[arg(long, help = "Seed for loss, jitter and serve rolls")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = DriverConfig::from_args(&args)?;
    log::info!(
        "Running {:.1}s at {} fps, link {:?}, prediction {}, smoothing {}",
        config.duration.as_secs_f32(),
        config.frame_rate,
        config.conditions,
        config.sync.options.enable_prediction,
        config.sync.options.enable_smoothing
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let reports = runtime.block_on(driver::run(config))?;

    for report in reports {
        log::info!(
            "{}: {} ticks{}, display error mean {:.2} max {:.2}, score {}-{}, sent {} ({} bytes), received {}, dropped {}",
            report.name,
            report.ticks,
            if report.was_host { " as host" } else { "" },
            report.mean_error,
            report.max_error,
            report.score.player1,
            report.score.player2,
            report.stats.packets_sent,
            report.stats.bytes_sent,
            report.stats.packets_received,
            report.stats.packets_dropped
        );
    }

    Ok(())
}
