//! Synthetic tracker
//!
//! Streams a waving figure that steps in front of the "camera" for a few
//! seconds, then leaves, on a loop.
//!
//! Usage: mimic-sender [target_addr] [gender]

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use mimic_core::Gender;
use mimic_demo::waving_landmarks;
use mimic_runtime::{init_logging, LogConfig};
use mimic_tracker::TrackerPipeline;
use mimic_transport::{default_target, PoseSender};

const FRAME_RATE_HZ: u64 = 30;
const VISIBLE_SECS: f32 = 6.0;
const ABSENT_SECS: f32 = 2.0;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LogConfig::default())?;

    let args: Vec<String> = std::env::args().collect();
    let target: SocketAddr = match args.get(1) {
        Some(addr) => addr.parse()?,
        None => default_target(),
    };
    let gender = args.get(2).map(|g| Gender::parse(g)).unwrap_or(Gender::Female);

    let sender = PoseSender::new(target).await?;
    let mut pipeline = TrackerPipeline::default();
    info!(%target, %gender, "streaming synthetic pose");

    let start = Instant::now();
    let mut interval = tokio::time::interval(Duration::from_micros(1_000_000 / FRAME_RATE_HZ));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                let now = Instant::now();
                let t = now.duration_since(start).as_secs_f32();
                let visible = t % (VISIBLE_SECS + ABSENT_SECS) < VISIBLE_SECS;
                let landmarks = visible.then(|| waving_landmarks(t));

                if let Some(frame) = pipeline.process(landmarks.as_ref(), gender, now) {
                    if let Err(e) = sender.send(&frame).await {
                        debug!("send failed: {}", e);
                    }
                }
            }
        }
    }

    Ok(())
}
