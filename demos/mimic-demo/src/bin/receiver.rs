//! Headless pose receiver
//!
//! Listens for tracker datagrams and drives an in-memory avatar at a fixed
//! tick rate, logging what the avatar is doing.
//!
//! Usage: mimic-receiver [config.toml]

use std::time::Duration;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use mimic_core::HumanBone;
use mimic_demo::{segment_direction, DemoCatalog, HeadlessScene};
use mimic_rig::Skeleton;
use mimic_runtime::{init_logging, LifecycleManager, PoseRuntime, RuntimeConfig};
use mimic_transport::PoseIngestor;

const TICK_RATE_HZ: u64 = 60;
const REPORT_EVERY: u64 = TICK_RATE_HZ;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => RuntimeConfig::load_or_default(path),
        None => RuntimeConfig::default(),
    };
    init_logging(&config.logging)?;

    let ingestor = PoseIngestor::start(&config.ingest());
    let lifecycle = LifecycleManager::new(DemoCatalog::default(), HeadlessScene::default(), StdRng::from_entropy())
        .with_placement(config.placement())
        .with_mapper_config(config.mapper());
    let mut runtime = PoseRuntime::new(Box::new(ingestor), lifecycle);

    let mut interval = tokio::time::interval(Duration::from_micros(1_000_000 / TICK_RATE_HZ));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                runtime.tick();
                if runtime.stats().ticks % REPORT_EVERY == 0 {
                    report(&runtime);
                }
            }
        }
    }

    runtime.shutdown();
    let stats = runtime.stats();
    info!(
        ticks = stats.ticks,
        messages = stats.messages_processed,
        spawns = stats.spawns,
        despawns = stats.despawns,
        "receiver stopped"
    );
    Ok(())
}

fn report(runtime: &PoseRuntime<DemoCatalog, HeadlessScene, StdRng>) {
    let Some(active) = runtime.lifecycle().active() else {
        info!(messages = runtime.stats().messages_processed, "waiting for a person");
        return;
    };

    let chest = active.avatar.rig.rotation(HumanBone::Chest).map(|r| r * Vec3::Z);
    let arm = |bone| segment_direction(&active.avatar, bone);
    info!(
        avatar = %active.avatar.name,
        gender = %active.gender,
        chest_forward = ?chest,
        left_upper_arm = ?arm(HumanBone::LeftUpperArm),
        right_upper_arm = ?arm(HumanBone::RightUpperArm),
        right_lower_arm = ?arm(HumanBone::RightLowerArm),
        "avatar pose"
    );
}
