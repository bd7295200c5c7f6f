mod replay;

use hoarder_core::clock::Scheduler;
use hoarder_core::rng::SeededRng;
use hoarder_forest::{ForestSim, SimEvent};
use hoarder_forest::config::ForestConfig;
use hoarder_forest::save::DirStore;
use tracing_subscriber::EnvFilter;

use replay::{Replay, ReplayHost};

fn arg(prefix: &str) -> Option<String> {
    std::env::args()
        .skip(1)
        .find_map(|a| a.strip_prefix(prefix).map(String::from))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let replay_path = arg("--replay=").unwrap_or_else(|| "demos/first_day.json".to_string());
    let save_dir = arg("--save-dir=").unwrap_or_else(|| "saves".to_string());

    let replay = match std::fs::read_to_string(&replay_path)
        .map_err(|e| e.to_string())
        .and_then(|json| Replay::from_json(&json).map_err(|e| e.to_string()))
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to read replay {replay_path}: {e}");
            std::process::exit(1);
        },
    };

    let seed = arg("--seed=")
        .and_then(|s| s.parse::<u64>().ok())
        .or(replay.seed)
        .unwrap_or_else(|| SeededRng::from_entropy().seed());

    let config = ForestConfig::load();
    let mut store = DirStore::new(&save_dir);
    let mut sim = ForestSim::new(seed, config);
    if arg("--continue").is_some() && sim.try_load(&store) {
        tracing::info!("Continuing from {save_dir}");
    }

    tracing::info!(
        seed,
        frames = replay.total_frames(),
        "Forest Hoarder replay starting from {replay_path}"
    );

    let mut host = ReplayHost::new(sim);
    let mut scheduler = Scheduler::new();
    scheduler.start(0.0);
    let mut now = 0.0;
    'frames: for frame in &replay.frames {
        host.apply(frame);
        for _ in 0..frame.repeat {
            now += replay.frame_ms / 1000.0;
            scheduler.frame(now, &mut host);
            if host.sim.outcome().is_some() {
                scheduler.stop();
                break 'frames;
            }
        }
    }

    let kills = count(&host.events, |e| matches!(e, SimEvent::EnemyKilled { .. }));
    let items = count(&host.events, |e| matches!(e, SimEvent::ItemCollected { .. }));
    let snap = host.sim.snapshot(host.last_alpha);
    tracing::info!(
        ticks = host.sim.tick(),
        renders = host.renders,
        season = snap.season.name(),
        day = snap.day,
        clock = %snap.clock,
        health = snap.player.health,
        items,
        kills,
        pantry = host.sim.nest().total_food(),
        outcome = ?snap.outcome,
        "Replay finished"
    );

    match host.sim.outcome() {
        Some(_) => tracing::info!("Game over, save not written"),
        None => {
            if let Err(e) = host.sim.save(&mut store) {
                tracing::error!("Failed to save to {save_dir}: {e}");
                std::process::exit(1);
            }
        },
    }
}

fn count(events: &[SimEvent], pred: impl Fn(&SimEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}
