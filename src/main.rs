//! Session replay demo - Main Entry Point
//!
//! Replays a stored session headlessly: transcript turns print as playback
//! reaches them, score overlays appear and disappear on their windows, and
//! a performance summary closes the run.
//!
//! Usage: `replaysync-rs <sessions-root> <session-id>`

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use replaysync_rs::{
    config::{default_config_path, ReplayConfig},
    engine::{EngineEvent, PositionThrottle, SyncEngine},
    player::{PlayerEvent, SimulatedPlayer, SimulatedPlayerConfig},
    session::{best_moment, worst_moment},
    store::{FsEventLogStore, FsMediaStore},
    types::format_time,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,replaysync_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let root = args.next().context("usage: replaysync-rs <sessions-root> <session-id>")?;
    let session_id = args.next().context("usage: replaysync-rs <sessions-root> <session-id>")?;

    let config = match default_config_path() {
        Some(path) => ReplayConfig::load_or_default(path),
        None => ReplayConfig::default(),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(&root, &session_id, config))
}

async fn run(root: &str, session_id: &str, config: ReplayConfig) -> anyhow::Result<()> {
    tracing::info!(session_id, "starting session replay");

    // Peek at the manifest for the media length the simulation should cover;
    // the engine itself resolves duration during open()
    let manifest_duration = peek_declared_duration(root, session_id).await?;

    let mut player = SimulatedPlayer::new(SimulatedPlayerConfig {
        duration_seconds: manifest_duration,
        tick_interval: Duration::from_millis(50),
        ..Default::default()
    });
    let ticks = player.events();
    player.start_ticker();

    let engine = SyncEngine::new(
        Arc::new(FsEventLogStore::new(root)),
        Arc::new(FsMediaStore::new(root)),
        Box::new(player),
        config.clone(),
    )?;
    let signals = engine.subscribe();

    engine.open(session_id).await?;
    let session = engine.session().context("session should be loaded")?;
    println!(
        "Session {} | {} turns | {}",
        session.session_id,
        session.event_count(),
        format_time(session.media_duration_seconds),
    );

    engine.toggle_play();

    let mut throttle = PositionThrottle::from_settings(&config.playback);
    let mut last_overlay_index: Option<usize> = None;

    loop {
        match ticks.recv_timeout(Duration::from_secs(2)) {
            Ok(PlayerEvent::Position(position)) => {
                if !throttle.accept(Instant::now()) {
                    continue;
                }
                engine.on_position_update(position);

                // Print transcript turns as they become active
                while let Ok(signal) = signals.try_recv() {
                    if let EngineEvent::ActiveEventChanged(change) = signal {
                        if let Some(event) = change.current.and_then(|_| engine.active_event()) {
                            println!(
                                "[{}] {:>11}: {}",
                                format_time(event.time),
                                event.role.to_string(),
                                event.text
                            );
                        }
                    }
                }

                // Surface overlay edges, not every tick inside the window
                let overlay = engine.overlay();
                let overlay_index = overlay.as_ref().map(|m| m.index);
                if overlay_index != last_overlay_index {
                    if let Some(moment) = &overlay {
                        println!(
                            "        >>> score {} ({}) - {}",
                            moment.score,
                            moment.band().label(),
                            moment.preview_text(100)
                        );
                    }
                    last_overlay_index = overlay_index;
                }
            }
            Ok(PlayerEvent::Ended) => {
                tracing::info!("playback reached the end");
                break;
            }
            Ok(PlayerEvent::Error(message)) => {
                engine.on_player_error(message);
                break;
            }
            Err(_) => {
                tracing::warn!("player went quiet, stopping");
                break;
            }
        }
    }

    let metrics = engine.metrics();
    println!("\nPerformance summary");
    println!("  feedback count: {}", metrics.feedback_count);
    if metrics.feedback_count > 0 {
        println!("  average score:  {}", metrics.average);
        println!("  highest score:  {}", metrics.highest);
        println!("  lowest score:   {}", metrics.lowest);
        println!("  trend:          {}", metrics.trend);

        if let Some(session) = engine.session() {
            let moments = session.timeline.moments();
            if let Some(best) = best_moment(moments) {
                println!("  best moment:    {} at {}", best.score, format_time(best.time));
            }
            if let Some(worst) = worst_moment(moments) {
                println!("  needs work:     {} at {}", worst.score, format_time(worst.time));
            }
        }
    }

    engine.close();
    Ok(())
}

/// Read the declared duration from the recording manifest so the simulated
/// player covers the same span the real recording would
async fn peek_declared_duration(root: &str, session_id: &str) -> anyhow::Result<f64> {
    let path = std::path::Path::new(root)
        .join(session_id)
        .join(replaysync_rs::store::fs::RECORDING_MANIFEST_FILE);
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {:?}", path))?;
    let manifest: replaysync_rs::store::fs::RecordingManifest = serde_json::from_str(&raw)?;
    Ok(manifest.duration_seconds)
}
