//! Arena - headless blob arena runner
//!
//! Runs the simulation at its frame rate with the autopilot standing in for
//! the pointer and keyboard. Set `ARENA_TICKS` to stop after that many
//! ticks; otherwise runs until Ctrl-C.

use glam::Vec2;
use sim::ai::Autopilot;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Blob Arena v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = sim::Config::load()?;
    info!("Loaded configuration");
    info!("  World: {}x{}", config.world.width, config.world.height);
    info!("  Max food: {}", config.food.max_food);
    info!("  Max cells: {}", config.player.max_cells);
    info!("  Tick interval: {}ms", config.runtime.tick_interval_ms);

    let max_ticks: Option<u64> = std::env::var("ARENA_TICKS")
        .ok()
        .and_then(|v| v.parse().ok());

    let home = Vec2::new(config.world.width / 2.0, config.world.height / 2.0);
    let mut pilot = Autopilot::new(home);

    let driver = sim::Driver::spawn(config);
    let mut frames = driver.subscribe();
    let inputs = driver.inputs.clone();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last_frame = None;
    'run: loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Ctrl-C received, shutting down");
                break;
            }
            received = frames.recv() => {
                let frame = match received {
                    Ok(frame) => frame,
                    Err(RecvError::Lagged(n)) => {
                        warn!("Autopilot lagged behind by {} frames", n);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                for packet in pilot.update(&frame) {
                    if inputs.send(packet).await.is_err() {
                        break 'run;
                    }
                }

                let done = max_ticks.is_some_and(|m| frame.tick >= m);
                last_frame = Some(frame);
                if done {
                    break;
                }
            }
        }
    }

    let state = driver.shutdown().await?;
    info!(
        "Finished after {} ticks: mass {:.2}, {} cells, {} food left",
        state.tick_count,
        state.player.total_mass(),
        state.player.cells.len(),
        state.food.len()
    );
    if let Some(frame) = last_frame {
        let encoded = frame.build();
        info!(
            "Last frame: {} circles, {} bytes on the wire",
            frame.circles.len(),
            encoded.len()
        );
    }

    Ok(())
}
