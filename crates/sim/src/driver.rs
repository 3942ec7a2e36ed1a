//! Frame clock, respawn timer and input queue around a [`SimulationState`].
//!
//! The loop task is the only owner of the state. Input arrives over an mpsc
//! channel and is queued for the next tick; the respawn timer queues a
//! `Respawn` input the same way, so no mutation ever happens between the
//! steps of a tick. Frames go out over a broadcast channel.

use crate::config::Config;
use crate::simulation::SimulationState;
use futures_util::FutureExt;
use protocol::packets::{Frame, InputPacket};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

/// Capacity of the input queue.
const INPUT_CAPACITY: usize = 256;
/// Frames buffered for slow subscribers before they start lagging.
const FRAME_CAPACITY: usize = 64;

/// Handle to a running simulation loop.
pub struct Driver {
    /// Send pointer/split input here.
    pub inputs: mpsc::Sender<InputPacket>,
    frames: broadcast::Sender<Frame>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<SimulationState>,
}

impl Driver {
    /// Build the world from `config` and start ticking it.
    pub fn spawn(config: Config) -> Self {
        let state = SimulationState::new(config);
        Self::spawn_with_state(state)
    }

    /// Start ticking an existing state.
    pub fn spawn_with_state(state: SimulationState) -> Self {
        let (input_tx, input_rx) = mpsc::channel(INPUT_CAPACITY);
        let (frame_tx, _) = broadcast::channel(FRAME_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run_loop(state, input_rx, frame_tx.clone(), shutdown_rx));

        Self {
            inputs: input_tx,
            frames: frame_tx,
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Receive every frame published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.frames.subscribe()
    }

    /// Stop ticking and hand back the final state.
    pub async fn shutdown(self) -> anyhow::Result<SimulationState> {
        let _ = self.shutdown.send(true);
        Ok(self.task.await?)
    }
}

/// Run the simulation until `shutdown` flips to true or its sender is dropped.
pub async fn run_loop(
    mut state: SimulationState,
    mut inputs: mpsc::Receiver<InputPacket>,
    frames: broadcast::Sender<Frame>,
    mut shutdown: watch::Receiver<bool>,
) -> SimulationState {
    // Both timers are capped at `MAX_TIMER`, so `start + period` stays in range
    let tick_interval = state.config.runtime.tick_interval();
    let respawn_interval = state.config.food.respawn_interval();
    let stats_every = state.config.runtime.stats_every_ticks;

    let start = Instant::now();
    let mut ticker = interval_at(start + tick_interval, tick_interval);
    // Use Skip so a stalled frame doesn't trigger a burst of catch-up ticks.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut respawn = interval_at(start + respawn_interval, respawn_interval);
    respawn.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Simulation loop started: {:?} ticks, respawn every {:.1}s",
        tick_interval,
        respawn_interval.as_secs_f32()
    );

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            Some(packet) = inputs.recv() => {
                state.push_input(packet);
            }

            _ = respawn.tick() => {
                state.push_input(InputPacket::Respawn);
            }

            scheduled = ticker.tick() => {
                // Drain any backlog so we always process the most recent tick.
                let mut skipped = 0u32;
                while ticker.tick().now_or_never().is_some() {
                    skipped += 1;
                }
                if skipped > 0 {
                    debug!(
                        "Skipped {} ticks to stay current (lag: {:?})",
                        skipped,
                        Instant::now().saturating_duration_since(scheduled)
                    );
                }

                let tick_start = std::time::Instant::now();
                let frame = state.tick(start.elapsed());
                let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;

                let tick_budget = tick_interval.as_secs_f64() * 1000.0 * 0.9;
                if tick_ms > tick_budget {
                    warn!(
                        "Slow tick #{}: {:.3}ms (budget: {:.1}ms) - {} food, {} cells",
                        state.tick_count,
                        tick_ms,
                        tick_budget,
                        state.food.len(),
                        state.player.cells.len()
                    );
                }

                if stats_every > 0 && state.tick_count % stats_every == 0 {
                    debug!(
                        "Tick #{}: mass {:.2}, {} cells, {} food, can split: {}",
                        state.tick_count,
                        frame.total_mass,
                        frame.cell_count(),
                        frame.food_count(),
                        frame.can_split
                    );
                }

                // No subscribers is fine; frames are simply dropped.
                let _ = frames.send(frame);
            }
        }
    }

    info!(
        "Simulation loop stopped after {} ticks (mass {:.2})",
        state.tick_count,
        state.player.total_mass()
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.runtime.tick_interval_ms = 1;
        config.runtime.seed = Some(99);
        config
    }

    async fn next_frame(rx: &mut broadcast::Receiver<Frame>) -> Frame {
        loop {
            match rx.recv().await {
                Ok(frame) => return frame,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("frame channel closed"),
            }
        }
    }

    #[tokio::test]
    async fn test_driver_publishes_frames() {
        let driver = Driver::spawn(fast_config());
        let mut frames = driver.subscribe();

        let first = next_frame(&mut frames).await;
        let mut last = first.clone();
        for _ in 0..5 {
            last = next_frame(&mut frames).await;
        }
        assert!(last.tick > first.tick);
        assert_eq!(last.circles[0].kind, protocol::packets::BodyKind::Player);

        let state = driver.shutdown().await.unwrap();
        assert!(state.tick_count >= last.tick);
    }

    #[tokio::test]
    async fn test_driver_runs_with_unbounded_timers() {
        let mut config = fast_config();
        config.food.respawn_interval_secs = f32::INFINITY;
        config.split.max_split_time_secs = 1e20;
        let mut state = SimulationState::with_seed(config, 7);
        state.player.player_data.radius = 100.0;
        let driver = Driver::spawn_with_state(state);
        let mut frames = driver.subscribe();

        driver.inputs.send(InputPacket::Split).await.unwrap();
        for _ in 0..20 {
            next_frame(&mut frames).await;
        }

        let state = driver.shutdown().await.unwrap();
        assert_eq!(state.player.cells.len(), 1);
        assert!(state.tick_count >= 20);
    }

    #[tokio::test]
    async fn test_driver_applies_queued_input() {
        let mut state = SimulationState::with_seed(fast_config(), 5);
        state.player.player_data.radius = 100.0;
        let driver = Driver::spawn_with_state(state);
        let mut frames = driver.subscribe();

        driver.inputs.send(InputPacket::Split).await.unwrap();
        let mut split_seen = false;
        for _ in 0..200 {
            if next_frame(&mut frames).await.cell_count() == 1 {
                split_seen = true;
                break;
            }
        }
        assert!(split_seen);

        let state = driver.shutdown().await.unwrap();
        assert_eq!(state.player.cells.len(), 1);
        assert_eq!(state.pending_inputs(), 0);
    }
}
