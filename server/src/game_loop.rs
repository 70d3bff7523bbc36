use crate::config::ServerConfig;
use crate::state::{DispatchError, GameState, Outbox};
use axum::body::Bytes;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};

/// Commands from client connections to the game loop
pub enum GameCommand {
    Connect {
        outbox: Outbox,
        response: oneshot::Sender<u32>,
    },
    Packet {
        id: u32,
        data: Bytes,
    },
    Disconnect {
        id: u32,
    },
}

/// Run the main game loop. Owns all game state.
///
/// Commands are applied between ticks, so a tick never observes a half-applied
/// command and every snapshot reflects a finished tick.
pub async fn run_game_loop(mut cmd_rx: mpsc::Receiver<GameCommand>, config: ServerConfig) {
    let mut state = GameState::new(&config);

    let mut tick_interval = tokio::time::interval(config.tick_duration());
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut leaderboard_interval =
        tokio::time::interval(Duration::from_secs_f64(config.leaderboard_interval_secs));
    leaderboard_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let now = Instant::now();
                let dt = now
                    .duration_since(last_tick)
                    .as_secs_f64()
                    .min(config.max_step_secs);
                last_tick = now;
                state.tick(dt);
            }

            _ = leaderboard_interval.tick() => {
                state.broadcast_leaderboards();
            }

            Some(cmd) = cmd_rx.recv() => {
                match cmd {
                    GameCommand::Connect { outbox, response } => {
                        let id = state.connect(outbox);
                        if response.send(id).is_err() {
                            // Socket went away before hearing back.
                            state.disconnect(id);
                        }
                    }
                    GameCommand::Packet { id, data } => {
                        match state.handle_packet(id, &data) {
                            Ok(()) => {}
                            Err(DispatchError::Decode(e)) => {
                                tracing::debug!(conn = id, error = %e, "Dropped packet");
                            }
                            Err(e) => {
                                tracing::warn!(conn = id, error = %e, "Rejected packet");
                            }
                        }
                    }
                    GameCommand::Disconnect { id } => {
                        state.disconnect(id);
                    }
                }
            }

            else => break,
        }
    }

    tracing::info!("Game loop ended");
}

/// Start the game loop on the current runtime and return its command sender.
pub fn spawn_game_loop(config: ServerConfig) -> mpsc::Sender<GameCommand> {
    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(1024);
    tokio::spawn(async move {
        run_game_loop(game_rx, config).await;
    });
    game_tx
}
