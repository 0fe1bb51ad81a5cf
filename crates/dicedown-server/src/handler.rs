//! Per-connection handler: identity issue, action routing, disconnect.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Issue a fresh `PlayerId` and register an outbound event channel
//!   2. Send `Welcome` so the client learns its identity
//!   3. Loop: decode `ClientAction` → mutate the registry → emit events
//!   4. On close: deregister, mark the seat disconnected, notify the peer

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dicedown_core::Reject;
use dicedown_protocol::{ClientAction, Codec, GameCode, PlayerId, ServerEvent};
use dicedown_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::ServerError;

static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    let player_id =
        PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));
    tracing::debug!(%conn_id, %player_id, "handling new connection");

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    state.peers.lock().await.insert(player_id, tx.clone());

    // Writer task: the handler and broadcasts from other connections
    // both feed the channel; only this task touches the socket's send
    // half. Exits when every sender is dropped or the socket dies.
    let writer_conn = conn.clone();
    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode event");
                    continue;
                }
            };
            if writer_conn.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(ServerEvent::Welcome { player_id });

    // The one session this connection is in, if any.
    let mut current_code: Option<GameCode> = None;

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let action: ClientAction = match state.codec.decode(&data) {
            Ok(action) => action,
            Err(e) => {
                tracing::debug!(
                    %player_id, error = %e, "failed to decode action"
                );
                let _ = tx.send(ServerEvent::ActionRejected {
                    reason: "malformed message".into(),
                });
                continue;
            }
        };

        dispatch(&state, player_id, &tx, &mut current_code, action).await;
    }

    state.peers.lock().await.remove(&player_id);
    if let Some(code) = current_code {
        handle_disconnect(&state, player_id, &code).await;
    }

    drop(tx);
    let _ = writer.await;
    Ok(())
}

/// Routes one decoded action to the registry and emits the results.
async fn dispatch(
    state: &Arc<ServerState>,
    player_id: PlayerId,
    tx: &EventSender,
    current_code: &mut Option<GameCode>,
    action: ClientAction,
) {
    match action {
        ClientAction::CreateGame => {
            let code = {
                let mut games = state.games.lock().await;
                let code = games.create().code.clone();
                // A fresh session is empty, so the creator's join
                // cannot be rejected.
                let _ = games.join(&code, player_id);
                code
            };
            *current_code = Some(code.clone());
            let _ = tx.send(ServerEvent::GameCreated { code: code.clone() });
            broadcast_state(state, &code).await;
        }

        ClientAction::JoinGame { code } => {
            let code = GameCode::new(code.as_str());
            let result = {
                let mut games = state.games.lock().await;
                games.join(&code, player_id).map(|_| ())
            };
            match result {
                Ok(()) => {
                    *current_code = Some(code.clone());
                    let _ = tx.send(ServerEvent::JoinResult {
                        success: true,
                        reason: None,
                    });
                    broadcast_state(state, &code).await;
                }
                Err(reject) => {
                    let _ = tx.send(ServerEvent::JoinResult {
                        success: false,
                        reason: Some(reject.to_string()),
                    });
                }
            }
        }

        ClientAction::SetPlayerInfo { name, avatar } => {
            let Some(code) = require_code(current_code, tx) else {
                return;
            };
            let result = state.games.lock().await.set_player_info(
                &code,
                player_id,
                &name,
                &avatar,
            );
            report(state, tx, &code, result).await;
        }

        ClientAction::RollDie => {
            let Some(code) = require_code(current_code, tx) else {
                return;
            };
            // The rolled value reaches the client inside the snapshot.
            let result = state
                .games
                .lock()
                .await
                .roll_die(&code, player_id)
                .map(|_| ());
            report(state, tx, &code, result).await;
        }

        ClientAction::SelectCards { indices } => {
            let Some(code) = require_code(current_code, tx) else {
                return;
            };
            let result =
                state.games.lock().await.discard(&code, player_id, &indices);
            report(state, tx, &code, result).await;
        }

        ClientAction::DrawCard => {
            let Some(code) = require_code(current_code, tx) else {
                return;
            };
            let result =
                state.games.lock().await.draw_card(&code, player_id);
            report(state, tx, &code, result).await;
        }

        ClientAction::ReconnectToGame { code, name } => {
            if current_code.is_some() {
                let _ = tx.send(ServerEvent::ReconnectResult {
                    success: false,
                    message: "already in a game".into(),
                });
                return;
            }
            let code = GameCode::new(code.as_str());
            let result = {
                let mut games = state.games.lock().await;
                games
                    .reconnect(&code, player_id, &name)
                    .map(|player| player.name.clone())
            };
            match result {
                Ok(name) => {
                    *current_code = Some(code.clone());
                    let _ = tx.send(ServerEvent::ReconnectResult {
                        success: true,
                        message: "Successfully reconnected".into(),
                    });
                    notify_peers(
                        state,
                        &code,
                        player_id,
                        ServerEvent::PlayerReconnected {
                            name: name.clone(),
                            message: format!("{name} has reconnected"),
                        },
                    )
                    .await;
                    broadcast_state(state, &code).await;
                }
                Err(reject) => {
                    let _ = tx.send(ServerEvent::ReconnectResult {
                        success: false,
                        message: reject.to_string(),
                    });
                }
            }
        }

        ClientAction::PlayAgain => {
            let Some(code) = require_code(current_code, tx) else {
                return;
            };
            // Relayed, not acted on: rematch is a client-side restart.
            notify_peers(
                state,
                &code,
                player_id,
                ServerEvent::RematchRequested {
                    message: "Opponent wants to play again".into(),
                },
            )
            .await;
        }
    }
}

/// Marks the seat disconnected and tells the remaining player.
async fn handle_disconnect(
    state: &Arc<ServerState>,
    player_id: PlayerId,
    code: &GameCode,
) {
    state.games.lock().await.mark_disconnected(code, player_id);
    notify_peers(
        state,
        code,
        player_id,
        ServerEvent::PlayerDisconnected {
            message: "Your opponent has disconnected. They can reconnect \
                      using their name and game code."
                .into(),
        },
    )
    .await;
    broadcast_state(state, code).await;
}

/// Resolves the session this connection is in, rejecting if there is none.
fn require_code(
    current_code: &Option<GameCode>,
    tx: &EventSender,
) -> Option<GameCode> {
    match current_code {
        Some(code) => Some(code.clone()),
        None => {
            let _ = tx.send(ServerEvent::ActionRejected {
                reason: "not in a game".into(),
            });
            None
        }
    }
}

/// Completes a turn action: broadcast on success, reject to the caller
/// on failure. A rejected action changes nothing, so no snapshot goes out.
async fn report(
    state: &Arc<ServerState>,
    tx: &EventSender,
    code: &GameCode,
    result: Result<(), Reject>,
) {
    match result {
        Ok(()) => broadcast_state(state, code).await,
        Err(reject) => {
            let _ = tx.send(ServerEvent::ActionRejected {
                reason: reject.to_string(),
            });
        }
    }
}

/// Sends the current snapshot to every session member with a live channel.
///
/// The snapshot is taken under the registry lock, the sends happen under
/// the peers lock; neither lock is held across socket I/O.
async fn broadcast_state(state: &Arc<ServerState>, code: &GameCode) {
    let Some(view) = state.games.lock().await.snapshot(code) else {
        return;
    };
    let peers = state.peers.lock().await;
    for player in &view.players {
        if let Some(peer) = peers.get(&player.id) {
            let _ = peer.send(ServerEvent::GameState(view.clone()));
        }
    }
}

/// Sends an event to every session member except `from`.
async fn notify_peers(
    state: &Arc<ServerState>,
    code: &GameCode,
    from: PlayerId,
    event: ServerEvent,
) {
    let ids: Vec<PlayerId> = {
        let games = state.games.lock().await;
        match games.get(code) {
            Some(session) => session
                .players
                .iter()
                .map(|p| p.id)
                .filter(|id| *id != from)
                .collect(),
            None => return,
        }
    };
    let peers = state.peers.lock().await;
    for id in ids {
        if let Some(peer) = peers.get(&id) {
            let _ = peer.send(event.clone());
        }
    }
}
