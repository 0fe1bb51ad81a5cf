//! `GameServer` builder and server loop.
//!
//! This is the entry point for running a Dicedown server. It ties
//! together the layers: transport → protocol → core registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dicedown_core::{GameConfig, GameRegistry};
use dicedown_protocol::{JsonCodec, PlayerId, ServerEvent};
use dicedown_transport::{Transport, WebSocketTransport};
use tokio::sync::{mpsc, Mutex};

use crate::handler::handle_connection;
use crate::ServerError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
/// Interior mutability via `Mutex` where needed.
pub(crate) struct ServerState {
    pub(crate) games: Mutex<GameRegistry>,
    /// Outbound event channel for every live connection, keyed by the
    /// identity issued at accept time. Broadcasts go through here so the
    /// registry lock is never held across network I/O.
    pub(crate) peers:
        Mutex<HashMap<PlayerId, mpsc::UnboundedSender<ServerEvent>>>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Dicedown server.
///
/// # Example
///
/// ```rust,ignore
/// let server = GameServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct GameServerBuilder {
    bind_addr: String,
    game_config: GameConfig,
    sweep_interval: Duration,
}

impl GameServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            game_config: GameConfig::default(),
            sweep_interval: Duration::from_secs(60 * 60),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the game configuration.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Sets how often abandoned sessions are swept.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Binds the transport and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport` as defaults (MVP).
    pub async fn build(self) -> Result<GameServer, ServerError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            games: Mutex::new(GameRegistry::new(self.game_config)),
            peers: Mutex::new(HashMap::new()),
            codec: JsonCodec,
        });

        Ok(GameServer {
            transport,
            state,
            sweep_interval: self.sweep_interval,
        })
    }
}

impl Default for GameServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Dicedown game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GameServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
    sweep_interval: Duration,
}

impl GameServer {
    /// Creates a new builder.
    pub fn builder() -> GameServerBuilder {
        GameServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns the periodic sweep task, then accepts incoming connections
    /// and spawns a handler task for each. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Dicedown server running");

        spawn_sweeper(Arc::clone(&self.state), self.sweep_interval);

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Spawns the background task that removes over-age sessions.
///
/// The first tick fires immediately and is a no-op on an empty registry.
fn spawn_sweeper(state: Arc<ServerState>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let mut games = state.games.lock().await;
            let retention = games.config().retention;
            let swept = games.sweep(Instant::now(), retention);
            drop(games);
            if swept > 0 {
                tracing::info!(swept, "swept abandoned games");
            }
        }
    });
}
