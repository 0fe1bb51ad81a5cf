//! # Dicedown server
//!
//! WebSocket gateway for the Dicedown session engine. The server is
//! authoritative: clients send [`ClientAction`](dicedown_protocol::ClientAction)s,
//! the registry validates and applies them, and every member of the
//! session receives a fresh [`GameView`](dicedown_protocol::GameView)
//! snapshot after each accepted action.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dicedown_server::GameServer;
//!
//! # async fn run() -> Result<(), dicedown_server::ServerError> {
//! let server = GameServer::builder().bind("0.0.0.0:8080").build().await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::{GameServer, GameServerBuilder};
