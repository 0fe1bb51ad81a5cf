//! Wire protocol for dicedown.
//!
//! This crate defines the "language" that clients and the game server
//! speak:
//!
//! - **Types** ([`ClientAction`], [`ServerEvent`], [`GameView`], etc.) —
//!   the messages and the typed state snapshot that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer sits between transport (raw bytes) and the session
//! engine (game rules). It doesn't know about connections or game state —
//! it only knows message shapes.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientAction / ServerEvent) → Engine
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientAction, GameCode, GamePhase, GameView, PlayerId, PlayerView,
    ServerEvent,
};
