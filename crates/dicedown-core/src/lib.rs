//! Authoritative session engine for dicedown.
//!
//! A dicedown match is a two-player turn-based game: each turn the active
//! player rolls a die and must discard cards from their hand summing
//! exactly to the roll, or draw a replacement card from a shared deck.
//! The first player to empty their hand wins.
//!
//! This crate owns the true state of every match and enforces the rules.
//! It is split along the responsibilities it carries:
//!
//! - [`GameRegistry`] — the code → session store: create, look up,
//!   remove, and periodically sweep stale sessions.
//! - [`GameSession`] / [`Player`] — one match's state: roster, shared
//!   deck, turn index, pending roll, phase, winner.
//! - Turn engine ([`GameRegistry::roll_die`], [`GameRegistry::discard`],
//!   [`GameRegistry::draw_card`], [`GameRegistry::can_match`]) — rule
//!   validation and application.
//! - Reconnection manager ([`GameRegistry::mark_disconnected`],
//!   [`GameRegistry::reconnect`]) — keeps a match alive across transient
//!   network drops by swapping a disconnected player's identity token.
//!
//! # Concurrency
//!
//! The engine is NOT thread-safe by itself — every operation is a
//! synchronous, in-memory computation on `&mut self`. Mutations on one
//! registry must be serialized by the owner (the gateway holds it behind
//! a mutex). Nothing here blocks, suspends, or performs I/O; every input,
//! however malformed, maps to a [`Reject`] rather than a panic.

mod config;
mod error;
mod reconnect;
mod registry;
mod session;
mod turn;
mod view;

pub use config::GameConfig;
pub use error::Reject;
pub use registry::GameRegistry;
pub use session::{GameSession, Player, MAX_PLAYERS};
