//! Session state: one match's players, deck, and phase.

use std::time::Instant;

use dicedown_protocol::{GameCode, GamePhase, PlayerId, PlayerView};

/// A session holds at most two players.
pub const MAX_PLAYERS: usize = 2;

/// One side of a match.
///
/// A player is appended to the roster on join and never removed — a
/// disconnect only flips `is_connected`, so the seat survives for
/// reconnection. The identity token `id` is the only externally visible
/// handle and is swapped for a fresh one when the player reconnects.
#[derive(Debug, Clone)]
pub struct Player {
    /// Opaque identity token, reassignable on reconnect. Unique within
    /// the session while the player is present.
    pub id: PlayerId,
    /// Display name; empty until set during setup. Also the key used to
    /// locate an abandoned seat on reconnect.
    pub name: String,
    /// Avatar token; cosmetic only.
    pub avatar: String,
    /// Hand values, kept sorted ascending for deterministic display.
    /// Sorting is cosmetic — the rules never depend on order.
    pub cards: Vec<u8>,
    /// Set once name/avatar have been submitted.
    pub is_ready: bool,
    /// Liveness flag, maintained by the connection manager.
    pub is_connected: bool,
    /// Stamped on disconnect and reconnect.
    pub last_seen: Instant,
}

impl Player {
    pub(crate) fn new(id: PlayerId) -> Self {
        Self {
            id,
            name: String::new(),
            avatar: String::new(),
            cards: Vec::new(),
            is_ready: false,
            is_connected: true,
            last_seen: Instant::now(),
        }
    }

    /// Projects this player for a state snapshot.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            cards: self.cards.clone(),
            is_ready: self.is_ready,
            is_connected: self.is_connected,
        }
    }
}

/// The single source of truth for one match.
///
/// Invariants:
/// - `players.len() <= MAX_PLAYERS` at all times.
/// - `current_player` indexes into `players` once the match has started.
/// - `last_roll` is `Some` only while phase is `Playing` (the
///   awaiting-move sub-state of a turn).
/// - The deck and hands are mutated in place by this session only.
///
/// A session is destroyed only by explicit removal from the registry or
/// by the staleness sweep, never implicitly.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// The session's unique join code.
    pub code: GameCode,
    /// Ordered roster, 0–2 players.
    pub players: Vec<Player>,
    /// Shared draw pile; draw order is pop-from-end.
    pub deck: Vec<u8>,
    /// Index of the turn-holder.
    pub current_player: usize,
    /// The pending die value the turn-holder must match.
    pub last_roll: Option<u8>,
    /// Lifecycle phase.
    pub phase: GamePhase,
    /// Winner's display name once the game has ended.
    pub winner: Option<String>,
    /// Creation time, consulted by the staleness sweep.
    pub created_at: Instant,
}

impl GameSession {
    pub(crate) fn new(code: GameCode) -> Self {
        Self {
            code,
            players: Vec::new(),
            deck: Vec::new(),
            current_player: 0,
            last_roll: None,
            phase: GamePhase::Waiting,
            winner: None,
            created_at: Instant::now(),
        }
    }

    /// Looks up a player by identity token.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// The current turn-holder, if the roster is non-empty.
    pub fn turn_holder(&self) -> Option<&Player> {
        self.players.get(self.current_player)
    }

    /// Returns `true` if no more players can join.
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Advances the turn to the other player and clears the pending
    /// roll, returning to the awaiting-roll sub-state.
    pub(crate) fn next_turn(&mut self) {
        self.current_player = (self.current_player + 1) % self.players.len();
        self.last_roll = None;
    }
}
