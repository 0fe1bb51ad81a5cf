//! Message and view types for the dicedown wire protocol.
//!
//! Everything here is serde-serializable; client actions and server events
//! are internally tagged (`{"type": "..."}`), which keeps the JSON easy to
//! dispatch on from a browser client.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's identity token.
///
/// Issued by the gateway when a connection is accepted, and sent to the
/// client in [`ServerEvent::Welcome`]. The token is opaque and tied to the
/// connection, not the person: after a reconnect the same player carries a
/// fresh `PlayerId`.
///
/// `#[serde(transparent)]` serializes `PlayerId(42)` as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A short human-typeable code identifying one game session.
///
/// Six characters from `[A-Z0-9]`, generated by the session registry.
/// Codes typed by humans arrive in whatever case the keyboard produced,
/// so [`GameCode::new`] normalizes to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameCode(pub String);

impl GameCode {
    /// Builds a code from raw user input, trimming and uppercasing.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a game session.
///
/// Transitions are one-directional:
///
/// ```text
/// Waiting → Setup → Playing → Ended
/// ```
///
/// - **Waiting**: 0–1 players, match not started.
/// - **Setup**: both players present, collecting name/avatar/ready.
/// - **Playing**: active match, turns proceeding.
/// - **Ended**: winner decided, state frozen.
///
/// The enum lives in the protocol crate because it appears verbatim in
/// [`GameView`]; the engine enforces the transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Waiting,
    Setup,
    Playing,
    Ended,
}

impl GamePhase {
    /// Returns `true` if the match has started and is not yet over.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Returns `true` once a winner has been decided.
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Setup => write!(f, "setup"),
            Self::Playing => write!(f, "playing"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot views
// ---------------------------------------------------------------------------

/// One player's slice of a [`GameView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// The player's current identity token.
    pub id: PlayerId,
    /// Display name (empty until set during setup).
    pub name: String,
    /// Avatar token chosen by the player.
    pub avatar: String,
    /// Hand values, sorted ascending for stable display.
    pub cards: Vec<u8>,
    /// Whether the player has submitted name/avatar.
    pub is_ready: bool,
    /// Liveness flag; `false` while the player's channel is down.
    pub is_connected: bool,
}

/// A read-only projection of one game session, broadcast after every
/// successful mutation.
///
/// The shared deck is never exposed — `deck` is always an empty
/// placeholder so clients cannot learn its contents or length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// The session's join code.
    pub code: GameCode,
    /// Both players (or fewer while waiting).
    pub players: Vec<PlayerView>,
    /// Index into `players` of the turn-holder.
    pub current_player: usize,
    /// Always empty; the real deck stays server-side.
    pub deck: Vec<u8>,
    /// The pending die value, if the turn-holder has rolled.
    pub last_roll: Option<u8>,
    /// Current lifecycle phase.
    pub phase: GamePhase,
    /// Winner's display name once the game has ended.
    pub winner: Option<String>,
    /// Human-readable status line derived from phase/turn/roll.
    pub message: String,
    /// Whether the turn-holder may roll the die right now.
    pub can_roll: bool,
    /// Whether the turn-holder may draw a replacement card right now.
    pub can_draw: bool,
}

// ---------------------------------------------------------------------------
// ClientAction — inbound
// ---------------------------------------------------------------------------

/// Actions a client can send to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientAction {
    /// Create a new game session; the creator joins it automatically.
    CreateGame,

    /// Join an existing session by code.
    JoinGame { code: GameCode },

    /// Submit display name and avatar; marks the player ready. When both
    /// players are ready the match starts.
    SetPlayerInfo { name: String, avatar: String },

    /// Roll the die (turn-holder only, once per turn).
    RollDie,

    /// Discard the cards at `indices`, whose values must sum exactly to
    /// the pending roll.
    SelectCards { indices: Vec<usize> },

    /// Give up on matching the roll and draw a replacement card instead.
    DrawCard,

    /// Resume an abandoned seat: the caller's fresh identity replaces the
    /// disconnected player with this display name.
    ReconnectToGame { code: GameCode, name: String },

    /// Ask the opponent for a rematch. Relayed only; the session itself
    /// never restarts.
    PlayAgain,
}

// ---------------------------------------------------------------------------
// ServerEvent — outbound
// ---------------------------------------------------------------------------

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// First event on every connection: the identity token the client
    /// must use to find itself in [`GameView::players`].
    Welcome { player_id: PlayerId },

    /// Sent to the creator after `CreateGame`.
    GameCreated { code: GameCode },

    /// Sent to the joiner after `JoinGame`.
    JoinResult {
        success: bool,
        reason: Option<String>,
    },

    /// Full state snapshot, broadcast to every player in the session.
    GameState(GameView),

    /// Advisory to the remaining player: the opponent's channel dropped.
    PlayerDisconnected { message: String },

    /// Advisory to the remaining player: the opponent is back.
    PlayerReconnected { name: String, message: String },

    /// Sent to the reconnecting identity after `ReconnectToGame`.
    ReconnectResult { success: bool, message: String },

    /// An action violated a precondition; nothing was mutated.
    ActionRejected { reason: String },

    /// The opponent asked for a rematch.
    RematchRequested { message: String },
}

// =========================================================================
// Tests
// =========================================================================
