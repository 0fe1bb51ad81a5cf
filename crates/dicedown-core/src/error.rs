//! Rejection reasons for engine operations.

/// Why an operation was declined.
///
/// There are only two error classes in the engine: a precondition
/// violation, and "session not found" — which is itself just a rejection
/// variant, not a fault. A rejected operation performs no mutation, and
/// the `Display` strings double as the user-visible reason text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Reject {
    /// No session exists for the given code.
    #[error("game not found")]
    GameNotFound,

    /// The session already has two players.
    #[error("game is full")]
    GameFull,

    /// The caller's identity is not in this session's roster.
    #[error("player not in this game")]
    PlayerNotFound,

    /// The caller is not the current turn-holder.
    #[error("not your turn")]
    NotYourTurn,

    /// The session is not in the `playing` phase.
    #[error("game is not in progress")]
    NotPlaying,

    /// The action needs a pending roll and there is none.
    #[error("roll the die first")]
    NoPendingRoll,

    /// The die was already rolled this turn.
    #[error("a roll is already pending")]
    RollPending,

    /// An index was out of bounds for the hand, or repeated.
    #[error("invalid card selection")]
    InvalidIndices,

    /// The selected cards do not sum to the pending roll.
    #[error("selected cards sum to {selected}, needed {needed}")]
    SumMismatch { selected: u32, needed: u32 },

    /// No player with that display name in this session.
    #[error("no player named {0} in this game")]
    NameNotFound(String),

    /// The matched player is still connected; a live player can never be
    /// displaced by a reconnect.
    #[error("{0} is still connected")]
    StillConnected(String),

    /// The reconnecting identity is already a player in this session.
    #[error("already a player in this game")]
    AlreadyInGame,
}
