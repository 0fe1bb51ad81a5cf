//! Engine configuration.

use std::time::Duration;

/// Tunable parameters for the session engine.
///
/// The defaults describe the standard dicedown match: a deck of values
/// 1–6 with four copies each (24 cards), six-card starting hands, a
/// six-sided die, six-character game codes, and a two-hour retention
/// window for the staleness sweep.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Lowest card value in the deck.
    pub card_min: u8,

    /// Highest card value in the deck (inclusive).
    pub card_max: u8,

    /// How many copies of each value the deck holds.
    pub copies_per_value: usize,

    /// Cards dealt to each player at match start.
    pub hand_size: usize,

    /// Number of faces on the per-turn die.
    pub die_faces: u8,

    /// Length of generated game codes.
    pub code_len: usize,

    /// Sessions older than this are removed by the sweep, regardless of
    /// phase or liveness. Bounding memory wins over rescuing an abandoned
    /// match.
    pub retention: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            card_min: 1,
            card_max: 6,
            copies_per_value: 4,
            hand_size: 6,
            die_faces: 6,
            code_len: 6,
            retention: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl GameConfig {
    /// Total number of cards a fresh deck holds.
    pub fn deck_size(&self) -> usize {
        (self.card_max - self.card_min + 1) as usize * self.copies_per_value
    }
}
