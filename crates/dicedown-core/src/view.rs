//! Snapshot projection for transmission to clients.

use dicedown_protocol::{GameCode, GamePhase, GameView};

use crate::{GameRegistry, GameSession};

impl GameRegistry {
    /// Derives a read-only [`GameView`] for the session, or `None` if
    /// the code is unknown.
    pub fn snapshot(&self, code: &GameCode) -> Option<GameView> {
        self.get(code).map(GameSession::view)
    }
}

impl GameSession {
    /// Builds the client-facing projection of this session.
    ///
    /// The shared deck is deliberately replaced with an empty placeholder
    /// — neither its contents nor its length ever leave the server.
    pub fn view(&self) -> GameView {
        GameView {
            code: self.code.clone(),
            players: self.players.iter().map(|p| p.view()).collect(),
            current_player: self.current_player,
            deck: Vec::new(),
            last_roll: self.last_roll,
            phase: self.phase,
            winner: self.winner.clone(),
            message: self.status_line(),
            can_roll: self.phase.is_playing() && self.last_roll.is_none(),
            can_draw: self.phase.is_playing() && self.last_roll.is_some(),
        }
    }

    /// A human-readable status line derived from phase, turn, and roll.
    fn status_line(&self) -> String {
        match self.phase {
            GamePhase::Waiting => "Waiting for players to join...".to_string(),
            GamePhase::Setup => "Setting up game...".to_string(),
            GamePhase::Playing => {
                let name = self
                    .turn_holder()
                    .map(|p| p.name.as_str())
                    .filter(|n| !n.is_empty())
                    .unwrap_or("Current player");
                match self.last_roll {
                    Some(value) => {
                        format!("{name}'s turn - Dice rolled: {value}")
                    }
                    None => format!("{name}'s turn - Roll the dice!"),
                }
            }
            GamePhase::Ended => {
                let winner = self.winner.as_deref().unwrap_or("Nobody");
                format!("{winner} wins!")
            }
        }
    }
}
