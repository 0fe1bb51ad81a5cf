//! Connection and reconnection management.
//!
//! A disconnect never removes a player from the roster — it only flips
//! the liveness flag, so the seat (hand, turn position, name) survives
//! until the owner comes back. Reconnection locates the abandoned seat by
//! display name and swaps in the caller's fresh identity token. There is
//! no forced forfeiture: a match interrupted mid-turn stays paused on
//! that turn indefinitely (until the staleness sweep reclaims it).

use std::time::Instant;

use dicedown_protocol::{GameCode, PlayerId};

use crate::{GameRegistry, Player, Reject};

impl GameRegistry {
    /// Marks a player's channel as down and stamps last-seen.
    ///
    /// No-op if the session or player is absent — disconnect
    /// notifications race with the sweep, and a late one must not fault.
    pub fn mark_disconnected(&mut self, code: &GameCode, player_id: PlayerId) {
        let Ok(session) = self.get_mut(code) else {
            return;
        };
        if let Some(player) = session.player_mut(player_id) {
            player.is_connected = false;
            player.last_seen = Instant::now();
            tracing::info!(
                code = %code,
                %player_id,
                name = %player.name,
                "player disconnected"
            );
        }
    }

    /// Finds a player by display name, for locating an abandoned seat.
    pub fn find_by_name(&self, code: &GameCode, name: &str) -> Option<&Player> {
        self.get(code)?.players.iter().find(|p| p.name == name)
    }

    /// Restores the seat named `name` under the fresh identity `new_id`.
    ///
    /// Rejected if the session does not exist, if `new_id` is already in
    /// the roster, if no player carries that name, or if the matched
    /// player is still connected — a live player can never be displaced,
    /// which is the guard against identity hijacking.
    ///
    /// On success the player's token is replaced, liveness restored, and
    /// the updated player returned so the gateway can notify the peer and
    /// re-issue a snapshot.
    pub fn reconnect(
        &mut self,
        code: &GameCode,
        new_id: PlayerId,
        name: &str,
    ) -> Result<&Player, Reject> {
        let session = self.get_mut(code)?;

        if session.player(new_id).is_some() {
            return Err(Reject::AlreadyInGame);
        }
        let player = session
            .players
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| Reject::NameNotFound(name.to_string()))?;
        if player.is_connected {
            return Err(Reject::StillConnected(name.to_string()));
        }

        let old_id = player.id;
        player.id = new_id;
        player.is_connected = true;
        player.last_seen = Instant::now();
        tracing::info!(
            code = %code,
            name = %name,
            %old_id,
            %new_id,
            "player reconnected"
        );
        Ok(player)
    }
}

// =========================================================================
// Tests
// =========================================================================
