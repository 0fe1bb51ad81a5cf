//! The turn engine: rule validation and application.
//!
//! Inside the `playing` phase each turn is a two-step sub-machine:
//!
//! ```text
//! awaiting-roll ──roll_die──→ awaiting-move ──discard/draw_card──→
//!     next player's awaiting-roll, or `ended` when a hand empties
//! ```
//!
//! Every operation validates its preconditions first and mutates only on
//! success. Out-of-turn calls are rejected rather than silently ignored,
//! so a caller can tell "not your turn" apart from success.

use dicedown_protocol::{GameCode, GamePhase, PlayerId};
use rand::Rng;

use crate::{GameRegistry, GameSession, Reject};

impl GameRegistry {
    /// Rolls the die for the current turn-holder.
    ///
    /// The value is a per-turn random event, independent of the shared
    /// deck. It becomes the pending value the turn-holder must match.
    pub fn roll_die(
        &mut self,
        code: &GameCode,
        player_id: PlayerId,
    ) -> Result<u8, Reject> {
        let faces = self.config().die_faces;
        let session = self.get_mut(code)?;
        session.require_turn(player_id)?;
        if session.last_roll.is_some() {
            return Err(Reject::RollPending);
        }

        let value = rand::rng().random_range(1..=faces);
        session.last_roll = Some(value);
        tracing::debug!(code = %code, %player_id, value, "die rolled");
        Ok(value)
    }

    /// Discards the turn-holder's cards at `indices`.
    ///
    /// The selected values must sum exactly to the pending roll. On
    /// success the pending roll is cleared; if the hand is now empty the
    /// player wins and the turn freezes, otherwise the turn advances.
    pub fn discard(
        &mut self,
        code: &GameCode,
        player_id: PlayerId,
        indices: &[usize],
    ) -> Result<(), Reject> {
        let session = self.get_mut(code)?;
        session.require_turn(player_id)?;
        let needed = session.last_roll.ok_or(Reject::NoPendingRoll)?;

        let hand_len = session.players[session.current_player].cards.len();
        let mut seen = vec![false; hand_len];
        for &i in indices {
            if i >= hand_len || seen[i] {
                return Err(Reject::InvalidIndices);
            }
            seen[i] = true;
        }

        let hand = &session.players[session.current_player].cards;
        let selected: u32 = indices.iter().map(|&i| u32::from(hand[i])).sum();
        if selected != u32::from(needed) {
            return Err(Reject::SumMismatch {
                selected,
                needed: u32::from(needed),
            });
        }

        // Remove by descending index so earlier removals don't shift the
        // positions still to be removed.
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        let player = &mut session.players[session.current_player];
        for i in sorted {
            player.cards.remove(i);
        }
        session.last_roll = None;

        if session.players[session.current_player].cards.is_empty() {
            let name = session.players[session.current_player].name.clone();
            session.winner = Some(name.clone());
            session.phase = GamePhase::Ended;
            tracing::info!(code = %code, winner = %name, "game over");
        } else {
            session.next_turn();
        }
        Ok(())
    }

    /// Takes a replacement card instead of matching the roll.
    ///
    /// Pops one card from the shared deck into the hand. An empty deck is
    /// not an error — the draw is a no-op and the turn still advances,
    /// exactly as after a successful discard.
    pub fn draw_card(
        &mut self,
        code: &GameCode,
        player_id: PlayerId,
    ) -> Result<(), Reject> {
        let session = self.get_mut(code)?;
        session.require_turn(player_id)?;
        if session.last_roll.is_none() {
            return Err(Reject::NoPendingRoll);
        }

        if let Some(card) = session.deck.pop() {
            let player = &mut session.players[session.current_player];
            player.cards.push(card);
            player.cards.sort_unstable();
        }
        session.next_turn();
        Ok(())
    }

    /// Advisory check: can any subset of the player's hand sum to the
    /// pending roll?
    ///
    /// Drives client affordances only. The authoritative check is the
    /// exact-sum validation in [`discard`](Self::discard) — this hint can
    /// be absent or wrong without breaking correctness.
    pub fn can_match(
        &self,
        code: &GameCode,
        player_id: PlayerId,
    ) -> Result<bool, Reject> {
        let session = self.get(code).ok_or(Reject::GameNotFound)?;
        if !session.phase.is_playing() {
            return Err(Reject::NotPlaying);
        }
        let target = session.last_roll.ok_or(Reject::NoPendingRoll)?;
        let player = session.player(player_id).ok_or(Reject::PlayerNotFound)?;
        Ok(subset_sums_to(&player.cards, usize::from(target)))
    }
}

impl GameSession {
    /// Checks that the match is in progress and `player_id` holds the
    /// turn.
    fn require_turn(&self, player_id: PlayerId) -> Result<(), Reject> {
        if !self.phase.is_playing() {
            return Err(Reject::NotPlaying);
        }
        match self.turn_holder() {
            Some(holder) if holder.id == player_id => Ok(()),
            _ => Err(Reject::NotYourTurn),
        }
    }
}

/// Classic 0/1 subset-sum reachability over `target`, O(cards × target).
fn subset_sums_to(cards: &[u8], target: usize) -> bool {
    let mut reachable = vec![false; target + 1];
    reachable[0] = true;
    for &card in cards {
        let card = usize::from(card);
        for sum in (card..=target).rev() {
            if reachable[sum - card] {
                reachable[sum] = true;
            }
        }
    }
    reachable[target]
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Deterministic turn-engine tests.
    //!
    //! The engine's randomness (deal order, die value) is pinned by
    //! writing session fields directly before exercising an operation
    //! through the registry API.

    use super::*;
    use crate::GameConfig;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    /// A playing-phase registry with known hands, deck, and turn-holder.
    ///
    /// Player 1 ("alice") holds `[1, 2, 2, 3]` and has the turn; player 2
    /// ("bob") holds `[4, 5]`. The deck holds `[6, 1]` (1 on top).
    fn fixture() -> (GameRegistry, GameCode) {
        let mut reg = GameRegistry::new(GameConfig::default());
        let code = reg.create().code.clone();
        reg.join(&code, pid(1)).unwrap();
        reg.join(&code, pid(2)).unwrap();
        reg.set_player_info(&code, pid(1), "alice", "cat").unwrap();
        reg.set_player_info(&code, pid(2), "bob", "dog").unwrap();

        let session = reg.get_mut(&code).unwrap();
        session.players[0].cards = vec![1, 2, 2, 3];
        session.players[1].cards = vec![4, 5];
        session.deck = vec![6, 1];
        session.current_player = 0;
        session.last_roll = None;
        (reg, code)
    }

    fn set_roll(reg: &mut GameRegistry, code: &GameCode, value: u8) {
        reg.get_mut(code).unwrap().last_roll = Some(value);
    }

    // =====================================================================
    // roll_die()
    // =====================================================================

    #[test]
    fn test_roll_die_sets_pending_value_in_range() {
        let (mut reg, code) = fixture();

        let value = reg.roll_die(&code, pid(1)).unwrap();

        assert!((1..=6).contains(&value));
        assert_eq!(reg.get(&code).unwrap().last_roll, Some(value));
    }

    #[test]
    fn test_roll_die_out_of_turn_rejected() {
        let (mut reg, code) = fixture();

        let result = reg.roll_die(&code, pid(2));

        assert_eq!(result.unwrap_err(), Reject::NotYourTurn);
        assert!(reg.get(&code).unwrap().last_roll.is_none());
    }

    #[test]
    fn test_roll_die_twice_rejected() {
        let (mut reg, code) = fixture();
        reg.roll_die(&code, pid(1)).unwrap();

        let result = reg.roll_die(&code, pid(1));

        assert_eq!(result.unwrap_err(), Reject::RollPending);
    }

    #[test]
    fn test_roll_die_before_match_start_rejected() {
        let mut reg = GameRegistry::new(GameConfig::default());
        let code = reg.create().code.clone();
        reg.join(&code, pid(1)).unwrap();

        let result = reg.roll_die(&code, pid(1));

        assert_eq!(result.unwrap_err(), Reject::NotPlaying);
    }

    #[test]
    fn test_roll_die_unknown_code_rejected() {
        let mut reg = GameRegistry::new(GameConfig::default());
        let result = reg.roll_die(&GameCode("NOSUCH".into()), pid(1));
        assert_eq!(result.unwrap_err(), Reject::GameNotFound);
    }

    // =====================================================================
    // discard()
    // =====================================================================

    #[test]
    fn test_discard_exact_sum_applied() {
        // Hand [1,2,2,3], roll 5, indices {2,3} select 2+3.
        let (mut reg, code) = fixture();
        set_roll(&mut reg, &code, 5);

        reg.discard(&code, pid(1), &[2, 3]).unwrap();

        let session = reg.get(&code).unwrap();
        assert_eq!(session.players[0].cards, vec![1, 2]);
        assert!(session.last_roll.is_none());
        assert_eq!(session.current_player, 1);
        assert_eq!(session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_discard_wrong_sum_rejected_without_mutation() {
        // Hand [1,2,2,3], roll 5, indices {1,2} sum to 4.
        let (mut reg, code) = fixture();
        set_roll(&mut reg, &code, 5);

        let result = reg.discard(&code, pid(1), &[1, 2]);

        assert_eq!(
            result.unwrap_err(),
            Reject::SumMismatch {
                selected: 4,
                needed: 5
            }
        );
        let session = reg.get(&code).unwrap();
        assert_eq!(session.players[0].cards, vec![1, 2, 2, 3]);
        assert_eq!(session.last_roll, Some(5));
        assert_eq!(session.current_player, 0);
    }

    #[test]
    fn test_discard_without_roll_rejected() {
        let (mut reg, code) = fixture();

        let result = reg.discard(&code, pid(1), &[0]);

        assert_eq!(result.unwrap_err(), Reject::NoPendingRoll);
    }

    #[test]
    fn test_discard_out_of_turn_rejected() {
        let (mut reg, code) = fixture();
        set_roll(&mut reg, &code, 4);

        let result = reg.discard(&code, pid(2), &[0]);

        assert_eq!(result.unwrap_err(), Reject::NotYourTurn);
    }

    #[test]
    fn test_discard_index_out_of_bounds_rejected() {
        let (mut reg, code) = fixture();
        set_roll(&mut reg, &code, 5);

        let result = reg.discard(&code, pid(1), &[2, 4]);

        assert_eq!(result.unwrap_err(), Reject::InvalidIndices);
        assert_eq!(reg.get(&code).unwrap().players[0].cards.len(), 4);
    }

    #[test]
    fn test_discard_duplicate_indices_rejected() {
        // [2,2] would "select" index 1 twice to fake a sum of 4.
        let (mut reg, code) = fixture();
        set_roll(&mut reg, &code, 4);

        let result = reg.discard(&code, pid(1), &[1, 1]);

        assert_eq!(result.unwrap_err(), Reject::InvalidIndices);
    }

    #[test]
    fn test_discard_empty_selection_rejected_as_sum_mismatch() {
        let (mut reg, code) = fixture();
        set_roll(&mut reg, &code, 3);

        let result = reg.discard(&code, pid(1), &[]);

        assert_eq!(
            result.unwrap_err(),
            Reject::SumMismatch {
                selected: 0,
                needed: 3
            }
        );
    }

    #[test]
    fn test_discard_unsorted_indices_removed_correctly() {
        // Removal must not depend on the order the client listed indices.
        let (mut reg, code) = fixture();
        set_roll(&mut reg, &code, 6);

        reg.discard(&code, pid(1), &[3, 0, 1]).unwrap(); // 3+1+2

        assert_eq!(reg.get(&code).unwrap().players[0].cards, vec![2]);
    }

    #[test]
    fn test_discard_emptying_hand_ends_game_and_freezes_turn() {
        let (mut reg, code) = fixture();
        {
            let session = reg.get_mut(&code).unwrap();
            session.players[0].cards = vec![2, 3];
        }
        set_roll(&mut reg, &code, 5);

        reg.discard(&code, pid(1), &[0, 1]).unwrap();

        let session = reg.get(&code).unwrap();
        assert_eq!(session.phase, GamePhase::Ended);
        assert_eq!(session.winner.as_deref(), Some("alice"));
        // Turn did not advance past the winning action.
        assert_eq!(session.current_player, 0);
        assert!(session.last_roll.is_none());
    }

    #[test]
    fn test_discard_after_game_ended_rejected() {
        let (mut reg, code) = fixture();
        reg.get_mut(&code).unwrap().players[0].cards = vec![2, 3];
        set_roll(&mut reg, &code, 5);
        reg.discard(&code, pid(1), &[0, 1]).unwrap();

        let result = reg.discard(&code, pid(2), &[0]);

        assert_eq!(result.unwrap_err(), Reject::NotPlaying);
    }

    // =====================================================================
    // draw_card()
    // =====================================================================

    #[test]
    fn test_draw_card_pops_deck_into_sorted_hand_and_advances() {
        let (mut reg, code) = fixture();
        set_roll(&mut reg, &code, 6);

        reg.draw_card(&code, pid(1)).unwrap();

        let session = reg.get(&code).unwrap();
        // Deck top was 1; hand re-sorted ascending.
        assert_eq!(session.players[0].cards, vec![1, 1, 2, 2, 3]);
        assert_eq!(session.deck, vec![6]);
        assert!(session.last_roll.is_none());
        assert_eq!(session.current_player, 1);
    }

    #[test]
    fn test_draw_card_empty_deck_is_noop_draw_but_advances() {
        let (mut reg, code) = fixture();
        reg.get_mut(&code).unwrap().deck.clear();
        set_roll(&mut reg, &code, 6);

        reg.draw_card(&code, pid(1)).unwrap();

        let session = reg.get(&code).unwrap();
        assert_eq!(session.players[0].cards, vec![1, 2, 2, 3]);
        assert!(session.last_roll.is_none());
        assert_eq!(session.current_player, 1);
    }

    #[test]
    fn test_draw_card_without_roll_rejected() {
        let (mut reg, code) = fixture();

        let result = reg.draw_card(&code, pid(1));

        assert_eq!(result.unwrap_err(), Reject::NoPendingRoll);
    }

    #[test]
    fn test_turn_alternates_strictly_between_players() {
        let (mut reg, code) = fixture();

        set_roll(&mut reg, &code, 6);
        reg.draw_card(&code, pid(1)).unwrap();
        assert_eq!(reg.get(&code).unwrap().current_player, 1);

        set_roll(&mut reg, &code, 6);
        reg.draw_card(&code, pid(2)).unwrap();
        assert_eq!(reg.get(&code).unwrap().current_player, 0);

        // Alice drew the deck's 1: her hand is now [1,1,2,2,3].
        set_roll(&mut reg, &code, 3);
        reg.discard(&code, pid(1), &[4]).unwrap();
        assert_eq!(reg.get(&code).unwrap().current_player, 1);
    }

    // =====================================================================
    // can_match()
    // =====================================================================

    #[test]
    fn test_can_match_true_for_reachable_sum() {
        let (mut reg, code) = fixture();
        set_roll(&mut reg, &code, 5); // 2+3 reachable in [1,2,2,3]

        assert!(reg.can_match(&code, pid(1)).unwrap());
    }

    #[test]
    fn test_can_match_false_for_unreachable_sum() {
        let (mut reg, code) = fixture();
        set_roll(&mut reg, &code, 2); // bob holds [4,5]

        assert!(!reg.can_match(&code, pid(2)).unwrap());
    }

    #[test]
    fn test_can_match_without_roll_rejected() {
        let (reg, code) = fixture();

        let result = reg.can_match(&code, pid(1));

        assert_eq!(result.unwrap_err(), Reject::NoPendingRoll);
    }

    #[test]
    fn test_subset_sums_to_edge_cases() {
        assert!(subset_sums_to(&[], 0));
        assert!(!subset_sums_to(&[], 3));
        assert!(subset_sums_to(&[1, 2, 2, 3], 8)); // whole hand
        assert!(!subset_sums_to(&[2, 4, 6], 5)); // parity-impossible
        assert!(subset_sums_to(&[6, 6, 6], 6));
    }
}
