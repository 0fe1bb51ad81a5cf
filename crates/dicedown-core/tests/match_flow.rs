//! Integration tests driving whole matches through the public
//! `GameRegistry` API, the way the gateway does.

use dicedown_core::{GameConfig, GameRegistry, Reject};
use dicedown_protocol::{GameCode, GamePhase, PlayerId};

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

/// Creates, fills, and starts a match; returns the registry and code.
fn start_match() -> (GameRegistry, GameCode) {
    let mut reg = GameRegistry::new(GameConfig::default());
    let code = reg.create().code.clone();
    reg.join(&code, pid(1)).unwrap();
    reg.join(&code, pid(2)).unwrap();
    reg.set_player_info(&code, pid(1), "alice", "cat").unwrap();
    reg.set_player_info(&code, pid(2), "bob", "dog").unwrap();
    (reg, code)
}

/// Finds a subset of `hand` summing to `target` by brute force, as a
/// client UI would. Returns the selected indices.
fn find_subset(hand: &[u8], target: u32) -> Option<Vec<usize>> {
    for mask in 1u32..(1 << hand.len()) {
        let sum: u32 = (0..hand.len())
            .filter(|&i| mask & (1 << i) != 0)
            .map(|i| u32::from(hand[i]))
            .sum();
        if sum == target {
            return Some(
                (0..hand.len()).filter(|&i| mask & (1 << i) != 0).collect(),
            );
        }
    }
    None
}

#[test]
fn test_full_lifecycle_to_victory() {
    // Play a complete match: every turn, roll, then discard a matching
    // subset when one exists, otherwise draw. The game must end with a
    // winner, an empty winning hand, and a frozen turn.
    let (mut reg, code) = start_match();

    let mut turns = 0;
    while reg.get(&code).unwrap().phase == GamePhase::Playing {
        turns += 1;
        assert!(turns < 10_000, "match did not terminate");

        let (holder_idx, holder_id) = {
            let s = reg.get(&code).unwrap();
            (s.current_player, s.players[s.current_player].id)
        };

        let roll = reg.roll_die(&code, holder_id).unwrap();
        assert!((1..=6).contains(&roll));

        let hand = reg.get(&code).unwrap().players[holder_idx].cards.clone();
        match find_subset(&hand, u32::from(roll)) {
            Some(indices) => {
                // The advisory hint must agree with the found subset.
                assert!(reg.can_match(&code, holder_id).unwrap());
                reg.discard(&code, holder_id, &indices).unwrap();
            }
            None => {
                assert!(!reg.can_match(&code, holder_id).unwrap());
                reg.draw_card(&code, holder_id).unwrap();
            }
        }

        // Roster invariant holds at every observed point.
        assert!(reg.get(&code).unwrap().players.len() <= 2);
    }

    let session = reg.get(&code).unwrap();
    assert_eq!(session.phase, GamePhase::Ended);
    let winner = session.winner.as_deref().unwrap();
    assert!(winner == "alice" || winner == "bob");
    assert!(session.players[session.current_player].cards.is_empty());

    // State is frozen: no further actions are legal.
    let holder_id = session.players[session.current_player].id;
    assert_eq!(
        reg.roll_die(&code, holder_id).unwrap_err(),
        Reject::NotPlaying
    );
}

#[test]
fn test_deal_splits_deck_between_hands_and_pile() {
    let (reg, code) = start_match();
    let session = reg.get(&code).unwrap();

    let dealt: usize = session.players.iter().map(|p| p.cards.len()).sum();
    assert_eq!(dealt, 12);
    assert_eq!(session.deck.len(), 24 - 12);
}

#[test]
fn test_duplicate_join_leaves_roster_identical() {
    let mut reg = GameRegistry::new(GameConfig::default());
    let code = reg.create().code.clone();
    reg.join(&code, pid(1)).unwrap();

    let once: Vec<_> = reg
        .get(&code)
        .unwrap()
        .players
        .iter()
        .map(|p| p.id)
        .collect();
    reg.join(&code, pid(1)).unwrap();
    let twice: Vec<_> = reg
        .get(&code)
        .unwrap()
        .players
        .iter()
        .map(|p| p.id)
        .collect();

    assert_eq!(once, twice);
}

#[test]
fn test_disconnect_pauses_match_and_reconnect_resumes_it() {
    let (mut reg, code) = start_match();
    let (holder_idx, holder_id, holder_name) = {
        let s = reg.get(&code).unwrap();
        let p = &s.players[s.current_player];
        (s.current_player, p.id, p.name.clone())
    };

    // The turn-holder vanishes mid-turn. Nobody can act.
    reg.mark_disconnected(&code, holder_id);
    let other_id = reg.get(&code).unwrap().players[1 - holder_idx].id;
    assert_eq!(
        reg.roll_die(&code, other_id).unwrap_err(),
        Reject::NotYourTurn
    );

    // A fresh identity reclaims the seat and play resumes.
    let new_id = pid(99);
    reg.reconnect(&code, new_id, &holder_name).unwrap();
    assert!(reg.roll_die(&code, new_id).is_ok());
}

#[test]
fn test_sessions_are_independent() {
    // Two matches in one registry never interfere: an identity from one
    // session means nothing in the other.
    let mut reg = GameRegistry::new(GameConfig::default());
    let a = reg.create().code.clone();
    let b = reg.create().code.clone();
    assert_ne!(a, b);

    reg.join(&a, pid(1)).unwrap();
    reg.join(&a, pid(2)).unwrap();
    reg.join(&b, pid(3)).unwrap();

    assert_eq!(reg.get(&a).unwrap().players.len(), 2);
    assert_eq!(reg.get(&b).unwrap().players.len(), 1);
    assert_eq!(
        reg.set_player_info(&b, pid(1), "x", "y").unwrap_err(),
        Reject::PlayerNotFound
    );

    reg.remove(&a);
    assert!(reg.get(&a).is_none());
    assert!(reg.get(&b).is_some());
}
