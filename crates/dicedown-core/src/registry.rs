//! The session registry: the code → session store.
//!
//! Owns every live match, keyed by its six-character game code. This is
//! the entry point for all engine operations — the gateway holds exactly
//! one registry and serializes access to it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use dicedown_protocol::{GameCode, GamePhase, PlayerId};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{GameConfig, GameSession, Player, Reject};

/// Alphabet for generated game codes.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Owns the mapping from game codes to sessions.
///
/// Exactly one session exists per code; a session is deleted only by
/// [`remove`](Self::remove) or the [`sweep`](Self::sweep).
pub struct GameRegistry {
    games: HashMap<GameCode, GameSession>,
    config: GameConfig,
}

impl GameRegistry {
    /// Creates an empty registry with the given configuration.
    pub fn new(config: GameConfig) -> Self {
        Self {
            games: HashMap::new(),
            config,
        }
    }

    /// Returns the registry's configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Creates a new empty session in the `waiting` phase and returns it.
    ///
    /// The code is drawn uniformly from `[A-Z0-9]`. A collision with an
    /// existing code is unlikely but real, so generation retries until a
    /// free code is found.
    pub fn create(&mut self) -> &GameSession {
        let code = loop {
            let candidate = random_code(self.config.code_len);
            if !self.games.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!(code = %candidate, "game code collision, retrying");
        };

        tracing::info!(code = %code, "game created");
        self.games
            .entry(code)
            .or_insert_with_key(|c| GameSession::new(c.clone()))
    }

    /// Looks up a session. Absence is a normal outcome, not a fault.
    pub fn get(&self, code: &GameCode) -> Option<&GameSession> {
        self.games.get(code)
    }

    pub(crate) fn get_mut(
        &mut self,
        code: &GameCode,
    ) -> Result<&mut GameSession, Reject> {
        self.games.get_mut(code).ok_or(Reject::GameNotFound)
    }

    /// Deletes a session unconditionally. No-op if the code is absent.
    pub fn remove(&mut self, code: &GameCode) {
        if self.games.remove(code).is_some() {
            tracing::info!(code = %code, "game removed");
        }
    }

    /// Removes every session older than `max_age` relative to `now`,
    /// regardless of phase or liveness, and returns how many were removed.
    ///
    /// Taking `now` as a parameter keeps the sweep a pure function of
    /// time; the host process drives it on a fixed interval.
    pub fn sweep(&mut self, now: Instant, max_age: Duration) -> usize {
        let before = self.games.len();
        self.games.retain(|code, session| {
            let keep = now.duration_since(session.created_at) <= max_age;
            if !keep {
                tracing::info!(code = %code, phase = %session.phase, "game swept");
            }
            keep
        });
        before - self.games.len()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Adds a player to a session.
    ///
    /// Rejected if the session does not exist or already has two players.
    /// A duplicate join with an identity already in the roster is
    /// idempotent — unreliable channels re-send joins, and that must not
    /// error. The second distinct join moves the phase to `setup`.
    pub fn join(
        &mut self,
        code: &GameCode,
        player_id: PlayerId,
    ) -> Result<&GameSession, Reject> {
        let session = self.games.get_mut(code).ok_or(Reject::GameNotFound)?;

        if session.player(player_id).is_some() {
            return Ok(session);
        }
        if session.is_full() {
            return Err(Reject::GameFull);
        }

        session.players.push(Player::new(player_id));
        if session.is_full() && session.phase == GamePhase::Waiting {
            session.phase = GamePhase::Setup;
        }
        tracing::info!(
            code = %code,
            %player_id,
            players = session.players.len(),
            "player joined"
        );
        Ok(session)
    }

    /// Sets a player's name and avatar and marks them ready.
    ///
    /// When this readies the second player, the match starts synchronously
    /// within the same call — callers never observe a "both ready but not
    /// started" state.
    pub fn set_player_info(
        &mut self,
        code: &GameCode,
        player_id: PlayerId,
        name: &str,
        avatar: &str,
    ) -> Result<(), Reject> {
        let config = self.config.clone();
        let session = self.games.get_mut(code).ok_or(Reject::GameNotFound)?;
        let player = session
            .player_mut(player_id)
            .ok_or(Reject::PlayerNotFound)?;

        player.name = name.to_string();
        player.avatar = avatar.to_string();
        player.is_ready = true;

        if session.is_full() && session.players.iter().all(|p| p.is_ready) {
            start_match(session, &config);
        }
        Ok(())
    }
}

/// Builds the deck, deals the hands, and opens play.
///
/// Populates hands and the deck exactly once per session, at the
/// `setup → playing` transition.
fn start_match(session: &mut GameSession, config: &GameConfig) {
    let mut rng = rand::rng();

    let mut deck: Vec<u8> = (config.card_min..=config.card_max)
        .flat_map(|v| std::iter::repeat_n(v, config.copies_per_value))
        .collect();
    deck.shuffle(&mut rng);

    for player in &mut session.players {
        player.cards.clear();
        for _ in 0..config.hand_size {
            if let Some(card) = deck.pop() {
                player.cards.push(card);
            }
        }
        player.cards.sort_unstable();
    }

    session.deck = deck;
    session.phase = GamePhase::Playing;
    session.current_player = rng.random_range(0..session.players.len());
    tracing::info!(
        code = %session.code,
        starter = session.current_player,
        deck = session.deck.len(),
        "match started"
    );
}

/// Draws `len` characters uniformly from the code alphabet.
fn random_code(len: usize) -> GameCode {
    let mut rng = rand::rng();
    let code: String = (0..len)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect();
    GameCode(code)
}

// =========================================================================
// Tests
// =========================================================================
