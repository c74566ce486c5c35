//! Registry of independently locked games.
//!
//! Each game sits behind its own mutex: an action on one game never waits on
//! another, and every action runs its precondition checks and mutation under
//! a single lock acquisition.

use crate::crypto::Salt;
use crate::ledger::Ledger;
use crate::protocol::{
    Game, GameError, GameId, GameSnapshot, GameState, GameTerms, Outcome, Payout, PlayerId,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;

/// Errors from arena operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// All hosted games plus the ledger that receives their payouts
pub struct Arena<L> {
    games: RwLock<HashMap<GameId, Arc<Mutex<Game>>>>,
    ledger: L,
}

impl<L: Ledger> Arena<L> {
    pub fn new(ledger: L) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            ledger,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Open a new game for player 1 and return its id
    pub fn create(&self, player1: PlayerId, terms: GameTerms, now: DateTime<Utc>) -> GameId {
        let id = GameId::new();
        let game = Game::create(id, player1, terms, now);
        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(Mutex::new(game)));
        id
    }

    pub fn join(
        &self,
        id: GameId,
        player2: PlayerId,
        move_index: u8,
        contributed: u64,
        now: DateTime<Utc>,
    ) -> Result<GameSnapshot, ArenaError> {
        self.with_game(id, |game| {
            game.join(player2, move_index, contributed, now)?;
            Ok(game.snapshot(now))
        })
    }

    pub fn reveal(
        &self,
        id: GameId,
        caller: PlayerId,
        move_index: u8,
        salt: &Salt,
        now: DateTime<Utc>,
    ) -> Result<Outcome, ArenaError> {
        self.with_game(id, |game| {
            game.reveal(caller, move_index, salt, now, &self.ledger)
        })
    }

    pub fn claim_timeout_before_join(
        &self,
        id: GameId,
        caller: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<Payout, ArenaError> {
        self.with_game(id, |game| {
            game.claim_timeout_before_join(caller, now, &self.ledger)
        })
    }

    pub fn claim_timeout_after_join(
        &self,
        id: GameId,
        caller: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<Payout, ArenaError> {
        self.with_game(id, |game| {
            game.claim_timeout_after_join(caller, now, &self.ledger)
        })
    }

    pub fn claim_timeout(
        &self,
        id: GameId,
        caller: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<Payout, ArenaError> {
        self.with_game(id, |game| game.claim_timeout(caller, now, &self.ledger))
    }

    pub fn get_state(&self, id: GameId, now: DateTime<Utc>) -> Result<GameSnapshot, ArenaError> {
        self.with_game(id, |game| Ok(game.snapshot(now)))
    }

    /// Games still waiting for a second player
    pub fn list_open(&self, now: DateTime<Utc>) -> Vec<GameSnapshot> {
        self.snapshots(now, |s| s.state == GameState::AwaitingPlayer2)
    }

    /// Games in which the player holds either seat
    pub fn list_for_player(&self, player: PlayerId, now: DateTime<Utc>) -> Vec<GameSnapshot> {
        self.snapshots(now, |s| s.involves(player))
    }

    fn snapshots(
        &self,
        now: DateTime<Utc>,
        keep: impl Fn(&GameSnapshot) -> bool,
    ) -> Vec<GameSnapshot> {
        let handles: Vec<Arc<Mutex<Game>>> = self
            .games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut snapshots: Vec<GameSnapshot> = handles
            .iter()
            .map(|handle| handle.lock().unwrap_or_else(PoisonError::into_inner).snapshot(now))
            .filter(|s| keep(s))
            .collect();
        snapshots.sort_by_key(|s| s.last_action_at);
        snapshots
    }

    fn with_game<T>(
        &self,
        id: GameId,
        action: impl FnOnce(&mut Game) -> Result<T, GameError>,
    ) -> Result<T, ArenaError> {
        // Release the registry lock before taking the game lock.
        let handle = self
            .games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(ArenaError::GameNotFound(id))?;

        let mut game = handle.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(action(&mut game)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Commitment;
    use crate::games::Move;
    use crate::ledger::InMemoryLedger;
    use chrono::{Duration, TimeZone};
    use std::thread;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn terms(mv: Move, salt: u64) -> GameTerms {
        GameTerms::new(Commitment::new(mv, &Salt::from(salt)), 100, Duration::minutes(5))
    }

    #[test]
    fn test_unknown_game() {
        let arena = Arena::new(InMemoryLedger::new());
        let missing = GameId::new();

        assert_eq!(
            arena.get_state(missing, t0()),
            Err(ArenaError::GameNotFound(missing))
        );
        assert_eq!(
            arena.claim_timeout(missing, PlayerId::new(), t0()),
            Err(ArenaError::GameNotFound(missing))
        );
    }

    #[test]
    fn test_listing() {
        let arena = Arena::new(InMemoryLedger::new());
        let (alice, bob) = (PlayerId::new(), PlayerId::new());

        let first = arena.create(alice, terms(Move::Rock, 1), t0());
        let second = arena.create(alice, terms(Move::Paper, 2), t0() + Duration::seconds(1));
        arena.join(first, bob, 3, 100, t0() + Duration::seconds(2)).unwrap();

        let open: Vec<GameId> = arena.list_open(t0()).iter().map(|s| s.id).collect();
        assert_eq!(open, vec![second]);

        assert_eq!(arena.list_for_player(alice, t0()).len(), 2);
        let bobs: Vec<GameId> = arena.list_for_player(bob, t0()).iter().map(|s| s.id).collect();
        assert_eq!(bobs, vec![first]);
    }

    #[test]
    fn test_games_are_independent() {
        let arena = Arena::new(InMemoryLedger::new());
        let (alice, bob) = (PlayerId::new(), PlayerId::new());

        let a = arena.create(alice, terms(Move::Rock, 1), t0());
        let b = arena.create(alice, terms(Move::Rock, 1), t0());
        arena.join(a, bob, 3, 100, t0()).unwrap();

        assert_eq!(arena.get_state(a, t0()).unwrap().state, GameState::AwaitingReveal);
        assert_eq!(arena.get_state(b, t0()).unwrap().state, GameState::AwaitingPlayer2);
    }

    #[test]
    fn test_racing_joins_admit_exactly_one() {
        let arena = Arc::new(Arena::new(InMemoryLedger::new()));
        let id = arena.create(PlayerId::new(), terms(Move::Rock, 1), t0());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let arena = Arc::clone(&arena);
                thread::spawn(move || arena.join(id, PlayerId::new(), 2, 100, t0()).is_ok())
            })
            .collect();
        let joined = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(joined, 1);
    }

    #[test]
    fn test_reveal_races_forfeit_single_payout() {
        let arena = Arc::new(Arena::new(InMemoryLedger::new()));
        let (alice, bob) = (PlayerId::new(), PlayerId::new());
        let id = arena.create(alice, terms(Move::Rock, 42), t0());
        arena.join(id, bob, Move::Scissors.index(), 100, t0()).unwrap();
        let late = t0() + Duration::minutes(10);

        let revealer = {
            let arena = Arc::clone(&arena);
            thread::spawn(move || arena.reveal(id, alice, 1, &Salt::from(42), late).is_ok())
        };
        let claimer = {
            let arena = Arc::clone(&arena);
            thread::spawn(move || arena.claim_timeout_after_join(id, bob, late).is_ok())
        };
        let revealed = revealer.join().unwrap();
        let claimed = claimer.join().unwrap();

        assert!(revealed ^ claimed);
        assert_eq!(arena.ledger().total_disbursed(), 200);
        assert_eq!(arena.get_state(id, late).unwrap().state, GameState::Settled);
    }
}
