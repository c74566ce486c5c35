//! Integration tests for complete game sessions.
//!
//! Each test plays one match through the arena from commitment to payout.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rpsls_core::{
    Arena, ArenaError, Commitment, GameError, GameState, GameTerms, InMemoryLedger, Move,
    MoveResolver, Outcome, PlayerId, Salt, Settlement,
};

const STAKE: u64 = 100;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

fn timeout() -> Duration {
    Duration::minutes(5)
}

struct Table {
    arena: Arena<InMemoryLedger>,
    player1: PlayerId,
    player2: PlayerId,
}

impl Table {
    fn new() -> Self {
        Self {
            arena: Arena::new(InMemoryLedger::new()),
            player1: PlayerId::new(),
            player2: PlayerId::new(),
        }
    }

    fn open(&self, mv: Move, salt: u64) -> rpsls_core::GameId {
        let commitment = Commitment::new(mv, &Salt::from(salt));
        self.arena
            .create(self.player1, GameTerms::new(commitment, STAKE, timeout()), t0())
    }

    fn balance(&self, player: PlayerId) -> u64 {
        self.arena.ledger().balance(player)
    }
}

/// Rock beats Scissors: player 1 takes the whole escrow
#[test]
fn test_rock_beats_scissors() {
    let table = Table::new();
    let game = table.open(Move::Rock, 42);

    let snapshot = table
        .arena
        .join(game, table.player2, Move::Scissors.index(), STAKE, t0())
        .unwrap();
    assert_eq!(snapshot.state, GameState::AwaitingReveal);

    let outcome = table
        .arena
        .reveal(game, table.player1, Move::Rock.index(), &Salt::from(42), t0())
        .unwrap();

    assert_eq!(outcome, Outcome::Player1Wins);
    assert_eq!(table.balance(table.player1), 200);
    assert_eq!(table.balance(table.player2), 0);
    assert_eq!(
        table.arena.get_state(game, t0()).unwrap().state,
        GameState::Settled
    );
}

/// Nobody joins: player 1 takes the stake back after the timeout
#[test]
fn test_unjoined_game_reclaimed() {
    let table = Table::new();
    let game = table.open(Move::Paper, 7);
    let expired = t0() + timeout();

    let payout = table
        .arena
        .claim_timeout_before_join(game, table.player1, expired)
        .unwrap();

    assert_eq!(payout.total(), STAKE);
    assert_eq!(table.balance(table.player1), STAKE);

    let snapshot = table.arena.get_state(game, expired).unwrap();
    assert_eq!(snapshot.state, GameState::Settled);
    assert_eq!(snapshot.settlement, Some(Settlement::Player1Reclaimed));
}

/// Player 1 never reveals: player 2 takes the escrow and a late reveal fails
#[test]
fn test_forfeit_then_reveal_rejected() {
    let table = Table::new();
    let game = table.open(Move::Scissors, 11);
    table
        .arena
        .join(game, table.player2, Move::Rock.index(), STAKE, t0())
        .unwrap();

    let early = t0() + timeout() - Duration::seconds(1);
    assert!(matches!(
        table.arena.claim_timeout_after_join(game, table.player2, early),
        Err(ArenaError::Game(GameError::TimeoutNotElapsed { .. }))
    ));

    let expired = t0() + timeout();
    let payout = table
        .arena
        .claim_timeout_after_join(game, table.player2, expired)
        .unwrap();
    assert_eq!(payout.total(), 200);
    assert_eq!(table.balance(table.player2), 200);

    assert_eq!(
        table
            .arena
            .reveal(game, table.player1, Move::Scissors.index(), &Salt::from(11), expired),
        Err(ArenaError::Game(GameError::InvalidState(GameState::Settled)))
    );
    assert_eq!(table.balance(table.player1), 0);
}

/// Spock smashes Scissors
#[test]
fn test_spock_beats_scissors() {
    let table = Table::new();
    let game = table.open(Move::Spock, 1);
    table
        .arena
        .join(game, table.player2, Move::Scissors.index(), STAKE, t0())
        .unwrap();

    let outcome = table
        .arena
        .reveal(game, table.player1, Move::Spock.index(), &Salt::from(1), t0())
        .unwrap();

    assert_eq!(outcome, Outcome::Player1Wins);
}

/// Every reachable terminal path disburses exactly the escrow
#[test]
fn test_conservation_across_all_paths() {
    let table = Table::new();
    let mut expected_total = 0;

    for p1 in Move::ALL {
        for p2 in Move::ALL {
            let game = table.open(p1, 99);
            table.arena.join(game, table.player2, p2.index(), STAKE, t0()).unwrap();
            let outcome = table
                .arena
                .reveal(game, table.player1, p1.index(), &Salt::from(99), t0())
                .unwrap();
            assert_eq!(outcome, MoveResolver::resolve(p1, p2));
            expected_total += 2 * STAKE;
        }
    }

    let unjoined = table.open(Move::Rock, 5);
    table
        .arena
        .claim_timeout(unjoined, table.player1, t0() + timeout())
        .unwrap();
    expected_total += STAKE;

    let abandoned = table.open(Move::Rock, 6);
    table.arena.join(abandoned, table.player2, 2, STAKE, t0()).unwrap();
    table
        .arena
        .claim_timeout(abandoned, table.player2, t0() + timeout())
        .unwrap();
    expected_total += 2 * STAKE;

    let ledger = table.arena.ledger();
    assert_eq!(ledger.total_disbursed(), expected_total);
    assert_eq!(
        ledger.balance(table.player1) + ledger.balance(table.player2),
        expected_total
    );
}

/// A wrong reveal is rejected without touching funds, then corrected
#[test]
fn test_mismatched_reveal_then_corrected() {
    let table = Table::new();
    let game = table.open(Move::Lizard, 1234);
    table
        .arena
        .join(game, table.player2, Move::Paper.index(), STAKE, t0())
        .unwrap();

    assert_eq!(
        table
            .arena
            .reveal(game, table.player1, Move::Lizard.index(), &Salt::from(4321), t0()),
        Err(ArenaError::Game(GameError::CommitmentMismatch))
    );
    assert_eq!(table.arena.ledger().total_disbursed(), 0);
    assert_eq!(
        table.arena.get_state(game, t0()).unwrap().state,
        GameState::AwaitingReveal
    );

    let outcome = table
        .arena
        .reveal(game, table.player1, Move::Lizard.index(), &Salt::from(1234), t0())
        .unwrap();
    assert_eq!(outcome, Outcome::Player1Wins);
    assert_eq!(table.balance(table.player1), 200);
}
