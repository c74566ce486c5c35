//! Read-only view of a game.

use super::game::{Game, Settlement};
use super::{GameId, GameState, Payout, PlayerId};
use crate::crypto::Commitment;
use crate::games::Move;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a game taken at a given `now`.
///
/// Never carries the salt. The commitment and player 1's move appear only
/// once the game has settled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: GameId,
    pub state: GameState,
    pub player1: PlayerId,
    pub opponent: Option<PlayerId>,
    pub player2: Option<PlayerId>,
    pub stake: u64,
    pub escrow: u64,
    pub player2_move: Option<Move>,
    pub player1_move: Option<Move>,
    pub commitment: Option<Commitment>,
    pub timeout_secs: i64,
    pub last_action_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub timed_out: bool,
    /// Player 1 may reclaim the stake right now
    pub can_player1_claim: bool,
    /// Player 2 may claim the escrow right now
    pub can_player2_claim: bool,
    pub settlement: Option<Settlement>,
    pub payout: Option<Payout>,
}

impl GameSnapshot {
    pub fn capture(game: &Game, now: DateTime<Utc>) -> Self {
        let state = game.state();
        let clock = game.clock();
        let timed_out = clock.has_elapsed(now);
        let settlement = game.settlement();
        let player1_move = match settlement {
            Some(Settlement::Revealed { player1_move, .. }) => Some(player1_move),
            _ => None,
        };

        Self {
            id: game.id(),
            state,
            player1: game.player1(),
            opponent: game.opponent(),
            player2: game.player2(),
            stake: game.stake(),
            escrow: game.escrow(),
            player2_move: game.player2_move(),
            player1_move,
            commitment: game.revealed_commitment(),
            timeout_secs: clock.timeout().num_seconds(),
            last_action_at: clock.last_action_at(),
            deadline: clock.deadline(),
            timed_out,
            can_player1_claim: timed_out && state == GameState::AwaitingPlayer2,
            can_player2_claim: timed_out && state == GameState::AwaitingReveal,
            settlement,
            payout: game.payout().cloned(),
        }
    }

    /// Whether the given player holds a seat in this game
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == Some(player)
    }
}

impl Game {
    pub fn snapshot(&self, now: DateTime<Utc>) -> GameSnapshot {
        GameSnapshot::capture(self, now)
    }
}
