//! Game aggregate and its transition rules.
//!
//! A [`Game`] is created by player 1's commitment, joined by player 2 in the
//! clear, and settled exactly once: by player 1's reveal or by a timeout
//! claim. Every action checks its preconditions before touching any field, so
//! a rejected action leaves the game exactly as it was.

use super::clock::GameClock;
use super::payout::{matched_escrow, Payout, PayoutEngine};
use super::{GameError, GameId, GameState, Outcome, PlayerId};
use crate::crypto::{Commitment, Salt};
use crate::games::{Move, MoveResolver};
use crate::ledger::Ledger;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Terms player 1 fixes when opening a game
#[derive(Clone, Debug)]
pub struct GameTerms {
    pub commitment: Commitment,
    pub stake: u64,
    pub timeout: Duration,
    /// Only this player may join, when set
    pub opponent: Option<PlayerId>,
}

impl GameTerms {
    pub fn new(commitment: Commitment, stake: u64, timeout: Duration) -> Self {
        Self {
            commitment,
            stake,
            timeout,
            opponent: None,
        }
    }

    pub fn with_opponent(mut self, opponent: PlayerId) -> Self {
        self.opponent = Some(opponent);
        self
    }
}

/// Player 2's seat once taken
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenger {
    pub player: PlayerId,
    #[serde(rename = "move")]
    pub mv: Move,
}

/// How a game reached its terminal state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Settlement {
    /// Player 1 revealed and the moves were resolved
    Revealed { player1_move: Move, outcome: Outcome },
    /// Nobody joined in time and player 1 took the stake back
    Player1Reclaimed,
    /// Player 1 did not reveal in time and player 2 took the escrow
    Player2ClaimedForfeit,
}

#[derive(Clone, Debug)]
enum Phase {
    AwaitingPlayer2,
    AwaitingReveal {
        challenger: Challenger,
    },
    Settled {
        challenger: Option<Challenger>,
        settlement: Settlement,
        payout: Payout,
    },
}

/// One match between two players
#[derive(Clone, Debug)]
pub struct Game {
    id: GameId,
    player1: PlayerId,
    opponent: Option<PlayerId>,
    stake: u64,
    commitment: Commitment,
    clock: GameClock,
    phase: Phase,
}

impl Game {
    /// Open a game with player 1's stake in escrow
    pub fn create(id: GameId, player1: PlayerId, terms: GameTerms, now: DateTime<Utc>) -> Self {
        info!(
            game = %id,
            player1 = %player1,
            stake = terms.stake,
            timeout_secs = terms.timeout.num_seconds(),
            "game created"
        );

        Self {
            id,
            player1,
            opponent: terms.opponent,
            stake: terms.stake,
            commitment: terms.commitment,
            clock: GameClock::start(now, terms.timeout),
            phase: Phase::AwaitingPlayer2,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn player1(&self) -> PlayerId {
        self.player1
    }

    /// Invited opponent, if player 1 restricted who may join
    pub fn opponent(&self) -> Option<PlayerId> {
        self.opponent
    }

    pub fn stake(&self) -> u64 {
        self.stake
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn state(&self) -> GameState {
        match self.phase {
            Phase::AwaitingPlayer2 => GameState::AwaitingPlayer2,
            Phase::AwaitingReveal { .. } => GameState::AwaitingReveal,
            Phase::Settled { .. } => GameState::Settled,
        }
    }

    pub fn challenger(&self) -> Option<Challenger> {
        match &self.phase {
            Phase::AwaitingPlayer2 => None,
            Phase::AwaitingReveal { challenger } => Some(*challenger),
            Phase::Settled { challenger, .. } => *challenger,
        }
    }

    pub fn player2(&self) -> Option<PlayerId> {
        self.challenger().map(|c| c.player)
    }

    pub fn player2_move(&self) -> Option<Move> {
        self.challenger().map(|c| c.mv)
    }

    pub fn settlement(&self) -> Option<Settlement> {
        match &self.phase {
            Phase::Settled { settlement, .. } => Some(*settlement),
            _ => None,
        }
    }

    pub fn payout(&self) -> Option<&Payout> {
        match &self.phase {
            Phase::Settled { payout, .. } => Some(payout),
            _ => None,
        }
    }

    /// Commitment, only once the game is over
    pub fn revealed_commitment(&self) -> Option<Commitment> {
        self.settlement().map(|_| self.commitment)
    }

    /// Amount currently held in escrow; zero once disbursed
    pub fn escrow(&self) -> u64 {
        match self.phase {
            Phase::AwaitingPlayer2 => self.stake,
            // Join refuses stakes whose doubled escrow would overflow.
            Phase::AwaitingReveal { .. } => matched_escrow(self.stake).unwrap_or(u64::MAX),
            Phase::Settled { .. } => 0,
        }
    }

    /// Player 2 matches the stake and plays in the clear.
    ///
    /// Still accepted after the timeout has elapsed, as long as player 1 has
    /// not reclaimed the stake.
    pub fn join(
        &mut self,
        player2: PlayerId,
        move_index: u8,
        contributed: u64,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        if !matches!(self.phase, Phase::AwaitingPlayer2) {
            return Err(GameError::InvalidState(self.state()));
        }
        if player2 == self.player1 {
            return Err(GameError::SelfPlay);
        }
        if self.opponent.is_some_and(|invited| invited != player2) {
            return Err(GameError::Unauthorized(player2));
        }
        if contributed != self.stake {
            return Err(GameError::StakeMismatch {
                expected: self.stake,
                actual: contributed,
            });
        }
        let mv = Move::try_from(move_index)?;
        matched_escrow(self.stake)?;

        self.phase = Phase::AwaitingReveal {
            challenger: Challenger {
                player: player2,
                mv,
            },
        };
        self.clock.touch(now);

        info!(game = %self.id, player2 = %player2, "player 2 joined");
        Ok(())
    }

    /// Player 1 reveals the committed move and the game settles.
    ///
    /// A reveal after the timeout is still honored until player 2 claims.
    pub fn reveal(
        &mut self,
        caller: PlayerId,
        move_index: u8,
        salt: &Salt,
        now: DateTime<Utc>,
        ledger: &dyn Ledger,
    ) -> Result<Outcome, GameError> {
        let challenger = match self.phase {
            Phase::AwaitingReveal { challenger } => challenger,
            _ => return Err(GameError::InvalidState(self.state())),
        };
        if caller != self.player1 {
            return Err(GameError::Unauthorized(caller));
        }
        let player1_move = Move::try_from(move_index)?;
        if !self.commitment.verify(player1_move, salt) {
            warn!(game = %self.id, "reveal does not match commitment");
            return Err(GameError::CommitmentMismatch);
        }

        let outcome = MoveResolver::resolve(player1_move, challenger.mv);
        let payout =
            PayoutEngine::after_reveal(self.player1, challenger.player, self.stake, outcome)?;
        self.settle(
            Some(challenger),
            Settlement::Revealed {
                player1_move,
                outcome,
            },
            payout,
            now,
            ledger,
        )?;

        info!(
            game = %self.id,
            player1_move = %player1_move,
            player2_move = %challenger.mv,
            outcome = %outcome,
            "game resolved"
        );
        Ok(outcome)
    }

    /// Player 1 reclaims the stake when nobody joined in time.
    pub fn claim_timeout_before_join(
        &mut self,
        caller: PlayerId,
        now: DateTime<Utc>,
        ledger: &dyn Ledger,
    ) -> Result<Payout, GameError> {
        if !matches!(self.phase, Phase::AwaitingPlayer2) {
            return Err(GameError::InvalidState(self.state()));
        }
        if caller != self.player1 {
            return Err(GameError::Unauthorized(caller));
        }
        self.clock.ensure_elapsed(now)?;

        let payout = PayoutEngine::reclaim_unjoined(self.player1, self.stake);
        self.settle(None, Settlement::Player1Reclaimed, payout.clone(), now, ledger)?;

        info!(game = %self.id, amount = payout.total(), "player 1 reclaimed stake");
        Ok(payout)
    }

    /// Player 2 takes the escrow when player 1 did not reveal in time.
    pub fn claim_timeout_after_join(
        &mut self,
        caller: PlayerId,
        now: DateTime<Utc>,
        ledger: &dyn Ledger,
    ) -> Result<Payout, GameError> {
        let challenger = match self.phase {
            Phase::AwaitingReveal { challenger } => challenger,
            _ => return Err(GameError::InvalidState(self.state())),
        };
        if caller != challenger.player {
            return Err(GameError::Unauthorized(caller));
        }
        self.clock.ensure_elapsed(now)?;

        let payout = PayoutEngine::forfeit_to_player2(challenger.player, self.stake)?;
        self.settle(
            Some(challenger),
            Settlement::Player2ClaimedForfeit,
            payout.clone(),
            now,
            ledger,
        )?;

        info!(game = %self.id, amount = payout.total(), "player 2 claimed forfeit");
        Ok(payout)
    }

    /// Apply whichever timeout rule fits the current state.
    pub fn claim_timeout(
        &mut self,
        caller: PlayerId,
        now: DateTime<Utc>,
        ledger: &dyn Ledger,
    ) -> Result<Payout, GameError> {
        match self.phase {
            Phase::AwaitingPlayer2 => self.claim_timeout_before_join(caller, now, ledger),
            Phase::AwaitingReveal { .. } => self.claim_timeout_after_join(caller, now, ledger),
            Phase::Settled { .. } => Err(GameError::InvalidState(GameState::Settled)),
        }
    }

    fn settle(
        &mut self,
        challenger: Option<Challenger>,
        settlement: Settlement,
        payout: Payout,
        now: DateTime<Utc>,
        ledger: &dyn Ledger,
    ) -> Result<(), GameError> {
        if let Err(err) = ledger.disburse(self.id, &payout) {
            warn!(game = %self.id, error = %err, "disbursement failed, game not settled");
            return Err(err.into());
        }

        self.clock.touch(now);
        self.phase = Phase::Settled {
            challenger,
            settlement,
            payout,
        };
        Ok(())
    }
}
