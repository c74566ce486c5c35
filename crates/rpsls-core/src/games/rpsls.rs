//! Rock-Paper-Scissors-Lizard-Spock rules.

use crate::protocol::{GameError, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RPSLS move, numbered in canonical order starting at 1
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Rock = 1,
    Paper = 2,
    Scissors = 3,
    Spock = 4,
    Lizard = 5,
}

impl Move {
    /// All moves in index order
    pub const ALL: [Move; 5] = [
        Move::Rock,
        Move::Paper,
        Move::Scissors,
        Move::Spock,
        Move::Lizard,
    ];

    /// Index in `1..=5`
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
            Move::Spock => "Spock",
            Move::Lizard => "Lizard",
        }
    }

    /// Check if this move beats the other
    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors)
                | (Move::Rock, Move::Lizard)
                | (Move::Paper, Move::Rock)
                | (Move::Paper, Move::Spock)
                | (Move::Scissors, Move::Paper)
                | (Move::Scissors, Move::Lizard)
                | (Move::Spock, Move::Scissors)
                | (Move::Spock, Move::Rock)
                | (Move::Lizard, Move::Paper)
                | (Move::Lizard, Move::Spock)
        )
    }
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Move::ALL
            .get(usize::from(index).wrapping_sub(1))
            .copied()
            .ok_or(GameError::InvalidMove(index))
    }
}

impl FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown move: {s}"))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decides the winner from player 1's revealed move and player 2's move.
pub struct MoveResolver;

impl MoveResolver {
    pub fn resolve(player1: Move, player2: Move) -> Outcome {
        if player1 == player2 {
            Outcome::Tie
        } else if player1.beats(player2) {
            Outcome::Player1Wins
        } else {
            Outcome::Player2Wins
        }
    }
}
