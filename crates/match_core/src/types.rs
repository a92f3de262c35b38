//! Core identifiers and shared enums for the match coordination system.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connected client.
///
/// Generated per accepted connection; players and observers alike are
/// addressed by their `ClientId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two sides of a match.
///
/// `Black` is registered first and moves first; the indices align with the
/// engine's side-to-move encoding and with the `btime`/`wtime` configuration
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Black,
    White,
}

impl Side {
    /// Array index for clock and player storage (Black = 0, White = 1).
    pub fn index(self) -> usize {
        match self {
            Side::Black => 0,
            Side::White => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Black => write!(f, "black"),
            Side::White => write!(f, "white"),
        }
    }
}

/// Why a match ended.
///
/// Broadcast in the `termination` event together with the winner, so clients
/// never have to infer the result from a bare disconnect signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The side to move sent the resignation token.
    Resignation,
    /// The side to move submitted a move outside the legal set.
    IllegalMove,
    /// Byoyomi was overdrawn while the mover's clock ran.
    Timeout,
    /// The position recurred under continuous check; the checker loses.
    PerpetualCheck,
    /// The position recurred without continuous check; drawn.
    Repetition,
    /// The side to move has no legal reply.
    Mate,
    /// A registered player's connection closed mid-match.
    Disconnection,
    /// The rules engine faulted; no result is assigned.
    Aborted,
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchOutcome::Resignation => "resignation",
            MatchOutcome::IllegalMove => "illegal_move",
            MatchOutcome::Timeout => "timeout",
            MatchOutcome::PerpetualCheck => "perpetual_check",
            MatchOutcome::Repetition => "repetition",
            MatchOutcome::Mate => "mate",
            MatchOutcome::Disconnection => "disconnection",
            MatchOutcome::Aborted => "aborted",
        };
        write!(f, "{}", name)
    }
}
