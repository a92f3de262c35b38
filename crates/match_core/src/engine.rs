//! The rules engine capability.
//!
//! All board semantics live behind this trait: position state, legal move
//! enumeration, move application, repetition detection, and the serialized
//! views the protocol sends. The session only ever talks notation strings
//! and [`Side`] values across this boundary, so it can be exercised with a
//! scripted engine (see [`crate::testing`]) as well as a real one.

use crate::error::EngineError;
use crate::types::Side;

/// Repetition state of the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepetitionStatus {
    /// No recurrence.
    Clear,
    /// The position has recurred; drawn under the governing rule set.
    Repetition,
    /// The position has recurred under continuous check; an immediate loss
    /// for the side giving check.
    CheckRepetition,
}

/// Boundary interface to the external rules engine.
///
/// The session always checks [`RulesEngine::is_legal`] before applying a
/// move; an error out of [`RulesEngine::apply_move`] is therefore an
/// engine-level fault, not a user mistake.
pub trait RulesEngine: Send + Sync {
    /// Reset to the canonical start position.
    fn set_start_position(&mut self);

    /// Which side the engine expects to move next.
    fn side_to_move(&self) -> Side;

    /// Legal moves in canonical notation, recomputed for the current
    /// position.
    fn legal_moves(&self) -> Vec<String>;

    /// Whether `notation` is a member of the current legal move set.
    fn is_legal(&self, notation: &str) -> bool {
        self.legal_moves().iter().any(|m| m == notation)
    }

    /// Apply a move to the position. The one mutator besides
    /// [`RulesEngine::set_start_position`].
    fn apply_move(&mut self, notation: &str) -> Result<(), EngineError>;

    /// Repetition state of the position just reached.
    fn repetition_status(&self) -> RepetitionStatus;

    /// Canonical text encoding of the current position.
    fn sfen(&self) -> String;

    /// Visual rendering of the position, for observers.
    fn svg(&self) -> String;

    /// Move history in game-record notation, for observers.
    fn kif(&self) -> String;
}
