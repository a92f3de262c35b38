//! Error types for the match core.
//!
//! Protocol violations are answered to the offending sender and never end a
//! match; engine faults abort the session without crashing the process. Rule
//! violations (illegal moves, resignation) are game outcomes, not errors.

use thiserror::Error;

/// A malformed or invalid inbound message.
///
/// The display text is what the offending client receives in the `error`
/// event, so the messages are written for the other end of the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The payload was not a JSON envelope at all.
    #[error("Malformed message: {0}")]
    Malformed(String),

    /// The envelope named an event this server does not handle.
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// A required payload field was missing or had the wrong type.
    #[error("You sent a request but {0} field was None.")]
    MissingField(&'static str),

    /// The payload had the wrong shape for the named event.
    #[error("{0}")]
    InvalidPayload(&'static str),
}

/// A fault inside the rules engine.
///
/// The session validates legality before applying moves, so any error out of
/// the engine is treated as an engine-level fault: the coordinator logs it
/// and aborts the session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected a move the session believed legal.
    #[error("move rejected by the rules engine: {0}")]
    Rejected(String),

    /// Any other engine failure.
    #[error("rules engine failure: {0}")]
    Internal(String),
}
