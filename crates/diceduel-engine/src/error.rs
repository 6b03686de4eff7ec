//! Error types for the turn engine.

use diceduel_protocol::MessageKind;
use diceduel_session::SessionError;
use thiserror::Error;

/// Errors raised while running a match.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A `TURN_RESULT` named an actor index outside the two-player pair.
    /// Session-fatal, like any other malformed protocol input.
    #[error("turn result names player {0}, expected 0 or 1")]
    InvalidPlayerIndex(usize),

    /// An action needed an item the combatant no longer holds. Recoverable:
    /// the engine re-queries the policy instead of forfeiting the turn.
    #[error("no {0} item left")]
    ItemExhausted(&'static str),

    /// The peer sent something other than a turn result or game end while
    /// a match was in progress.
    #[error("unexpected {0} message during a match")]
    UnexpectedMessage(MessageKind),

    #[error("unknown dice kind: {0:?}")]
    UnknownDice(String),
}
