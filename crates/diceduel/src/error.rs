//! The facade's error type: everything match setup or play can surface.

use diceduel_engine::EngineError;
use diceduel_net::NetError;
use diceduel_protocol::ProtocolError;
use diceduel_session::SessionError;
use thiserror::Error;

/// Anything that can go wrong setting up or playing a match.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A character id with no entry in the catalog, whether chosen locally
    /// or received from the peer.
    #[error("unknown character: {0:?}")]
    UnknownArchetype(String),
}
