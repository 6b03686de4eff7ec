//! Error types for the session layer.

use diceduel_net::NetError;
use diceduel_protocol::{MessageKind, ProtocolError};

/// Errors that can occur during handshake or message exchange.
///
/// Any of these received mid-match means the match ends with no declared
/// winner; during setup they abort before the match starts.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The transport failed underneath the session.
    #[error(transparent)]
    Net(#[from] NetError),

    /// A frame was structurally corrupt.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The peer replied `rejected` to our handshake.
    #[error("handshake rejected by peer")]
    Rejected,

    /// The peer sent a well-formed message of the wrong kind.
    #[error("expected {expected} but received {got}")]
    Unexpected {
        expected: MessageKind,
        got: MessageKind,
    },

    /// A datagram arrived shorter than its own declared payload length.
    /// Datagram transport truncates oversized messages silently; the frame
    /// cannot be completed and the session cannot continue.
    #[error("frame arrived truncated")]
    Truncated,

    /// The session has not completed its handshake (or has already been
    /// marked disconnected).
    #[error("session is not connected")]
    NotConnected,
}
