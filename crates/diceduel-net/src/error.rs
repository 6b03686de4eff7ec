//! Error types for the transport layer.

use diceduel_protocol::ProtocolError;

/// Errors that can occur on an [`Endpoint`](crate::Endpoint).
///
/// Setup failures (`InvalidAddr`, `Setup`) abort match setup before it
/// starts; everything else mid-match is an unrecoverable connection loss.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// The host string is neither an IP literal nor a resolvable name.
    #[error("invalid address '{0}'")]
    InvalidAddr(String),

    /// Bind, listen, connect or accept failed.
    #[error("transport setup failed: {0}")]
    Setup(#[source] std::io::Error),

    /// Writing to the socket failed.
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    /// Reading from the socket failed.
    #[error("receive failed: {0}")]
    Recv(#[source] std::io::Error),

    /// The peer closed the stream mid-frame or before one arrived.
    #[error("peer closed the connection")]
    PeerClosed,

    /// The operation needs a connected endpoint (or a listening one, for
    /// accept) and this endpoint isn't in that state.
    #[error("endpoint is not in the required state for this operation")]
    NotConnected,

    /// The byte stream carried a frame the protocol layer refuses to
    /// buffer (oversized or corrupt length field).
    #[error(transparent)]
    Frame(#[from] ProtocolError),
}
