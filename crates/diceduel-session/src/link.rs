//! The message link trait: what the turn engine needs from a session.

use serde::Serialize;

use diceduel_protocol::{Envelope, MessageKind};

use crate::SessionError;

/// A bidirectional, message-delimited channel to the match peer.
///
/// Implemented by the connected [`Session`](crate::Session) over real
/// sockets, and by in-memory queue pairs in engine tests. Receives block
/// until a message is available; there is no timeout.
pub trait MessageLink {
    /// Serializes `data` and sends it under the given kind.
    fn send_message<T: Serialize>(
        &mut self,
        kind: MessageKind,
        data: &T,
    ) -> Result<(), SessionError>;

    /// Blocks until the next envelope arrives.
    fn recv_message(&mut self) -> Result<Envelope, SessionError>;
}
