//! Session establishment for Diceduel.
//!
//! A [`Session`] wraps a transport [`Endpoint`](diceduel_net::Endpoint) and
//! runs the two-message handshake that flips it into the connected state:
//!
//! ```text
//! client: Disconnected → HandshakeSent  → Connected
//! server: Disconnected → HandshakeAwait → Connected
//! ```
//!
//! Once connected, the session implements [`MessageLink`] — the seam the
//! turn engine drives. The engine never sees sockets or frames, only typed
//! payloads under a [`MessageKind`](diceduel_protocol::MessageKind); tests
//! substitute an in-memory link behind the same trait.

mod error;
mod link;
mod messages;
mod session;

pub use error::SessionError;
pub use link::MessageLink;
pub use messages::{HandshakeReply, HandshakeRequest, HandshakeStatus};
pub use session::{Session, SessionState};
