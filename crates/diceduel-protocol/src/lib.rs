//! Wire protocol for Diceduel.
//!
//! This crate defines the "language" the two endpoints of a match speak:
//!
//! - **Types** ([`Envelope`], [`MessageKind`]) — the versioned message
//!   structure that travels on the wire.
//! - **Codec** ([`encode`], [`decode`], [`Decoded`]) — the fixed-header
//!   framing that converts envelopes to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (handshake, turn exchange). It doesn't know about sockets or turns —
//! it only knows how to frame and unframe messages.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Session (handshake, turns)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{decode, encode, encode_envelope, frame_len, Decoded};
pub use error::ProtocolError;
pub use types::{Envelope, MessageKind};

/// Protocol version string carried in every envelope.
///
/// The exchanged version is informational only: a mismatch is logged by the
/// session layer but never negotiated.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Size of the fixed wire header: `u32` payload length + `u32` type id,
/// both big-endian.
pub const HEADER_LEN: usize = 8;

/// Upper bound on a declared payload length.
///
/// A frame declaring more than this is treated as malformed rather than
/// buffered, so a corrupt length field cannot stall the receive loop on a
/// frame that will never complete.
pub const MAX_PAYLOAD_LEN: usize = 1 << 20;
