//! Handshake payload structures.

use serde::{Deserialize, Serialize};

/// Client → server: the opening message of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeRequest {
    /// Client's protocol version. Informational only; mismatches are
    /// logged, never negotiated.
    pub version: String,
    /// Free-form client description.
    pub client_info: String,
}

/// Server → client: the reply that decides the session's fate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeReply {
    pub version: String,
    pub status: HandshakeStatus,
    /// Free-form server description.
    pub server_info: String,
}

/// Verdict carried by a [`HandshakeReply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandshakeStatus {
    Accepted,
    Rejected,
}
