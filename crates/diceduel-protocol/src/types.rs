//! Core protocol types for Diceduel's wire format.
//!
//! Every message on the wire is an [`Envelope`]: a typed, versioned JSON
//! document. The payload under `data` is opaque to this crate — the session
//! and engine layers define the per-kind payload structures.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// MessageKind — the closed, wire-stable type enumeration
// ---------------------------------------------------------------------------

/// The kind of a protocol message.
///
/// The numeric ids are wire-stable and appear twice per frame: in the
/// 4-byte header type field and as the `type` field of the JSON envelope.
/// A decoder must reject any id outside this enumeration.
///
/// `GameState`, `PlayerAction`, `Heartbeat` and `Error` are reserved ids
/// with no current producer; they decode fine but nothing in the turn loop
/// emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum MessageKind {
    /// Two-message session establishment exchange.
    Handshake = 1,
    /// Host → guest: match parameters (dice, host character).
    GameConfig = 2,
    /// Guest → host: chosen archetype.
    CharacterSelect = 3,
    /// Reserved: full-state broadcast outside the turn loop.
    GameState = 4,
    /// Reserved: standalone action without a state snapshot.
    PlayerAction = 5,
    /// Post-action snapshot of both combatants plus an action descriptor.
    TurnResult = 6,
    /// Winner announcement; the receiving side halts without replying.
    GameEnd = 7,
    /// Reserved: keep-alive.
    Heartbeat = 8,
    /// Reserved: protocol-level error report.
    Error = 9,
}

impl From<MessageKind> for u32 {
    fn from(kind: MessageKind) -> u32 {
        kind as u32
    }
}

impl TryFrom<u32> for MessageKind {
    type Error = ProtocolError;

    fn try_from(id: u32) -> Result<Self, ProtocolError> {
        match id {
            1 => Ok(Self::Handshake),
            2 => Ok(Self::GameConfig),
            3 => Ok(Self::CharacterSelect),
            4 => Ok(Self::GameState),
            5 => Ok(Self::PlayerAction),
            6 => Ok(Self::TurnResult),
            7 => Ok(Self::GameEnd),
            8 => Ok(Self::Heartbeat),
            9 => Ok(Self::Error),
            other => Err(ProtocolError::UnknownType(other)),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Handshake => "HANDSHAKE",
            Self::GameConfig => "GAME_CONFIG",
            Self::CharacterSelect => "CHARACTER_SELECT",
            Self::GameState => "GAME_STATE",
            Self::PlayerAction => "PLAYER_ACTION",
            Self::TurnResult => "TURN_RESULT",
            Self::GameEnd => "GAME_END",
            Self::Heartbeat => "HEARTBEAT",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Envelope — the top-level wire format
// ---------------------------------------------------------------------------

/// One complete protocol message after framing is removed.
///
/// Serialized as JSON:
///
/// ```text
/// { "type": 6, "data": {...}, "timestamp": 1724371200.5, "version": "1.0" }
/// ```
///
/// `data` is an opaque JSON value here; each layer deserializes it into its
/// own payload struct once the kind is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message kind, serialized as its numeric wire id.
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Kind-specific payload document.
    pub data: serde_json::Value,

    /// Seconds since the Unix epoch at encode time. Informational.
    pub timestamp: f64,

    /// Sender's protocol version string. Informational.
    pub version: String,
}
