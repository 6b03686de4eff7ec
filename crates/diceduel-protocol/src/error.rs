//! Error types for the protocol layer.
//!
//! Every variant here is fatal to the session that produced it: a corrupt
//! frame cannot be skipped safely because the length framing has already
//! been consumed incorrectly. The recoverable "keep buffering" case is not
//! an error — see [`Decoded::NeedMoreData`](crate::Decoded).

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (the payload cannot be represented as JSON).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// A complete frame's payload failed to deserialize.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    /// The frame header declares a type id outside the enumeration.
    #[error("unknown message type id {0}")]
    UnknownType(u32),

    /// The header type id and the envelope's `type` field disagree.
    #[error("type id mismatch: header says {header}, body says {body}")]
    KindMismatch { header: u32, body: u32 },

    /// The header declares a payload larger than
    /// [`MAX_PAYLOAD_LEN`](crate::MAX_PAYLOAD_LEN).
    #[error("frame declares {declared} payload bytes, over the {max} limit")]
    FrameTooLarge { declared: u32, max: usize },
}
