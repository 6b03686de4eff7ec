//! Frame codec: fixed-header framing of envelopes.
//!
//! The wire frame is an 8-byte big-endian header — `u32` payload length,
//! then `u32` message type id — followed by exactly `payload length` bytes
//! of JSON-serialized [`Envelope`].
//!
//! Decoding is a three-way outcome, not two: a short buffer means "keep
//! buffering" ([`Decoded::NeedMoreData`]), while a structurally corrupt
//! frame is an error the caller must treat as fatal to the session.
//! Conflating the two would either stall on garbage or tear down a session
//! that merely hasn't received the rest of a frame yet.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::{Envelope, MessageKind, ProtocolError, HEADER_LEN, MAX_PAYLOAD_LEN, PROTOCOL_VERSION};

/// Outcome of [`decode`] on a possibly-incomplete buffer.
#[derive(Debug)]
pub enum Decoded {
    /// The buffer does not yet hold a complete frame. Zero bytes were
    /// consumed; the caller should read more and retry.
    NeedMoreData,

    /// One complete frame was decoded. `consumed` is the exact number of
    /// bytes the frame occupied, so the caller can advance its accumulator
    /// precisely and retain any trailing bytes.
    Frame { envelope: Envelope, consumed: usize },
}

/// Serializes `data` under the given kind into one complete wire frame.
///
/// Fills in the envelope timestamp and protocol version.
///
/// # Errors
/// Returns [`ProtocolError::Encode`] if the payload cannot be represented
/// as JSON, or [`ProtocolError::FrameTooLarge`] if the serialized payload
/// exceeds [`MAX_PAYLOAD_LEN`].
pub fn encode<T: Serialize>(kind: MessageKind, data: &T) -> Result<Vec<u8>, ProtocolError> {
    let envelope = Envelope {
        kind,
        data: serde_json::to_value(data).map_err(ProtocolError::Encode)?,
        timestamp: unix_now(),
        version: PROTOCOL_VERSION.to_string(),
    };
    encode_envelope(&envelope)
}

/// Frames an already-built envelope.
pub fn encode_envelope(envelope: &Envelope) -> Result<Vec<u8>, ProtocolError> {
    let payload = serde_json::to_vec(envelope).map_err(ProtocolError::Encode)?;
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::FrameTooLarge {
            declared: payload.len() as u32,
            max: MAX_PAYLOAD_LEN,
        });
    }

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&u32::from(envelope.kind).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Returns the total frame length (header included) declared by the buffer,
/// or `None` if the buffer doesn't yet hold a full header.
///
/// # Errors
/// Returns [`ProtocolError::FrameTooLarge`] if the declared length is over
/// the limit — a receive loop must not keep buffering toward a frame that
/// will never be accepted.
pub fn frame_len(buf: &[u8]) -> Result<Option<usize>, ProtocolError> {
    if buf.len() < HEADER_LEN {
        return Ok(None);
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&buf[0..4]);
    let declared = u32::from_be_bytes(len_bytes);
    if declared as usize > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::FrameTooLarge {
            declared,
            max: MAX_PAYLOAD_LEN,
        });
    }
    Ok(Some(HEADER_LEN + declared as usize))
}

/// Decodes at most one frame from the front of `buf`.
///
/// - Fewer than [`HEADER_LEN`] bytes, or fewer total bytes than the header
///   declares: [`Decoded::NeedMoreData`], nothing consumed.
/// - A complete frame with an unknown type id, a header/body type mismatch,
///   or an undeserializable payload: an error, fatal to the session.
/// - Otherwise: [`Decoded::Frame`] with the exact byte count consumed.
pub fn decode(buf: &[u8]) -> Result<Decoded, ProtocolError> {
    let Some(total) = frame_len(buf)? else {
        return Ok(Decoded::NeedMoreData);
    };
    if buf.len() < total {
        return Ok(Decoded::NeedMoreData);
    }

    let mut id_bytes = [0u8; 4];
    id_bytes.copy_from_slice(&buf[4..8]);
    let header_id = u32::from_be_bytes(id_bytes);
    let header_kind = MessageKind::try_from(header_id)?;

    let envelope: Envelope =
        serde_json::from_slice(&buf[HEADER_LEN..total]).map_err(ProtocolError::MalformedPayload)?;

    if envelope.kind != header_kind {
        return Err(ProtocolError::KindMismatch {
            header: header_id,
            body: envelope.kind.into(),
        });
    }

    Ok(Decoded::Frame {
        envelope,
        consumed: total,
    })
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
