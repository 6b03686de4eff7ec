//! The session state machine over a transport endpoint.

use serde::Serialize;

use diceduel_net::Endpoint;
use diceduel_protocol::{decode, encode, Decoded, Envelope, MessageKind, PROTOCOL_VERSION};

use crate::{HandshakeReply, HandshakeRequest, HandshakeStatus, MessageLink, SessionError};

/// Where a session is in its lifecycle.
///
/// Note that "connected" is a protocol-level state, not a transport fact:
/// on datagram transport nothing was established underneath — the session
/// object holds the remembered peer and this flag, and that is all
/// "connected" means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    /// Client only: handshake sent, awaiting the verdict.
    HandshakeSent,
    /// Server only: waiting for the peer's opening handshake.
    HandshakeAwait,
    Connected,
}

/// One side of a match session.
///
/// Owns the endpoint (and through it the socket handle) exclusively; the
/// socket is released exactly once when the session is dropped, on every
/// exit path.
pub struct Session {
    endpoint: Endpoint,
    state: SessionState,
    peer_version: Option<String>,
}

impl Session {
    /// Wraps a transport endpoint in a not-yet-connected session.
    ///
    /// For servers, call [`Endpoint::accept_or_wait`] before constructing
    /// the session, then [`respond`](Session::respond). Clients go straight
    /// to [`initiate`](Session::initiate).
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            state: SessionState::Disconnected,
            peer_version: None,
        }
    }

    /// Client side of the handshake: send our hello, await the verdict.
    ///
    /// The session becomes connected only on an `accepted` reply. Any
    /// other outcome — rejection, a malformed or unexpected reply, a
    /// transport error — leaves it disconnected, and match setup must be
    /// aborted.
    pub fn initiate(&mut self, client_info: &str) -> Result<(), SessionError> {
        self.state = SessionState::HandshakeSent;
        let request = HandshakeRequest {
            version: PROTOCOL_VERSION.to_string(),
            client_info: client_info.to_string(),
        };
        if let Err(e) = self.send_raw(MessageKind::Handshake, &request) {
            self.state = SessionState::Disconnected;
            return Err(e);
        }

        let envelope = match self.recv_raw() {
            Ok(env) => env,
            Err(e) => {
                self.state = SessionState::Disconnected;
                return Err(e);
            }
        };
        if envelope.kind != MessageKind::Handshake {
            self.state = SessionState::Disconnected;
            return Err(SessionError::Unexpected {
                expected: MessageKind::Handshake,
                got: envelope.kind,
            });
        }
        let reply: HandshakeReply = match serde_json::from_value(envelope.data) {
            Ok(reply) => reply,
            Err(e) => {
                self.state = SessionState::Disconnected;
                return Err(diceduel_protocol::ProtocolError::MalformedPayload(e).into());
            }
        };

        match reply.status {
            HandshakeStatus::Accepted => {
                log_version(&reply.version);
                tracing::info!(server = %reply.server_info, "handshake accepted");
                self.peer_version = Some(reply.version);
                self.state = SessionState::Connected;
                Ok(())
            }
            HandshakeStatus::Rejected => {
                tracing::warn!("handshake rejected by server");
                self.state = SessionState::Disconnected;
                Err(SessionError::Rejected)
            }
        }
    }

    /// Server side of the handshake: await the peer's hello and accept it.
    ///
    /// A first message that is not a handshake gets a `rejected` reply
    /// (best-effort) and fails setup.
    pub fn respond(&mut self, server_info: &str) -> Result<(), SessionError> {
        self.state = SessionState::HandshakeAwait;
        let envelope = match self.recv_raw() {
            Ok(env) => env,
            Err(e) => {
                self.state = SessionState::Disconnected;
                return Err(e);
            }
        };

        if envelope.kind != MessageKind::Handshake {
            let reply = HandshakeReply {
                version: PROTOCOL_VERSION.to_string(),
                status: HandshakeStatus::Rejected,
                server_info: server_info.to_string(),
            };
            let _ = self.send_raw(MessageKind::Handshake, &reply);
            self.state = SessionState::Disconnected;
            return Err(SessionError::Unexpected {
                expected: MessageKind::Handshake,
                got: envelope.kind,
            });
        }

        let request: HandshakeRequest = match serde_json::from_value(envelope.data) {
            Ok(req) => req,
            Err(e) => {
                self.state = SessionState::Disconnected;
                return Err(diceduel_protocol::ProtocolError::MalformedPayload(e).into());
            }
        };
        log_version(&request.version);
        tracing::info!(client = %request.client_info, "handshake received");

        let reply = HandshakeReply {
            version: PROTOCOL_VERSION.to_string(),
            status: HandshakeStatus::Accepted,
            server_info: server_info.to_string(),
        };
        if let Err(e) = self.send_raw(MessageKind::Handshake, &reply) {
            self.state = SessionState::Disconnected;
            return Err(e);
        }

        self.peer_version = Some(request.version);
        self.state = SessionState::Connected;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Protocol version the peer reported during the handshake.
    pub fn peer_version(&self) -> Option<&str> {
        self.peer_version.as_deref()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn send_raw<T: Serialize>(&mut self, kind: MessageKind, data: &T) -> Result<(), SessionError> {
        let frame = encode(kind, data)?;
        self.endpoint.send(&frame)?;
        Ok(())
    }

    fn recv_raw(&mut self) -> Result<Envelope, SessionError> {
        let bytes = self.endpoint.recv_frame()?;
        match decode(&bytes)? {
            Decoded::Frame { envelope, .. } => Ok(envelope),
            // recv_frame returned a "complete" message that is shorter than
            // its own header claims: a truncated datagram.
            Decoded::NeedMoreData => Err(SessionError::Truncated),
        }
    }
}

impl MessageLink for Session {
    fn send_message<T: Serialize>(
        &mut self,
        kind: MessageKind,
        data: &T,
    ) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        if let Err(e) = self.send_raw(kind, data) {
            self.state = SessionState::Disconnected;
            return Err(e);
        }
        Ok(())
    }

    fn recv_message(&mut self) -> Result<Envelope, SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        match self.recv_raw() {
            Ok(envelope) => Ok(envelope),
            Err(e) => {
                self.state = SessionState::Disconnected;
                Err(e)
            }
        }
    }
}

fn log_version(peer_version: &str) {
    if peer_version == PROTOCOL_VERSION {
        tracing::debug!(version = peer_version, "peer protocol version");
    } else {
        // Tolerated: the exchanged version is informational only.
        tracing::warn!(
            ours = PROTOCOL_VERSION,
            theirs = peer_version,
            "protocol version mismatch, continuing"
        );
    }
}
