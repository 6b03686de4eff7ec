//! Loopback integration tests for the TCP/UDP endpoint.
//!
//! Each test binds an ephemeral port on 127.0.0.1 and drives the peer from
//! a separate thread, since every endpoint operation blocks.

use std::io::Write;
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use diceduel_net::{Endpoint, Proto, RECV_CHUNK};
use diceduel_protocol::{decode, encode, Decoded, MessageKind};
use serde_json::json;

fn frame(kind: MessageKind, data: serde_json::Value) -> Vec<u8> {
    encode(kind, &data).unwrap()
}

fn unwrap_frame(bytes: &[u8]) -> diceduel_protocol::Envelope {
    match decode(bytes).unwrap() {
        Decoded::Frame { envelope, consumed } => {
            assert_eq!(consumed, bytes.len());
            envelope
        }
        Decoded::NeedMoreData => panic!("incomplete frame from recv_frame"),
    }
}

#[test]
fn tcp_frame_exchange() {
    let mut server = Endpoint::listen("127.0.0.1", 0, Proto::Tcp).unwrap();
    let addr = server.local_addr().unwrap();

    let client = thread::spawn(move || {
        let mut client = Endpoint::connect("127.0.0.1", addr.port(), Proto::Tcp).unwrap();
        client
            .send(&frame(MessageKind::Handshake, json!({"version": "1.0"})))
            .unwrap();
        let reply = client.recv_frame().unwrap();
        unwrap_frame(&reply)
    });

    let peer = server.accept_or_wait().unwrap();
    assert!(peer.ip().is_loopback());

    let env = unwrap_frame(&server.recv_frame().unwrap());
    assert_eq!(env.kind, MessageKind::Handshake);

    server
        .send(&frame(MessageKind::Handshake, json!({"status": "accepted"})))
        .unwrap();

    let reply = client.join().unwrap();
    assert_eq!(reply.kind, MessageKind::Handshake);
    assert_eq!(reply.data["status"], "accepted");
}

#[test]
fn tcp_coalesced_frames_are_split_by_the_accumulator() {
    let mut server = Endpoint::listen("127.0.0.1", 0, Proto::Tcp).unwrap();
    let addr = server.local_addr().unwrap();

    let client = thread::spawn(move || {
        // Two frames in a single write: the receiver must return them one
        // at a time, retaining the excess bytes between calls.
        let mut both = frame(MessageKind::GameConfig, json!({"dice_type": "d6"}));
        both.extend_from_slice(&frame(MessageKind::CharacterSelect, json!({"character": "mage"})));
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(&both).unwrap();
        // Keep the stream open until the server has read everything.
        thread::sleep(Duration::from_millis(200));
    });

    server.accept_or_wait().unwrap();
    let first = unwrap_frame(&server.recv_frame().unwrap());
    assert_eq!(first.kind, MessageKind::GameConfig);
    let second = unwrap_frame(&server.recv_frame().unwrap());
    assert_eq!(second.kind, MessageKind::CharacterSelect);
    client.join().unwrap();
}

#[test]
fn tcp_partial_delivery_blocks_until_complete() {
    let mut server = Endpoint::listen("127.0.0.1", 0, Proto::Tcp).unwrap();
    let addr = server.local_addr().unwrap();

    let client = thread::spawn(move || {
        let full = frame(MessageKind::TurnResult, json!({"round": 1}));
        let mut stream = TcpStream::connect(addr).unwrap();
        // Header first, then the payload after a pause: the server's
        // receive must keep buffering instead of failing.
        stream.write_all(&full[..8]).unwrap();
        stream.flush().unwrap();
        thread::sleep(Duration::from_millis(50));
        stream.write_all(&full[8..]).unwrap();
        thread::sleep(Duration::from_millis(200));
    });

    server.accept_or_wait().unwrap();
    let env = unwrap_frame(&server.recv_frame().unwrap());
    assert_eq!(env.kind, MessageKind::TurnResult);
    client.join().unwrap();
}

#[test]
fn tcp_peer_close_is_reported() {
    let mut server = Endpoint::listen("127.0.0.1", 0, Proto::Tcp).unwrap();
    let addr = server.local_addr().unwrap();

    let client = thread::spawn(move || {
        let stream = TcpStream::connect(addr).unwrap();
        drop(stream);
    });

    server.accept_or_wait().unwrap();
    client.join().unwrap();
    assert!(matches!(
        server.recv_frame(),
        Err(diceduel_net::NetError::PeerClosed)
    ));
}

#[test]
fn udp_first_datagram_adopts_the_peer() {
    let mut server = Endpoint::listen("127.0.0.1", 0, Proto::Udp).unwrap();
    let addr = server.local_addr().unwrap();

    let client = thread::spawn(move || {
        let mut client = Endpoint::connect("127.0.0.1", addr.port(), Proto::Udp).unwrap();
        client
            .send(&frame(MessageKind::Handshake, json!({"version": "1.0"})))
            .unwrap();
        let reply = client.recv_frame().unwrap();
        unwrap_frame(&reply)
    });

    let peer = server.accept_or_wait().unwrap();
    assert!(peer.ip().is_loopback());
    // accept_or_wait only peeked: the handshake datagram is still queued.
    let env = unwrap_frame(&server.recv_frame().unwrap());
    assert_eq!(env.kind, MessageKind::Handshake);

    server
        .send(&frame(MessageKind::Handshake, json!({"status": "accepted"})))
        .unwrap();
    let reply = client.join().unwrap();
    assert_eq!(reply.data["status"], "accepted");
}

#[test]
fn udp_oversized_datagram_arrives_truncated() {
    // Known fragility: a logical message larger than one receive chunk is
    // silently truncated on datagram transport. This test documents the
    // gap; it does not assert recovery.
    let mut server = Endpoint::listen("127.0.0.1", 0, Proto::Udp).unwrap();
    let addr = server.local_addr().unwrap();

    let client = thread::spawn(move || {
        let mut client = Endpoint::connect("127.0.0.1", addr.port(), Proto::Udp).unwrap();
        let big = "x".repeat(RECV_CHUNK);
        client
            .send(&frame(MessageKind::TurnResult, json!({"blob": big})))
            .unwrap();
    });

    server.accept_or_wait().unwrap();
    let bytes = server.recv_frame().unwrap();
    client.join().unwrap();

    assert_eq!(bytes.len(), RECV_CHUNK);
    // The truncated datagram can never satisfy its own declared length.
    assert!(matches!(decode(&bytes), Ok(Decoded::NeedMoreData)));
}

#[test]
fn udp_send_before_peer_is_rejected() {
    let mut server = Endpoint::listen("127.0.0.1", 0, Proto::Udp).unwrap();
    assert!(matches!(
        server.send(b"anything"),
        Err(diceduel_net::NetError::NotConnected)
    ));
}
