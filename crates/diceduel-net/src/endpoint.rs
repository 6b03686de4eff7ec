//! The blocking TCP/UDP endpoint.
//!
//! An [`Endpoint`] exclusively owns its socket handle; dropping the
//! endpoint releases the socket exactly once on every exit path (normal
//! teardown, connection loss, or an error during setup).
//!
//! UDP has no transport-level connections, so "connected" there is a
//! protocol-level fiction: the endpoint just remembers the first peer
//! address it saw (server) or the target it was given (client). The
//! handshake layer above turns that into a session.

use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs, UdpSocket};

use crate::{NetError, RECV_CHUNK};
use diceduel_protocol::frame_len;

/// Which transport the endpoint runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proto {
    /// Reliable, ordered byte stream. Frames are reassembled from the
    /// stream via the length header.
    Tcp,
    /// Unsequenced datagrams. One datagram carries one frame; delivery and
    /// ordering are not guaranteed.
    Udp,
}

enum Handle {
    Listener(TcpListener),
    Stream(TcpStream),
    Datagram(UdpSocket),
}

/// One side of a match's network link.
pub struct Endpoint {
    handle: Handle,
    peer: Option<SocketAddr>,
    /// Receive accumulator. Meaningful only for stream transport; datagram
    /// receives are already message-delimited.
    buf: Vec<u8>,
}

impl Endpoint {
    /// Opens a listening endpoint on `host:port`.
    ///
    /// `host` must be an IP literal; it selects the address family. An
    /// empty `host` binds the IPv4 wildcard (use `"::"` for the IPv6
    /// wildcard). For UDP there is nothing to listen on — the socket is
    /// simply bound.
    pub fn listen(host: &str, port: u16, proto: Proto) -> Result<Self, NetError> {
        let addr = listen_addr(host, port)?;
        let handle = match proto {
            Proto::Tcp => {
                let listener = TcpListener::bind(addr).map_err(NetError::Setup)?;
                tracing::info!(%addr, "TCP listener bound");
                Handle::Listener(listener)
            }
            Proto::Udp => {
                let socket = UdpSocket::bind(addr).map_err(NetError::Setup)?;
                tracing::info!(%addr, "UDP socket bound");
                Handle::Datagram(socket)
            }
        };
        Ok(Self {
            handle,
            peer: None,
            buf: Vec::new(),
        })
    }

    /// Opens a client endpoint toward `host:port`.
    ///
    /// TCP performs the usual connect. UDP only records the target as the
    /// peer — no bytes travel until the first send.
    pub fn connect(host: &str, port: u16, proto: Proto) -> Result<Self, NetError> {
        let addr = peer_addr_of(host, port)?;
        let handle = match proto {
            Proto::Tcp => {
                let stream = TcpStream::connect(addr).map_err(NetError::Setup)?;
                tracing::info!(%addr, "TCP connected");
                Handle::Stream(stream)
            }
            Proto::Udp => {
                let socket = UdpSocket::bind(wildcard_for(addr.ip())).map_err(NetError::Setup)?;
                socket.connect(addr).map_err(NetError::Setup)?;
                tracing::info!(%addr, "UDP peer recorded");
                Handle::Datagram(socket)
            }
        };
        Ok(Self {
            handle,
            peer: Some(addr),
            buf: Vec::new(),
        })
    }

    /// Blocks until a peer shows up, and returns its address.
    ///
    /// TCP: accepts one inbound connection and replaces the listening
    /// handle with the per-connection stream. UDP: waits for the first
    /// datagram to arrive, records its source as the implicit peer, and
    /// leaves the datagram queued for the next [`recv_frame`] — the
    /// handshake layer consumes it, not this one.
    ///
    /// [`recv_frame`]: Endpoint::recv_frame
    pub fn accept_or_wait(&mut self) -> Result<SocketAddr, NetError> {
        match &mut self.handle {
            Handle::Listener(listener) => {
                let (stream, addr) = listener.accept().map_err(NetError::Setup)?;
                tracing::info!(%addr, "peer connected");
                self.handle = Handle::Stream(stream);
                self.peer = Some(addr);
                Ok(addr)
            }
            Handle::Datagram(socket) if self.peer.is_none() => {
                let mut probe = [0u8; RECV_CHUNK];
                let (_, addr) = socket.peek_from(&mut probe).map_err(NetError::Setup)?;
                socket.connect(addr).map_err(NetError::Setup)?;
                tracing::info!(%addr, "first datagram seen, peer adopted");
                self.peer = Some(addr);
                Ok(addr)
            }
            _ => Err(NetError::NotConnected),
        }
    }

    /// Sends one complete frame to the peer.
    pub fn send(&mut self, frame: &[u8]) -> Result<(), NetError> {
        match &mut self.handle {
            Handle::Stream(stream) => stream.write_all(frame).map_err(NetError::Send),
            Handle::Datagram(socket) if self.peer.is_some() => {
                socket.send(frame).map(|_| ()).map_err(NetError::Send)
            }
            _ => Err(NetError::NotConnected),
        }
    }

    /// Blocks until one complete frame's bytes are available and returns
    /// them.
    ///
    /// Stream transport reads in [`RECV_CHUNK`] pieces into the
    /// accumulator until the length header is satisfied, retaining any
    /// excess bytes for the next call. Datagram transport returns one
    /// datagram verbatim; a datagram longer than [`RECV_CHUNK`] arrives
    /// truncated.
    pub fn recv_frame(&mut self) -> Result<Vec<u8>, NetError> {
        match &mut self.handle {
            Handle::Stream(stream) => loop {
                if let Some(total) = frame_len(&self.buf)? {
                    if self.buf.len() >= total {
                        let rest = self.buf.split_off(total);
                        let frame = std::mem::replace(&mut self.buf, rest);
                        return Ok(frame);
                    }
                }
                let mut chunk = [0u8; RECV_CHUNK];
                let n = stream.read(&mut chunk).map_err(NetError::Recv)?;
                if n == 0 {
                    return Err(NetError::PeerClosed);
                }
                self.buf.extend_from_slice(&chunk[..n]);
            },
            Handle::Datagram(socket) if self.peer.is_some() => {
                let mut chunk = [0u8; RECV_CHUNK];
                let n = socket.recv(&mut chunk).map_err(NetError::Recv)?;
                Ok(chunk[..n].to_vec())
            }
            _ => Err(NetError::NotConnected),
        }
    }

    /// True for stream (TCP) transport.
    pub fn is_stream(&self) -> bool {
        !matches!(self.handle, Handle::Datagram(_))
    }

    /// The peer's address, once known.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// The locally bound address.
    pub fn local_addr(&self) -> Result<SocketAddr, NetError> {
        match &self.handle {
            Handle::Listener(listener) => listener.local_addr(),
            Handle::Stream(stream) => stream.local_addr(),
            Handle::Datagram(socket) => socket.local_addr(),
        }
        .map_err(NetError::Setup)
    }
}

/// Picks the bind address for a listener: literal hosts choose their own
/// family, an empty host means the IPv4 wildcard.
fn listen_addr(host: &str, port: u16) -> Result<SocketAddr, NetError> {
    if host.is_empty() {
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }
    let ip: IpAddr = host
        .parse()
        .map_err(|_| NetError::InvalidAddr(host.to_string()))?;
    Ok(SocketAddr::new(ip, port))
}

/// Resolves a peer address: IP literals pass through, anything else goes
/// through name resolution.
fn peer_addr_of(host: &str, port: u16) -> Result<SocketAddr, NetError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }
    (host, port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| NetError::InvalidAddr(host.to_string()))
}

/// Family-matching wildcard for a UDP client's local bind.
fn wildcard_for(peer: IpAddr) -> SocketAddr {
    match peer {
        IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_host_binds_ipv4_wildcard() {
        let addr = listen_addr("", 12345).unwrap();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(addr.port(), 12345);
    }

    #[test]
    fn ipv6_literal_selects_v6_family() {
        let addr = listen_addr("::1", 12345).unwrap();
        assert!(addr.is_ipv6());
        let addr = listen_addr("::", 12345).unwrap();
        assert_eq!(addr.ip(), IpAddr::V6(Ipv6Addr::UNSPECIFIED));
    }

    #[test]
    fn ipv4_literal_selects_v4_family() {
        let addr = listen_addr("192.168.1.10", 9999).unwrap();
        assert!(addr.is_ipv4());
    }

    #[test]
    fn junk_listen_host_is_rejected() {
        assert!(matches!(
            listen_addr("not-an-ip", 12345),
            Err(NetError::InvalidAddr(_))
        ));
    }

    #[test]
    fn peer_literal_skips_resolution() {
        let addr = peer_addr_of("127.0.0.1", 12345).unwrap();
        assert_eq!(addr, "127.0.0.1:12345".parse().unwrap());
    }

    #[test]
    fn udp_client_binds_matching_family() {
        assert!(wildcard_for("127.0.0.1".parse().unwrap()).is_ipv4());
        assert!(wildcard_for("::1".parse().unwrap()).is_ipv6());
    }
}
