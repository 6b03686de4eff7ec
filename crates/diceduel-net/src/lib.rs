//! Transport abstraction for Diceduel.
//!
//! One [`Endpoint`] owns one underlying socket — a TCP stream or a UDP
//! socket — and exposes listen/connect/accept/send/receive primitives that
//! are uniform across both. The engine above never touches a socket type
//! directly.
//!
//! All operations are blocking and carry no timeout: execution is
//! single-threaded and fully synchronous per process, and a peer that never
//! sends leaves the other side blocked. That is an accepted limitation of
//! this design, not something this layer papers over.

mod endpoint;
mod error;

pub use endpoint::{Endpoint, Proto};
pub use error::NetError;

/// Default match port.
pub const DEFAULT_PORT: u16 = 12345;

/// Socket read size. Also the upper bound on a single datagram's payload:
/// a logical message larger than this is silently truncated on UDP (known
/// fragility of unsequenced datagram transport).
pub const RECV_CHUNK: usize = 4096;
