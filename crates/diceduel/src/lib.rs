//! # Diceduel
//!
//! Two-player networked dice battles over TCP or UDP.
//!
//! The stack underneath, each its own crate:
//!
//! - [`diceduel_protocol`] — the length-prefixed JSON envelope codec,
//! - [`diceduel_net`] — blocking socket endpoints for both transports,
//! - [`diceduel_session`] — the two-message handshake and message link,
//! - [`diceduel_engine`] — combat rules and the turn synchronization loop.
//!
//! This crate ties them together into two entry points: host a match with
//! [`HostMatch`] or join one with [`join_match`]. Plug in an
//! [`ActionPolicy`] (the built-in [`CpuPolicy`] or a human prompt) and a
//! [`MatchView`] for rendering.
//!
//! ```rust,no_run
//! use diceduel::prelude::*;
//!
//! # fn main() -> Result<(), MatchError> {
//! let mut policy = CpuPolicy::new(None);
//! let outcome = join_match(
//!     "127.0.0.1",
//!     DEFAULT_PORT,
//!     Proto::Tcp,
//!     MatchOptions::default(),
//!     &mut policy,
//!     &mut SilentView,
//! )?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

mod error;
mod setup;

pub use error::MatchError;
pub use setup::{join_match, CharacterSelectData, GameConfigData, HostMatch, MatchOptions};

pub use diceduel_engine::{
    Action, ActionOutcome, ActionPolicy, Archetype, Catalog, Combatant, CpuPolicy, DiceKind,
    DiceRoller, MatchState, MatchView, Outcome, Side, SilentView,
};
pub use diceduel_net::{Proto, DEFAULT_PORT};
pub use diceduel_protocol::PROTOCOL_VERSION;

pub mod prelude {
    pub use crate::{
        join_match, Action, ActionOutcome, ActionPolicy, Catalog, Combatant, CpuPolicy, DiceKind,
        HostMatch, MatchError, MatchOptions, MatchState, MatchView, Outcome, Proto, SilentView,
        DEFAULT_PORT,
    };
}
