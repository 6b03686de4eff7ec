//! Turn synchronization engine and combat model for Diceduel.
//!
//! The [`TurnEngine`] alternates exclusive turn ownership between the host
//! and the guest of a match and keeps both replicas of the
//! [`MatchState`] consistent by retransmitting full combatant snapshots —
//! never deltas — after every action. The remote snapshot is authoritative:
//! on the opponent's turn the engine overwrites its local state verbatim
//! with whatever arrives, with no reconciliation.
//!
//! The engine talks to three collaborators it does not implement:
//!
//! - an [`ActionPolicy`] that decides what the local side does on its turn
//!   (a human prompt or the [`CpuPolicy`] threshold rule),
//! - a [`MatchView`] that renders turns and outcomes,
//! - a [`MessageLink`](diceduel_session::MessageLink) that carries
//!   envelopes to the peer.
//!
//! Everything here is synchronous; the engine blocks inside
//! `recv_message` on the opponent's turn until data arrives or the link
//! reports closure.

mod catalog;
mod combat;
mod combatant;
mod engine;
mod error;
mod policy;
mod state;
mod view;

pub use catalog::{Archetype, Catalog};
pub use combat::{
    attack_damage, resolve_attack, AttackRoll, DiceKind, DiceRoller, BUFF_BONUS, BUFF_DURATION,
    CRIT_BONUS, DEBUFF_PENALTY, DEF_CLAMP_SLACK, HEAL_AMOUNT,
};
pub use combatant::{Combatant, ItemBag};
pub use engine::{apply_action, ActionOutcome, GameEndData, TurnEngine, TurnResultData};
pub use error::EngineError;
pub use policy::{Action, ActionPolicy, CpuPolicy};
pub use state::{MatchState, Outcome, Side};
pub use view::{MatchView, SilentView};
