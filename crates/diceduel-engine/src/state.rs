//! Match state: the replicated pair of combatants plus turn bookkeeping.

use serde::{Deserialize, Serialize};

use crate::{Combatant, DiceKind};

/// Which endpoint of the match this process is.
///
/// Players are kept in canonical order on BOTH processes — index 0 is the
/// host, index 1 is the guest — so a received snapshot pair can overwrite
/// the local one verbatim, with no perspective swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Host,
    Guest,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Self::Host => 0,
            Self::Guest => 1,
        }
    }

    pub fn opponent_index(self) -> usize {
        1 - self.index()
    }
}

/// The authoritative state of one match, owned independently by each
/// process. Consistency between the two copies comes purely from full
/// snapshot retransmission after every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Current round, starting at 1. A round is one host turn plus one
    /// guest turn.
    pub round: u32,
    /// Canonical pair: `players[0]` is the host, `players[1]` the guest.
    pub players: [Combatant; 2],
    /// Index of the side currently permitted to act.
    pub turn_owner: usize,
    pub dice: DiceKind,
}

impl MatchState {
    /// A fresh match. The host always owns the first turn.
    pub fn new(host: Combatant, guest: Combatant, dice: DiceKind) -> Self {
        Self {
            round: 1,
            players: [host, guest],
            turn_owner: Side::Host.index(),
            dice,
        }
    }

    /// Flips turn ownership unconditionally; the round counter advances
    /// once per completed pair of turns, when ownership returns to the
    /// host.
    pub fn advance_turn(&mut self) {
        self.turn_owner = 1 - self.turn_owner;
        if self.turn_owner == Side::Host.index() {
            self.round += 1;
        }
    }

    /// The surviving combatant, once the other has dropped to 0 hp.
    pub fn winner(&self) -> Option<&Combatant> {
        match (self.players[0].is_alive(), self.players[1].is_alive()) {
            (true, false) => Some(&self.players[0]),
            (false, true) => Some(&self.players[1]),
            _ => None,
        }
    }
}

/// How a match concluded on this side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Somebody's hp reached zero; `winner` names the survivor.
    Victory { winner: String },
    /// The link failed mid-match. No winner is declared on this side and
    /// nothing is retried.
    ConnectionLost,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    fn state() -> MatchState {
        let catalog = Catalog::standard();
        MatchState::new(
            Combatant::from_archetype("Alice", catalog.get("warrior").unwrap()),
            Combatant::from_archetype("Bob", catalog.get("mage").unwrap()),
            DiceKind::D6,
        )
    }

    #[test]
    fn host_owns_the_first_turn() {
        let s = state();
        assert_eq!(s.turn_owner, Side::Host.index());
        assert_eq!(s.round, 1);
    }

    #[test]
    fn owner_is_host_iff_completed_turns_is_even() {
        let mut s = state();
        for completed in 0..10 {
            let host_owns = s.turn_owner == Side::Host.index();
            assert_eq!(host_owns, completed % 2 == 0);
            s.advance_turn();
        }
    }

    #[test]
    fn round_increments_once_per_turn_pair() {
        let mut s = state();
        s.advance_turn(); // host done
        assert_eq!(s.round, 1);
        s.advance_turn(); // guest done
        assert_eq!(s.round, 2);
        s.advance_turn();
        s.advance_turn();
        assert_eq!(s.round, 3);
    }

    #[test]
    fn winner_requires_a_dead_combatant() {
        let mut s = state();
        assert!(s.winner().is_none());
        s.players[1].hp = 0;
        assert_eq!(s.winner().map(|c| c.name.as_str()), Some("Alice"));
    }
}
