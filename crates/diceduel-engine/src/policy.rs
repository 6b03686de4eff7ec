//! Action selection: what the local side does with its turn.

use crate::{Combatant, DiceRoller};

/// One of the four things a combatant can do on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Roll the die and strike the opponent.
    Attack,
    /// Spend a heal item for hp, clamped to max.
    Heal,
    /// Spend a buff item: +50% damage for the next turns.
    Buff,
    /// Raise defense by one for the rest of the match (softly clamped).
    Defend,
}

/// Decides the local action each turn. Implemented by the CPU opponent
/// here and by interactive prompts in front ends.
///
/// If the chosen action needs an item the combatant has run out of, the
/// engine asks again rather than failing the turn, so implementations
/// should not return an exhausted item choice twice in a row.
pub trait ActionPolicy {
    fn decide(&mut self, me: &Combatant, foe: &Combatant) -> Action;
}

/// The built-in computer opponent, a fixed threshold rule:
///
/// 1. heal when own hp has fallen to 35% of max or below and a heal item
///    remains,
/// 2. otherwise buff with probability 0.4 when the foe is at half health
///    or below and a buff item remains,
/// 3. otherwise attack.
pub struct CpuPolicy {
    roller: DiceRoller,
}

impl CpuPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            roller: DiceRoller::new(seed),
        }
    }
}

impl ActionPolicy for CpuPolicy {
    fn decide(&mut self, me: &Combatant, foe: &Combatant) -> Action {
        let low_hp = me.hp as f64 <= me.max_hp as f64 * 0.35;
        if low_hp && me.items.heal > 0 {
            return Action::Heal;
        }
        let foe_weak = foe.hp as f64 <= foe.max_hp as f64 * 0.5;
        if me.items.buff > 0 && foe_weak && self.roller.chance(0.4) {
            return Action::Buff;
        }
        Action::Attack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    fn pair() -> (Combatant, Combatant) {
        let catalog = Catalog::standard();
        (
            Combatant::from_archetype("Me", catalog.get("warrior").unwrap()),
            Combatant::from_archetype("Foe", catalog.get("mage").unwrap()),
        )
    }

    #[test]
    fn cpu_heals_when_low_with_items() {
        let (mut me, foe) = pair();
        me.hp = (me.max_hp as f64 * 0.35) as i32; // exactly at threshold
        let mut cpu = CpuPolicy::new(Some(1));
        assert_eq!(cpu.decide(&me, &foe), Action::Heal);
    }

    #[test]
    fn cpu_attacks_when_low_but_out_of_heals() {
        let (mut me, foe) = pair();
        me.hp = 1;
        me.items.heal = 0;
        me.items.buff = 0;
        let mut cpu = CpuPolicy::new(Some(1));
        assert_eq!(cpu.decide(&me, &foe), Action::Attack);
    }

    #[test]
    fn cpu_never_buffs_against_a_healthy_foe() {
        let (me, foe) = pair();
        let mut cpu = CpuPolicy::new(Some(1));
        for _ in 0..100 {
            assert_eq!(cpu.decide(&me, &foe), Action::Attack);
        }
    }

    #[test]
    fn cpu_sometimes_buffs_a_weakened_foe() {
        let (me, mut foe) = pair();
        foe.hp = foe.max_hp / 2;
        let mut cpu = CpuPolicy::new(Some(1));
        let buffed = (0..100).any(|_| cpu.decide(&me, &foe) == Action::Buff);
        assert!(buffed);
    }
}
