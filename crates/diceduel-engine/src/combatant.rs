//! Combatant snapshots: the full mutable state of one fighter.
//!
//! A `Combatant` is exactly what travels inside `TURN_RESULT` — the wire
//! snapshot and the in-memory state are the same structure, which is what
//! makes verbatim overwrite replication possible.

use serde::{Deserialize, Serialize};

use crate::Archetype;

/// Consumable item counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBag {
    /// Heal potions: +10 hp, clamped to max.
    pub heal: u32,
    /// Buff charges: +50% attack damage for the next turns.
    pub buff: u32,
}

impl ItemBag {
    /// Starting loadout for every combatant.
    pub fn standard() -> Self {
        Self { heal: 2, buff: 1 }
    }
}

/// Full state of one combatant at a point in time.
///
/// Invariant: `0 <= hp <= max_hp` always; the turn counters are
/// non-negative and decrease by at most one per completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    /// Archetype id; resolves base stats in the [`Catalog`](crate::Catalog).
    pub archetype: String,
    pub hp: i32,
    pub max_hp: i32,
    pub atk: i32,
    #[serde(rename = "def")]
    pub defense: i32,
    pub items: ItemBag,
    pub buff_turns_remaining: u32,
    pub debuff_turns_remaining: u32,
}

impl Combatant {
    /// Builds a fresh combatant from an archetype's base stats.
    pub fn from_archetype(name: impl Into<String>, archetype: &Archetype) -> Self {
        Self {
            name: name.into(),
            archetype: archetype.id.clone(),
            hp: archetype.hp,
            max_hp: archetype.hp,
            atk: archetype.atk,
            defense: archetype.def,
            items: ItemBag::standard(),
            buff_turns_remaining: 0,
            debuff_turns_remaining: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Restores up to `amount` hp, clamped to `max_hp`. Returns the hp
    /// actually gained.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    /// Applies damage, clamping hp at zero.
    pub fn take_damage(&mut self, damage: i32) {
        self.hp = (self.hp - damage.max(0)).max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    fn warrior() -> Combatant {
        let catalog = Catalog::standard();
        Combatant::from_archetype("Test", catalog.get("warrior").unwrap())
    }

    #[test]
    fn fresh_combatant_starts_at_full_health() {
        let c = warrior();
        assert_eq!(c.hp, c.max_hp);
        assert_eq!(c.items, ItemBag::standard());
        assert!(c.is_alive());
    }

    #[test]
    fn heal_clamps_to_max_hp() {
        let mut c = warrior();
        c.hp = c.max_hp - 3;
        assert_eq!(c.heal(10), 3);
        assert_eq!(c.hp, c.max_hp);
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut c = warrior();
        c.take_damage(1000);
        assert_eq!(c.hp, 0);
        assert!(!c.is_alive());
    }

    #[test]
    fn hp_stays_bounded_under_arbitrary_sequences() {
        // Any interleaving of heals and hits keeps 0 <= hp <= max_hp.
        let mut c = warrior();
        let ops: [i32; 12] = [5, -9, 30, -2, -50, 10, 10, -1, 7, -100, 4, 2];
        for op in ops {
            if op >= 0 {
                c.heal(op);
            } else {
                c.take_damage(-op);
            }
            assert!(c.hp >= 0 && c.hp <= c.max_hp, "hp {} out of bounds", c.hp);
        }
    }

    #[test]
    fn snapshot_serializes_wire_field_names() {
        let c = warrior();
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["def"], 2);
        assert_eq!(value["items"]["heal"], 2);
        assert_eq!(value["items"]["buff"], 1);
        assert_eq!(value["buff_turns_remaining"], 0);
    }
}
