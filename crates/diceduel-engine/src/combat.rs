//! Combat resolution: dice, criticals and the damage formula.
//!
//! The formula, reproduced exactly:
//!
//! ```text
//! roll    = uniform 1..=sides          (roll == sides is a critical)
//! base    = max(0, atk + roll - def)
//! mult    = 1.0 + 0.5 if attacker buffed - 0.25 if defender debuffed
//! damage  = trunc(base * mult)
//! crit    → damage = trunc(damage * 1.5) + 1
//! ```
//!
//! Rolls come from a ChaCha stream cipher RNG so a seeded match replays
//! bit-for-bit.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::{Combatant, EngineError};

/// Hp restored by one heal item.
pub const HEAL_AMOUNT: i32 = 10;
/// Turns a buff stays active once triggered.
pub const BUFF_DURATION: u32 = 2;
/// Damage multiplier bonus while buffed.
pub const BUFF_BONUS: f64 = 0.5;
/// Damage multiplier penalty while the defender is debuffed.
pub const DEBUFF_PENALTY: f64 = 0.25;
/// Critical-hit damage multiplier (plus one flat point).
pub const CRIT_BONUS: f64 = 1.5;
/// How far defense may drift above the archetype base (from stacked
/// defends) before it snaps back.
pub const DEF_CLAMP_SLACK: i32 = 3;

/// The die a match is played with. The host picks; the guest adopts it
/// from `GAME_CONFIG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiceKind {
    D6,
    D8,
    D10,
}

impl DiceKind {
    pub fn sides(self) -> u32 {
        match self {
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
        }
    }
}

impl fmt::Display for DiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::D6 => f.write_str("d6"),
            Self::D8 => f.write_str("d8"),
            Self::D10 => f.write_str("d10"),
        }
    }
}

impl FromStr for DiceKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, EngineError> {
        match s {
            "d6" => Ok(Self::D6),
            "d8" => Ok(Self::D8),
            "d10" => Ok(Self::D10),
            other => Err(EngineError::UnknownDice(other.to_string())),
        }
    }
}

/// Seedable dice source.
pub struct DiceRoller {
    rng: ChaCha8Rng,
}

impl DiceRoller {
    /// Seeded roller if a seed is given, OS entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self {
                rng: ChaCha8Rng::from_os_rng(),
            },
        }
    }

    /// Fully deterministic roller: the same seed replays the same rolls.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// One die roll, uniform in `1..=sides`.
    pub fn roll(&mut self, sides: u32) -> u32 {
        self.rng.random_range(1..=sides)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random::<f64>() < p
    }
}

/// Result of one attack resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRoll {
    pub roll: u32,
    pub crit: bool,
    pub damage: i32,
}

/// The deterministic half of combat resolution: damage from a known roll.
pub fn attack_damage(
    attacker: &Combatant,
    defender: &Combatant,
    roll: u32,
    sides: u32,
) -> AttackRoll {
    let crit = roll == sides;
    let base = (attacker.atk + roll as i32 - defender.defense).max(0);

    let mut multiplier = 1.0;
    if attacker.buff_turns_remaining > 0 {
        multiplier += BUFF_BONUS;
    }
    if defender.debuff_turns_remaining > 0 {
        multiplier -= DEBUFF_PENALTY;
    }

    let mut damage = (base as f64 * multiplier) as i32;
    if crit {
        damage = (damage as f64 * CRIT_BONUS) as i32 + 1;
    }

    AttackRoll { roll, crit, damage }
}

/// Rolls the die and resolves the attack.
pub fn resolve_attack(
    attacker: &Combatant,
    defender: &Combatant,
    dice: DiceKind,
    roller: &mut DiceRoller,
) -> AttackRoll {
    let sides = dice.sides();
    attack_damage(attacker, defender, roller.roll(sides), sides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    fn fighter(atk: i32, def: i32) -> Combatant {
        let catalog = Catalog::standard();
        let mut c = Combatant::from_archetype("F", catalog.get("warrior").unwrap());
        c.atk = atk;
        c.defense = def;
        c
    }

    #[test]
    fn critical_damage_scenario() {
        // atk 5, d6 roll of 6 (maximum => critical), def 2, no modifiers:
        // base = 5 + 6 - 2 = 9; crit => trunc(9 * 1.5) + 1 = 14.
        let attacker = fighter(5, 0);
        let defender = fighter(0, 2);
        let result = attack_damage(&attacker, &defender, 6, 6);
        assert!(result.crit);
        assert_eq!(result.damage, 14);
    }

    #[test]
    fn non_critical_damage() {
        let attacker = fighter(5, 0);
        let defender = fighter(0, 2);
        let result = attack_damage(&attacker, &defender, 3, 6);
        assert!(!result.crit);
        assert_eq!(result.damage, 6); // 5 + 3 - 2
    }

    #[test]
    fn base_damage_never_negative() {
        let attacker = fighter(1, 0);
        let defender = fighter(0, 10);
        let result = attack_damage(&attacker, &defender, 2, 6);
        assert_eq!(result.damage, 0);
    }

    #[test]
    fn buff_adds_half_again() {
        let mut attacker = fighter(5, 0);
        attacker.buff_turns_remaining = 1;
        let defender = fighter(0, 2);
        // base 6 * 1.5 = 9
        assert_eq!(attack_damage(&attacker, &defender, 3, 6).damage, 9);
    }

    #[test]
    fn debuff_shaves_a_quarter() {
        let attacker = fighter(5, 0);
        let mut defender = fighter(0, 2);
        defender.debuff_turns_remaining = 1;
        // base 6 * 0.75 = 4.5, truncated to 4
        assert_eq!(attack_damage(&attacker, &defender, 3, 6).damage, 4);
    }

    #[test]
    fn rolls_stay_in_range() {
        let mut roller = DiceRoller::seeded(7);
        for dice in [DiceKind::D6, DiceKind::D8, DiceKind::D10] {
            for _ in 0..200 {
                let roll = roller.roll(dice.sides());
                assert!((1..=dice.sides()).contains(&roll));
            }
        }
    }

    #[test]
    fn seeded_rolls_are_reproducible() {
        let mut a = DiceRoller::seeded(42);
        let mut b = DiceRoller::seeded(42);
        let rolls_a: Vec<u32> = (0..100).map(|_| a.roll(10)).collect();
        let rolls_b: Vec<u32> = (0..100).map(|_| b.roll(10)).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn seeded_resolution_is_reproducible() {
        let attacker = fighter(5, 0);
        let defender = fighter(0, 2);
        let mut a = DiceRoller::seeded(99);
        let mut b = DiceRoller::seeded(99);
        for _ in 0..50 {
            let ra = resolve_attack(&attacker, &defender, DiceKind::D8, &mut a);
            let rb = resolve_attack(&attacker, &defender, DiceKind::D8, &mut b);
            assert_eq!(ra, rb);
        }
    }

    #[test]
    fn dice_kind_parses_and_prints() {
        assert_eq!("d6".parse::<DiceKind>().unwrap(), DiceKind::D6);
        assert_eq!("d10".parse::<DiceKind>().unwrap(), DiceKind::D10);
        assert_eq!(DiceKind::D8.to_string(), "d8");
        assert!("d20".parse::<DiceKind>().is_err());
    }

    #[test]
    fn dice_kind_wire_form_is_lowercase() {
        assert_eq!(serde_json::to_string(&DiceKind::D6).unwrap(), "\"d6\"");
        let d: DiceKind = serde_json::from_str("\"d10\"").unwrap();
        assert_eq!(d, DiceKind::D10);
    }
}
