//! The archetype catalog: base stats for every playable character.
//!
//! The catalog is an immutable configuration table built once and passed
//! by reference into engine construction. Nothing mutates it after that —
//! both sides of a match must agree on it for snapshots to make sense.

/// Base stats for one playable archetype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archetype {
    /// Stable identifier used on the wire (`CHARACTER_SELECT`, snapshots).
    pub id: String,
    pub hp: i32,
    pub atk: i32,
    pub def: i32,
    /// One-line description for selection menus.
    pub blurb: String,
}

/// An immutable lookup table of archetypes.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<Archetype>,
}

impl Catalog {
    /// The standard three-archetype roster.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                Archetype {
                    id: "warrior".into(),
                    hp: 28,
                    atk: 5,
                    def: 2,
                    blurb: "Balanced damage and defense.".into(),
                },
                Archetype {
                    id: "mage".into(),
                    hp: 20,
                    atk: 7,
                    def: 1,
                    blurb: "High damage, low health.".into(),
                },
                Archetype {
                    id: "guardian".into(),
                    hp: 34,
                    atk: 4,
                    def: 4,
                    blurb: "High health and defense.".into(),
                },
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Archetype> {
        self.entries.iter().find(|a| a.id == id)
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.entries
    }
}
