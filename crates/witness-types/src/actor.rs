//! Actor, item, and target data supplied by the host.
//!
//! The core never owns actors. The host hands over snapshots of the data it
//! needs through [`ActorData`] and [`AvailableTarget`]; handlers and
//! validators read them and never write back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{ActionKind, EntityKind, RangeCategory, Sense};
use crate::ids::{EntityId, ItemId};
use crate::location::Location;

/// Name of the stat that scales thrown range and melee rolls.
pub const STAT_STRENGTH: &str = "strength";

/// Name of the stat used for fired projectiles.
pub const STAT_DEXTERITY: &str = "dexterity";

/// Name of the stat used for inspection rolls and templated checks.
pub const STAT_PERCEPTION: &str = "perception";

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// What an item can do when used for a given action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCapability {
    /// The verb and subtype this capability answers.
    pub action: ActionKind,
    /// Capability tag, used for proficiency and effector lookups.
    pub tag: String,
    /// Magnitude stack contributed by this capability (damage MAG).
    #[serde(default = "default_stack")]
    pub stack: u32,
    /// How far the capability reaches.
    #[serde(default = "default_range_category")]
    pub range_category: RangeCategory,
    /// Base reach in tiles, overriding the registry range.
    #[serde(default)]
    pub base_range: Option<u32>,
}

const fn default_stack() -> u32 {
    1
}

const fn default_range_category() -> RangeCategory {
    RangeCategory::Melee
}

/// How an item behaves in flight: ammunition, or a tool that can be thrown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileProfile {
    /// Magnitude stack the projectile adds to damage.
    pub stack: u32,
}

/// An item in a slot or inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item reference.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Free-form tags (`aerodynamic`, `unbalanced`, ...), matched against
    /// the effector registry.
    #[serde(default)]
    pub tags: Vec<String>,
    /// What the item can be used for.
    #[serde(default)]
    pub capabilities: Vec<ItemCapability>,
    /// Flight behaviour, if the item can travel as a projectile.
    #[serde(default)]
    pub projectile: Option<ProjectileProfile>,
}

impl Item {
    /// A plain item with no capabilities.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            tags: Vec::new(),
            capabilities: Vec::new(),
            projectile: None,
        }
    }

    /// Add a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: ItemCapability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Mark the item as a projectile with the given stack.
    #[must_use]
    pub const fn with_projectile(mut self, stack: u32) -> Self {
        self.projectile = Some(ProjectileProfile { stack });
        self
    }

    /// The capability answering `kind`, if any.
    pub fn capability_for(&self, kind: ActionKind) -> Option<&ItemCapability> {
        self.capabilities.iter().find(|cap| cap.action == kind)
    }

    /// Whether any capability answers the same verb as `kind`.
    pub fn has_capability_for_verb(&self, kind: ActionKind) -> bool {
        self.capabilities
            .iter()
            .any(|cap| cap.action.verb() == kind.verb())
    }
}

// ---------------------------------------------------------------------------
// Senses
// ---------------------------------------------------------------------------

/// Sense magnitudes for an observer (abstract MAG scale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseMagnitudes {
    /// Sight.
    pub light: i32,
    /// Hearing.
    pub pressure: i32,
    /// Smell.
    pub aroma: i32,
    /// Arcane awareness.
    pub thaumic: i32,
}

impl SenseMagnitudes {
    /// Magnitude for one sense.
    pub const fn get(&self, sense: Sense) -> i32 {
        match sense {
            Sense::Light => self.light,
            Sense::Pressure => self.pressure,
            Sense::Aroma => self.aroma,
            Sense::Thaumic => self.thaumic,
        }
    }
}

impl Default for SenseMagnitudes {
    /// An ordinary humanoid: good sight and hearing, weak smell, no arcane sense.
    fn default() -> Self {
        Self {
            light: 3,
            pressure: 3,
            aroma: 1,
            thaumic: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// ActorData
// ---------------------------------------------------------------------------

/// Snapshot of an actor's equipment and abilities, returned by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorData {
    /// Display name used in rendered effect text.
    #[serde(default)]
    pub name: String,
    /// Items held in hands, searched first for tools.
    #[serde(default)]
    pub hand_slots: Vec<Item>,
    /// Worn items, searched after hands.
    #[serde(default)]
    pub body_slots: Vec<Item>,
    /// Carried but unequipped items (ammunition lives here).
    #[serde(default)]
    pub inventory: Vec<Item>,
    /// Raw stats keyed by name (`strength`, `dexterity`, ...).
    #[serde(default)]
    pub stats: BTreeMap<String, i64>,
    /// Proficiency bonuses keyed by capability tag or verb name.
    #[serde(default)]
    pub proficiencies: BTreeMap<String, i64>,
    /// Sense magnitudes used when this actor observes.
    #[serde(default)]
    pub senses: SenseMagnitudes,
    /// Body size on the MAG scale (larger is easier to perceive).
    #[serde(default)]
    pub size_mag: i32,
}

impl ActorData {
    /// Bonus derived from a stat: `floor((value - 10) / 2)`, 0 if absent.
    pub fn stat_bonus(&self, stat: &str) -> i64 {
        self.stats
            .get(stat)
            .map_or(0, |value| value.saturating_sub(10).div_euclid(2))
    }

    /// Proficiency bonus for a key, 0 if absent.
    pub fn proficiency(&self, key: &str) -> i64 {
        self.proficiencies.get(key).copied().unwrap_or(0)
    }

    /// Equipped items in search order: hands, then body.
    pub fn equipped(&self) -> impl Iterator<Item = &Item> {
        self.hand_slots.iter().chain(self.body_slots.iter())
    }

    /// Find an inventory item by reference.
    pub fn inventory_item(&self, id: ItemId) -> Option<&Item> {
        self.inventory.iter().find(|item| item.id == id)
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Walls between the querying location and a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstruction {
    /// Thin walls (doors, partitions).
    pub thin_walls: u32,
    /// Thick walls (stone, earth).
    pub thick_walls: u32,
}

impl Obstruction {
    /// No walls.
    pub const NONE: Self = Self {
        thin_walls: 0,
        thick_walls: 0,
    };

    /// Whether any wall is in the way.
    pub const fn is_blocked(&self) -> bool {
        self.thin_walls > 0 || self.thick_walls > 0
    }
}

/// An entity returned by the host's radius query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableTarget {
    /// Entity reference.
    #[serde(rename = "ref")]
    pub entity: EntityId,
    /// Entity kind.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Display name.
    pub name: String,
    /// Where the entity stands.
    pub location: Location,
    /// Distance from the query origin in tiles.
    pub distance: f64,
    /// Body size on the MAG scale.
    #[serde(default)]
    pub size_mag: i32,
    /// Defensive bonus added to the CR of attacks against it.
    #[serde(default)]
    pub defense: i64,
    /// Walls between the query origin and this entity.
    #[serde(default)]
    pub obstruction: Obstruction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::UseMode;

    fn sword() -> Item {
        Item::new("sword").with_capability(ItemCapability {
            action: ActionKind::Use(UseMode::ImpactSingle),
            tag: String::from("blade"),
            stack: 3,
            range_category: RangeCategory::Melee,
            base_range: None,
        })
    }

    #[test]
    fn stat_bonus_floors_toward_negative() {
        let mut actor = ActorData::default();
        actor.stats.insert(String::from(STAT_STRENGTH), 15);
        actor.stats.insert(String::from(STAT_DEXTERITY), 7);
        assert_eq!(actor.stat_bonus(STAT_STRENGTH), 2);
        assert_eq!(actor.stat_bonus(STAT_DEXTERITY), -2);
        assert_eq!(actor.stat_bonus("charisma"), 0);
    }

    #[test]
    fn equipped_searches_hands_first() {
        let actor = ActorData {
            hand_slots: vec![sword()],
            body_slots: vec![Item::new("cloak")],
            ..ActorData::default()
        };
        let names: Vec<&str> = actor.equipped().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["sword", "cloak"]);
    }

    #[test]
    fn capability_matches_exact_kind() {
        let item = sword();
        assert!(item.capability_for(ActionKind::Use(UseMode::ImpactSingle)).is_some());
        assert!(item
            .capability_for(ActionKind::Use(UseMode::ProjectileSingle))
            .is_none());
        assert!(item.has_capability_for_verb(ActionKind::Use(UseMode::ProjectileSingle)));
    }

    #[test]
    fn default_senses_favour_sight_and_hearing() {
        let senses = SenseMagnitudes::default();
        assert_eq!(senses.get(Sense::Light), 3);
        assert_eq!(senses.get(Sense::Thaumic), 0);
    }

    #[test]
    fn obstruction_blocked_when_any_wall() {
        assert!(!Obstruction::NONE.is_blocked());
        let walls = Obstruction {
            thin_walls: 1,
            thick_walls: 0,
        };
        assert!(walls.is_blocked());
    }
}
