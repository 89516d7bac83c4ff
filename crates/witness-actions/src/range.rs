//! Effective range per action.
//!
//! Most verbs use the registry range, possibly per subtype. Speech is gated
//! by how far its pressure signature carries rather than the registry
//! number. Projectiles reach further for strong throwers and are adjusted by
//! range effectors. Inspection has no hard limit; clarity decides what is
//! seen.

use witness_rules::{ActionDefinition, EffectorRegistry, compose};
use witness_senses::SenseProfiles;
use witness_types::{
    ActionIntent, ActionKind, ActorData, Effector, EffectorChannel, STAT_STRENGTH, UseMode,
    params,
};

use crate::tools::{ToolSelection, find_tool};

/// Reach of a thrown tool with no configured base range.
pub const DEFAULT_THROWN_RANGE: u32 = 5;

/// Reach of a launcher with no configured base range.
pub const DEFAULT_FIRED_RANGE: u32 = 20;

/// How far an action may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeLimit {
    /// At most this many tiles.
    Tiles(u32),
    /// No distance limit.
    Unbounded,
    /// Not range-checked at all.
    Exempt,
}

impl RangeLimit {
    /// The tile limit, if there is one.
    pub const fn tiles(self) -> Option<u32> {
        match self {
            Self::Tiles(tiles) => Some(tiles),
            Self::Unbounded | Self::Exempt => None,
        }
    }
}

/// Reach of a projectile attack.
///
/// Starts from the capability's base range (or the thrown/fired default),
/// adds the actor's strength bonus for thrown tools when positive, then
/// applies range effectors. Never negative.
pub fn projectile_range(
    selection: &ToolSelection,
    actor: Option<&ActorData>,
    range_effectors: &[Effector],
) -> u32 {
    let default = if selection.is_thrown() {
        DEFAULT_THROWN_RANGE
    } else {
        DEFAULT_FIRED_RANGE
    };
    let base = i64::from(selection.capability.base_range.unwrap_or(default));
    let strength = if selection.is_thrown() {
        actor.map_or(0, |a| a.stat_bonus(STAT_STRENGTH).max(0))
    } else {
        0
    };
    let composed = compose(base.saturating_add(strength), range_effectors).value;
    u32::try_from(composed.max(0)).unwrap_or(u32::MAX)
}

/// Effective range of an action.
pub fn effective_range(
    kind: ActionKind,
    definition: &ActionDefinition,
    profiles: &SenseProfiles,
    tool: Option<&ToolSelection>,
    actor: Option<&ActorData>,
    range_effectors: &[Effector],
) -> RangeLimit {
    let limit = |range: Option<u32>| range.map_or(RangeLimit::Unbounded, RangeLimit::Tiles);
    match kind {
        ActionKind::Communicate(mode) => limit(profiles.communication_range(mode)),
        ActionKind::Inspect => RangeLimit::Exempt,
        ActionKind::Use(UseMode::ProjectileSingle) => match tool {
            Some(selection) => {
                RangeLimit::Tiles(projectile_range(selection, actor, range_effectors))
            }
            None => limit(definition.range_for(kind)),
        },
        ActionKind::Use(UseMode::ImpactSingle) => limit(
            tool.and_then(|selection| selection.capability.base_range)
                .or_else(|| definition.range_for(kind)),
        ),
        ActionKind::Move | ActionKind::Templated(_) => limit(definition.range_for(kind)),
    }
}

/// Reach of the projectile `intent` would loose, known before any target
/// is chosen.
///
/// Picks the tool the way validation will and applies the same range
/// effectors. `None` when the intent is not a projectile attack or no
/// usable tool is equipped.
pub fn projectile_reach(
    intent: &ActionIntent,
    actor: Option<&ActorData>,
    effectors: &EffectorRegistry,
) -> Option<u32> {
    if intent.action != ActionKind::Use(UseMode::ProjectileSingle) {
        return None;
    }
    let ammo = intent.param_item(params::AMMO);
    let selection = find_tool(actor, intent.action, intent.tool, ammo).ok()?;
    let set = effectors.collect(selection.tags());
    Some(projectile_range(
        &selection,
        actor,
        set.channel(EffectorChannel::Range),
    ))
}

/// Radius for the host's target query: twice the known range.
///
/// Speech follows its signature. A projectile uses `reach` from
/// [`projectile_reach`]; with no reach known it falls back to `fallback`,
/// as does any verb without a finite range.
pub fn query_radius(
    kind: ActionKind,
    definition: &ActionDefinition,
    profiles: &SenseProfiles,
    reach: Option<u32>,
    fallback: u32,
) -> u32 {
    let range = match kind {
        ActionKind::Communicate(mode) => profiles.communication_range(mode),
        ActionKind::Use(UseMode::ProjectileSingle) => reach,
        _ => definition.range_for(kind),
    };
    range.map_or(fallback, |r| r.saturating_mul(2))
}
