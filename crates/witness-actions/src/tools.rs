//! Finding the tool an action is performed with.
//!
//! Hands are searched before body slots. A fired projectile also needs its
//! ammunition, named by the `ammo` parameter and carried in the inventory.

use witness_types::{
    ActionKind, ActorData, Item, ItemCapability, ItemId, RangeCategory, ToolFailure, UseMode,
};

/// The tool chosen for an action, with its matching capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSelection {
    /// The equipped item.
    pub tool: Item,
    /// The capability that answers the action.
    pub capability: ItemCapability,
    /// Ammunition drawn from the inventory, for fired projectiles.
    pub ammo: Option<Item>,
}

impl ToolSelection {
    /// Whether the tool itself is the projectile.
    pub fn is_thrown(&self) -> bool {
        self.capability.range_category == RangeCategory::Thrown
    }

    /// The item that flies: the tool when thrown, else the ammunition.
    pub fn projectile(&self) -> &Item {
        if self.is_thrown() {
            &self.tool
        } else {
            self.ammo.as_ref().unwrap_or(&self.tool)
        }
    }

    /// The launcher, when the projectile is separate ammunition.
    pub fn launcher(&self) -> Option<&Item> {
        self.ammo.as_ref().map(|_| &self.tool)
    }

    /// Tags that may grant effectors: tool tags, the capability tag, and
    /// ammunition tags.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tool
            .tags
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.capability.tag.as_str()))
            .chain(
                self.ammo
                    .iter()
                    .flat_map(|ammo| ammo.tags.iter().map(String::as_str)),
            )
    }
}

/// Find the equipped tool for `kind`.
///
/// With `requested` set only that item is considered. Otherwise the first
/// equipped item, hands then body, whose capability matches the action
/// exactly is chosen.
pub fn find_tool(
    actor: Option<&ActorData>,
    kind: ActionKind,
    requested: Option<ItemId>,
    ammo: Option<ItemId>,
) -> Result<ToolSelection, ToolFailure> {
    let actor = actor.ok_or(ToolFailure::NoActorData)?;
    if actor.equipped().next().is_none() {
        return Err(ToolFailure::NothingEquipped {
            action: kind.to_string(),
        });
    }

    let no_match = || ToolFailure::NoMatchingCapability {
        action: kind.to_string(),
    };
    let (tool, capability) = match requested {
        Some(id) => {
            let item = actor
                .equipped()
                .find(|item| item.id == id)
                .ok_or(ToolFailure::RequestedToolMissing { tool: id })?;
            let capability = item.capability_for(kind).ok_or_else(no_match)?;
            (item, capability)
        }
        None => actor
            .equipped()
            .find_map(|item| item.capability_for(kind).map(|cap| (item, cap)))
            .ok_or_else(no_match)?,
    };

    let needs_ammo = kind == ActionKind::Use(UseMode::ProjectileSingle)
        && capability.range_category != RangeCategory::Thrown;
    let ammo = if needs_ammo {
        let id = ammo.ok_or(ToolFailure::AmmoRequired)?;
        let item = actor
            .inventory_item(id)
            .ok_or(ToolFailure::AmmoNotFound { ammo: id })?;
        if item.projectile.is_none() {
            return Err(ToolFailure::AmmoNotProjectile { ammo: id });
        }
        Some(item.clone())
    } else {
        None
    };

    Ok(ToolSelection {
        tool: tool.clone(),
        capability: capability.clone(),
        ammo,
    })
}
