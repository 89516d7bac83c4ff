//! Intent validation.
//!
//! Seven checks run in a fixed order and the first failure stops the rest:
//!
//! 1. a target is present when the verb requires one
//! 2. the target exists nearby and is a kind the verb accepts
//! 3. self-targeting is allowed
//! 4. a matching tool (and ammunition) is equipped
//! 5. the target is within the effective range
//! 6. the actor is aware of the target, when required
//! 7. the verb is legal in the current combat state
//!
//! Awareness is the only check that reaches back into the host, so it is
//! passed in as a callback and only invoked when checks 1-5 have passed.

use tracing::debug;

use witness_rules::{ActionDefinition, EffectorRegistry, EffectorSet};
use witness_senses::SenseProfiles;
use witness_types::{
    ActionIntent, ActorData, AvailableTarget, EffectorChannel, EntityId, Obstruction,
    ValidationFailure, params,
};

use crate::range::{RangeLimit, effective_range};
use crate::target::find_available;
use crate::tools::{ToolSelection, find_tool};

/// Everything validation reads.
#[derive(Debug, Clone, Copy)]
pub struct ValidationInput<'a> {
    /// The intent, after target resolution.
    pub intent: &'a ActionIntent,
    /// The verb's definition.
    pub definition: &'a ActionDefinition,
    /// Entities returned by the radius query.
    pub available: &'a [AvailableTarget],
    /// Actor equipment and stats, if the host has any.
    pub actor: Option<&'a ActorData>,
    /// Sense profiles (speech range).
    pub profiles: &'a SenseProfiles,
    /// Tag effectors (projectile range).
    pub effectors: &'a EffectorRegistry,
    /// Whether turn-based combat is active.
    pub in_combat: bool,
}

/// What validation established, handed on to the handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    /// The target as the host reported it. Self-targets are synthesised
    /// from the actor's own location.
    pub target: Option<AvailableTarget>,
    /// Distance from actor to target in tiles.
    pub distance: Option<f64>,
    /// The tool chosen, when the verb needs one.
    pub tool: Option<ToolSelection>,
    /// Effectors granted by the tool and ammunition tags.
    pub effectors: EffectorSet,
    /// The range the target was checked against.
    pub range: RangeLimit,
}

/// Why validation stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection<E> {
    /// A check failed.
    Invalid(ValidationFailure),
    /// The awareness callback failed.
    Host(E),
}

impl<E> From<ValidationFailure> for Rejection<E> {
    fn from(failure: ValidationFailure) -> Self {
        Self::Invalid(failure)
    }
}

/// Run the checks in order.
pub fn validate<E>(
    input: &ValidationInput<'_>,
    is_aware: &mut dyn FnMut(EntityId, EntityId) -> Result<bool, E>,
) -> Result<Validated, Rejection<E>> {
    let intent = input.intent;
    let def = input.definition;
    let verb = intent.action.verb();

    // 1. Target required.
    if def.requires_target && intent.target.is_none() {
        return Err(ValidationFailure::TargetRequired { verb }.into());
    }

    // 2. Target exists and is of an accepted kind.
    let target = match intent.target {
        Some(id) => Some(locate_target(intent, input.available, id)?),
        None => None,
    };
    if let Some(found) = &target
        && !def.allows_kind(found.kind)
    {
        return Err(ValidationFailure::InvalidTargetType {
            verb,
            kind: found.kind,
        }
        .into());
    }

    // 3. Self-targeting.
    let self_target = intent.target == Some(intent.actor);
    if self_target && !def.allow_self_target {
        return Err(ValidationFailure::SelfTargetForbidden { verb }.into());
    }

    // 4. Tool.
    let tool = if def.requires_tool {
        let ammo = intent.param_item(params::AMMO);
        let selection = find_tool(input.actor, intent.action, intent.tool, ammo)
            .map_err(ValidationFailure::Tool)?;
        Some(selection)
    } else {
        None
    };
    let mut effectors = EffectorSet::default();
    if let Some(selection) = &tool {
        effectors = input.effectors.collect(selection.tags());
    }

    // 5. Range.
    let range = effective_range(
        intent.action,
        def,
        input.profiles,
        tool.as_ref(),
        input.actor,
        effectors.channel(EffectorChannel::Range),
    );
    let distance = match (&target, &intent.actor_location, &intent.target_location) {
        (Some(_), Some(from), Some(to)) => Some(from.distance_to(to)),
        _ => None,
    };
    if let (Some(_), RangeLimit::Tiles(max_range)) = (&target, range) {
        let distance = distance.ok_or(ValidationFailure::TargetLocationUnknown)?;
        if distance > f64::from(max_range) {
            return Err(ValidationFailure::OutOfRange {
                distance,
                max_range,
            }
            .into());
        }
    }

    // 6. Awareness.
    if def.requires_awareness && !self_target {
        if let Some(found) = &target {
            let aware = is_aware(intent.actor, found.entity).map_err(Rejection::Host)?;
            if !aware {
                return Err(ValidationFailure::NotAware.into());
            }
        }
    }

    // 7. Combat state.
    if input.in_combat && !def.usable_in_combat {
        return Err(ValidationFailure::NotUsableInCombat { verb }.into());
    }
    if !input.in_combat && !def.usable_out_of_combat {
        return Err(ValidationFailure::CombatOnly { verb }.into());
    }

    debug!(intent = %intent.id, action = %intent.action, ?distance, ?range, "validated");
    Ok(Validated {
        target,
        distance,
        tool,
        effectors,
        range,
    })
}

/// The resolved target as an [`AvailableTarget`]. An actor targeting
/// itself need not be in the query results.
fn locate_target(
    intent: &ActionIntent,
    available: &[AvailableTarget],
    id: EntityId,
) -> Result<AvailableTarget, ValidationFailure> {
    if let Some(found) = find_available(available, id) {
        return Ok(found.clone());
    }
    if id == intent.actor
        && let Some(location) = &intent.actor_location
    {
        return Ok(AvailableTarget {
            entity: id,
            kind: intent.actor_kind,
            name: String::from("self"),
            location: location.clone(),
            distance: 0.0,
            size_mag: 0,
            defense: 0,
            obstruction: Obstruction::NONE,
        });
    }
    Err(ValidationFailure::TargetNotFound { target: id })
}
