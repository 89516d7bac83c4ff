//! Action results, effects, and the failure taxonomy.
//!
//! Every processed intent yields exactly one [`ActionResult`]. A result
//! either carries the effects the handler produced (each settled once by the
//! host) or an [`ActionFailure`] naming the stage that stopped it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{Clarity, CommunicationMode, CostCategory, EntityKind, Sense, Verb};
use crate::error::TypeError;
use crate::ids::{EffectId, EntityId, IntentId, ItemId};
use crate::intent::ActionIntent;
use crate::location::Location;
use crate::roll::{PotencyResult, RollResult};

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// Why the actor's tool could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ToolFailure {
    /// The host returned no actor data to search.
    #[error("no equipment data available for actor")]
    NoActorData,
    /// Nothing is equipped in hand or body slots.
    #[error("no tool equipped for {action}")]
    NothingEquipped {
        /// The action that needed a tool.
        action: String,
    },
    /// Equipped items exist, but none answers this action.
    #[error("equipped items cannot perform {action}")]
    NoMatchingCapability {
        /// The action that needed a tool.
        action: String,
    },
    /// The requested tool is not equipped.
    #[error("requested tool {tool} is not equipped")]
    RequestedToolMissing {
        /// The requested item.
        tool: ItemId,
    },
    /// A launcher was found but no ammunition was named.
    #[error("ranged tool requires ammunition")]
    AmmoRequired,
    /// The named ammunition is not in the inventory.
    #[error("ammunition {ammo} not found in inventory")]
    AmmoNotFound {
        /// The named ammunition.
        ammo: ItemId,
    },
    /// The named item cannot fly.
    #[error("item {ammo} is not usable as ammunition")]
    AmmoNotProjectile {
        /// The named item.
        ammo: ItemId,
    },
}

/// Why validation rejected an intent. One variant per check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum ValidationFailure {
    /// Check 1: the verb needs a target and none was resolved.
    #[error("{verb} requires a target")]
    TargetRequired {
        /// The verb.
        verb: Verb,
    },
    /// Check 2: the target is not among the entities in range of the query.
    #[error("target {target} not found nearby")]
    TargetNotFound {
        /// The missing target.
        target: EntityId,
    },
    /// Check 2: the target is of a kind the verb cannot act on.
    #[error("{verb} cannot target a {kind:?}")]
    InvalidTargetType {
        /// The verb.
        verb: Verb,
        /// The rejected kind.
        kind: EntityKind,
    },
    /// Check 3: self-targeting is not allowed for this verb.
    #[error("{verb} cannot target yourself")]
    SelfTargetForbidden {
        /// The verb.
        verb: Verb,
    },
    /// Check 4: tool requirement not met.
    #[error("tool check failed: {0}")]
    Tool(ToolFailure),
    /// Check 5: no location to measure range against.
    #[error("target location unknown, cannot measure range")]
    TargetLocationUnknown,
    /// Check 5: the target is beyond the effective range.
    #[error("target out of range: {distance:.1} tiles away, maximum {max_range}")]
    OutOfRange {
        /// Measured distance in tiles.
        distance: f64,
        /// Effective maximum in tiles.
        max_range: u32,
    },
    /// Check 6: the actor is not aware of the target.
    #[error("actor is not aware of the target")]
    NotAware,
    /// Check 7: cannot be used while in combat.
    #[error("{verb} cannot be used during combat")]
    NotUsableInCombat {
        /// The verb.
        verb: Verb,
    },
    /// Check 7: can only be used while in combat.
    #[error("{verb} can only be used during combat")]
    CombatOnly {
        /// The verb.
        verb: Verb,
    },
}

/// Why the cost stage rejected an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CostFailure {
    /// Another actor holds the turn.
    #[error("not the actor's turn")]
    NotYourTurn {
        /// Who currently holds the turn, if anyone.
        current: Option<EntityId>,
    },
    /// The ledger reports the cost cannot be paid.
    #[error("cannot afford {cost:?} action")]
    Insufficient {
        /// The cost category.
        cost: CostCategory,
    },
    /// The ledger accepted the check but refused the charge.
    #[error("ledger refused to consume {cost:?} action")]
    ConsumeRejected {
        /// The cost category.
        cost: CostCategory,
    },
}

/// Terminal failure of an intent. No failure is retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum ActionFailure {
    /// The verb has no registry entry.
    #[error("unknown verb: {0}")]
    UnknownVerb(Verb),
    /// Actor or target could not be resolved.
    #[error("target resolution failed: {0}")]
    TargetResolution(String),
    /// A validation check failed.
    #[error("{0}")]
    Validation(ValidationFailure),
    /// The cost stage failed.
    #[error("{0}")]
    Cost(CostFailure),
    /// An interrupt rule blocked the action.
    #[error("blocked: {0}")]
    Rules(String),
    /// The handler refused the action (bad parameters, failed opt-in roll).
    #[error("{0}")]
    Handler(String),
    /// A host call failed part-way; remaining stages were skipped.
    #[error("pipeline error: {0}")]
    Pipeline(String),
}

impl From<ValidationFailure> for ActionFailure {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

impl From<CostFailure> for ActionFailure {
    fn from(failure: CostFailure) -> Self {
        Self::Cost(failure)
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Tag naming an effect's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Words spoken or sent.
    Speech,
    /// Change of position.
    Movement,
    /// Melee strike.
    Strike,
    /// Thrown or fired projectile.
    Projectile,
    /// Sensory study of a target.
    Inspection,
    /// Generic verb rendered from a template.
    Templated,
}

/// Typed payload of an effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectDetail {
    /// Words spoken or sent.
    Speech {
        /// Who spoke.
        speaker: EntityId,
        /// The addressed listener, if any.
        listener: Option<EntityId>,
        /// Message text.
        message: String,
        /// Delivery mode.
        mode: CommunicationMode,
        /// Tiles the message carries; `None` is unbounded.
        audible_range: Option<u32>,
    },
    /// Change of position.
    Movement {
        /// Who moves.
        mover: EntityId,
        /// Starting tile.
        from: Location,
        /// Destination tile, when one was given.
        destination: Option<Location>,
        /// Requested distance in tiles.
        distance: u32,
        /// Movement cost charged (equal to the distance).
        cost: u32,
        /// The opt-in roll, if one was made.
        roll: Option<RollResult>,
    },
    /// Melee strike.
    Strike {
        /// Who attacks.
        attacker: EntityId,
        /// Tool used.
        tool: ItemId,
        /// Attack roll.
        roll: RollResult,
        /// Whether the strike landed.
        hit: bool,
        /// Damage, present on a hit.
        damage: Option<PotencyResult>,
        /// Damage dice rolled, present on a hit.
        damage_roll: Option<u32>,
    },
    /// Thrown or fired projectile.
    Projectile {
        /// Who threw or fired.
        shooter: EntityId,
        /// The item in flight.
        projectile: ItemId,
        /// The launcher, for fired ammunition.
        launcher: Option<ItemId>,
        /// Attack roll.
        roll: RollResult,
        /// Whether it hit.
        hit: bool,
        /// How far the roll fell short.
        miss_by: u64,
        /// Tiles the projectile scattered from the target.
        scatter: u32,
        /// Where the projectile came to rest.
        landing: Location,
        /// Whether it embedded in the target.
        sticks: bool,
        /// Damage, present on a hit.
        damage: Option<PotencyResult>,
        /// Damage dice rolled, present on a hit.
        damage_roll: Option<u32>,
    },
    /// Sensory study of a target.
    Inspection {
        /// Who inspects.
        observer: EntityId,
        /// Best sense used, `None` when nothing was perceived.
        sense: Option<Sense>,
        /// How clearly the target was perceived.
        clarity: Clarity,
        /// Distance in tiles.
        distance: f64,
    },
    /// Generic verb rendered from a template.
    Templated {
        /// The verb.
        verb: Verb,
        /// Rendered text.
        text: String,
    },
}

impl EffectDetail {
    /// The effect's type tag.
    pub const fn kind(&self) -> EffectKind {
        match self {
            Self::Speech { .. } => EffectKind::Speech,
            Self::Movement { .. } => EffectKind::Movement,
            Self::Strike { .. } => EffectKind::Strike,
            Self::Projectile { .. } => EffectKind::Projectile,
            Self::Inspection { .. } => EffectKind::Inspection,
            Self::Templated { .. } => EffectKind::Templated,
        }
    }
}

/// A concrete change to be applied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEffect {
    /// Unique effect reference.
    pub id: EffectId,
    /// The entity the effect lands on, if any.
    pub target: Option<EntityId>,
    /// Typed payload.
    pub detail: EffectDetail,
    /// Set once the host applied the effect.
    pub applied: bool,
    /// Set if the host failed to apply it.
    pub error: Option<String>,
}

impl ActionEffect {
    /// A new, unapplied effect.
    pub fn new(target: Option<EntityId>, detail: EffectDetail) -> Self {
        Self {
            id: EffectId::new(),
            target,
            detail,
            applied: false,
            error: None,
        }
    }

    /// The effect's type tag.
    pub const fn kind(&self) -> EffectKind {
        self.detail.kind()
    }

    /// The payload as a parameter map.
    pub fn parameters(&self) -> BTreeMap<String, Value> {
        match serde_json::to_value(&self.detail) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        }
    }

    /// Whether the host has already applied or failed this effect.
    pub const fn is_settled(&self) -> bool {
        self.applied || self.error.is_some()
    }

    /// Record the host's application outcome. Allowed exactly once.
    pub fn settle(&mut self, outcome: Result<(), String>) -> Result<(), TypeError> {
        if self.is_settled() {
            return Err(TypeError::EffectAlreadySettled);
        }
        match outcome {
            Ok(()) => self.applied = true,
            Err(error) => self.error = Some(error),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ActionResult
// ---------------------------------------------------------------------------

/// The outcome of processing one intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// The intent this result answers.
    pub intent: IntentId,
    /// Handler succeeded and every effect applied.
    pub success: bool,
    /// Effects in the order they were produced.
    pub effects: Vec<ActionEffect>,
    /// Entities that perceived the action.
    pub observers: BTreeSet<EntityId>,
    /// Human-readable summary.
    pub summary: String,
    /// Why the intent failed, if it did.
    pub failure: Option<ActionFailure>,
    /// The result roll, if one was made.
    pub roll: Option<RollResult>,
    /// Reaction intents returned by the reaction hook, for the host to submit.
    #[serde(default)]
    pub reactions: Vec<ActionIntent>,
}

impl ActionResult {
    /// A failed result with no effects.
    pub fn failed(intent: IntentId, failure: ActionFailure) -> Self {
        Self {
            intent,
            success: false,
            effects: Vec::new(),
            observers: BTreeSet::new(),
            summary: failure.to_string(),
            failure: Some(failure),
            roll: None,
            reactions: Vec::new(),
        }
    }

    /// The failure reason as shown to players.
    pub fn failure_reason(&self) -> Option<String> {
        self.failure.as_ref().map(ToString::to_string)
    }

    /// Effects the host failed to apply.
    pub fn unapplied(&self) -> impl Iterator<Item = &ActionEffect> {
        self.effects.iter().filter(|effect| !effect.applied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn speech() -> ActionEffect {
        ActionEffect::new(
            None,
            EffectDetail::Speech {
                speaker: EntityId::new(),
                listener: None,
                message: String::from("hello"),
                mode: CommunicationMode::Normal,
                audible_range: Some(3),
            },
        )
    }

    #[test]
    fn effect_settles_once() {
        let mut effect = speech();
        assert!(!effect.is_settled());
        effect.settle(Ok(())).unwrap();
        assert!(effect.applied);
        assert_eq!(
            effect.settle(Err(String::from("late"))),
            Err(TypeError::EffectAlreadySettled)
        );
        assert!(effect.error.is_none());
    }

    #[test]
    fn failed_settlement_records_error() {
        let mut effect = speech();
        effect.settle(Err(String::from("listener deaf"))).unwrap();
        assert!(!effect.applied);
        assert_eq!(effect.error.as_deref(), Some("listener deaf"));
    }

    #[test]
    fn parameters_expose_payload() {
        let effect = speech();
        let params = effect.parameters();
        assert_eq!(params.get("kind"), Some(&Value::from("speech")));
        assert_eq!(params.get("message"), Some(&Value::from("hello")));
        assert_eq!(params.get("audible_range"), Some(&Value::from(3)));
        assert_eq!(effect.kind(), EffectKind::Speech);
    }

    #[test]
    fn failed_result_surfaces_reason_verbatim() {
        let failure = ActionFailure::Validation(ValidationFailure::OutOfRange {
            distance: 2.0,
            max_range: 1,
        });
        let result = ActionResult::failed(IntentId::new(), failure);
        assert!(!result.success);
        assert!(result.effects.is_empty());
        assert_eq!(
            result.failure_reason().as_deref(),
            Some("target out of range: 2.0 tiles away, maximum 1")
        );
        assert_eq!(result.summary, "target out of range: 2.0 tiles away, maximum 1");
    }

    #[test]
    fn validation_reasons_are_distinct() {
        let verb = Verb::Use;
        let reasons: BTreeSet<String> = [
            ValidationFailure::TargetRequired { verb },
            ValidationFailure::TargetNotFound {
                target: EntityId::from(uuid::Uuid::nil()),
            },
            ValidationFailure::InvalidTargetType {
                verb,
                kind: EntityKind::Item,
            },
            ValidationFailure::SelfTargetForbidden { verb },
            ValidationFailure::Tool(ToolFailure::AmmoRequired),
            ValidationFailure::TargetLocationUnknown,
            ValidationFailure::OutOfRange {
                distance: 4.0,
                max_range: 1,
            },
            ValidationFailure::NotAware,
            ValidationFailure::NotUsableInCombat { verb },
            ValidationFailure::CombatOnly { verb },
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(reasons.len(), 10);
    }
}
