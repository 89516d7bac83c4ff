//! The action intent and its lifecycle.
//!
//! An [`ActionIntent`] is what an actor wants to do. The pipeline never
//! mutates a shared intent: every stage consumes the value and returns a
//! new one, either advanced or marked failed. Once an intent reaches
//! [`IntentStatus::Executed`] or [`IntentStatus::Failed`] further
//! transitions are ignored.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{ActionKind, CostCategory, EntityKind, IntentSource, IntentStatus, PipelineStage};
use crate::ids::{EntityId, IntentId, ItemId};
use crate::location::Location;

/// Well-known parameter keys read by the handlers.
pub mod params {
    /// Message text for `COMMUNICATE`.
    pub const MESSAGE: &str = "message";
    /// Requested tile distance for `MOVE`.
    pub const DISTANCE: &str = "distance";
    /// Destination location for `MOVE` (serialized [`Location`](crate::Location)).
    pub const DESTINATION: &str = "destination";
    /// Explicit CR override; also opts `MOVE` into a roll.
    pub const DIFFICULTY: &str = "difficulty";
    /// Opt-in flag forcing a result roll on `MOVE`.
    pub const REQUIRES_ROLL: &str = "requires_roll";
    /// Ammunition item reference for fired projectiles.
    pub const AMMO: &str = "ammo";
    /// Prevents a hitting projectile from embedding in the target.
    pub const SUPPRESS_STICK: &str = "suppress_stick";
}

/// What an actor intends to do, plus its progress through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionIntent {
    /// Unique intent reference.
    pub id: IntentId,
    /// When the intent was created.
    pub created_at: DateTime<Utc>,
    /// Kind of the acting entity.
    pub actor_kind: EntityKind,
    /// The acting entity.
    pub actor: EntityId,
    /// Where the actor stands; filled from the host when absent.
    pub actor_location: Option<Location>,
    /// Verb and subtype.
    pub action: ActionKind,
    /// Turn budget category.
    pub cost: CostCategory,
    /// Target entity, once known.
    pub target: Option<EntityId>,
    /// Target kind, once resolved.
    pub target_kind: Option<EntityKind>,
    /// Target location, once resolved.
    pub target_location: Option<Location>,
    /// Specific tool the actor wants to use.
    pub tool: Option<ItemId>,
    /// Free-form parameters (see [`params`]).
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    /// Which factory produced the intent.
    pub source: IntentSource,
    /// For reactions: the intent being reacted to.
    pub trigger: Option<IntentId>,
    /// Lifecycle status.
    pub status: IntentStatus,
    /// Stages completed so far, in order.
    pub completed_stages: Vec<PipelineStage>,
    /// Why the intent failed, if it did.
    pub failure_reason: Option<String>,
}

impl ActionIntent {
    /// Generic factory.
    pub fn new(
        actor: EntityId,
        actor_kind: EntityKind,
        action: ActionKind,
        cost: CostCategory,
    ) -> Self {
        Self {
            id: IntentId::new(),
            created_at: Utc::now(),
            actor_kind,
            actor,
            actor_location: None,
            action,
            cost,
            target: None,
            target_kind: None,
            target_location: None,
            tool: None,
            params: BTreeMap::new(),
            source: IntentSource::Generic,
            trigger: None,
            status: IntentStatus::Pending,
            completed_stages: Vec::new(),
            failure_reason: None,
        }
    }

    /// Player input; costs a full action.
    pub fn player(actor: EntityId, action: ActionKind) -> Self {
        Self {
            source: IntentSource::Player,
            ..Self::new(actor, EntityKind::Player, action, CostCategory::Full)
        }
    }

    /// NPC behaviour; costs a full action.
    pub fn npc(actor: EntityId, action: ActionKind) -> Self {
        Self {
            source: IntentSource::Npc,
            ..Self::new(actor, EntityKind::Npc, action, CostCategory::Full)
        }
    }

    /// A reaction to a perceived intent; costs a reaction and skips the
    /// turn check.
    pub fn reaction(
        actor: EntityId,
        actor_kind: EntityKind,
        action: ActionKind,
        trigger: IntentId,
    ) -> Self {
        Self {
            source: IntentSource::Reaction,
            trigger: Some(trigger),
            ..Self::new(actor, actor_kind, action, CostCategory::Reaction)
        }
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    /// Set the creation timestamp.
    #[must_use]
    pub const fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the target entity.
    #[must_use]
    pub const fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the actor location.
    #[must_use]
    pub fn with_actor_location(mut self, location: Location) -> Self {
        self.actor_location = Some(location);
        self
    }

    /// Set the preferred tool.
    #[must_use]
    pub const fn with_tool(mut self, tool: ItemId) -> Self {
        self.tool = Some(tool);
        self
    }

    /// Override the cost category.
    #[must_use]
    pub const fn with_cost(mut self, cost: CostCategory) -> Self {
        self.cost = cost;
        self
    }

    /// Add a parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    // -----------------------------------------------------------------------
    // Stage transitions
    // -----------------------------------------------------------------------

    /// Whether no further stage may run.
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to a new status. Ignored once terminal.
    #[must_use]
    pub fn with_status(mut self, status: IntentStatus) -> Self {
        if !self.is_terminal() {
            self.status = status;
        }
        self
    }

    /// Record a completed stage. Ignored once terminal.
    #[must_use]
    pub fn complete_stage(mut self, stage: PipelineStage) -> Self {
        if !self.is_terminal() {
            self.completed_stages.push(stage);
        }
        self
    }

    /// Fill in the resolved actor location.
    #[must_use]
    pub fn resolve_actor_location(mut self, location: Location) -> Self {
        if !self.is_terminal() {
            self.actor_location = Some(location);
        }
        self
    }

    /// Fill in the resolved target. `kind` and `location` are `None` when
    /// the target is not among the available targets.
    #[must_use]
    pub fn resolve_target(
        mut self,
        target: Option<EntityId>,
        kind: Option<EntityKind>,
        location: Option<Location>,
    ) -> Self {
        if !self.is_terminal() {
            self.target = target;
            self.target_kind = kind;
            self.target_location = location;
        }
        self
    }

    /// Mark the intent failed with a reason. Ignored once terminal.
    #[must_use]
    pub fn fail(mut self, reason: impl Into<String>) -> Self {
        if !self.is_terminal() {
            self.status = IntentStatus::Failed;
            self.failure_reason = Some(reason.into());
        }
        self
    }

    // -----------------------------------------------------------------------
    // Parameter access
    // -----------------------------------------------------------------------

    /// String parameter.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Unsigned integer parameter.
    pub fn param_u64(&self, key: &str) -> Option<u64> {
        self.params.get(key).and_then(Value::as_u64)
    }

    /// Signed integer parameter.
    pub fn param_i64(&self, key: &str) -> Option<i64> {
        self.params.get(key).and_then(Value::as_i64)
    }

    /// Boolean parameter; absent means `false`.
    pub fn param_flag(&self, key: &str) -> bool {
        self.params
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Item reference parameter, stored as a UUID string.
    pub fn param_item(&self, key: &str) -> Option<ItemId> {
        self.params
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Location parameter, stored as a serialized [`Location`].
    pub fn param_location(&self, key: &str) -> Option<Location> {
        self.params
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{CommunicationMode, UseMode};

    #[test]
    fn factories_set_source_and_cost() {
        let actor = EntityId::new();
        let kind = ActionKind::Move;

        let player = ActionIntent::player(actor, kind);
        assert_eq!(player.source, IntentSource::Player);
        assert_eq!(player.cost, CostCategory::Full);
        assert_eq!(player.actor_kind, EntityKind::Player);

        let npc = ActionIntent::npc(actor, kind);
        assert_eq!(npc.source, IntentSource::Npc);
        assert_eq!(npc.actor_kind, EntityKind::Npc);

        let trigger = IntentId::new();
        let reaction = ActionIntent::reaction(actor, EntityKind::Creature, kind, trigger);
        assert_eq!(reaction.source, IntentSource::Reaction);
        assert_eq!(reaction.cost, CostCategory::Reaction);
        assert_eq!(reaction.trigger, Some(trigger));
        assert_eq!(reaction.status, IntentStatus::Pending);
    }

    #[test]
    fn failing_is_terminal() {
        let intent = ActionIntent::player(EntityId::new(), ActionKind::Inspect)
            .with_status(IntentStatus::Validating)
            .complete_stage(PipelineStage::TargetResolution)
            .fail("no target");
        assert_eq!(intent.status, IntentStatus::Failed);
        assert_eq!(intent.failure_reason.as_deref(), Some("no target"));

        // Further transitions are ignored.
        let after = intent
            .clone()
            .with_status(IntentStatus::Executed)
            .complete_stage(PipelineStage::Validation)
            .fail("other");
        assert_eq!(after, intent);
    }

    #[test]
    fn stages_recorded_in_order() {
        let intent = ActionIntent::player(EntityId::new(), ActionKind::Move)
            .complete_stage(PipelineStage::TargetResolution)
            .complete_stage(PipelineStage::Validation);
        assert_eq!(
            intent.completed_stages,
            vec![PipelineStage::TargetResolution, PipelineStage::Validation]
        );
    }

    #[test]
    fn parameter_accessors() {
        let ammo = ItemId::new();
        let destination = Location::tile(4, 2);
        let intent = ActionIntent::player(
            EntityId::new(),
            ActionKind::Use(UseMode::ProjectileSingle),
        )
        .with_param(params::AMMO, ammo.to_string())
        .with_param(params::DISTANCE, 3)
        .with_param(params::SUPPRESS_STICK, true)
        .with_param(
            params::DESTINATION,
            serde_json::to_value(&destination).unwrap_or_default(),
        );

        assert_eq!(intent.param_item(params::AMMO), Some(ammo));
        assert_eq!(intent.param_u64(params::DISTANCE), Some(3));
        assert!(intent.param_flag(params::SUPPRESS_STICK));
        assert!(!intent.param_flag(params::REQUIRES_ROLL));
        assert_eq!(intent.param_location(params::DESTINATION), Some(destination));
    }

    #[test]
    fn message_parameter() {
        let intent = ActionIntent::player(
            EntityId::new(),
            ActionKind::Communicate(CommunicationMode::Whisper),
        )
        .with_param(params::MESSAGE, "psst");
        assert_eq!(intent.param_str(params::MESSAGE), Some("psst"));
    }
}
