//! The host contract.
//!
//! The action core owns no world state. Everything it needs to know about
//! actors, positions, turns, and costs comes through an [`ActionHost`], and
//! every effect it produces goes back out through one. Hosts are shared
//! across batch tasks, so the trait takes `&self` and requires `Sync`;
//! mutable world state lives behind the host's own locks.

use chrono::{DateTime, Utc};

use witness_types::{
    ActionEffect, ActorData, AvailableTarget, CostCategory, CostFailure, EntityId, Location,
};

/// Errors a host may report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host does not know the entity.
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// The host could not answer.
    #[error("host unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The host refused to apply an effect.
    #[error("effect rejected: {reason}")]
    EffectRejected {
        /// Why the effect could not be applied.
        reason: String,
    },
}

/// World access for the action pipeline.
pub trait ActionHost: Send + Sync {
    /// Entities within `radius` tiles of `origin`, as seen from `actor`.
    /// The actor itself need not be included.
    fn available_targets(
        &self,
        actor: EntityId,
        origin: &Location,
        radius: u32,
    ) -> Result<Vec<AvailableTarget>, HostError>;

    /// Where the actor currently stands, if known.
    fn actor_location(&self, actor: EntityId) -> Result<Option<Location>, HostError>;

    /// Whether `actor` is aware of `target`.
    fn is_aware(&self, actor: EntityId, target: EntityId) -> Result<bool, HostError>;

    /// Whether the actor can pay `cost` this turn.
    fn can_afford(&self, actor: EntityId, cost: CostCategory) -> Result<bool, HostError>;

    /// Charge `cost`. Returns `false` if the ledger refused.
    fn consume_cost(&self, actor: EntityId, cost: CostCategory) -> Result<bool, HostError>;

    /// Check and charge `cost` in one step.
    ///
    /// The default is [`can_afford`](Self::can_afford) followed by
    /// [`consume_cost`](Self::consume_cost), which can race when intents
    /// for the same actor run in parallel. Hosts with a real ledger should
    /// override this with an atomic reserve.
    fn try_consume_action_cost(
        &self,
        actor: EntityId,
        cost: CostCategory,
    ) -> Result<Result<(), CostFailure>, HostError> {
        if !self.can_afford(actor, cost)? {
            return Ok(Err(CostFailure::Insufficient { cost }));
        }
        if !self.consume_cost(actor, cost)? {
            return Ok(Err(CostFailure::ConsumeRejected { cost }));
        }
        Ok(Ok(()))
    }

    /// Equipment, stats, and senses of an actor.
    fn actor_data(&self, actor: EntityId) -> Result<Option<ActorData>, HostError>;

    /// Apply one effect to the world.
    fn execute_effect(&self, effect: &ActionEffect) -> Result<(), HostError>;

    /// Whether turn-based combat is active.
    fn is_in_combat(&self) -> Result<bool, HostError>;

    /// Who holds the current turn, if anyone.
    fn current_actor(&self) -> Result<Option<EntityId>, HostError>;

    /// The host's clock, used to timestamp perception events.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
