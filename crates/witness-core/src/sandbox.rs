//! An in-memory [`ActionHost`] for tests and the demo binary.
//!
//! The sandbox keeps a flat map of entities with positions and optional
//! actor data, a symmetric table of walls between pairs of entities, a turn
//! order, and a per-actor action budget. Applied effects are recorded so
//! callers can inspect exactly what the pipeline asked for. The clock is the
//! wall clock plus whatever skew tests have advanced it by.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use witness_types::{
    ActionEffect, ActorData, AvailableTarget, CostCategory, CostFailure, EffectDetail, EntityId,
    EntityKind, Location, Obstruction,
};

use crate::host::{ActionHost, HostError};

/// Actions an actor may still take this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionBudget {
    /// Full actions left.
    pub full: u32,
    /// Reactions left.
    pub reaction: u32,
    /// Extended actions left.
    pub extended: u32,
}

impl ActionBudget {
    /// One of each.
    pub const PER_TURN: Self = Self {
        full: 1,
        reaction: 1,
        extended: 1,
    };

    /// Nothing left.
    pub const SPENT: Self = Self {
        full: 0,
        reaction: 0,
        extended: 0,
    };

    const fn remaining(&self, cost: CostCategory) -> Option<u32> {
        match cost {
            CostCategory::Free => None,
            CostCategory::Reaction => Some(self.reaction),
            CostCategory::Full => Some(self.full),
            CostCategory::Extended => Some(self.extended),
        }
    }

    fn spend(&mut self, cost: CostCategory) -> bool {
        let slot = match cost {
            CostCategory::Free => return true,
            CostCategory::Reaction => &mut self.reaction,
            CostCategory::Full => &mut self.full,
            CostCategory::Extended => &mut self.extended,
        };
        match slot.checked_sub(1) {
            Some(left) => {
                *slot = left;
                true
            }
            None => false,
        }
    }
}

impl Default for ActionBudget {
    fn default() -> Self {
        Self::PER_TURN
    }
}

#[derive(Debug, Clone)]
struct Entity {
    kind: EntityKind,
    name: String,
    location: Location,
    data: Option<ActorData>,
    size_mag: i32,
    defense: i64,
}

#[derive(Debug, Default)]
struct World {
    entities: BTreeMap<EntityId, Entity>,
    walls: BTreeMap<(EntityId, EntityId), Obstruction>,
    unaware: BTreeSet<(EntityId, EntityId)>,
    in_combat: bool,
    turn: Option<EntityId>,
    budgets: BTreeMap<EntityId, ActionBudget>,
    rejecting: BTreeSet<EntityId>,
    applied: Vec<ActionEffect>,
    execute_calls: usize,
    offline: bool,
    clock_skew: Duration,
}

impl World {
    fn online(&self) -> Result<(), HostError> {
        if self.offline {
            Err(HostError::Unavailable {
                message: String::from("sandbox offline"),
            })
        } else {
            Ok(())
        }
    }

    fn obstruction(&self, a: EntityId, b: EntityId) -> Obstruction {
        self.walls.get(&pair(a, b)).copied().unwrap_or_default()
    }

    fn budget(&self, actor: EntityId) -> ActionBudget {
        self.budgets.get(&actor).copied().unwrap_or_default()
    }
}

fn pair(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// In-memory host.
#[derive(Debug, Default)]
pub struct SandboxHost {
    world: Mutex<World>,
}

impl SandboxHost {
    /// An empty sandbox, out of combat.
    pub fn new() -> Self {
        Self::default()
    }

    fn world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    /// Add an actor with default senses and no equipment.
    pub fn spawn_actor(&self, name: &str, kind: EntityKind, location: Location) -> EntityId {
        let data = ActorData {
            name: String::from(name),
            ..ActorData::default()
        };
        self.spawn(name, kind, location, Some(data))
    }

    /// Add something without actor data (an item, a door).
    pub fn spawn_object(&self, name: &str, kind: EntityKind, location: Location) -> EntityId {
        self.spawn(name, kind, location, None)
    }

    fn spawn(
        &self,
        name: &str,
        kind: EntityKind,
        location: Location,
        data: Option<ActorData>,
    ) -> EntityId {
        let id = EntityId::new();
        debug!(%id, name, ?kind, %location, "sandbox spawn");
        self.world().entities.insert(
            id,
            Entity {
                kind,
                name: String::from(name),
                location,
                size_mag: data.as_ref().map_or(0, |d| d.size_mag),
                data,
                defense: 0,
            },
        );
        id
    }

    /// Edit an actor's data in place. Objects gain actor data on first edit.
    pub fn update_actor(&self, id: EntityId, edit: impl FnOnce(&mut ActorData)) {
        let mut world = self.world();
        if let Some(entity) = world.entities.get_mut(&id) {
            let data = entity.data.get_or_insert_with(|| ActorData {
                name: entity.name.clone(),
                ..ActorData::default()
            });
            edit(data);
            entity.size_mag = data.size_mag;
        }
    }

    /// Set the defense added to attacks against `id`.
    pub fn set_defense(&self, id: EntityId, defense: i64) {
        if let Some(entity) = self.world().entities.get_mut(&id) {
            entity.defense = defense;
        }
    }

    /// Put walls between two entities.
    pub fn set_obstruction(&self, a: EntityId, b: EntityId, obstruction: Obstruction) {
        self.world().walls.insert(pair(a, b), obstruction);
    }

    /// Remove the walls between two entities.
    pub fn clear_obstruction(&self, a: EntityId, b: EntityId) {
        self.world().walls.remove(&pair(a, b));
    }

    /// Make `actor` unaware of `target`.
    pub fn set_unaware(&self, actor: EntityId, target: EntityId) {
        self.world().unaware.insert((actor, target));
    }

    /// Enter combat with `first` holding the turn. Budgets reset.
    pub fn start_combat(&self, first: EntityId) {
        let mut world = self.world();
        world.in_combat = true;
        world.turn = Some(first);
        world.budgets.clear();
    }

    /// Pass the turn to `actor` and refill its budget.
    pub fn pass_turn(&self, actor: EntityId) {
        let mut world = self.world();
        world.turn = Some(actor);
        world.budgets.insert(actor, ActionBudget::PER_TURN);
    }

    /// Leave combat.
    pub fn end_combat(&self) {
        let mut world = self.world();
        world.in_combat = false;
        world.turn = None;
    }

    /// Override an actor's remaining budget.
    pub fn set_budget(&self, actor: EntityId, budget: ActionBudget) {
        self.world().budgets.insert(actor, budget);
    }

    /// Refuse every effect that lands on `target`.
    pub fn reject_effects_on(&self, target: EntityId) {
        self.world().rejecting.insert(target);
    }

    /// Make every host query fail.
    pub fn set_offline(&self, offline: bool) {
        self.world().offline = offline;
    }

    /// Move the sandbox clock forward.
    pub fn advance_clock(&self, by: Duration) {
        let mut world = self.world();
        world.clock_skew = world.clock_skew.checked_add(&by).unwrap_or(Duration::MAX);
        debug!(skew_secs = world.clock_skew.num_seconds(), "sandbox clock advanced");
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// An actor's remaining budget.
    pub fn budget(&self, actor: EntityId) -> ActionBudget {
        self.world().budget(actor)
    }

    /// Where an entity stands.
    pub fn location_of(&self, id: EntityId) -> Option<Location> {
        self.world().entities.get(&id).map(|e| e.location.clone())
    }

    /// Effects applied so far, in order.
    pub fn applied_effects(&self) -> Vec<ActionEffect> {
        self.world().applied.clone()
    }

    /// How many times `execute_effect` was called, applied or not.
    pub fn execute_calls(&self) -> usize {
        self.world().execute_calls
    }
}

impl ActionHost for SandboxHost {
    fn available_targets(
        &self,
        actor: EntityId,
        origin: &Location,
        radius: u32,
    ) -> Result<Vec<AvailableTarget>, HostError> {
        let world = self.world();
        world.online()?;
        let targets = world
            .entities
            .iter()
            .filter(|(id, _)| **id != actor)
            .filter_map(|(id, entity)| {
                let distance = origin.distance_to(&entity.location);
                (distance <= f64::from(radius)).then(|| AvailableTarget {
                    entity: *id,
                    kind: entity.kind,
                    name: entity.name.clone(),
                    location: entity.location.clone(),
                    distance,
                    size_mag: entity.size_mag,
                    defense: entity.defense,
                    obstruction: world.obstruction(actor, *id),
                })
            })
            .collect();
        Ok(targets)
    }

    fn actor_location(&self, actor: EntityId) -> Result<Option<Location>, HostError> {
        let world = self.world();
        world.online()?;
        Ok(world.entities.get(&actor).map(|e| e.location.clone()))
    }

    fn is_aware(&self, actor: EntityId, target: EntityId) -> Result<bool, HostError> {
        let world = self.world();
        world.online()?;
        Ok(!world.unaware.contains(&(actor, target)))
    }

    fn can_afford(&self, actor: EntityId, cost: CostCategory) -> Result<bool, HostError> {
        let world = self.world();
        world.online()?;
        Ok(world.budget(actor).remaining(cost).is_none_or(|left| left > 0))
    }

    fn consume_cost(&self, actor: EntityId, cost: CostCategory) -> Result<bool, HostError> {
        let mut world = self.world();
        world.online()?;
        let mut budget = world.budget(actor);
        let spent = budget.spend(cost);
        world.budgets.insert(actor, budget);
        Ok(spent)
    }

    /// Check and spend under a single lock.
    fn try_consume_action_cost(
        &self,
        actor: EntityId,
        cost: CostCategory,
    ) -> Result<Result<(), CostFailure>, HostError> {
        let mut world = self.world();
        world.online()?;
        let mut budget = world.budget(actor);
        if !budget.spend(cost) {
            return Ok(Err(CostFailure::Insufficient { cost }));
        }
        world.budgets.insert(actor, budget);
        Ok(Ok(()))
    }

    fn actor_data(&self, actor: EntityId) -> Result<Option<ActorData>, HostError> {
        let world = self.world();
        world.online()?;
        Ok(world.entities.get(&actor).and_then(|e| e.data.clone()))
    }

    fn execute_effect(&self, effect: &ActionEffect) -> Result<(), HostError> {
        let mut world = self.world();
        world.execute_calls = world.execute_calls.saturating_add(1);
        if let Some(target) = effect.target
            && world.rejecting.contains(&target)
        {
            return Err(HostError::EffectRejected {
                reason: format!("{target} refuses {:?}", effect.kind()),
            });
        }
        if let EffectDetail::Movement {
            mover,
            destination: Some(destination),
            ..
        } = &effect.detail
            && let Some(entity) = world.entities.get_mut(mover)
        {
            entity.location = destination.clone();
        }
        world.applied.push(effect.clone());
        Ok(())
    }

    fn is_in_combat(&self) -> Result<bool, HostError> {
        let world = self.world();
        world.online()?;
        Ok(world.in_combat)
    }

    fn current_actor(&self) -> Result<Option<EntityId>, HostError> {
        let world = self.world();
        world.online()?;
        Ok(world.turn)
    }

    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        now.checked_add_signed(self.world().clock_skew)
            .unwrap_or(now)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn radius_query_excludes_actor_and_far_entities() {
        let host = SandboxHost::new();
        let origin = Location::tile(0, 0);
        let me = host.spawn_actor("Ada", EntityKind::Player, origin.clone());
        let near = host.spawn_object("door", EntityKind::Feature, origin.offset(3, 4));
        host.spawn_object("tree", EntityKind::Feature, origin.offset(30, 0));

        let found = host.available_targets(me, &origin, 5).unwrap();
        assert_eq!(found.len(), 1);
        let door = found.first().unwrap();
        assert_eq!(door.entity, near);
        assert!((door.distance - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn walls_are_symmetric() {
        let host = SandboxHost::new();
        let a = host.spawn_actor("Ada", EntityKind::Player, Location::tile(0, 0));
        let b = host.spawn_actor("Bo", EntityKind::Npc, Location::tile(1, 0));
        let wall = Obstruction {
            thin_walls: 0,
            thick_walls: 1,
        };
        host.set_obstruction(a, b, wall);
        let from_b = host.available_targets(b, &Location::tile(1, 0), 3).unwrap();
        assert_eq!(from_b.first().map(|t| t.obstruction), Some(wall));
    }

    #[test]
    fn atomic_consume_spends_once() {
        let host = SandboxHost::new();
        let a = host.spawn_actor("Ada", EntityKind::Player, Location::tile(0, 0));
        host.start_combat(a);
        assert_eq!(host.try_consume_action_cost(a, CostCategory::Full).unwrap(), Ok(()));
        assert_eq!(
            host.try_consume_action_cost(a, CostCategory::Full).unwrap(),
            Err(CostFailure::Insufficient {
                cost: CostCategory::Full
            })
        );
        assert_eq!(host.budget(a).full, 0);
        assert_eq!(host.try_consume_action_cost(a, CostCategory::Free).unwrap(), Ok(()));
    }

    #[test]
    fn offline_host_errors() {
        let host = SandboxHost::new();
        let a = host.spawn_actor("Ada", EntityKind::Player, Location::tile(0, 0));
        host.set_offline(true);
        assert!(matches!(
            host.actor_location(a),
            Err(HostError::Unavailable { .. })
        ));
    }

    #[test]
    fn advanced_clock_runs_ahead_of_the_wall() {
        let host = SandboxHost::new();
        let before = Utc::now();
        host.advance_clock(Duration::minutes(10));
        assert!(host.now() >= before + Duration::minutes(10));
    }
}
