//! Target resolution.
//!
//! Picks the target an intent acts on and fills in its kind and location
//! from the host's radius query. Resolution never fails: an unknown or
//! missing target is left for validation to reject.

use std::collections::BTreeMap;

use tracing::debug;

use witness_types::{ActionIntent, AvailableTarget, EntityId};

/// Per-actor record of the last target successfully acted on.
#[derive(Debug, Clone, Default)]
pub struct TargetMemory {
    last: BTreeMap<EntityId, EntityId>,
}

impl TargetMemory {
    /// An empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The actor's last target, if any.
    pub fn last_target(&self, actor: EntityId) -> Option<EntityId> {
        self.last.get(&actor).copied()
    }

    /// Remember `target` as the actor's last target.
    pub fn remember(&mut self, actor: EntityId, target: EntityId) {
        self.last.insert(actor, target);
    }

    /// Forget the actor's last target.
    pub fn forget(&mut self, actor: EntityId) {
        self.last.remove(&actor);
    }
}

/// Choose the target for an intent.
///
/// Precedence: `override_target`, then the intent's own target, then the
/// remembered last target, then none. When the chosen target is in
/// `available` its kind and location are filled in. An actor targeting
/// itself gets its own kind and location even if the query left it out.
pub fn resolve_target(
    intent: ActionIntent,
    override_target: Option<EntityId>,
    remembered: Option<EntityId>,
    available: &[AvailableTarget],
) -> ActionIntent {
    let chosen = override_target.or(intent.target).or(remembered);
    let Some(target) = chosen else {
        return intent.resolve_target(None, None, None);
    };

    if let Some(found) = find_available(available, target) {
        debug!(intent = %intent.id, %target, kind = ?found.kind, "target resolved");
        let (kind, location) = (found.kind, found.location.clone());
        return intent.resolve_target(Some(target), Some(kind), Some(location));
    }

    if target == intent.actor {
        let (kind, location) = (intent.actor_kind, intent.actor_location.clone());
        return intent.resolve_target(Some(target), Some(kind), location);
    }

    debug!(intent = %intent.id, %target, "target not among available entities");
    intent.resolve_target(Some(target), None, None)
}

/// Look up an entity in the query results.
pub fn find_available(
    available: &[AvailableTarget],
    target: EntityId,
) -> Option<&AvailableTarget> {
    available.iter().find(|t| t.entity == target)
}
