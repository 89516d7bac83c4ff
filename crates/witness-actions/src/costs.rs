//! Turn and cost rules.
//!
//! Costs only matter while turn-based combat is active. Outside combat, and
//! for FREE actions, the ledger is never consulted. Reactions happen on
//! someone else's turn, so they skip the turn check but still pay.

use witness_types::{ActionIntent, CostCategory, CostFailure, EntityId, IntentSource};

/// What the cost stage should do with the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostPlan {
    /// Leave the ledger alone.
    Skip,
    /// Check and consume this cost.
    Charge(CostCategory),
}

/// Whether the intent is a reaction, exempt from the turn check.
pub fn is_reaction(intent: &ActionIntent) -> bool {
    intent.source == IntentSource::Reaction || intent.cost == CostCategory::Reaction
}

/// Decide how the cost stage treats an intent.
///
/// `current_actor` is the holder of the turn as the host reports it.
pub fn plan_cost(
    intent: &ActionIntent,
    in_combat: bool,
    current_actor: Option<EntityId>,
) -> Result<CostPlan, CostFailure> {
    if !in_combat || intent.cost == CostCategory::Free {
        return Ok(CostPlan::Skip);
    }
    if !is_reaction(intent) && current_actor != Some(intent.actor) {
        return Err(CostFailure::NotYourTurn {
            current: current_actor,
        });
    }
    Ok(CostPlan::Charge(intent.cost))
}
