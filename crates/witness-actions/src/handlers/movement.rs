//! `MOVE`: a movement effect costing the distance travelled.
//!
//! Moving normally needs no roll. An intent carrying `difficulty` or
//! `requires_roll` (a climb, a leap) rolls against its CR first and fails
//! outright on a miss.

use witness_rules::{
    CrFactors, DiceRoller, RollContext, calculate_cr, perform_result_roll, requires_result_roll,
};
use witness_types::{ActionEffect, EffectDetail, STAT_DEXTERITY, params};

use super::{ActionContext, HandlerError, HandlerOutcome};

/// Tiles covered: the `distance` parameter, else the distance to
/// `destination` rounded up.
fn requested_distance(ctx: &ActionContext<'_>) -> Result<u32, HandlerError> {
    if let Some(distance) = ctx.intent.param_u64(params::DISTANCE) {
        return Ok(u32::try_from(distance).unwrap_or(u32::MAX));
    }
    let from = ctx
        .intent
        .actor_location
        .as_ref()
        .ok_or(HandlerError::MissingActorLocation)?;
    let destination = ctx
        .intent
        .param_location(params::DESTINATION)
        .ok_or(HandlerError::MissingDistance)?;
    let tiles = from.distance_to(&destination).ceil();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // Distances are non-negative; `as` saturates at the u32 bound.
    let tiles = tiles as u32;
    Ok(tiles)
}

/// Emit the movement effect.
pub fn handle(
    ctx: &ActionContext<'_>,
    roller: &mut dyn DiceRoller,
) -> Result<HandlerOutcome, HandlerError> {
    let from = ctx
        .intent
        .actor_location
        .clone()
        .ok_or(HandlerError::MissingActorLocation)?;
    let destination = ctx.intent.param_location(params::DESTINATION);
    let distance = requested_distance(ctx)?;

    let roll = if requires_result_roll(ctx.intent) {
        let roll_ctx = RollContext::roll(
            roller,
            ctx.settings.result_die,
            ctx.proficiency(ctx.intent.action.verb().as_str()),
            ctx.stat_bonus(STAT_DEXTERITY),
            Vec::new(),
        )?;
        let cr = calculate_cr(
            ctx.definition.base_cr,
            &CrFactors {
                difficulty: ctx.intent.param_i64(params::DIFFICULTY),
                ..CrFactors::default()
            },
        );
        let roll = perform_result_roll(&roll_ctx, cr);
        if !roll.success {
            return Err(HandlerError::RollFailed {
                total: roll.total,
                cr: roll.cr,
            });
        }
        Some(roll)
    } else {
        None
    };

    let summary = match &destination {
        Some(to) => format!("{} moves {distance} tiles to {to}", ctx.actor_name()),
        None => format!("{} moves {distance} tiles", ctx.actor_name()),
    };
    let effect = ActionEffect::new(
        Some(ctx.intent.actor),
        EffectDetail::Movement {
            mover: ctx.intent.actor,
            from,
            destination,
            distance,
            cost: distance,
            roll: roll.clone(),
        },
    );
    Ok(HandlerOutcome {
        effects: vec![effect],
        summary,
        roll,
    })
}
