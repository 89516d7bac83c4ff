//! `USE.IMPACT_SINGLE`: a melee strike.
//!
//! The attack roll adds proficiency in the capability tag and the strength
//! bonus. On a hit, damage magnitude starts at the capability's stack and
//! goes through the potency effectors and the dice table.

use witness_rules::{
    CrFactors, DiceRoller, RollContext, calculate_cr, perform_potency_roll, perform_result_roll,
    roll_damage,
};
use witness_types::{ActionEffect, EffectDetail, STAT_STRENGTH, params};

use super::{ActionContext, HandlerError, HandlerOutcome};

/// Resolve the strike.
pub fn handle(
    ctx: &ActionContext<'_>,
    roller: &mut dyn DiceRoller,
) -> Result<HandlerOutcome, HandlerError> {
    let action = ctx.intent.action;
    let selection = ctx
        .validated
        .tool
        .as_ref()
        .ok_or(HandlerError::MissingTool(action))?;
    let target = ctx
        .validated
        .target
        .as_ref()
        .ok_or(HandlerError::MissingTarget(action))?;
    let effectors = &ctx.validated.effectors;

    let roll_ctx = RollContext::roll(
        roller,
        ctx.settings.result_die,
        ctx.proficiency(&selection.capability.tag),
        ctx.stat_bonus(STAT_STRENGTH),
        effectors.roll.clone(),
    )?;
    let cr = calculate_cr(
        ctx.definition.base_cr,
        &CrFactors {
            distance: ctx.validated.distance.unwrap_or(target.distance),
            max_range: None,
            target_defense: target.defense,
            difficulty: ctx.intent.param_i64(params::DIFFICULTY),
        },
    );
    let roll = perform_result_roll(&roll_ctx, cr);
    let hit = roll.success;

    let (damage, damage_roll) = if hit {
        let potency =
            perform_potency_roll(i64::from(selection.capability.stack), &effectors.potency);
        let rolled = roll_damage(potency.dice, roller)?;
        (Some(potency), Some(rolled))
    } else {
        (None, None)
    };

    let summary = match (&damage, damage_roll) {
        (Some(potency), Some(rolled)) => format!(
            "{} strikes {} with the {} for {rolled} ({})",
            ctx.actor_name(),
            target.name,
            selection.tool.name,
            potency.dice
        ),
        _ => format!(
            "{} swings the {} at {} and misses",
            ctx.actor_name(),
            selection.tool.name,
            target.name
        ),
    };
    let effect = ActionEffect::new(
        Some(target.entity),
        EffectDetail::Strike {
            attacker: ctx.intent.actor,
            tool: selection.tool.id,
            roll: roll.clone(),
            hit,
            damage,
            damage_roll,
        },
    );
    Ok(HandlerOutcome {
        effects: vec![effect],
        summary,
        roll: Some(roll),
    })
}
