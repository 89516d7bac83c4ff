//! `USE.PROJECTILE_SINGLE`: throwing a tool or firing ammunition.
//!
//! Thrown tools roll with strength, launchers with dexterity. The CR grows
//! with distance relative to the attack's reach. A miss scatters the
//! projectile one tile for every three points it fell short, in a direction
//! drawn from the roller. A hit embeds the projectile in the target unless
//! the intent suppresses it.

use std::f64::consts::TAU;

use witness_rules::{
    CrFactors, DiceRoller, RollContext, calculate_cr, perform_potency_roll, perform_result_roll,
    roll_damage,
};
use witness_types::{ActionEffect, EffectDetail, Location, STAT_DEXTERITY, STAT_STRENGTH, params};

use super::{ActionContext, HandlerError, HandlerOutcome};

/// Tiles of scatter for a miss: one per three points short, rounded up.
pub const fn scatter_distance(miss_by: u64) -> u64 {
    miss_by.div_ceil(3)
}

/// Where a scattered projectile lands: `scatter` tiles from `target` along
/// `direction` (radians), rounded to the nearest tile.
pub fn scatter_landing(target: &Location, scatter: u32, direction: f64) -> Location {
    if scatter == 0 {
        return target.clone();
    }
    let angle = direction.rem_euclid(TAU);
    let reach = f64::from(scatter);
    #[allow(clippy::cast_possible_truncation)]
    // Bounded by `scatter`, which fits in i32 for any realistic miss.
    let (dx, dy) = (
        (reach * angle.cos()).round() as i32,
        (reach * angle.sin()).round() as i32,
    );
    target.offset(dx, dy)
}

/// Resolve the shot.
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
    let projectile = selection.projectile();

    let stat = if selection.is_thrown() {
        STAT_STRENGTH
    } else {
        STAT_DEXTERITY
    };
    let roll_ctx = RollContext::roll(
        roller,
        ctx.settings.result_die,
        ctx.proficiency(&selection.capability.tag),
        ctx.stat_bonus(stat),
        effectors.roll.clone(),
    )?;
    let cr = calculate_cr(
        ctx.definition.base_cr,
        &CrFactors {
            distance: ctx.validated.distance.unwrap_or(target.distance),
            max_range: ctx.validated.range.tiles(),
            target_defense: target.defense,
            difficulty: ctx.intent.param_i64(params::DIFFICULTY),
        },
    );
    let roll = perform_result_roll(&roll_ctx, cr);
    let hit = roll.success;
    let miss_by = roll.miss_by();

    let scatter = u32::try_from(scatter_distance(miss_by)).unwrap_or(u32::MAX);
    let landing = if scatter > 0 {
        scatter_landing(&target.location, scatter, roller.direction()?)
    } else {
        target.location.clone()
    };
    let sticks = hit && !ctx.intent.param_flag(params::SUPPRESS_STICK);

    let (damage, damage_roll) = if hit {
        let stack = selection
            .capability
            .stack
            .saturating_add(projectile.projectile.map_or(0, |p| p.stack));
        let potency = perform_potency_roll(i64::from(stack), &effectors.potency);
        let rolled = roll_damage(potency.dice, roller)?;
        (Some(potency), Some(rolled))
    } else {
        (None, None)
    };

    let how = if selection.is_thrown() {
        "throws"
    } else {
        "fires"
    };
    let summary = match (&damage, damage_roll) {
        (Some(potency), Some(rolled)) => format!(
            "{} {how} the {} at {} and hits for {rolled} ({})",
            ctx.actor_name(),
            projectile.name,
            target.name,
            potency.dice
        ),
        _ => format!(
            "{} {how} the {} at {}; it lands {scatter} tiles wide",
            ctx.actor_name(),
            projectile.name,
            target.name
        ),
    };
    let effect = ActionEffect::new(
        Some(target.entity),
        EffectDetail::Projectile {
            shooter: ctx.intent.actor,
            projectile: projectile.id,
            launcher: selection.launcher().map(|l| l.id),
            roll: roll.clone(),
            hit,
            miss_by,
            scatter,
            landing,
            sticks,
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
