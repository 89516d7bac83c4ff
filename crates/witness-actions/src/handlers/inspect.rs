//! `INSPECT`: study a target through the best available sense.

use witness_senses::best_sense;
use witness_types::{ActionEffect, Clarity, EffectDetail, Sense, SenseMagnitudes};

use super::{ActionContext, HandlerError, HandlerOutcome};

/// Emit the inspection effect.
///
/// Inspection always succeeds; an observer who perceives nothing gets a
/// reading with no sense and [`Clarity::None`].
pub fn handle(ctx: &ActionContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let target = ctx
        .validated
        .target
        .as_ref()
        .ok_or(HandlerError::MissingTarget(ctx.intent.action))?;
    let senses = ctx.actor.map_or_else(SenseMagnitudes::default, |a| a.senses);
    let distance = ctx.validated.distance.unwrap_or(target.distance);

    let reading = best_sense(
        Sense::ALL,
        &senses,
        distance,
        target.obstruction,
        target.size_mag,
    );
    let (sense, clarity) = reading.map_or((None, Clarity::None), |r| (Some(r.sense), r.clarity));

    let summary = match sense {
        Some(sense) => format!(
            "{} studies {} ({clarity:?} by {sense:?})",
            ctx.actor_name(),
            target.name
        ),
        None => format!("{} cannot make out {}", ctx.actor_name(), target.name),
    };
    let effect = ActionEffect::new(
        Some(target.entity),
        EffectDetail::Inspection {
            observer: ctx.intent.actor,
            sense,
            clarity,
            distance,
        },
    );
    Ok(HandlerOutcome::single(effect, summary))
}
