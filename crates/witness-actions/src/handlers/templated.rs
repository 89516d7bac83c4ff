//! Non-core verbs: render the registry template into a single effect.

use witness_types::{ActionEffect, EffectDetail, Verb};

use super::{ActionContext, HandlerError, HandlerOutcome};

/// Emit the templated effect.
pub fn handle(ctx: &ActionContext<'_>, verb: Verb) -> Result<HandlerOutcome, HandlerError> {
    let text = ctx
        .definition
        .render(&ctx.actor_name(), ctx.target_name())
        .ok_or(HandlerError::MissingTemplate(verb))?;
    let effect = ActionEffect::new(
        ctx.intent.target,
        EffectDetail::Templated {
            verb,
            text: text.clone(),
        },
    );
    Ok(HandlerOutcome::single(effect, text))
}
