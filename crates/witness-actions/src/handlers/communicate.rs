//! `COMMUNICATE`: one speech effect.

use witness_types::{ActionEffect, CommunicationMode, EffectDetail, params};

use super::{ActionContext, HandlerError, HandlerOutcome};

const fn speech_verb(mode: CommunicationMode) -> &'static str {
    match mode {
        CommunicationMode::Whisper => "whispers",
        CommunicationMode::Normal => "says",
        CommunicationMode::Shout => "shouts",
        CommunicationMode::Telepathy => "sends",
    }
}

/// Emit the speech effect. The audible range comes from the mode's
/// pressure signature; telepathy is unbounded.
pub fn handle(
    ctx: &ActionContext<'_>,
    mode: CommunicationMode,
) -> Result<HandlerOutcome, HandlerError> {
    let message = ctx
        .intent
        .param_str(params::MESSAGE)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(HandlerError::MissingMessage)?;
    let len = message.chars().count();
    if len > ctx.settings.max_message_len {
        return Err(HandlerError::MessageTooLong {
            len,
            max: ctx.settings.max_message_len,
        });
    }

    let audible_range = ctx.profiles.communication_range(mode);
    let summary = match ctx.target_name() {
        Some(listener) => format!(
            "{} {} to {listener}: \"{message}\"",
            ctx.actor_name(),
            speech_verb(mode)
        ),
        None => format!("{} {}: \"{message}\"", ctx.actor_name(), speech_verb(mode)),
    };
    let effect = ActionEffect::new(
        ctx.intent.target,
        EffectDetail::Speech {
            speaker: ctx.intent.actor,
            listener: ctx.intent.target,
            message: String::from(message),
            mode,
            audible_range,
        },
    );
    Ok(HandlerOutcome::single(effect, summary))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use witness_types::{ActionIntent, ActionKind, EntityId};

    use super::*;
    use crate::handlers::fixtures::Fixture;

    fn speak(mode: CommunicationMode, message: &str) -> Fixture {
        Fixture::new(
            ActionIntent::player(EntityId::new(), ActionKind::Communicate(mode))
                .with_param(params::MESSAGE, message),
        )
    }

    fn audible(outcome: &HandlerOutcome) -> Option<u32> {
        match outcome.effects.first().map(|e| &e.detail) {
            Some(EffectDetail::Speech { audible_range, .. }) => *audible_range,
            _ => Some(u32::MAX),
        }
    }

    #[test]
    fn audible_range_per_mode() {
        let cases = [
            (CommunicationMode::Whisper, Some(1)),
            (CommunicationMode::Normal, Some(3)),
            (CommunicationMode::Shout, Some(10)),
            (CommunicationMode::Telepathy, None),
        ];
        for (mode, want) in cases {
            let mut fixture = speak(mode, "hello");
            // The registry's numeric range plays no part.
            fixture.definition.target_range = Some(99);
            let outcome = handle(&fixture.ctx(), mode).unwrap();
            assert_eq!(audible(&outcome), want, "{mode:?}");
            assert_eq!(outcome.effects.len(), 1);
            assert!(outcome.roll.is_none());
        }
    }

    #[test]
    fn message_is_trimmed_and_required() {
        let fixture = speak(CommunicationMode::Normal, "   ");
        assert_eq!(
            handle(&fixture.ctx(), CommunicationMode::Normal),
            Err(HandlerError::MissingMessage)
        );

        let fixture = speak(CommunicationMode::Shout, "  run!  ");
        let outcome = handle(&fixture.ctx(), CommunicationMode::Shout).unwrap();
        assert!(outcome.summary.ends_with("shouts: \"run!\""));
    }

    #[test]
    fn long_messages_rejected() {
        let mut fixture = speak(CommunicationMode::Normal, "abcdef");
        fixture.settings.max_message_len = 5;
        assert_eq!(
            handle(&fixture.ctx(), CommunicationMode::Normal),
            Err(HandlerError::MessageTooLong { len: 6, max: 5 })
        );
    }
}
