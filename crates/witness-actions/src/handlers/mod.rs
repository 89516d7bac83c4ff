//! Per-verb effect producers.
//!
//! A handler turns a validated intent into effects. Handlers never touch
//! the host: everything they read arrives in the [`ActionContext`] and all
//! randomness comes from the caller's [`DiceRoller`]. The four core verbs
//! are dispatched exhaustively; every other verb renders its registry
//! template.
//!
//! - [`communicate`] -- Speech with a mode-dependent audible range
//! - [`movement`] -- Movement, optionally gated by a roll
//! - [`impact`] -- Melee strikes
//! - [`projectile`] -- Thrown and fired projectiles, with scatter on a miss
//! - [`inspect`] -- Sensory study through the clarity model
//! - [`templated`] -- Rendered text for non-core verbs

pub mod communicate;
pub mod impact;
pub mod inspect;
pub mod movement;
pub mod projectile;
pub mod templated;

use witness_rules::{ActionDefinition, DiceRoller, RESULT_DIE, RulesError};
use witness_senses::SenseProfiles;
use witness_types::{ActionEffect, ActionIntent, ActionKind, ActorData, RollResult, UseMode, Verb};

use crate::validation::Validated;

/// Longest message `COMMUNICATE` accepts, in characters.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 500;

/// Tunables shared by all handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerSettings {
    /// Faces on the result die.
    pub result_die: u32,
    /// Longest accepted message.
    pub max_message_len: usize,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            result_die: RESULT_DIE,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}

/// Everything a handler reads.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// The validated intent.
    pub intent: &'a ActionIntent,
    /// The verb's definition.
    pub definition: &'a ActionDefinition,
    /// Actor equipment, stats, and senses.
    pub actor: Option<&'a ActorData>,
    /// Target, tool, distance, and effectors from validation.
    pub validated: &'a Validated,
    /// Sense profiles.
    pub profiles: &'a SenseProfiles,
    /// Tunables.
    pub settings: &'a HandlerSettings,
}

impl ActionContext<'_> {
    /// The actor's display name, falling back to its reference.
    pub fn actor_name(&self) -> String {
        self.actor
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .map_or_else(|| self.intent.actor.to_string(), String::from)
    }

    /// The target's display name, if there is a target.
    pub fn target_name(&self) -> Option<&str> {
        self.validated.target.as_ref().map(|t| t.name.as_str())
    }

    /// Stat bonus for the actor, 0 without actor data.
    pub fn stat_bonus(&self, stat: &str) -> i64 {
        self.actor.map_or(0, |a| a.stat_bonus(stat))
    }

    /// Proficiency for a capability tag, falling back to the verb name.
    pub fn proficiency(&self, tag: &str) -> i64 {
        self.actor.map_or(0, |a| {
            let by_tag = a.proficiency(tag);
            if by_tag == 0 {
                a.proficiency(self.intent.action.verb().as_str())
            } else {
                by_tag
            }
        })
    }
}

/// What a handler produced.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    /// Effects in production order.
    pub effects: Vec<ActionEffect>,
    /// Human-readable summary.
    pub summary: String,
    /// The result roll, if one was made.
    pub roll: Option<RollResult>,
}

impl HandlerOutcome {
    /// A single effect with no roll.
    pub fn single(effect: ActionEffect, summary: String) -> Self {
        Self {
            effects: vec![effect],
            summary,
            roll: None,
        }
    }
}

/// Why a handler refused an intent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// `COMMUNICATE` without a message.
    #[error("nothing to say: message is missing or empty")]
    MissingMessage,
    /// The message exceeds the configured maximum.
    #[error("message too long: {len} characters, maximum {max}")]
    MessageTooLong {
        /// Characters in the message.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
    /// `MOVE` with neither a distance nor a destination.
    #[error("move needs a distance or a destination")]
    MissingDistance,
    /// The actor's own location is unknown.
    #[error("actor location unknown")]
    MissingActorLocation,
    /// A tool handler ran without a selected tool.
    #[error("no tool selected for {0}")]
    MissingTool(ActionKind),
    /// A targeted handler ran without a target.
    #[error("{0} needs a target")]
    MissingTarget(ActionKind),
    /// An opt-in roll failed.
    #[error("roll failed: {total} against CR {cr}")]
    RollFailed {
        /// Roll total.
        total: i64,
        /// CR it had to meet.
        cr: i64,
    },
    /// A templated verb has no template.
    #[error("{0} has no effect template")]
    MissingTemplate(Verb),
    /// Rolling dice failed.
    #[error("dice: {0}")]
    Dice(#[from] RulesError),
}

/// Run the handler for the intent's action kind.
pub fn dispatch(
    ctx: &ActionContext<'_>,
    roller: &mut dyn DiceRoller,
) -> Result<HandlerOutcome, HandlerError> {
    match ctx.intent.action {
        ActionKind::Communicate(mode) => communicate::handle(ctx, mode),
        ActionKind::Move => movement::handle(ctx, roller),
        ActionKind::Use(UseMode::ImpactSingle) => impact::handle(ctx, roller),
        ActionKind::Use(UseMode::ProjectileSingle) => projectile::handle(ctx, roller),
        ActionKind::Inspect => inspect::handle(ctx),
        ActionKind::Templated(verb) => templated::handle(ctx, verb),
    }
}
