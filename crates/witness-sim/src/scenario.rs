//! The demo world: a courtyard with a hero, a wolf, and a guard at the gate.
//!
//! [`courtyard`] builds the world on a [`SandboxHost`] and scripts one
//! round of intents. [`AlarmHook`] makes sentries shout when they see or
//! hear violence, so the demo also exercises reactions.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use witness_core::{ReactionHook, SandboxHost};
use witness_types::{
    ActionIntent, ActionKind, BroadcastPhase, CommunicationMode, CostCategory, EntityId,
    EntityKind, Item, ItemCapability, Location, Obstruction, PerceptionEvent, RangeCategory,
    UseMode, Verb, params,
};

use crate::error::SimError;

const STRIKE: ActionKind = ActionKind::Use(UseMode::ImpactSingle);
const THROW: ActionKind = ActionKind::Use(UseMode::ProjectileSingle);

/// Who is in the courtyard.
#[derive(Debug, Clone, Copy)]
pub struct Cast {
    /// Brannoc, the player.
    pub hero: EntityId,
    /// A wolf, adjacent to the hero.
    pub wolf: EntityId,
    /// Sela, the guard at the gate.
    pub guard: EntityId,
}

impl Cast {
    /// Names and ids, for logging.
    pub const fn roster(&self) -> [(&'static str, EntityId); 3] {
        [
            ("Brannoc", self.hero),
            ("the wolf", self.wolf),
            ("Sela", self.guard),
        ]
    }
}

/// A world and the round scripted against it.
pub struct Scenario {
    /// The world.
    pub host: Arc<SandboxHost>,
    /// Its inhabitants.
    pub cast: Cast,
    /// One round of intents, in submission order.
    pub intents: Vec<ActionIntent>,
}

fn mace() -> Item {
    Item::new("mace")
        .with_tag("masterwork")
        .with_capability(ItemCapability {
            action: STRIKE,
            tag: String::from("blunt"),
            stack: 3,
            range_category: RangeCategory::Melee,
            base_range: None,
        })
}

fn javelin() -> Item {
    Item::new("javelin")
        .with_tag("aerodynamic")
        .with_capability(ItemCapability {
            action: THROW,
            tag: String::from("throwing"),
            stack: 2,
            range_category: RangeCategory::Thrown,
            base_range: None,
        })
        .with_projectile(1)
}

/// Build the courtyard and its scripted round.
///
/// # Errors
///
/// Returns [`SimError`] if an intent cannot be assembled.
pub fn courtyard() -> Result<Scenario, SimError> {
    let host = Arc::new(SandboxHost::new());

    let hero = host.spawn_actor("Brannoc", EntityKind::Player, Location::tile(0, 0));
    host.update_actor(hero, |data| {
        data.hand_slots.push(mace());
        data.body_slots.push(javelin());
        data.stats.insert(String::from("strength"), 14);
        data.stats.insert(String::from("dexterity"), 12);
        data.proficiencies.insert(String::from("blunt"), 2);
    });

    let wolf = host.spawn_actor("the wolf", EntityKind::Creature, Location::tile(1, 0));
    host.update_actor(wolf, |data| {
        data.stats.insert(String::from("dexterity"), 15);
        data.senses.aroma = 4;
    });
    host.set_defense(wolf, 2);

    let guard = host.spawn_actor("Sela", EntityKind::Npc, Location::tile(4, 3));
    host.update_actor(guard, |data| data.senses.pressure = 4);
    // The gatehouse door stands between the wolf and the guard.
    host.set_obstruction(
        wolf,
        guard,
        Obstruction {
            thin_walls: 1,
            thick_walls: 0,
        },
    );
    host.spawn_object("a rain barrel", EntityKind::Item, Location::tile(2, 2));

    let cast = Cast { hero, wolf, guard };
    let intents = vec![
        ActionIntent::player(hero, ActionKind::Communicate(CommunicationMode::Normal))
            .with_param(params::MESSAGE, "Easy there."),
        ActionIntent::player(hero, ActionKind::Inspect).with_target(wolf),
        ActionIntent::player(hero, STRIKE).with_target(wolf),
        ActionIntent::player(hero, THROW).with_target(wolf),
        ActionIntent::player(hero, ActionKind::Communicate(CommunicationMode::Whisper))
            .with_target(guard)
            .with_param(params::MESSAGE, "Open the gate."),
        ActionIntent::new(
            wolf,
            EntityKind::Creature,
            ActionKind::templated(Verb::Attack)?,
            CostCategory::Full,
        )
        .with_target(hero),
        ActionIntent::npc(guard, ActionKind::Move).with_param(
            params::DESTINATION,
            serde_json::to_value(Location::tile(3, 1))?,
        ),
    ];

    debug!(intents = intents.len(), "courtyard scripted");
    Ok(Scenario {
        host,
        cast,
        intents,
    })
}

// ---------------------------------------------------------------------------
// AlarmHook
// ---------------------------------------------------------------------------

/// Sentries shout when they perceive the outcome of a strike, a throw, or
/// an attack.
#[derive(Debug, Default)]
pub struct AlarmHook {
    sentries: BTreeSet<EntityId>,
}

impl AlarmHook {
    /// A hook that raises the alarm for `sentries`.
    pub fn new(sentries: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            sentries: sentries.into_iter().collect(),
        }
    }
}

const fn is_violent(action: ActionKind) -> bool {
    matches!(
        action,
        ActionKind::Use(_) | ActionKind::Templated(Verb::Attack)
    )
}

impl ReactionHook for AlarmHook {
    fn on_perceived(&self, event: &PerceptionEvent) -> Vec<ActionIntent> {
        if event.phase != BroadcastPhase::Outcome
            || !is_violent(event.action)
            || !self.sentries.contains(&event.observer)
        {
            return Vec::new();
        }
        debug!(
            sentry = %event.observer,
            action = %event.action,
            sense = %event.sense,
            "alarm raised"
        );
        vec![
            ActionIntent::reaction(
                event.observer,
                EntityKind::Npc,
                ActionKind::Communicate(CommunicationMode::Shout),
                event.intent,
            )
            .with_param(params::MESSAGE, "Hold there!"),
        ]
    }
}
