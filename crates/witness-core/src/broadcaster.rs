//! Perception broadcasting.
//!
//! Each resolved action is broadcast twice: once as an attempt, before any
//! effect lands, and once as an outcome after application. For every
//! sentient entity within the action's loudest signature the broadcaster
//! picks the best sense that both reaches the observer and gives it some
//! clarity, and records a [`PerceptionEvent`].
//!
//! Perceived events are handed to a [`ReactionHook`], which may answer with
//! reaction intents for the host to submit.

use chrono::{DateTime, Utc};
use tracing::debug;

use witness_senses::{SenseProfiles, apparent_intensity, best_sense, is_detectable};
use witness_types::{ActionIntent, AvailableTarget, BroadcastPhase, PerceptionEvent, SenseBroadcast};

use crate::host::{ActionHost, HostError};

/// Reacts synchronously to perceived actions.
pub trait ReactionHook: Send + Sync {
    /// Called once per perception event. Returned intents are attached to
    /// the action's result; they are not processed automatically.
    fn on_perceived(&self, event: &PerceptionEvent) -> Vec<ActionIntent>;
}

/// Broadcasts actions to nearby observers through a host.
#[derive(Clone, Copy)]
pub struct Broadcaster<'a> {
    host: &'a dyn ActionHost,
    profiles: &'a SenseProfiles,
}

impl<'a> Broadcaster<'a> {
    /// A broadcaster over `host` using `profiles`.
    pub const fn new(host: &'a dyn ActionHost, profiles: &'a SenseProfiles) -> Self {
        Self { host, profiles }
    }

    /// Who perceives `intent` in `phase`, and how.
    ///
    /// `size_mag` is the actor's body size: bigger actors are easier to
    /// make out. An intent without a resolved actor location, or an action
    /// that gives off no signature, is perceived by nobody.
    pub fn broadcast(
        &self,
        intent: &ActionIntent,
        size_mag: i32,
        phase: BroadcastPhase,
    ) -> Result<Vec<PerceptionEvent>, HostError> {
        let broadcasts = self.profiles.broadcasts(intent.action);
        let radius = self.profiles.max_range(intent.action);
        let Some(origin) = intent.actor_location.as_ref() else {
            return Ok(Vec::new());
        };
        if broadcasts.is_empty() || radius == 0 {
            return Ok(Vec::new());
        }

        let now = self.host.now();
        let mut events = Vec::new();
        for candidate in self.host.available_targets(intent.actor, origin, radius)? {
            if candidate.entity == intent.actor || !candidate.kind.is_sentient() {
                continue;
            }
            let distance = origin.distance_to(&candidate.location);
            if let Some(event) =
                self.perceive(intent, &candidate, broadcasts, distance, size_mag, phase, now)?
            {
                events.push(event);
            }
        }
        debug!(
            intent = %intent.id,
            action = %intent.action,
            ?phase,
            observers = events.len(),
            "broadcast"
        );
        Ok(events)
    }

    #[allow(clippy::too_many_arguments)] // One call site; a struct would only rename them.
    fn perceive(
        &self,
        intent: &ActionIntent,
        candidate: &AvailableTarget,
        broadcasts: &[SenseBroadcast],
        distance: f64,
        size_mag: i32,
        phase: BroadcastPhase,
        now: DateTime<Utc>,
    ) -> Result<Option<PerceptionEvent>, HostError> {
        let reaching: Vec<&SenseBroadcast> = broadcasts
            .iter()
            .filter(|b| is_detectable(b, distance))
            .collect();
        if reaching.is_empty() {
            return Ok(None);
        }
        let senses = self
            .host
            .actor_data(candidate.entity)?
            .map(|data| data.senses)
            .unwrap_or_default();
        let Some(reading) = best_sense(
            reaching.iter().map(|b| b.sense),
            &senses,
            distance,
            candidate.obstruction,
            size_mag,
        ) else {
            return Ok(None);
        };
        let Some(carrier) = reaching.iter().find(|b| b.sense == reading.sense) else {
            return Ok(None);
        };
        Ok(Some(PerceptionEvent {
            observer: candidate.entity,
            actor: intent.actor,
            intent: intent.id,
            action: intent.action,
            sense: reading.sense,
            clarity: reading.clarity,
            apparent_intensity: apparent_intensity(carrier, distance),
            distance,
            phase,
            timestamp: now,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use witness_types::{
        ActionKind, CommunicationMode, EntityId, EntityKind, Location, Obstruction, Sense,
        SenseMagnitudes,
    };

    use super::*;
    use crate::sandbox::SandboxHost;

    fn here() -> Location {
        Location::tile(0, 0)
    }

    fn speak(actor: EntityId, mode: CommunicationMode) -> ActionIntent {
        ActionIntent::player(actor, ActionKind::Communicate(mode)).with_actor_location(here())
    }

    #[test]
    fn whisper_reaches_only_adjacent_listeners() {
        let host = SandboxHost::new();
        let speaker = host.spawn_actor("Ada", EntityKind::Player, here());
        let near = host.spawn_actor("Bo", EntityKind::Npc, here().offset(1, 0));
        let far = host.spawn_actor("Cy", EntityKind::Npc, here().offset(2, 0));
        let profiles = SenseProfiles::standard();
        let intent = speak(speaker, CommunicationMode::Whisper);

        let events = Broadcaster::new(&host, &profiles)
            .broadcast(&intent, 0, BroadcastPhase::Attempt)
            .unwrap();
        let observers: Vec<_> = events.iter().map(|e| e.observer).collect();
        assert_eq!(observers, vec![near]);
        assert!(!observers.contains(&far));
        let event = events.first().unwrap();
        assert_eq!(event.sense, Sense::Pressure);
        assert_eq!(event.phase, BroadcastPhase::Attempt);
        assert!(event.apparent_intensity >= 1);
    }

    #[test]
    fn walls_hide_sight() {
        let host = SandboxHost::new();
        let fighter = host.spawn_actor("Ada", EntityKind::Player, here());
        let behind = host.spawn_actor("Bo", EntityKind::Npc, here().offset(5, 0));
        host.set_obstruction(
            fighter,
            behind,
            Obstruction {
                thin_walls: 1,
                thick_walls: 0,
            },
        );
        let profiles = SenseProfiles::standard();
        let intent = ActionIntent::player(fighter, ActionKind::Move).with_actor_location(here());

        // MOVE: pressure 2 over 3 tiles, light 3 over 20. At 5 tiles only
        // light reaches, and the wall blocks it.
        let events = Broadcaster::new(&host, &profiles)
            .broadcast(&intent, 0, BroadcastPhase::Outcome)
            .unwrap();
        assert!(events.is_empty());

        host.clear_obstruction(fighter, behind);
        let events = Broadcaster::new(&host, &profiles)
            .broadcast(&intent, 0, BroadcastPhase::Outcome)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events.first().map(|e| e.sense), Some(Sense::Light));
    }

    #[test]
    fn blind_and_deaf_observers_perceive_nothing() {
        let host = SandboxHost::new();
        let actor = host.spawn_actor("Ada", EntityKind::Player, here());
        let observer = host.spawn_actor("Bo", EntityKind::Npc, here().offset(1, 0));
        host.update_actor(observer, |data| {
            data.senses = SenseMagnitudes {
                light: -10,
                pressure: -10,
                aroma: -10,
                thaumic: -10,
            };
        });
        let profiles = SenseProfiles::standard();
        let intent = speak(actor, CommunicationMode::Shout);
        let events = Broadcaster::new(&host, &profiles)
            .broadcast(&intent, 0, BroadcastPhase::Attempt)
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn items_never_observe() {
        let host = SandboxHost::new();
        let actor = host.spawn_actor("Ada", EntityKind::Player, here());
        host.spawn_object("crate", EntityKind::Item, here().offset(1, 0));
        let profiles = SenseProfiles::standard();
        let intent = speak(actor, CommunicationMode::Shout);
        let events = Broadcaster::new(&host, &profiles)
            .broadcast(&intent, 0, BroadcastPhase::Attempt)
            .unwrap();
        assert!(events.is_empty());
    }
}
