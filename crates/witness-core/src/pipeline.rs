//! The action resolution pipeline.
//!
//! Every intent runs through seven stages in order:
//!
//! 1. **Target resolution** -- actor location, radius query, target choice
//! 2. **Validation** -- the seven ordered checks
//! 3. **Cost accounting** -- turn ownership and the action ledger
//! 4. **Rules check** -- registered interrupt rules
//! 5. **Resolution** -- the verb's handler, after the attempt broadcast
//! 6. **Application** -- each effect handed to the host, best effort
//! 7. **Perception** -- the outcome broadcast
//!
//! The first failing stage ends processing and yields a failed
//! [`ActionResult`]. A host error at any stage is a pipeline failure.
//! Nothing is retried and nothing is compensated: a cost already paid stays
//! paid, and effects already applied stay applied.
//!
//! Resolution and commit are split. [`ActionPipeline::resolve`] does all
//! the work except recording perception; [`ActionPipeline::commit`] appends
//! the perception events to observer memory and runs the reaction hook.
//! Parallel batches use the split to commit in submission order.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use witness_actions::{
    ActionContext, CostPlan, HandlerSettings, Rejection, TargetMemory, Validated,
    ValidationInput, dispatch, plan_cost, projectile_reach, query_radius, resolve_target,
    validate,
};
use witness_rules::{
    ActionDefinition, ActionRegistry, DiceRoller, EffectorRegistry, RngRoller, standard_effectors,
};
use witness_senses::{MemoryConfig, PerceptionLog, SenseProfiles};
use witness_types::{
    ActionEffect, ActionFailure, ActionIntent, ActionResult, ActorData, AvailableTarget,
    BroadcastPhase, EntityId, IntentStatus, PerceptionEvent, PipelineStage, RollResult,
};

use crate::broadcaster::{Broadcaster, ReactionHook};
use crate::config::{ConfigError, WitnessConfig};
use crate::host::{ActionHost, HostError};
use crate::rules::{InterruptRule, first_block};

/// Radius used for the target query when a verb's range is unbounded.
pub const DEFAULT_FALLBACK_RADIUS: u32 = 30;

/// Pipeline tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Target query radius for verbs with no finite range.
    pub fallback_radius: u32,
    /// Handler tunables.
    pub handler: HandlerSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fallback_radius: DEFAULT_FALLBACK_RADIUS,
            handler: HandlerSettings::default(),
        }
    }
}

/// A resolved intent whose perception has not been committed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The intent in its final lifecycle state.
    pub intent: ActionIntent,
    /// The result, without reactions.
    pub result: ActionResult,
    /// Perception events, attempt phase first.
    pub perceptions: Vec<PerceptionEvent>,
}

/// What the stages produce when the handler succeeds.
struct Executed {
    effects: Vec<ActionEffect>,
    summary: String,
    roll: Option<RollResult>,
}

/// Mark a stage complete and move to `status`.
fn advance(intent: &mut ActionIntent, stage: PipelineStage, status: IntentStatus) {
    if !intent.is_terminal() {
        intent.completed_stages.push(stage);
        intent.status = status;
    }
}

/// A host error becomes a pipeline failure naming the stage.
fn host_failure(intent: &ActionIntent, stage: PipelineStage, err: &HostError) -> ActionFailure {
    warn!(intent = %intent.id, %stage, error = %err, "host error, aborting intent");
    ActionFailure::Pipeline(format!("{stage}: {err}"))
}

/// Resolves intents against a host.
pub struct ActionPipeline {
    host: Arc<dyn ActionHost>,
    registry: Arc<ActionRegistry>,
    profiles: Arc<SenseProfiles>,
    effectors: Arc<EffectorRegistry>,
    settings: PipelineSettings,
    rules: Vec<Arc<dyn InterruptRule>>,
    reaction_hook: Option<Arc<dyn ReactionHook>>,
    targets: Mutex<TargetMemory>,
    perceptions: Mutex<PerceptionLog>,
}

impl ActionPipeline {
    /// A pipeline with the standard registry, sense profiles, and
    /// effectors.
    pub fn new(host: Arc<dyn ActionHost>) -> Self {
        Self {
            host,
            registry: Arc::new(ActionRegistry::standard()),
            profiles: Arc::new(SenseProfiles::standard()),
            effectors: Arc::new(standard_effectors()),
            settings: PipelineSettings::default(),
            rules: Vec::new(),
            reaction_hook: None,
            targets: Mutex::new(TargetMemory::new()),
            perceptions: Mutex::new(PerceptionLog::new(MemoryConfig::default())),
        }
    }

    /// A pipeline built from configuration.
    pub fn from_config(
        host: Arc<dyn ActionHost>,
        config: &WitnessConfig,
    ) -> Result<Self, ConfigError> {
        let pipeline = Self::new(host)
            .with_registry(Arc::new(config.registry()?))
            .with_profiles(Arc::new(config.profiles()?))
            .with_effectors(Arc::new(config.effector_registry()))
            .with_settings(config.pipeline_settings())
            .with_memory(config.perception);
        debug!(
            verbs = pipeline.registry.len(),
            fallback_radius = pipeline.settings.fallback_radius,
            "pipeline configured"
        );
        Ok(pipeline)
    }

    /// Replace the action registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ActionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the sense profiles.
    #[must_use]
    pub fn with_profiles(mut self, profiles: Arc<SenseProfiles>) -> Self {
        self.profiles = profiles;
        self
    }

    /// Replace the tag effectors.
    #[must_use]
    pub fn with_effectors(mut self, effectors: Arc<EffectorRegistry>) -> Self {
        self.effectors = effectors;
        self
    }

    /// Replace the tunables.
    #[must_use]
    pub const fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Bound observer memory.
    #[must_use]
    pub fn with_memory(mut self, config: MemoryConfig) -> Self {
        self.perceptions = Mutex::new(PerceptionLog::new(config));
        self
    }

    /// Register an interrupt rule. Rules run in registration order.
    #[must_use]
    pub fn with_rule(mut self, rule: Arc<dyn InterruptRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Install the reaction hook.
    #[must_use]
    pub fn with_reaction_hook(mut self, hook: Arc<dyn ReactionHook>) -> Self {
        self.reaction_hook = Some(hook);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The host.
    pub fn host(&self) -> &dyn ActionHost {
        self.host.as_ref()
    }

    /// The action registry.
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// The sense profiles.
    pub fn profiles(&self) -> &SenseProfiles {
        &self.profiles
    }

    /// The tunables.
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn targets(&self) -> MutexGuard<'_, TargetMemory> {
        self.targets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self) -> MutexGuard<'_, PerceptionLog> {
        self.perceptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The actor's last successfully used target.
    pub fn last_target(&self, actor: EntityId) -> Option<EntityId> {
        self.targets().last_target(actor)
    }

    /// Forget the actor's last target.
    pub fn forget_target(&self, actor: EntityId) {
        self.targets().forget(actor);
    }

    /// What an observer still remembers as of the host clock, oldest first.
    pub fn perceived_by(&self, observer: EntityId) -> Vec<PerceptionEvent> {
        let now = self.host.now();
        let mut log = self.log();
        log.prune(now);
        log.events_for(observer).cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Processing
    // -----------------------------------------------------------------------

    /// Process one intent with fresh randomness.
    pub fn process(&self, intent: ActionIntent) -> ActionResult {
        let mut roller = RngRoller::new(SmallRng::from_rng(&mut rand::rng()));
        self.process_with(intent, &mut roller)
    }

    /// Process one intent, rolling with `roller`.
    pub fn process_with(&self, intent: ActionIntent, roller: &mut dyn DiceRoller) -> ActionResult {
        self.commit(self.resolve(intent, None, roller))
    }

    /// Process one intent against `target`, overriding the intent's own
    /// target and the remembered one.
    pub fn process_targeting(
        &self,
        intent: ActionIntent,
        target: EntityId,
        roller: &mut dyn DiceRoller,
    ) -> ActionResult {
        self.commit(self.resolve(intent, Some(target), roller))
    }

    /// Run every stage, holding perception back for [`commit`](Self::commit).
    pub fn resolve(
        &self,
        intent: ActionIntent,
        override_target: Option<EntityId>,
        roller: &mut dyn DiceRoller,
    ) -> Resolved {
        let mut intent = intent;
        let mut perceptions = Vec::new();
        debug!(
            intent = %intent.id,
            actor = %intent.actor,
            action = %intent.action,
            "processing intent"
        );

        match self.run(&mut intent, override_target, roller, &mut perceptions) {
            Ok(executed) => {
                let success = executed.effects.iter().all(|e| e.applied);
                let intent = intent.with_status(IntentStatus::Executed);
                if let Some(target) = intent.target.filter(|t| success && *t != intent.actor) {
                    self.targets().remember(intent.actor, target);
                }
                info!(
                    intent = %intent.id,
                    action = %intent.action,
                    success,
                    effects = executed.effects.len(),
                    perceptions = perceptions.len(),
                    "action resolved"
                );
                let result = ActionResult {
                    intent: intent.id,
                    success,
                    effects: executed.effects,
                    observers: observers_of(&perceptions),
                    summary: executed.summary,
                    failure: None,
                    roll: executed.roll,
                    reactions: Vec::new(),
                };
                Resolved {
                    intent,
                    result,
                    perceptions,
                }
            }
            Err(failure) => {
                let reason = failure.to_string();
                debug!(intent = %intent.id, action = %intent.action, %reason, "intent failed");
                let intent = intent.fail(reason);
                let mut result = ActionResult::failed(intent.id, failure);
                result.observers = observers_of(&perceptions);
                Resolved {
                    intent,
                    result,
                    perceptions,
                }
            }
        }
    }

    /// Record perception events in observer memory and collect reactions.
    pub fn commit(&self, resolved: Resolved) -> ActionResult {
        let Resolved {
            mut result,
            perceptions,
            ..
        } = resolved;
        let now = self.host.now();
        {
            let mut log = self.log();
            for event in &perceptions {
                log.record(event.clone());
            }
            log.prune(now);
        }
        if let Some(hook) = &self.reaction_hook {
            for event in &perceptions {
                result.reactions.extend(hook.on_perceived(event));
            }
        }
        result
    }

    fn run(
        &self,
        intent: &mut ActionIntent,
        override_target: Option<EntityId>,
        roller: &mut dyn DiceRoller,
        perceptions: &mut Vec<PerceptionEvent>,
    ) -> Result<Executed, ActionFailure> {
        let verb = intent.action.verb();
        let definition = self
            .registry
            .get(verb)
            .ok_or(ActionFailure::UnknownVerb(verb))?;
        intent.status = IntentStatus::Validating;

        // 1. Target resolution
        let actor = self
            .host
            .actor_data(intent.actor)
            .map_err(|e| host_failure(intent, PipelineStage::TargetResolution, &e))?;
        let available =
            self.resolve_targets(intent, definition, actor.as_ref(), override_target)?;
        advance(intent, PipelineStage::TargetResolution, IntentStatus::Validating);

        // 2. Validation
        let in_combat = self
            .host
            .is_in_combat()
            .map_err(|e| host_failure(intent, PipelineStage::Validation, &e))?;
        let validated = self.validate(intent, definition, &available, actor.as_ref(), in_combat)?;
        advance(intent, PipelineStage::Validation, IntentStatus::Validated);

        // 3. Cost accounting
        self.charge(intent, in_combat)?;
        advance(intent, PipelineStage::CostAccounting, IntentStatus::Validated);

        // 4. Rules check
        if let Some((rule, reason)) = first_block(&self.rules, intent, &validated) {
            debug!(intent = %intent.id, %rule, %reason, "blocked by interrupt rule");
            return Err(ActionFailure::Rules(reason));
        }
        advance(intent, PipelineStage::RulesCheck, IntentStatus::Executing);

        // 5. Resolution, seen first as an attempt
        let size_mag = actor.as_ref().map_or(0, |a| a.size_mag);
        let broadcaster = Broadcaster::new(self.host.as_ref(), &self.profiles);
        perceptions.extend(
            broadcaster
                .broadcast(intent, size_mag, BroadcastPhase::Attempt)
                .map_err(|e| host_failure(intent, PipelineStage::Resolution, &e))?,
        );
        let ctx = ActionContext {
            intent,
            definition,
            actor: actor.as_ref(),
            validated: &validated,
            profiles: &self.profiles,
            settings: &self.settings.handler,
        };
        let outcome = dispatch(&ctx, roller).map_err(|e| ActionFailure::Handler(e.to_string()))?;
        debug!(
            intent = %intent.id,
            effects = outcome.effects.len(),
            roll = ?outcome.roll.as_ref().map(|r| (r.total, r.cr)),
            "handler finished"
        );
        advance(intent, PipelineStage::Resolution, IntentStatus::Executing);

        // 6. Application
        let mut effects = outcome.effects;
        for effect in &mut effects {
            let applied = self.host.execute_effect(effect).map_err(|e| e.to_string());
            if let Err(reason) = &applied {
                warn!(
                    intent = %intent.id,
                    effect = %effect.id,
                    kind = ?effect.kind(),
                    %reason,
                    "effect not applied"
                );
            }
            if let Err(err) = effect.settle(applied) {
                warn!(effect = %effect.id, error = %err, "effect settled twice");
            }
        }
        advance(intent, PipelineStage::Application, IntentStatus::Executing);

        // 7. Perception of the outcome
        perceptions.extend(
            broadcaster
                .broadcast(intent, size_mag, BroadcastPhase::Outcome)
                .map_err(|e| host_failure(intent, PipelineStage::Perception, &e))?,
        );
        advance(intent, PipelineStage::Perception, IntentStatus::Executing);

        Ok(Executed {
            effects,
            summary: outcome.summary,
            roll: outcome.roll,
        })
    }

    /// Stage 1: fill in the actor location and the target.
    fn resolve_targets(
        &self,
        intent: &mut ActionIntent,
        definition: &ActionDefinition,
        actor: Option<&ActorData>,
        override_target: Option<EntityId>,
    ) -> Result<Vec<AvailableTarget>, ActionFailure> {
        let stage = PipelineStage::TargetResolution;
        let location = match intent.actor_location.clone() {
            Some(location) => location,
            None => self
                .host
                .actor_location(intent.actor)
                .map_err(|e| host_failure(intent, stage, &e))?
                .ok_or_else(|| {
                    ActionFailure::TargetResolution(String::from("actor location unknown"))
                })?,
        };
        intent.actor_location = Some(location.clone());

        let radius = query_radius(
            intent.action,
            definition,
            &self.profiles,
            projectile_reach(intent, actor, &self.effectors),
            self.settings.fallback_radius,
        );
        let available = self
            .host
            .available_targets(intent.actor, &location, radius)
            .map_err(|e| host_failure(intent, stage, &e))?;

        let remembered = if definition.requires_target {
            self.last_target(intent.actor)
        } else {
            None
        };
        *intent = resolve_target(intent.clone(), override_target, remembered, &available);
        debug!(
            intent = %intent.id,
            radius,
            candidates = available.len(),
            target = ?intent.target,
            "targets resolved"
        );
        Ok(available)
    }

    /// Stage 2.
    fn validate(
        &self,
        intent: &ActionIntent,
        definition: &ActionDefinition,
        available: &[AvailableTarget],
        actor: Option<&ActorData>,
        in_combat: bool,
    ) -> Result<Validated, ActionFailure> {
        let input = ValidationInput {
            intent,
            definition,
            available,
            actor,
            profiles: &self.profiles,
            effectors: &self.effectors,
            in_combat,
        };
        let host = self.host.as_ref();
        validate(&input, &mut |actor, target| host.is_aware(actor, target)).map_err(
            |rejection| match rejection {
                Rejection::Invalid(failure) => ActionFailure::Validation(failure),
                Rejection::Host(err) => host_failure(intent, PipelineStage::Validation, &err),
            },
        )
    }

    /// Stage 3.
    fn charge(&self, intent: &ActionIntent, in_combat: bool) -> Result<(), ActionFailure> {
        let stage = PipelineStage::CostAccounting;
        let current = if in_combat {
            self.host
                .current_actor()
                .map_err(|e| host_failure(intent, stage, &e))?
        } else {
            None
        };
        match plan_cost(intent, in_combat, current).map_err(ActionFailure::Cost)? {
            CostPlan::Skip => Ok(()),
            CostPlan::Charge(cost) => {
                self.host
                    .try_consume_action_cost(intent.actor, cost)
                    .map_err(|e| host_failure(intent, stage, &e))?
                    .map_err(ActionFailure::Cost)?;
                debug!(intent = %intent.id, ?cost, "cost consumed");
                Ok(())
            }
        }
    }
}

fn observers_of(perceptions: &[PerceptionEvent]) -> BTreeSet<EntityId> {
    perceptions.iter().map(|e| e.observer).collect()
}
