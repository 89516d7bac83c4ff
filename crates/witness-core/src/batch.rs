//! Batch processing.
//!
//! Sequential batches run one intent after another, so each intent sees the
//! world as the previous one left it. Parallel batches resolve every intent
//! on the blocking pool at once and make no ordering promise about effects
//! on shared world state; results still come back in submission order, and
//! perception is committed to observer memory in submission order too.
//!
//! A resolution that panics fails only its own slot. Every other intent in
//! the batch still resolves and commits.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use witness_rules::{DiceRoller, RngRoller};
use witness_types::{ActionFailure, ActionIntent, ActionResult, IntentId};

use crate::pipeline::ActionPipeline;

/// How a batch is scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// One after another, in submission order.
    #[default]
    Sequential,
    /// All at once on the blocking pool.
    Parallel,
}

/// Errors raised while running a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The sequential batch task was cancelled or died outside any intent.
    #[error("batch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The result for an intent whose resolution never finished.
fn aborted(intent: IntentId, reason: impl Display) -> ActionResult {
    ActionResult::failed(
        intent,
        ActionFailure::Pipeline(format!("resolution aborted: {reason}")),
    )
}

/// Process `intents` in order with one roller.
pub fn run_sequential(
    pipeline: &ActionPipeline,
    intents: Vec<ActionIntent>,
    roller: &mut dyn DiceRoller,
) -> Vec<ActionResult> {
    intents
        .into_iter()
        .map(|intent| {
            let id = intent.id;
            panic::catch_unwind(AssertUnwindSafe(|| pipeline.process_with(intent, &mut *roller)))
                .unwrap_or_else(|_| {
                    warn!(intent = %id, "intent resolution panicked");
                    aborted(id, "task panicked")
                })
        })
        .collect()
}

/// Resolve `intents` concurrently, then commit in submission order.
///
/// `roller_for` hands each intent its own roller, given the intent's index
/// in the batch. A task that panics or is cancelled yields a pipeline
/// failure in its slot and commits no perception.
pub async fn run_parallel<F, R>(
    pipeline: &Arc<ActionPipeline>,
    intents: Vec<ActionIntent>,
    mut roller_for: F,
) -> Vec<ActionResult>
where
    F: FnMut(usize, &ActionIntent) -> R,
    R: DiceRoller + Send + 'static,
{
    let mut handles = Vec::with_capacity(intents.len());
    for (index, intent) in intents.into_iter().enumerate() {
        let mut roller = roller_for(index, &intent);
        let id = intent.id;
        let pipeline = Arc::clone(pipeline);
        let handle = tokio::task::spawn_blocking(move || {
            pipeline.resolve(intent, None, &mut roller)
        });
        handles.push((id, handle));
    }
    debug!(tasks = handles.len(), "parallel batch spawned");

    let mut results = Vec::with_capacity(handles.len());
    for (id, handle) in handles {
        let result = match handle.await {
            Ok(resolved) => pipeline.commit(resolved),
            Err(err) => {
                warn!(intent = %id, error = %err, "resolution task failed");
                aborted(id, err)
            }
        };
        results.push(result);
    }
    results
}

/// Process a batch in `mode`.
///
/// With a `seed`, every roll in the batch is reproducible: sequential
/// batches share one seeded generator, and parallel batches draw each
/// intent's generator from it in submission order.
pub async fn process_batch(
    pipeline: &Arc<ActionPipeline>,
    intents: Vec<ActionIntent>,
    mode: BatchMode,
    seed: Option<u64>,
) -> Result<Vec<ActionResult>, BatchError> {
    let mut master = seed.map_or_else(
        || SmallRng::from_rng(&mut rand::rng()),
        SmallRng::seed_from_u64,
    );
    debug!(?mode, intents = intents.len(), seeded = seed.is_some(), "processing batch");
    match mode {
        BatchMode::Sequential => {
            let pipeline = Arc::clone(pipeline);
            let results = tokio::task::spawn_blocking(move || {
                let mut roller = RngRoller::new(master);
                run_sequential(&pipeline, intents, &mut roller)
            })
            .await?;
            Ok(results)
        }
        BatchMode::Parallel => {
            let results = run_parallel(pipeline, intents, |_, _| {
                RngRoller::new(SmallRng::from_rng(&mut master))
            })
            .await;
            Ok(results)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use witness_rules::ScriptedRoller;
    use witness_types::{
        ActionEffect, ActionKind, ActorData, AvailableTarget, CommunicationMode, CostCategory,
        EffectDetail, EntityId, EntityKind, Location, params,
    };

    use super::*;
    use crate::host::{ActionHost, HostError};
    use crate::sandbox::SandboxHost;

    /// A sandbox whose speech driver crashes.
    struct BrittleHost(SandboxHost);

    impl ActionHost for BrittleHost {
        fn available_targets(
            &self,
            actor: EntityId,
            origin: &Location,
            radius: u32,
        ) -> Result<Vec<AvailableTarget>, HostError> {
            self.0.available_targets(actor, origin, radius)
        }

        fn actor_location(&self, actor: EntityId) -> Result<Option<Location>, HostError> {
            self.0.actor_location(actor)
        }

        fn is_aware(&self, actor: EntityId, target: EntityId) -> Result<bool, HostError> {
            self.0.is_aware(actor, target)
        }

        fn can_afford(&self, actor: EntityId, cost: CostCategory) -> Result<bool, HostError> {
            self.0.can_afford(actor, cost)
        }

        fn consume_cost(&self, actor: EntityId, cost: CostCategory) -> Result<bool, HostError> {
            self.0.consume_cost(actor, cost)
        }

        fn actor_data(&self, actor: EntityId) -> Result<Option<ActorData>, HostError> {
            self.0.actor_data(actor)
        }

        fn execute_effect(&self, effect: &ActionEffect) -> Result<(), HostError> {
            if matches!(effect.detail, EffectDetail::Speech { .. }) {
                panic!("speech driver crashed");
            }
            self.0.execute_effect(effect)
        }

        fn is_in_combat(&self) -> Result<bool, HostError> {
            self.0.is_in_combat()
        }

        fn current_actor(&self) -> Result<Option<EntityId>, HostError> {
            self.0.current_actor()
        }
    }

    /// Ada walks off while Bo's shout crashes the host.
    fn crash_batch() -> (Arc<BrittleHost>, EntityId, EntityId, Vec<ActionIntent>) {
        let host = Arc::new(BrittleHost(SandboxHost::new()));
        let ada = host.0.spawn_actor("Ada", EntityKind::Player, Location::tile(0, 0));
        let bo = host.0.spawn_actor("Bo", EntityKind::Npc, Location::tile(1, 0));
        let walk = ActionIntent::player(ada, ActionKind::Move).with_param(
            params::DESTINATION,
            serde_json::to_value(Location::tile(0, 2)).unwrap(),
        );
        (host, ada, bo, vec![walk, shout(bo, "fire!")])
    }

    fn assert_only_the_shout_failed(results: &[ActionResult], ids: &[IntentId]) {
        let result_ids: Vec<_> = results.iter().map(|r| r.intent).collect();
        assert_eq!(result_ids, ids);
        let walked = results.first().unwrap();
        assert!(walked.success, "{walked:?}");
        match &results.get(1).unwrap().failure {
            Some(ActionFailure::Pipeline(message)) => {
                assert!(message.contains("panicked"), "{message}");
            }
            other => panic!("expected a pipeline failure, got {other:?}"),
        }
    }

    fn shout(actor: EntityId, message: &str) -> ActionIntent {
        ActionIntent::player(actor, ActionKind::Communicate(CommunicationMode::Shout))
            .with_param(params::MESSAGE, message)
    }

    #[tokio::test]
    async fn parallel_keeps_submission_order() {
        let host = Arc::new(SandboxHost::new());
        let crier = host.spawn_actor("Crier", EntityKind::Npc, Location::tile(0, 0));
        let listener = host.spawn_actor("Ada", EntityKind::Player, Location::tile(1, 0));
        let pipeline = Arc::new(ActionPipeline::new(host.clone()));

        let intents: Vec<_> = ["one", "two", "three", "four"]
            .into_iter()
            .map(|m| shout(crier, m))
            .collect();
        let ids: Vec<_> = intents.iter().map(|i| i.id).collect();

        let results = run_parallel(&pipeline, intents, |_, _| ScriptedRoller::default()).await;
        let result_ids: Vec<_> = results.iter().map(|r| r.intent).collect();
        assert_eq!(result_ids, ids);
        assert!(results.iter().all(|r| r.success));

        // Attempt then outcome, intent by intent.
        let perceived: Vec<_> = pipeline
            .perceived_by(listener)
            .iter()
            .map(|e| e.intent)
            .collect();
        let expected: Vec<_> = ids.iter().flat_map(|id| [*id, *id]).collect();
        assert_eq!(perceived, expected);
    }

    #[tokio::test]
    async fn parallel_task_panic_fails_only_its_slot() {
        let (host, ada, bo, intents) = crash_batch();
        let ids: Vec<_> = intents.iter().map(|i| i.id).collect();
        let pipeline = Arc::new(ActionPipeline::new(host.clone()));

        let results = run_parallel(&pipeline, intents, |_, _| ScriptedRoller::default()).await;

        assert_only_the_shout_failed(&results, &ids);
        assert_eq!(host.0.location_of(ada), Some(Location::tile(0, 2)));
        // The walk was committed; the crashed shout left nothing behind.
        let walk = ids.first().copied();
        let seen = pipeline.perceived_by(bo);
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|e| Some(e.intent) == walk));
    }

    #[tokio::test]
    async fn sequential_panic_fails_only_its_slot() {
        let (host, ada, _bo, mut intents) = crash_batch();
        intents.reverse();
        let ids: Vec<_> = intents.iter().map(|i| i.id).collect();
        let pipeline = Arc::new(ActionPipeline::new(host.clone()));

        let results = process_batch(&pipeline, intents, BatchMode::Sequential, Some(3))
            .await
            .unwrap();

        // The walk comes after the crash and still lands.
        assert!(results.first().unwrap().failure.is_some());
        assert!(results.get(1).unwrap().success);
        assert_eq!(results.iter().map(|r| r.intent).collect::<Vec<_>>(), ids);
        assert_eq!(host.0.location_of(ada), Some(Location::tile(0, 2)));
    }

    #[test]
    fn sequential_sees_earlier_moves() {
        let host = Arc::new(SandboxHost::new());
        let walker = host.spawn_actor("Ada", EntityKind::Player, Location::tile(0, 0));
        let pipeline = ActionPipeline::new(host.clone());
        let step = |x: i32| {
            ActionIntent::player(walker, ActionKind::Move)
                .with_param(
                    params::DESTINATION,
                    serde_json::to_value(Location::tile(x, 0)).unwrap(),
                )
        };

        let results = run_sequential(
            &pipeline,
            vec![step(1), step(2), step(3)],
            &mut ScriptedRoller::default(),
        );
        assert!(results.iter().all(|r| r.success));
        assert_eq!(host.location_of(walker), Some(Location::tile(3, 0)));
    }

    #[tokio::test]
    async fn seeded_batches_repeat() {
        async fn run(seed: u64) -> Vec<Option<i64>> {
            let host = Arc::new(SandboxHost::new());
            let walker = host.spawn_actor("Ada", EntityKind::Player, Location::tile(0, 0));
            let pipeline = Arc::new(ActionPipeline::new(host));
            let intents = (0..4)
                .map(|_| {
                    ActionIntent::player(walker, ActionKind::Move)
                        .with_param(params::DISTANCE, 1)
                        .with_param(params::REQUIRES_ROLL, true)
                        .with_param(params::DIFFICULTY, -100)
                })
                .collect();
            process_batch(&pipeline, intents, BatchMode::Parallel, Some(seed))
                .await
                .unwrap()
                .iter()
                .map(|r| r.roll.as_ref().map(|roll| roll.total))
                .collect()
        }

        let first = run(7).await;
        assert_eq!(first.len(), 4);
        assert!(first.iter().all(Option::is_some));
        assert_eq!(first, run(7).await);
    }

    #[test]
    fn batch_mode_parses_snake_case() {
        let mode: BatchMode = serde_json::from_str("\"parallel\"").unwrap();
        assert_eq!(mode, BatchMode::Parallel);
        assert_eq!(BatchMode::default(), BatchMode::Sequential);
    }
}
