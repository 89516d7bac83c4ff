//! Shared type definitions for the Witness action core.
//!
//! This crate is the single source of truth for the data that flows through
//! action resolution: intents going in, results and effects coming out, and
//! the perception events produced along the way. It holds no behaviour
//! beyond constructors, lifecycle transitions, and accessors.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity, item, intent, and effect references
//! - [`enums`] -- Verbs, the closed action kind, senses, clarity, lifecycle states
//! - [`location`] -- World/region/tile positions and distance
//! - [`actor`] -- Host-supplied actor, item, and target snapshots
//! - [`intent`] -- [`ActionIntent`] and its factories
//! - [`result`] -- [`ActionResult`], [`ActionEffect`], and the failure taxonomy
//! - [`roll`] -- Effectors and roll/potency records
//! - [`perception`] -- Sense broadcasts and perception events
//! - [`error`] -- Construction errors ([`TypeError`])

pub mod actor;
pub mod enums;
pub mod error;
pub mod ids;
pub mod intent;
pub mod location;
pub mod perception;
pub mod result;
pub mod roll;

// Re-export all public types at crate root for convenience.
pub use actor::{
    ActorData, AvailableTarget, Item, ItemCapability, Obstruction, ProjectileProfile,
    SenseMagnitudes, STAT_DEXTERITY, STAT_PERCEPTION, STAT_STRENGTH,
};
pub use enums::{
    ActionKind, BroadcastPhase, Clarity, CommunicationMode, CostCategory, EffectorChannel,
    EffectorKind, EntityKind, IntentSource, IntentStatus, PipelineStage, RangeCategory, Sense,
    UseMode, Verb,
};
pub use error::TypeError;
pub use ids::{EffectId, EntityId, IntentId, ItemId};
pub use intent::{ActionIntent, params};
pub use location::Location;
pub use perception::{PerceptionEvent, SenseBroadcast};
pub use result::{
    ActionEffect, ActionFailure, ActionResult, CostFailure, EffectDetail, EffectKind, ToolFailure,
    ValidationFailure,
};
pub use roll::{ChannelEffector, DamageDice, Effector, PotencyResult, RollResult};
