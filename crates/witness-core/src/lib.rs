//! Action pipeline and perception broadcasting for the Witness action core.
//!
//! This crate turns [`ActionIntent`]s into [`ActionResult`]s against an
//! [`ActionHost`] that owns the world, and tells every entity that could
//! have noticed what it saw, heard, or smelled.
//!
//! # Modules
//!
//! - [`batch`] -- Sequential and parallel batch processing.
//! - [`broadcaster`] -- Attempt and outcome perception broadcasts, and the
//!   [`ReactionHook`] trait.
//! - [`config`] -- Configuration loading from `witness-config.yaml` into
//!   strongly-typed structs.
//! - [`host`] -- The [`ActionHost`] trait the world implements.
//! - [`pipeline`] -- The seven-stage [`ActionPipeline`].
//! - [`rules`] -- [`InterruptRule`]s checked before resolution.
//! - [`sandbox`] -- [`SandboxHost`], an in-memory host for tests and demos.
//!
//! [`ActionIntent`]: witness_types::ActionIntent
//! [`ActionResult`]: witness_types::ActionResult

pub mod batch;
pub mod broadcaster;
pub mod config;
pub mod host;
pub mod pipeline;
pub mod rules;
pub mod sandbox;

pub use batch::{BatchError, BatchMode, process_batch, run_parallel, run_sequential};
pub use broadcaster::{Broadcaster, ReactionHook};
pub use config::{ConfigError, LoggingConfig, WitnessConfig};
pub use host::{ActionHost, HostError};
pub use pipeline::{ActionPipeline, DEFAULT_FALLBACK_RADIUS, PipelineSettings, Resolved};
pub use rules::{InterruptRule, first_block};
pub use sandbox::{ActionBudget, SandboxHost};
