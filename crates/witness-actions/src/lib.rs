//! Per-intent resolution logic for the Witness action core.
//!
//! Everything in this crate works on one intent at a time and never talks
//! to the host directly: the pipeline in `witness-core` gathers host data,
//! then calls in here to decide what happens.
//!
//! # Modules
//!
//! - [`target`] -- Target resolution and the per-actor last-target memory
//! - [`tools`] -- Choosing the equipped tool and ammunition for an action
//! - [`range`] -- Effective range, projectile reach, and the query radius
//! - [`validation`] -- The seven ordered validation checks
//! - [`costs`] -- Turn ownership and cost planning
//! - [`handlers`] -- Per-verb effect producers

pub mod costs;
pub mod handlers;
pub mod range;
pub mod target;
pub mod tools;
pub mod validation;

pub use costs::{CostPlan, is_reaction, plan_cost};
pub use handlers::{
    ActionContext, DEFAULT_MAX_MESSAGE_LEN, HandlerError, HandlerOutcome, HandlerSettings,
    dispatch,
};
pub use range::{
    DEFAULT_FIRED_RANGE, DEFAULT_THROWN_RANGE, RangeLimit, effective_range, projectile_range,
    projectile_reach, query_radius,
};
pub use target::{TargetMemory, find_available, resolve_target};
pub use tools::{ToolSelection, find_tool};
pub use validation::{Rejection, Validated, ValidationInput, validate};
