//! Static rules for the Witness action core.
//!
//! Everything here is pure: definitions are read-only once built, and the
//! arithmetic takes its randomness from a caller-supplied [`DiceRoller`].
//!
//! # Modules
//!
//! - [`registry`] -- Per-verb [`ActionDefinition`]s and the [`ActionRegistry`]
//! - [`effector`] -- The SHIFT/SCALE composition law and tag effectors
//! - [`roll`] -- Result rolls, CR, potency, and the damage dice table
//! - [`dice`] -- The [`DiceRoller`] trait with RNG-backed and scripted rollers
//! - [`error`] -- [`RulesError`]

pub mod dice;
pub mod effector;
pub mod error;
pub mod registry;
pub mod roll;

pub use dice::{DiceRoller, RESULT_DIE, RngRoller, ScriptedRoller, roll_damage};
pub use effector::{
    Composition, EffectorRegistry, EffectorSet, compose, floor_to_i64, standard_effectors,
};
pub use error::RulesError;
pub use registry::{ActionDefinition, ActionRegistry, standard_definition};
pub use roll::{
    CrFactors, DEFAULT_CR, RollContext, calculate_cr, damage_dice, perform_potency_roll,
    perform_result_roll, requires_result_roll,
};
