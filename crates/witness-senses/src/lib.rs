//! The sense and perception model.
//!
//! Actions give off signatures across four senses. Whether anyone notices,
//! and how clearly, depends on distance, walls, the observer's sense
//! magnitudes, and the size of what is observed.
//!
//! # Modules
//!
//! - [`broadcast`] -- Per-action [`SenseProfiles`] and intensity falloff
//! - [`clarity`] -- The distance-magnitude table, clarity bands, and best-sense selection
//! - [`memory`] -- Bounded per-observer [`PerceptionLog`]
//! - [`error`] -- [`SenseError`]

pub mod broadcast;
pub mod clarity;
pub mod error;
pub mod memory;

pub use broadcast::{ProfileEntry, SenseProfiles, apparent_intensity, is_detectable};
pub use clarity::{
    SenseReading, best_sense, clarity_at, max_clear_magnitude, sense_clarity, tiles_for_magnitude,
};
pub use error::SenseError;
pub use memory::{MemoryConfig, PerceptionLog};
