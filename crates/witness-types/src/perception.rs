//! Sensory broadcast entries and perception events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{ActionKind, BroadcastPhase, Clarity, Sense};
use crate::ids::{EntityId, IntentId};

/// Lowest broadcast intensity.
pub const MIN_INTENSITY: u8 = 1;

/// Highest broadcast intensity.
pub const MAX_INTENSITY: u8 = 10;

/// One sensory signature an action gives off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenseBroadcast {
    /// The sense carrying the signature.
    pub sense: Sense,
    /// Strength at the source, 1 to 10.
    pub intensity: u8,
    /// Tiles the signature carries.
    pub range: u32,
    /// Whether the signature travels in a line of sight (light only).
    pub directional: bool,
    /// Whether the signature passes through walls (all but light).
    pub penetrates_walls: bool,
}

impl SenseBroadcast {
    /// Build a broadcast, clamping intensity into 1..=10 and deriving the
    /// directional and wall flags from the sense.
    pub fn new(sense: Sense, intensity: u8, range: u32) -> Self {
        Self {
            sense,
            intensity: intensity.clamp(MIN_INTENSITY, MAX_INTENSITY),
            range,
            directional: sense.is_directional(),
            penetrates_walls: sense.penetrates_walls(),
        }
    }
}

/// A record that an observer perceived an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionEvent {
    /// Who perceived.
    pub observer: EntityId,
    /// Who acted.
    pub actor: EntityId,
    /// Which intent was perceived.
    pub intent: IntentId,
    /// Verb and subtype perceived.
    pub action: ActionKind,
    /// Sense that carried it.
    pub sense: Sense,
    /// How clearly.
    pub clarity: Clarity,
    /// Intensity at the observer's distance.
    pub apparent_intensity: u8,
    /// Distance in tiles.
    pub distance: f64,
    /// Attempt (before effects) or outcome (after).
    pub phase: BroadcastPhase,
    /// When it was perceived.
    pub timestamp: DateTime<Utc>,
}
