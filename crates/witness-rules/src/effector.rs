//! Effector composition and the effector registry.
//!
//! The composition law is exact:
//!
//! ```text
//! result = floor((base + sum(shifts)) * product(scales))
//! ```
//!
//! Shifts are summed before any scale is applied, so reordering effectors of
//! the same kind never changes the result. All arithmetic runs on
//! [`Decimal`] so fractional scales such as `1.5` or `0.1` stay exact, and
//! saturates instead of overflowing.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use witness_types::{ChannelEffector, Effector, EffectorChannel, EffectorKind};

/// The applied totals of one composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composition {
    /// Sum of SHIFT values.
    pub shift: Decimal,
    /// Product of SCALE values (1 when there are none).
    pub scale: Decimal,
    /// `floor((base + shift) * scale)`.
    pub value: i64,
}

/// Sum of all SHIFT effectors.
pub fn total_shift<'a>(effectors: impl IntoIterator<Item = &'a Effector>) -> Decimal {
    effectors
        .into_iter()
        .filter(|e| e.kind == EffectorKind::Shift)
        .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.value))
}

/// Product of all SCALE effectors.
pub fn total_scale<'a>(effectors: impl IntoIterator<Item = &'a Effector>) -> Decimal {
    effectors
        .into_iter()
        .filter(|e| e.kind == EffectorKind::Scale)
        .fold(Decimal::ONE, |acc, e| acc.saturating_mul(e.value))
}

/// Apply the composition law to `base`.
pub fn compose(base: i64, effectors: &[Effector]) -> Composition {
    let shift = total_shift(effectors);
    let scale = total_scale(effectors);
    let raw = Decimal::from(base).saturating_add(shift).saturating_mul(scale);
    Composition {
        shift,
        scale,
        value: floor_to_i64(raw),
    }
}

/// Floor a decimal into an `i64`, saturating at the bounds.
pub fn floor_to_i64(value: Decimal) -> i64 {
    let floored = value.floor();
    floored.to_i64().unwrap_or(if floored.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

// ---------------------------------------------------------------------------
// Effector sets
// ---------------------------------------------------------------------------

/// Effectors gathered for one action, split by the value they modify.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectorSet {
    /// Modifiers on the result roll.
    pub roll: Vec<Effector>,
    /// Modifiers on damage magnitude.
    pub potency: Vec<Effector>,
    /// Modifiers on projectile range.
    pub range: Vec<Effector>,
}

impl EffectorSet {
    /// Add an effector to the channel it targets.
    pub fn push(&mut self, channel: EffectorChannel, effector: Effector) {
        match channel {
            EffectorChannel::Roll => self.roll.push(effector),
            EffectorChannel::Potency => self.potency.push(effector),
            EffectorChannel::Range => self.range.push(effector),
        }
    }

    /// Add every channel effector.
    pub fn extend<'a>(&mut self, effectors: impl IntoIterator<Item = &'a ChannelEffector>) {
        for bound in effectors {
            self.push(bound.channel, bound.effector.clone());
        }
    }

    /// Effectors for one channel.
    pub fn channel(&self, channel: EffectorChannel) -> &[Effector] {
        match channel {
            EffectorChannel::Roll => &self.roll,
            EffectorChannel::Potency => &self.potency,
            EffectorChannel::Range => &self.range,
        }
    }

    /// Whether no channel has any effector.
    pub fn is_empty(&self) -> bool {
        self.roll.is_empty() && self.potency.is_empty() && self.range.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Effectors granted by tags (item tags, capability tags, statuses).
///
/// Built once from configuration and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectorRegistry {
    by_tag: BTreeMap<String, Vec<ChannelEffector>>,
}

impl EffectorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effector for a tag. Tags are case-insensitive.
    #[must_use]
    pub fn with(mut self, tag: &str, channel: EffectorChannel, effector: Effector) -> Self {
        self.by_tag
            .entry(tag.to_ascii_lowercase())
            .or_default()
            .push(ChannelEffector { channel, effector });
        self
    }

    /// Effectors registered for a tag.
    pub fn for_tag(&self, tag: &str) -> &[ChannelEffector] {
        self.by_tag
            .get(&tag.to_ascii_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Collect the effectors for every tag into a set.
    pub fn collect<'a>(&self, tags: impl IntoIterator<Item = &'a str>) -> EffectorSet {
        let mut set = EffectorSet::default();
        for tag in tags {
            set.extend(self.for_tag(tag));
        }
        set
    }

    /// Number of tags with registered effectors.
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// Whether no tag has effectors.
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

/// Registry with the stock item tags.
///
/// `aerodynamic` projectiles fly half again as far, `unbalanced` ones half
/// as far. `masterwork` tools add one to the attack roll, `heavy` ones one
/// to damage.
pub fn standard_effectors() -> EffectorRegistry {
    EffectorRegistry::new()
        .with(
            "aerodynamic",
            EffectorChannel::Range,
            Effector::scale(Decimal::new(15, 1), "aerodynamic"),
        )
        .with(
            "unbalanced",
            EffectorChannel::Range,
            Effector::scale(Decimal::new(5, 1), "unbalanced"),
        )
        .with(
            "masterwork",
            EffectorChannel::Roll,
            Effector::shift(1, "masterwork"),
        )
        .with("heavy", EffectorChannel::Potency, Effector::shift(1, "heavy"))
}
