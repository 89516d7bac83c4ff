//! Roll, potency, and effector records.
//!
//! These are plain data. The arithmetic that produces them lives in
//! `witness-rules`; results are recorded here so that effects and action
//! results can carry exactly what was rolled.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{EffectorChannel, EffectorKind};

/// A named modifier applied to a roll, damage, or range value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effector {
    /// Additive or multiplicative.
    pub kind: EffectorKind,
    /// Amount to add, or factor to multiply by.
    pub value: Decimal,
    /// What granted the modifier (item tag, status, spell).
    pub source: String,
}

impl Effector {
    /// An additive modifier.
    pub fn shift(value: impl Into<Decimal>, source: impl Into<String>) -> Self {
        Self {
            kind: EffectorKind::Shift,
            value: value.into(),
            source: source.into(),
        }
    }

    /// A multiplicative modifier.
    pub fn scale(value: impl Into<Decimal>, source: impl Into<String>) -> Self {
        Self {
            kind: EffectorKind::Scale,
            value: value.into(),
            source: source.into(),
        }
    }
}

/// An effector bound to the value it modifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEffector {
    /// Which value the effector modifies.
    pub channel: EffectorChannel,
    /// The modifier itself.
    #[serde(flatten)]
    pub effector: Effector,
}

/// Outcome of a result roll against a CR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// Natural die faces rolled.
    pub natural: Vec<u32>,
    /// Proficiency bonus added.
    pub proficiency: i64,
    /// Stat bonus added.
    pub stat_bonus: i64,
    /// Sum of SHIFT effectors applied.
    pub shift: Decimal,
    /// Product of SCALE effectors applied.
    pub scale: Decimal,
    /// Final total after composition.
    pub total: i64,
    /// Challenge rating the total was compared against.
    pub cr: i64,
    /// Whether `total >= cr`.
    pub success: bool,
    /// `total - cr`; negative on failure.
    pub margin: i64,
}

impl RollResult {
    /// How far the roll fell short, 0 on success.
    pub const fn miss_by(&self) -> u64 {
        if self.success {
            0
        } else {
            self.margin.unsigned_abs()
        }
    }
}

/// A damage expression produced from a magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DamageDice {
    /// A flat amount, no dice.
    Flat {
        /// The fixed amount.
        amount: u32,
    },
    /// `count` dice with `sides` faces each.
    Dice {
        /// Number of dice.
        count: u32,
        /// Faces per die.
        sides: u32,
    },
}

impl fmt::Display for DamageDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat { amount } => write!(f, "{amount}"),
            Self::Dice { count, sides } => write!(f, "{count}d{sides}"),
        }
    }
}

/// Outcome of a potency (magnitude) roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotencyResult {
    /// Magnitude before effectors.
    pub base: i64,
    /// Sum of SHIFT effectors applied.
    pub shift: Decimal,
    /// Product of SCALE effectors applied.
    pub scale: Decimal,
    /// Magnitude after composition.
    pub magnitude: i64,
    /// Damage expression for the magnitude.
    pub dice: DamageDice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dice_display() {
        assert_eq!(DamageDice::Flat { amount: 1 }.to_string(), "1");
        assert_eq!(DamageDice::Dice { count: 2, sides: 4 }.to_string(), "2d4");
    }

    #[test]
    fn miss_by_is_zero_on_success() {
        let roll = RollResult {
            natural: vec![15],
            proficiency: 0,
            stat_bonus: 0,
            shift: Decimal::ZERO,
            scale: Decimal::ONE,
            total: 15,
            cr: 10,
            success: true,
            margin: 5,
        };
        assert_eq!(roll.miss_by(), 0);
        let missed = RollResult {
            total: 8,
            success: false,
            margin: -2,
            ..roll
        };
        assert_eq!(missed.miss_by(), 2);
    }

    #[test]
    fn effector_constructors_set_kind() {
        assert_eq!(Effector::shift(2, "rage").kind, EffectorKind::Shift);
        assert_eq!(Effector::scale(2, "crit").kind, EffectorKind::Scale);
    }
}
