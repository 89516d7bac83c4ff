//! Result rolls, challenge ratings, and potency.
//!
//! A result roll adds the natural die, proficiency, and stat bonus, then
//! runs the sum through the effector composition law. Potency does the same
//! for a damage magnitude and maps the composed magnitude to dice through a
//! fixed step table.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::debug;

use witness_types::{
    ActionIntent, ActionKind, DamageDice, Effector, PotencyResult, RollResult, params,
};

use crate::dice::DiceRoller;
use crate::effector::compose;
use crate::error::RulesError;

/// CR used when neither the definition nor the intent supplies one.
pub const DEFAULT_CR: i64 = 10;

// ---------------------------------------------------------------------------
// Result roll
// ---------------------------------------------------------------------------

/// Everything that feeds a result roll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollContext {
    /// Natural die faces.
    pub natural: Vec<u32>,
    /// Proficiency bonus.
    pub proficiency: i64,
    /// Stat bonus.
    pub stat_bonus: i64,
    /// Roll-channel effectors.
    pub effectors: Vec<Effector>,
}

impl RollContext {
    /// Roll one die of `sides` faces and attach the bonuses.
    pub fn roll(
        roller: &mut dyn DiceRoller,
        sides: u32,
        proficiency: i64,
        stat_bonus: i64,
        effectors: Vec<Effector>,
    ) -> Result<Self, RulesError> {
        let face = roller.roll_die(sides)?;
        Ok(Self {
            natural: vec![face],
            proficiency,
            stat_bonus,
            effectors,
        })
    }

    /// Sum of the natural faces.
    pub fn natural_total(&self) -> i64 {
        self.natural
            .iter()
            .fold(0_i64, |acc, &face| acc.saturating_add(i64::from(face)))
    }
}

/// Resolve a result roll against `cr`.
pub fn perform_result_roll(ctx: &RollContext, cr: i64) -> RollResult {
    let base = ctx
        .natural_total()
        .saturating_add(ctx.proficiency)
        .saturating_add(ctx.stat_bonus);
    let composed = compose(base, &ctx.effectors);
    let total = composed.value;
    let success = total >= cr;
    let margin = total.saturating_sub(cr);
    debug!(
        natural = ?ctx.natural,
        proficiency = ctx.proficiency,
        stat_bonus = ctx.stat_bonus,
        total,
        cr,
        success,
        "result roll"
    );
    RollResult {
        natural: ctx.natural.clone(),
        proficiency: ctx.proficiency,
        stat_bonus: ctx.stat_bonus,
        shift: composed.shift,
        scale: composed.scale,
        total,
        cr,
        success,
        margin,
    }
}

// ---------------------------------------------------------------------------
// Challenge rating
// ---------------------------------------------------------------------------

/// Situational inputs to [`calculate_cr`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CrFactors {
    /// Distance to the target in tiles.
    pub distance: f64,
    /// Maximum reach of the attack; `None` disables distance scaling.
    pub max_range: Option<u32>,
    /// Target defense added to the base.
    pub target_defense: i64,
    /// Explicit override; wins over everything else.
    pub difficulty: Option<i64>,
}

/// Derive the effective CR.
///
/// An explicit `difficulty` is returned unchanged. Otherwise the base (or
/// [`DEFAULT_CR`]) plus target defense is scaled by
/// `1 + min(1, distance / max_range) / 2` and floored, so a shot at the
/// limit of its range is half again as hard.
pub fn calculate_cr(base: Option<i64>, factors: &CrFactors) -> i64 {
    if let Some(difficulty) = factors.difficulty {
        return difficulty;
    }
    let flat = base
        .unwrap_or(DEFAULT_CR)
        .saturating_add(factors.target_defense);
    let ratio = match factors.max_range {
        Some(max) if max > 0 && factors.distance > 0.0 => {
            Decimal::from_f64(factors.distance / f64::from(max))
                .unwrap_or(Decimal::ONE)
                .min(Decimal::ONE)
        }
        _ => Decimal::ZERO,
    };
    let factor = Decimal::ONE.saturating_add(ratio.saturating_mul(Decimal::new(5, 1)));
    compose(flat, &[Effector::scale(factor, "distance")]).value
}

// ---------------------------------------------------------------------------
// Potency
// ---------------------------------------------------------------------------

/// Map a magnitude to its damage expression.
///
/// The table is monotonic: `<=0 -> 1`, `1 -> 1d2`, `2 -> 1d4`, `3 -> 1d6`,
/// `4 -> 1d8`, `5 -> 2d4`, `6 -> 1d10`, above that `floor(mag / 2)d6`.
pub fn damage_dice(magnitude: i64) -> DamageDice {
    let dice = |count: u32, sides: u32| DamageDice::Dice { count, sides };
    match magnitude {
        i64::MIN..=0 => DamageDice::Flat { amount: 1 },
        1 => dice(1, 2),
        2 => dice(1, 4),
        3 => dice(1, 6),
        4 => dice(1, 8),
        5 => dice(2, 4),
        6 => dice(1, 10),
        _ => dice(u32::try_from(magnitude / 2).unwrap_or(u32::MAX), 6),
    }
}

/// Compose a base magnitude with potency effectors and pick its dice.
pub fn perform_potency_roll(base: i64, effectors: &[Effector]) -> PotencyResult {
    let composed = compose(base, effectors);
    PotencyResult {
        base,
        shift: composed.shift,
        scale: composed.scale,
        magnitude: composed.value,
        dice: damage_dice(composed.value),
    }
}

/// Whether resolving this intent needs a result roll.
///
/// `MOVE` only rolls when the intent carries a `difficulty` or sets
/// `requires_roll`; attacks always roll; everything else never does.
pub fn requires_result_roll(intent: &ActionIntent) -> bool {
    match intent.action {
        ActionKind::Move => {
            intent.params.contains_key(params::DIFFICULTY)
                || intent.param_flag(params::REQUIRES_ROLL)
        }
        ActionKind::Use(_) => true,
        ActionKind::Communicate(_) | ActionKind::Inspect | ActionKind::Templated(_) => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rust_decimal_macros::dec;
    use witness_types::{EntityId, UseMode};

    use super::*;
    use crate::dice::{RESULT_DIE, ScriptedRoller};

    #[test]
    fn dice_table_exact_for_low_magnitudes() {
        for mag in -5..=0 {
            assert_eq!(damage_dice(mag).to_string(), "1", "mag={mag}");
        }
        let expected = ["1d2", "1d4", "1d6", "1d8", "2d4", "1d10"];
        for (mag, want) in (1..=6).zip(expected) {
            assert_eq!(damage_dice(mag).to_string(), want, "mag={mag}");
        }
    }

    #[test]
    fn dice_table_halves_above_six() {
        assert_eq!(damage_dice(7).to_string(), "3d6");
        assert_eq!(damage_dice(8).to_string(), "4d6");
        assert_eq!(damage_dice(13).to_string(), "6d6");
        assert_eq!(damage_dice(40).to_string(), "20d6");
    }

    #[test]
    fn roll_sums_bonuses_before_effectors() {
        let ctx = RollContext {
            natural: vec![12],
            proficiency: 2,
            stat_bonus: 1,
            effectors: vec![Effector::scale(dec!(0.5), "blinded")],
        };
        let roll = perform_result_roll(&ctx, 7);
        // floor((12 + 2 + 1) * 0.5)
        assert_eq!(roll.total, 7);
        assert!(roll.success);
        assert_eq!(roll.margin, 0);
        assert_eq!(roll.scale, dec!(0.5));
    }

    #[test]
    fn hit_iff_total_meets_cr() {
        for natural in 1..=RESULT_DIE {
            let ctx = RollContext {
                natural: vec![natural],
                proficiency: 1,
                stat_bonus: 2,
                effectors: Vec::new(),
            };
            let roll = perform_result_roll(&ctx, 10);
            assert_eq!(roll.success, i64::from(natural) + 3 >= 10);
            assert_eq!(roll.margin, i64::from(natural) + 3 - 10);
        }
    }

    #[test]
    fn context_rolls_one_die() {
        let mut roller = ScriptedRoller::new([17]);
        let ctx = RollContext::roll(&mut roller, RESULT_DIE, 0, 0, Vec::new()).unwrap();
        assert_eq!(ctx.natural, vec![17]);
        assert_eq!(ctx.natural_total(), 17);
    }

    #[test]
    fn cr_defaults_to_ten() {
        assert_eq!(calculate_cr(None, &CrFactors::default()), DEFAULT_CR);
    }

    #[test]
    fn cr_difficulty_overrides() {
        let factors = CrFactors {
            distance: 30.0,
            max_range: Some(10),
            target_defense: 4,
            difficulty: Some(6),
        };
        assert_eq!(calculate_cr(Some(15), &factors), 6);
    }

    #[test]
    fn cr_scales_with_distance_ratio() {
        let mut factors = CrFactors {
            distance: 5.0,
            max_range: Some(10),
            target_defense: 2,
            difficulty: None,
        };
        // (10 + 2) * 1.25
        assert_eq!(calculate_cr(None, &factors), 15);
        // Ratio is capped at 1.
        factors.distance = 40.0;
        assert_eq!(calculate_cr(None, &factors), 18);
        // No range, no scaling.
        factors.max_range = None;
        assert_eq!(calculate_cr(None, &factors), 12);
    }

    #[test]
    fn potency_composes_then_maps() {
        let result = perform_potency_roll(3, &[]);
        assert_eq!(result.magnitude, 3);
        assert_eq!(result.dice.to_string(), "1d6");

        let boosted = perform_potency_roll(3, &[Effector::shift(2, "heavy")]);
        assert_eq!(boosted.magnitude, 5);
        assert_eq!(boosted.dice.to_string(), "2d4");
    }

    #[test]
    fn move_rolls_only_on_opt_in() {
        let actor = EntityId::new();
        let plain = ActionIntent::player(actor, ActionKind::Move);
        assert!(!requires_result_roll(&plain));

        let difficult = plain.clone().with_param(params::DIFFICULTY, 12);
        assert!(requires_result_roll(&difficult));

        let flagged = plain.with_param(params::REQUIRES_ROLL, true);
        assert!(requires_result_roll(&flagged));

        let strike = ActionIntent::player(actor, ActionKind::Use(UseMode::ImpactSingle));
        assert!(requires_result_roll(&strike));
        assert!(!requires_result_roll(&ActionIntent::player(actor, ActionKind::Inspect)));
    }
}
