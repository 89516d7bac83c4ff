//! Dice rolling behind a small trait.
//!
//! Everything random in resolution goes through [`DiceRoller`]: the natural
//! result die, damage dice, and the direction a missed projectile scatters.
//! Production code wraps a [`rand::Rng`] in [`RngRoller`]; tests script the
//! exact faces with [`ScriptedRoller`].

use std::collections::VecDeque;
use std::f64::consts::TAU;

use rand::Rng;

use witness_types::DamageDice;

use crate::error::RulesError;

/// Faces on the standard result die.
pub const RESULT_DIE: u32 = 20;

/// Source of random outcomes for resolution.
pub trait DiceRoller: Send {
    /// Roll one die with `sides` faces, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> Result<u32, RulesError>;

    /// A uniformly random direction, in radians in `[0, 2π)`.
    fn direction(&mut self) -> Result<f64, RulesError>;
}

/// A [`DiceRoller`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngRoller<R> {
    rng: R,
}

impl<R: Rng> RngRoller<R> {
    /// Wrap an RNG.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> DiceRoller for RngRoller<R> {
    fn roll_die(&mut self, sides: u32) -> Result<u32, RulesError> {
        if sides == 0 {
            return Err(RulesError::InvalidDie(sides));
        }
        Ok(self.rng.random_range(1..=sides))
    }

    fn direction(&mut self) -> Result<f64, RulesError> {
        Ok(self.rng.random_range(0.0..TAU))
    }
}

/// A roller that replays fixed values, for deterministic tests and replays.
///
/// Die rolls and directions come from separate queues. Running out of
/// either is an error rather than a silent default.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    rolls: VecDeque<u32>,
    directions: VecDeque<f64>,
}

impl ScriptedRoller {
    /// A roller that yields the given die faces in order.
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            directions: VecDeque::new(),
        }
    }

    /// Queue scatter directions (radians).
    #[must_use]
    pub fn with_directions(mut self, directions: impl IntoIterator<Item = f64>) -> Self {
        self.directions.extend(directions);
        self
    }

    /// Die faces not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceRoller for ScriptedRoller {
    fn roll_die(&mut self, sides: u32) -> Result<u32, RulesError> {
        if sides == 0 {
            return Err(RulesError::InvalidDie(sides));
        }
        let face = self.rolls.pop_front().ok_or(RulesError::ScriptExhausted)?;
        Ok(face.clamp(1, sides))
    }

    fn direction(&mut self) -> Result<f64, RulesError> {
        self.directions
            .pop_front()
            .ok_or(RulesError::ScriptExhausted)
    }
}

/// Roll a damage expression, returning the total.
pub fn roll_damage(dice: DamageDice, roller: &mut dyn DiceRoller) -> Result<u32, RulesError> {
    match dice {
        DamageDice::Flat { amount } => Ok(amount),
        DamageDice::Dice { count, sides } => {
            let mut total: u32 = 0;
            for _ in 0..count {
                total = total.saturating_add(roller.roll_die(sides)?);
            }
            Ok(total)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn rng_roller_stays_in_bounds() {
        let mut roller = RngRoller::new(SmallRng::seed_from_u64(42));
        for _ in 0..500 {
            let face = roller.roll_die(RESULT_DIE).unwrap();
            assert!((1..=RESULT_DIE).contains(&face));
            let angle = roller.direction().unwrap();
            assert!((0.0..TAU).contains(&angle));
        }
    }

    #[test]
    fn seeded_rollers_agree() {
        let mut a = RngRoller::new(SmallRng::seed_from_u64(7));
        let mut b = RngRoller::new(SmallRng::seed_from_u64(7));
        let xs: Vec<u32> = (0..20).map(|_| a.roll_die(6).unwrap()).collect();
        let ys: Vec<u32> = (0..20).map(|_| b.roll_die(6).unwrap()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn zero_sided_die_is_rejected() {
        let mut roller = RngRoller::new(SmallRng::seed_from_u64(1));
        assert_eq!(roller.roll_die(0), Err(RulesError::InvalidDie(0)));
    }

    #[test]
    fn scripted_roller_replays_then_errors() {
        let mut roller = ScriptedRoller::new([3, 25]).with_directions([1.5]);
        assert_eq!(roller.roll_die(20).unwrap(), 3);
        // Out-of-range faces are clamped to the die.
        assert_eq!(roller.roll_die(20).unwrap(), 20);
        assert_eq!(roller.roll_die(20), Err(RulesError::ScriptExhausted));
        assert!((roller.direction().unwrap() - 1.5).abs() < f64::EPSILON);
        assert_eq!(roller.direction(), Err(RulesError::ScriptExhausted));
    }

    #[test]
    fn damage_rolls_sum_dice() {
        let mut roller = ScriptedRoller::new([2, 4]);
        let total = roll_damage(DamageDice::Dice { count: 2, sides: 4 }, &mut roller).unwrap();
        assert_eq!(total, 6);
        assert_eq!(roller.remaining(), 0);

        let flat = roll_damage(DamageDice::Flat { amount: 1 }, &mut roller).unwrap();
        assert_eq!(flat, 1);
    }
}
