//! How clearly an observer perceives something at a distance.
//!
//! Sense strength lives on the abstract MAG scale. A fixed table turns a
//! distance magnitude into tiles; an observer's sense magnitude, adjusted for
//! the sense type, walls, and the size of what is observed, gives the
//! largest magnitude at which it still sees clearly. Each step past that
//! costs one clarity band.

use witness_types::{Clarity, Obstruction, Sense, SenseMagnitudes};

/// Smallest magnitude in the distance table.
pub const MIN_DISTANCE_MAG: i32 = -2;

/// Largest magnitude in the distance table.
pub const MAX_DISTANCE_MAG: i32 = 7;

/// Tiles per distance magnitude, from `-2` through `7`.
const DISTANCE_TABLE: [u32; 10] = [0, 1, 1, 1, 3, 5, 10, 30, 100, 300];

/// Tile distance for a magnitude. Magnitudes outside `-2..=7` clamp to the
/// nearest end of the table.
pub fn tiles_for_magnitude(magnitude: i32) -> u32 {
    let clamped = magnitude.clamp(MIN_DISTANCE_MAG, MAX_DISTANCE_MAG);
    let index = usize::try_from(clamped.saturating_sub(MIN_DISTANCE_MAG)).unwrap_or(0);
    DISTANCE_TABLE.get(index).copied().unwrap_or(0)
}

/// Largest distance magnitude at which `sense` perceives clearly.
///
/// Light gets `+2`, pressure and aroma `+1`. Thaumic sense loses one per
/// thin wall and two per thick wall crossed. Larger subjects are easier to
/// perceive, so a positive `size_mag` is added on top. Light cannot cross
/// walls at all and returns `None` when any wall is in the way.
pub fn max_clear_magnitude(
    sense: Sense,
    magnitude: i32,
    obstruction: Obstruction,
    size_mag: i32,
) -> Option<i32> {
    let walls = i32::try_from(
        u64::from(obstruction.thin_walls)
            .saturating_add(u64::from(obstruction.thick_walls).saturating_mul(2)),
    )
    .unwrap_or(i32::MAX);
    let adjusted = match sense {
        Sense::Light if obstruction.is_blocked() => return None,
        Sense::Light => magnitude.saturating_add(2),
        Sense::Pressure | Sense::Aroma => magnitude.saturating_add(1),
        Sense::Thaumic => magnitude.saturating_sub(walls),
    };
    Some(adjusted.saturating_add(size_mag.max(0)))
}

/// Clarity at `distance` tiles for a given max-clear magnitude.
pub fn clarity_at(distance: f64, max_clear: i32) -> Clarity {
    let within = |mag: i32| distance <= f64::from(tiles_for_magnitude(mag));
    if within(max_clear) {
        Clarity::Clear
    } else if within(max_clear.saturating_add(1)) {
        Clarity::Vague
    } else if within(max_clear.saturating_add(2)) {
        Clarity::Obscured
    } else {
        Clarity::None
    }
}

/// What an observer sees of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenseReading {
    /// The sense used.
    pub sense: Sense,
    /// How clearly.
    pub clarity: Clarity,
}

/// Clarity through one sense.
pub fn sense_clarity(
    sense: Sense,
    senses: &SenseMagnitudes,
    distance: f64,
    obstruction: Obstruction,
    size_mag: i32,
) -> Clarity {
    max_clear_magnitude(sense, senses.get(sense), obstruction, size_mag)
        .map_or(Clarity::None, |max_clear| clarity_at(distance, max_clear))
}

/// The best of `candidates` for perceiving a subject.
///
/// Highest clarity wins; ties go to the sense earliest in
/// [`Sense::ALL`] order. Returns `None` when no candidate perceives
/// anything.
pub fn best_sense(
    candidates: impl IntoIterator<Item = Sense>,
    senses: &SenseMagnitudes,
    distance: f64,
    obstruction: Obstruction,
    size_mag: i32,
) -> Option<SenseReading> {
    let mut best: Option<SenseReading> = None;
    for sense in candidates {
        let clarity = sense_clarity(sense, senses, distance, obstruction, size_mag);
        if !clarity.is_perceived() {
            continue;
        }
        let better = best.is_none_or(|current| {
            clarity > current.clarity || (clarity == current.clarity && sense < current.sense)
        });
        if better {
            best = Some(SenseReading { sense, clarity });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn senses(light: i32, pressure: i32, aroma: i32, thaumic: i32) -> SenseMagnitudes {
        SenseMagnitudes {
            light,
            pressure,
            aroma,
            thaumic,
        }
    }

    #[test]
    fn table_values_and_clamping() {
        let expected = [
            (-2, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
            (2, 3),
            (3, 5),
            (4, 10),
            (5, 30),
            (6, 100),
            (7, 300),
        ];
        for (mag, tiles) in expected {
            assert_eq!(tiles_for_magnitude(mag), tiles, "mag={mag}");
        }
        assert_eq!(tiles_for_magnitude(-9), 0);
        assert_eq!(tiles_for_magnitude(12), 300);
    }

    #[test]
    fn per_sense_adjustment() {
        let open = Obstruction::NONE;
        assert_eq!(max_clear_magnitude(Sense::Light, 3, open, 0), Some(5));
        assert_eq!(max_clear_magnitude(Sense::Pressure, 3, open, 0), Some(4));
        assert_eq!(max_clear_magnitude(Sense::Aroma, 3, open, -4), Some(4));
        assert_eq!(max_clear_magnitude(Sense::Thaumic, 3, open, 1), Some(4));
    }

    #[test]
    fn walls_weaken_thaumic_and_block_light() {
        let walls = Obstruction {
            thin_walls: 1,
            thick_walls: 2,
        };
        assert_eq!(max_clear_magnitude(Sense::Thaumic, 6, walls, 0), Some(1));
        assert_eq!(max_clear_magnitude(Sense::Light, 6, walls, 0), None);
        // Pressure passes walls unchanged.
        assert_eq!(max_clear_magnitude(Sense::Pressure, 6, walls, 0), Some(7));
    }

    #[test]
    fn large_target_seen_clearly_far_away() {
        // light 3 + 2 + size 2 = 7 -> 300 tiles
        let max = max_clear_magnitude(Sense::Light, 3, Obstruction::NONE, 2);
        assert_eq!(max, Some(7));
        assert_eq!(clarity_at(8.0, 7), Clarity::Clear);
    }

    #[test]
    fn bands_step_down() {
        // max 3: clear <= 5, vague <= 10, obscured <= 30
        assert_eq!(clarity_at(5.0, 3), Clarity::Clear);
        assert_eq!(clarity_at(5.5, 3), Clarity::Vague);
        assert_eq!(clarity_at(10.0, 3), Clarity::Vague);
        assert_eq!(clarity_at(29.0, 3), Clarity::Obscured);
        assert_eq!(clarity_at(31.0, 3), Clarity::None);
    }

    #[test]
    fn clarity_non_increasing_with_distance() {
        for max_clear in -4..=9 {
            let mut previous = Clarity::Clear;
            for step in 0..=700 {
                let d = f64::from(step) * 0.5;
                let now = clarity_at(d, max_clear);
                assert!(now <= previous, "max={max_clear} d={d}");
                previous = now;
            }
        }
    }

    #[test]
    fn best_sense_prefers_clarity_then_order() {
        let s = senses(3, 3, 1, 0);
        // At 8 tiles light (mag 5, 30 tiles) is clear; pressure (mag 4, 10) too.
        let reading = best_sense(Sense::ALL, &s, 8.0, Obstruction::NONE, 0);
        assert_eq!(
            reading,
            Some(SenseReading {
                sense: Sense::Light,
                clarity: Clarity::Clear
            })
        );

        // Behind a wall light is gone; pressure takes over.
        let wall = Obstruction {
            thin_walls: 1,
            thick_walls: 0,
        };
        let reading = best_sense(Sense::ALL, &s, 8.0, wall, 0);
        assert_eq!(reading.map(|r| r.sense), Some(Sense::Pressure));
    }

    #[test]
    fn best_sense_none_when_nothing_perceived() {
        let s = senses(0, 0, 0, 0);
        assert_eq!(
            best_sense([Sense::Aroma], &s, 500.0, Obstruction::NONE, 0),
            None
        );
    }
}
