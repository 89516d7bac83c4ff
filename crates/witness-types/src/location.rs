//! World positions and distance.
//!
//! A [`Location`] is a tile inside a region inside a world cell. Distances
//! between tiles of the same region are exact Euclidean tile distances.
//! Distances across regions fall back to an approximate metric computed on
//! absolute tile coordinates.

use serde::{Deserialize, Serialize};

/// Tiles along one edge of a region.
pub const TILES_PER_REGION: i64 = 64;

/// Regions along one edge of a world cell.
pub const REGIONS_PER_WORLD: i64 = 16;

/// A tile position in the world. Immutable value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    /// World cell X.
    pub world_x: i32,
    /// World cell Y.
    pub world_y: i32,
    /// Region X within the world cell.
    pub region_x: i32,
    /// Region Y within the world cell.
    pub region_y: i32,
    /// Tile X within the region.
    pub x: i32,
    /// Tile Y within the region.
    pub y: i32,
    /// Optional named place (building, room) the tile belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

impl Location {
    /// A tile in world cell (0, 0), region (0, 0).
    pub const fn tile(x: i32, y: i32) -> Self {
        Self {
            world_x: 0,
            world_y: 0,
            region_x: 0,
            region_y: 0,
            x,
            y,
            place: None,
        }
    }

    /// The same location moved to another tile in the same region.
    #[must_use]
    pub fn with_tile(&self, x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..self.clone()
        }
    }

    /// The same location tagged with a named place.
    #[must_use]
    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    /// Whether tile distances to `other` are exact.
    pub const fn same_region(&self, other: &Self) -> bool {
        self.world_x == other.world_x
            && self.world_y == other.world_y
            && self.region_x == other.region_x
            && self.region_y == other.region_y
    }

    /// Distance to `other` in tiles.
    ///
    /// Exact within a region. Across regions the tiles are projected onto
    /// absolute coordinates, which ignores any terrain between regions.
    #[allow(clippy::cast_precision_loss)] // Tile spans stay far below 2^52.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let (dx, dy) = if self.same_region(other) {
            (
                i64::from(other.x).saturating_sub(i64::from(self.x)),
                i64::from(other.y).saturating_sub(i64::from(self.y)),
            )
        } else {
            let (ax, ay) = self.absolute();
            let (bx, by) = other.absolute();
            (bx.saturating_sub(ax), by.saturating_sub(ay))
        };
        (dx as f64).hypot(dy as f64)
    }

    /// Absolute tile coordinates across world and region boundaries.
    fn absolute(&self) -> (i64, i64) {
        let axis = |world: i32, region: i32, tile: i32| {
            i64::from(world)
                .saturating_mul(REGIONS_PER_WORLD)
                .saturating_add(i64::from(region))
                .saturating_mul(TILES_PER_REGION)
                .saturating_add(i64::from(tile))
        };
        (
            axis(self.world_x, self.region_x, self.x),
            axis(self.world_y, self.region_y, self.y),
        )
    }

    /// Offset this tile by whole tiles, staying in the same region record.
    #[must_use]
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        self.with_tile(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "({},{})/({},{})/({},{})",
            self.world_x, self.world_y, self.region_x, self.region_y, self.x, self.y
        )?;
        if let Some(place) = &self.place {
            write!(f, " [{place}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn same_region_distance_is_euclidean() {
        let a = Location::tile(0, 0);
        let b = Location::tile(3, 4);
        assert!(a.same_region(&b));
        assert!(close(a.distance_to(&b), 5.0));
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Location::tile(2, 7);
        let b = Location::tile(-1, 3);
        assert!(close(a.distance_to(&b), b.distance_to(&a)));
    }

    #[test]
    fn cross_region_distance_uses_absolute_tiles() {
        let a = Location::tile(63, 0);
        let mut b = Location::tile(0, 0);
        b.region_x = 1;
        assert!(!a.same_region(&b));
        // Tile 63 of region 0 sits right next to tile 0 of region 1.
        assert!(close(a.distance_to(&b), 1.0));
    }

    #[test]
    fn place_does_not_affect_distance() {
        let a = Location::tile(1, 1).with_place("tavern");
        let b = Location::tile(1, 2);
        assert!(close(a.distance_to(&b), 1.0));
    }

    #[test]
    fn display_includes_place() {
        let loc = Location::tile(1, 2).with_place("forge");
        assert_eq!(loc.to_string(), "(0,0)/(0,0)/(1,2) [forge]");
    }
}
