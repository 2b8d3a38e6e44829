//! Static level geometry supplied once when the board is constructed.
//!
//! Positions are expressed in world space exactly as the scene graph reports
//! them, including any floating point noise introduced by rotating quadrant
//! tiles. [`crate::World::new`] snaps everything onto the board lattice and
//! rejects geometry that does not fit.

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;
use rand::{seq::SliceRandom, Rng};
use ricochet_core::{round_world, DEFAULT_BOARD_WIDTH, MAX_BOARD_WIDTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scene container that owns a wall mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallContainer {
    /// Two-sided wall wrapped around a target corner.
    Corner,
    /// Single wall sticking inward from the board edge.
    Side,
    /// Any other container; its walls are purely cosmetic.
    #[serde(other)]
    Decorative,
}

impl WallContainer {
    /// Reports whether walls inside this container block robots.
    #[must_use]
    pub const fn is_obstacle(self) -> bool {
        matches!(self, Self::Corner | Self::Side)
    }
}

/// Wall mesh attached to one edge of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    /// Container the wall was found in.
    pub container: WallContainer,
    /// World-space centre of the wall.
    pub position: DVec2,
}

impl WallSegment {
    /// Creates a new wall segment.
    #[must_use]
    pub const fn new(container: WallContainer, position: DVec2) -> Self {
        Self {
            container,
            position,
        }
    }
}

/// Named goal marker placed on a cell centre.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetMarker {
    /// Unique marker name, e.g. `red_moon`.
    pub name: String,
    /// World-space centre of the marker.
    pub position: DVec2,
}

impl TargetMarker {
    /// Creates a new target marker.
    #[must_use]
    pub fn new(name: impl Into<String>, position: DVec2) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Complete level description in board world space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelGeometry {
    /// Number of cells along each board edge.
    #[serde(default = "default_board_width")]
    pub width: u32,
    /// Wall meshes found in the scene.
    #[serde(default)]
    pub walls: Vec<WallSegment>,
    /// Target markers found in the scene.
    #[serde(default)]
    pub targets: Vec<TargetMarker>,
}

impl LevelGeometry {
    /// A board of `width` cells without walls or targets.
    #[must_use]
    pub fn empty(width: u32) -> Self {
        Self {
            width,
            walls: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Shuffles the four quadrant tiles and assembles them into a board.
    pub fn from_quadrants<R>(mut tiles: [QuadrantTile; 4], rng: &mut R) -> Result<Self, LevelError>
    where
        R: Rng + ?Sized,
    {
        tiles.shuffle(rng);
        Self::from_ordered_quadrants(&tiles)
    }

    /// Assembles four quadrant tiles in the provided order.
    ///
    /// Tile `i` is turned `i` quarter turns about the vertical axis and moved
    /// to the centre of quadrant `i`, which keeps every tile's local
    /// `(-w/2, -w/2)` corner on the board centre.
    pub fn from_ordered_quadrants(tiles: &[QuadrantTile; 4]) -> Result<Self, LevelError> {
        let tile_width = tiles[0].width;
        if let Some(other) = tiles.iter().find(|tile| tile.width != tile_width) {
            return Err(LevelError::MismatchedQuadrants {
                first: tile_width,
                other: other.width,
            });
        }

        let mut level = Self::empty(tile_width.saturating_mul(2));
        let offset = f64::from(tile_width) / 2.0;
        for (index, tile) in tiles.iter().enumerate() {
            let quarter_turns = index as f64;
            let translation = match index {
                0 => DVec2::new(offset, offset),
                1 => DVec2::new(offset, -offset),
                2 => DVec2::new(-offset, -offset),
                _ => DVec2::new(-offset, offset),
            };
            let place = |local: DVec2| {
                let turned = rotate_about_vertical(local, quarter_turns * FRAC_PI_2) + translation;
                DVec2::new(round_world(turned.x), round_world(turned.y))
            };

            for wall in &tile.walls {
                let placed = WallSegment::new(wall.container, place(wall.position));
                level.walls.push(placed);
            }
            for target in &tile.targets {
                let placed = TargetMarker::new(target.name.clone(), place(target.position));
                level.targets.push(placed);
            }
        }

        Ok(level)
    }
}

/// One quarter of the board in tile-local coordinates.
///
/// The tile spans `[-w/2, w/2]` on both axes; its `(-w/2, -w/2)` corner ends
/// up on the board centre once assembled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadrantTile {
    /// Number of cells along each tile edge.
    #[serde(default = "default_tile_width")]
    pub width: u32,
    /// Wall meshes in tile-local space.
    #[serde(default)]
    pub walls: Vec<WallSegment>,
    /// Target markers in tile-local space.
    #[serde(default)]
    pub targets: Vec<TargetMarker>,
}

/// Errors raised while turning level geometry into a board.
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    /// The board needs an even, non-zero width so the centre quadrant exists,
    /// and no more than [`MAX_BOARD_WIDTH`] cells per edge.
    #[error("board width {width} must be even and in 2..={}", MAX_BOARD_WIDTH)]
    InvalidWidth {
        /// Width found in the level.
        width: u32,
    },
    /// A blocking wall is not on the half-cell lattice of the board.
    #[error("wall at ({x}, {y}) does not sit on the board lattice")]
    WallOffLattice {
        /// World-space x coordinate of the wall.
        x: f64,
        /// World-space y coordinate of the wall.
        y: f64,
    },
    /// A blocking wall sits on a cell centre or on a corner between cells.
    #[error("wall at ({x}, {y}) does not separate two neighbouring cells")]
    WallNotOnEdge {
        /// World-space x coordinate of the wall.
        x: f64,
        /// World-space y coordinate of the wall.
        y: f64,
    },
    /// A target marker is not centred on a board cell.
    #[error("target `{name}` at ({x}, {y}) is not centred on a board cell")]
    TargetOffCell {
        /// Marker name.
        name: String,
        /// World-space x coordinate of the marker.
        x: f64,
        /// World-space y coordinate of the marker.
        y: f64,
    },
    /// Two target markers share a name.
    #[error("target `{name}` is declared more than once")]
    DuplicateTarget {
        /// Repeated marker name.
        name: String,
    },
    /// Quadrant tiles disagree on their width.
    #[error("quadrant tiles must share one width, found {first} and {other}")]
    MismatchedQuadrants {
        /// Width of the first tile.
        first: u32,
        /// First width that differed.
        other: u32,
    },
}

/// Rotates a ground-plane point about the vertical axis.
///
/// The ground plane is `(x, z)` in scene space, stored here as `(x, y)`.
fn rotate_about_vertical(point: DVec2, angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    DVec2::new(
        point.x * cos + point.y * sin,
        -point.x * sin + point.y * cos,
    )
}

const fn default_board_width() -> u32 {
    DEFAULT_BOARD_WIDTH
}

const fn default_tile_width() -> u32 {
    DEFAULT_BOARD_WIDTH / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn tile_with_corner_marker(name: &str) -> QuadrantTile {
        let wall = WallSegment::new(WallContainer::Side, DVec2::new(-3.0, -3.5));
        QuadrantTile {
            width: 8,
            walls: vec![wall],
            targets: vec![TargetMarker::new(name, DVec2::new(-3.5, -3.5))],
        }
    }

    #[test]
    fn quadrant_corners_meet_at_board_centre() {
        let tiles = [
            tile_with_corner_marker("a"),
            tile_with_corner_marker("b"),
            tile_with_corner_marker("c"),
            tile_with_corner_marker("d"),
        ];
        let level = LevelGeometry::from_ordered_quadrants(&tiles).expect("tiles match");

        assert_eq!(level.width, 16);
        let positions: Vec<DVec2> = level.targets.iter().map(|t| t.position).collect();
        assert_eq!(
            positions,
            vec![
                DVec2::new(0.5, 0.5),
                DVec2::new(0.5, -0.5),
                DVec2::new(-0.5, -0.5),
                DVec2::new(-0.5, 0.5),
            ]
        );
    }

    #[test]
    fn rotated_walls_snap_to_exact_values() {
        let tiles = [
            tile_with_corner_marker("a"),
            tile_with_corner_marker("b"),
            tile_with_corner_marker("c"),
            tile_with_corner_marker("d"),
        ];
        let level = LevelGeometry::from_ordered_quadrants(&tiles).expect("tiles match");
        let walls: Vec<DVec2> = level.walls.iter().map(|w| w.position).collect();

        assert_eq!(
            walls,
            vec![
                DVec2::new(1.0, 0.5),
                DVec2::new(0.5, -1.0),
                DVec2::new(-1.0, -0.5),
                DVec2::new(-0.5, 1.0),
            ]
        );
    }

    #[test]
    fn shuffled_assembly_keeps_every_tile() {
        let tiles = [
            tile_with_corner_marker("a"),
            tile_with_corner_marker("b"),
            tile_with_corner_marker("c"),
            tile_with_corner_marker("d"),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let level = LevelGeometry::from_quadrants(tiles, &mut rng).expect("tiles match");
        let mut names: Vec<&str> = level.targets.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();

        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn mismatched_quadrants_are_rejected() {
        let mut odd = tile_with_corner_marker("d");
        odd.width = 6;
        let tiles = [
            tile_with_corner_marker("a"),
            tile_with_corner_marker("b"),
            tile_with_corner_marker("c"),
            odd,
        ];

        assert_eq!(
            LevelGeometry::from_ordered_quadrants(&tiles),
            Err(LevelError::MismatchedQuadrants { first: 8, other: 6 })
        );
    }

    #[test]
    fn unknown_containers_deserialize_as_decorative() {
        let json = r#"{ "container": "lamp_post", "position": [0.0, 0.5] }"#;
        let wall: WallSegment = serde_json::from_str(json).expect("valid wall");

        assert_eq!(wall.container, WallContainer::Decorative);
        assert!(!wall.container.is_obstacle());
    }
}
