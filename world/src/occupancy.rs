//! Per-cell passability derived from walls, the centre quadrant and robots.

use std::collections::HashSet;

use ricochet_core::{
    BoardGeometry, CellCoord, Direction, DirectionMask, LatticePoint, PassabilityMatrix,
};

/// Immutable obstacle layout of a board.
///
/// Robots are not stored here. Every query rebuilds the full matrix from
/// the static obstacles plus the robot cells it is given.
#[derive(Clone, Debug)]
pub(crate) struct Occupancy {
    geometry: BoardGeometry,
    obstacles: HashSet<LatticePoint>,
}

impl Occupancy {
    /// Captures the static obstacles: blocking walls plus the centre quadrant.
    pub(crate) fn new(
        geometry: BoardGeometry,
        walls: impl IntoIterator<Item = LatticePoint>,
    ) -> Self {
        let mut obstacles: HashSet<LatticePoint> = walls.into_iter().collect();
        obstacles.extend(geometry.center_quadrant().map(LatticePoint::cell_center));
        Self {
            geometry,
            obstacles,
        }
    }

    /// Builds the passability matrix with the provided robot cells as obstacles.
    ///
    /// Cells are scanned row-major. A cell inside the centre quadrant or
    /// sitting exactly on an obstacle is closed on every side; otherwise an
    /// edge closes when it is the board boundary or when an obstacle sits half
    /// a cell (a wall) or a full cell (a robot or the centre) away.
    pub(crate) fn matrix(&self, robots: impl IntoIterator<Item = CellCoord>) -> PassabilityMatrix {
        let mut obstacles = self.obstacles.clone();
        obstacles.extend(robots.into_iter().map(LatticePoint::cell_center));
        let blocked = |point: LatticePoint| obstacles.contains(&point);
        let width = self.geometry.width();

        let mut matrix = PassabilityMatrix::filled(self.geometry, DirectionMask::OPEN);
        for cell in self.geometry.cells() {
            let centre = LatticePoint::cell_center(cell);
            let mut mask = DirectionMask::OPEN;

            if self.geometry.is_center(cell) || blocked(centre) {
                mask = DirectionMask::BLOCKED;
            }

            for direction in Direction::ALL {
                let at_boundary = direction.step(cell, width).is_none();
                if at_boundary
                    || blocked(centre.toward(direction, 1))
                    || blocked(centre.toward(direction, 2))
                {
                    mask = mask.close(direction);
                }
            }

            matrix.set_mask(cell, mask);
        }

        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_board() -> Occupancy {
        Occupancy::new(BoardGeometry::default(), Vec::new())
    }

    #[test]
    fn boundary_bits_are_closed_on_every_edge() {
        let occupancy = empty_board();
        let matrix = occupancy.matrix(Vec::new());

        for index in 0..16 {
            let top = matrix.mask(CellCoord::new(index, 0));
            let bottom = matrix.mask(CellCoord::new(index, 15));
            let left = matrix.mask(CellCoord::new(0, index));
            let right = matrix.mask(CellCoord::new(15, index));
            assert!(!top.allows(Direction::Top));
            assert!(!bottom.allows(Direction::Bottom));
            assert!(!left.allows(Direction::Left));
            assert!(!right.allows(Direction::Right));
        }
        assert_eq!(matrix.mask(CellCoord::new(0, 0)).bits(), 0b0011);
        assert_eq!(matrix.mask(CellCoord::new(3, 3)), DirectionMask::OPEN);
    }

    #[test]
    fn centre_quadrant_is_closed_and_walls_its_neighbours() {
        let matrix = empty_board().matrix(Vec::new());

        for cell in BoardGeometry::default().center_quadrant() {
            assert_eq!(matrix.mask(cell), DirectionMask::BLOCKED);
        }
        assert!(!matrix.mask(CellCoord::new(6, 7)).allows(Direction::Right));
        assert!(!matrix.mask(CellCoord::new(7, 9)).allows(Direction::Top));
        assert!(matrix.mask(CellCoord::new(6, 7)).allows(Direction::Left));
    }

    #[test]
    fn wall_is_shared_by_both_adjacent_cells() {
        // Edge between (4, 2) and (5, 2).
        let occupancy = Occupancy::new(BoardGeometry::default(), vec![LatticePoint::new(9, 4)]);
        let matrix = occupancy.matrix(Vec::new());

        assert!(!matrix.mask(CellCoord::new(4, 2)).allows(Direction::Right));
        assert!(!matrix.mask(CellCoord::new(5, 2)).allows(Direction::Left));
        assert!(matrix.mask(CellCoord::new(4, 2)).allows(Direction::Left));
        assert!(matrix.mask(CellCoord::new(4, 3)).allows(Direction::Right));
    }

    #[test]
    fn robots_block_their_cell_and_neighbours() {
        let occupancy = empty_board();
        let matrix = occupancy.matrix(vec![CellCoord::new(3, 3)]);

        assert_eq!(matrix.mask(CellCoord::new(3, 3)), DirectionMask::BLOCKED);
        assert!(!matrix.mask(CellCoord::new(2, 3)).allows(Direction::Right));
        assert!(!matrix.mask(CellCoord::new(4, 3)).allows(Direction::Left));
        assert!(!matrix.mask(CellCoord::new(3, 2)).allows(Direction::Bottom));
        assert!(!matrix.mask(CellCoord::new(3, 4)).allows(Direction::Top));
    }

    #[test]
    fn matrices_are_rebuilt_per_query() {
        let occupancy = empty_board();
        let blocked = occupancy.matrix(vec![CellCoord::new(3, 3)]);
        let open = occupancy.matrix(Vec::new());

        assert_eq!(blocked.mask(CellCoord::new(3, 3)), DirectionMask::BLOCKED);
        assert_eq!(open.mask(CellCoord::new(3, 3)), DirectionMask::OPEN);
    }
}
