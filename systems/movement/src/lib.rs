#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Slide resolution for robots on a Ricochet Robots board.
//!
//! A robot asked to move keeps travelling in a straight line until the
//! passability matrix closes the current cell's exit in that direction.

use glam::DVec2;
use ricochet_core::{CellCoord, Direction, PassabilityMatrix, RobotId};
use ricochet_world::{query, World};

/// Outcome of sliding a robot in one direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slide {
    /// Cell the robot started from.
    pub from: CellCoord,
    /// Cell the robot comes to rest on.
    pub to: CellCoord,
    /// World-space centre of the destination cell.
    pub world_position: DVec2,
}

impl Slide {
    /// Reports whether the robot actually changed cells.
    #[must_use]
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// Pure system that resolves where a slide ends.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Resolves the destination of `robot` sliding toward `direction`.
    ///
    /// The matrix is rebuilt for the call with every other robot treated as
    /// an obstacle. Returns `None` for unknown robots.
    #[must_use]
    pub fn resolve(&self, world: &World, robot: RobotId, direction: Direction) -> Option<Slide> {
        let from = query::robot_cell(world, robot)?;
        let matrix = query::passability(world, Some(robot));
        let to = slide(&matrix, from, direction);
        log::trace!(
            "robot {} slides {direction:?} from {from:?} to {to:?}",
            robot.get()
        );
        Some(Slide {
            from,
            to,
            world_position: query::geometry(world).cell_to_world(to),
        })
    }
}

/// Walks from `start` toward `direction` while the current cell allows it.
///
/// A closed exit on the starting cell leaves the robot where it is. The walk
/// never takes more than `width` steps.
#[must_use]
pub fn slide(matrix: &PassabilityMatrix, start: CellCoord, direction: Direction) -> CellCoord {
    let width = matrix.geometry().width();
    let mut current = start;
    for _ in 0..width {
        if !matrix.mask(current).allows(direction) {
            break;
        }
        match direction.step(current, width) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}
