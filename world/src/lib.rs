#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Ricochet Robots.
//!
//! Walls, targets and the centre quadrant are fixed when the [`World`] is
//! built from [`LevelGeometry`]. Robot positions change only through
//! [`apply`], which enforces that no two robots ever share a cell.

pub mod level;
mod occupancy;
mod registry;

use std::collections::{HashMap, HashSet};

use ricochet_core::{
    BoardGeometry, CellCoord, Command, Event, LatticePoint, PlacementError, RobotId,
    MAX_BOARD_WIDTH, WELCOME_BANNER,
};

pub use level::{LevelError, LevelGeometry, QuadrantTile, TargetMarker, WallContainer, WallSegment};
pub use registry::ConfigurationError;

use self::{
    occupancy::Occupancy,
    registry::{Registry, Robot},
};

/// Named goal cell. Targets never block movement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    name: String,
    cell: CellCoord,
}

impl Target {
    /// Name of the marker the target was built from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell marked by the target.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }
}

/// Represents the authoritative Ricochet Robots board state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    geometry: BoardGeometry,
    walls: Vec<LatticePoint>,
    occupancy: Occupancy,
    targets: Vec<Target>,
    registry: Registry,
}

impl World {
    /// Builds a board from static level geometry.
    ///
    /// Malformed geometry is rejected here so gameplay never observes it.
    pub fn new(level: &LevelGeometry) -> Result<Self, LevelError> {
        if level.width == 0 || level.width % 2 != 0 || level.width > MAX_BOARD_WIDTH {
            return Err(LevelError::InvalidWidth { width: level.width });
        }
        let geometry = BoardGeometry::new(level.width);

        let mut walls = Vec::with_capacity(level.walls.len());
        for segment in &level.walls {
            if !segment.container.is_obstacle() {
                log::warn!(
                    "ignoring wall at ({}, {}) outside corner/side containers",
                    segment.position.x,
                    segment.position.y
                );
                continue;
            }
            let Some(point) = geometry.lattice_point(segment.position) else {
                return Err(LevelError::WallOffLattice {
                    x: segment.position.x,
                    y: segment.position.y,
                });
            };
            if !point.is_edge() {
                return Err(LevelError::WallNotOnEdge {
                    x: segment.position.x,
                    y: segment.position.y,
                });
            }
            walls.push(point);
        }
        walls.sort_unstable();
        walls.dedup();

        let mut targets: Vec<Target> = Vec::with_capacity(level.targets.len());
        for marker in &level.targets {
            let Some(cell) = geometry.cell_at(marker.position) else {
                return Err(LevelError::TargetOffCell {
                    name: marker.name.clone(),
                    x: marker.position.x,
                    y: marker.position.y,
                });
            };
            if targets.iter().any(|target| target.name == marker.name) {
                return Err(LevelError::DuplicateTarget {
                    name: marker.name.clone(),
                });
            }
            targets.push(Target {
                name: marker.name.clone(),
                cell,
            });
        }

        let target_cells: HashSet<CellCoord> = targets.iter().map(Target::cell).collect();
        let pool: Vec<CellCoord> = geometry
            .cells()
            .filter(|cell| !target_cells.contains(cell) && !geometry.is_center(*cell))
            .collect();

        log::info!(
            "loaded {}x{} board with {} walls, {} targets and {} spawn cells",
            geometry.width(),
            geometry.width(),
            walls.len(),
            targets.len(),
            pool.len()
        );

        Ok(Self {
            banner: WELCOME_BANNER,
            geometry,
            occupancy: Occupancy::new(geometry, walls.iter().copied()),
            walls,
            targets,
            registry: Registry::new(pool),
        })
    }

    fn validate_cell(&self, cell: CellCoord, mover: Option<RobotId>) -> Result<(), PlacementError> {
        if !self.geometry.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.geometry.is_center(cell) {
            return Err(PlacementError::CenterQuadrant);
        }
        match self.registry.occupant(cell) {
            Some(occupant) if Some(occupant) != mover => Err(PlacementError::Occupied),
            _ => Ok(()),
        }
    }

    fn restore(
        &mut self,
        positions: &[(RobotId, CellCoord)],
    ) -> Result<Vec<Event>, PlacementError> {
        let mut requested: HashMap<RobotId, CellCoord> = HashMap::with_capacity(positions.len());
        for (robot, cell) in positions {
            if self.registry.robot(*robot).is_none() {
                return Err(PlacementError::UnknownRobot);
            }
            if !self.geometry.contains(*cell) {
                return Err(PlacementError::OutOfBounds);
            }
            if self.geometry.is_center(*cell) {
                return Err(PlacementError::CenterQuadrant);
            }
            if requested.insert(*robot, *cell).is_some() {
                return Err(PlacementError::DuplicateRobot);
            }
        }

        let mut layout: HashSet<CellCoord> = HashSet::with_capacity(self.registry.robots().len());
        for robot in self.registry.robots() {
            let cell = requested.get(&robot.id).copied().unwrap_or(robot.cell);
            if !layout.insert(cell) {
                return Err(PlacementError::Occupied);
            }
        }

        let mut moved = Vec::new();
        for (robot, cell) in positions {
            let Some(current) = self.registry.robot(*robot).cloned() else {
                continue;
            };
            if current.cell == *cell {
                continue;
            }
            moved.push(Event::RobotMoved {
                robot: *robot,
                from: current.cell,
                to: *cell,
            });
            self.registry.upsert(Robot {
                cell: *cell,
                ..current
            });
        }
        Ok(moved)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Invalid requests leave the world untouched and report a rejection event.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnRobot { name, color, cell } => {
            if let Err(reason) = world.validate_cell(cell, None) {
                log::debug!("rejected spawn of {name} at {cell:?}: {reason:?}");
                out_events.push(Event::PlacementRejected {
                    robot: None,
                    cell,
                    reason,
                });
                return;
            }
            let robot = world.registry.allocate(name, color, cell);
            log::debug!(
                "spawned robot {} ({}) at {cell:?}",
                robot.id.get(),
                robot.name
            );
            out_events.push(Event::RobotSpawned {
                robot: robot.id,
                entity: robot.entity,
                cell,
            });
        }
        Command::PlaceRobot { robot, cell } => {
            let Some(current) = world.registry.robot(robot).cloned() else {
                out_events.push(Event::PlacementRejected {
                    robot: Some(robot),
                    cell,
                    reason: PlacementError::UnknownRobot,
                });
                return;
            };
            if let Err(reason) = world.validate_cell(cell, Some(robot)) {
                log::debug!(
                    "rejected placement of robot {} at {cell:?}: {reason:?}",
                    robot.get()
                );
                out_events.push(Event::PlacementRejected {
                    robot: Some(robot),
                    cell,
                    reason,
                });
                return;
            }
            let from = current.cell;
            world.registry.upsert(Robot { cell, ..current });
            out_events.push(Event::RobotMoved {
                robot,
                from,
                to: cell,
            });
        }
        Command::RestorePositions { positions } => match world.restore(&positions) {
            Ok(moved) => out_events.extend(moved),
            Err(reason) => {
                log::debug!("rejected restore of {} robots: {reason:?}", positions.len());
                out_events.push(Event::RestoreRejected { reason });
            }
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use rand::Rng;
    use ricochet_core::{
        BoardGeometry, CellCoord, Direction, EntityId, EntityKind, LatticePoint, PassabilityMatrix,
        RobotId, RobotSnapshot, RobotView,
    };

    use super::{ConfigurationError, Target, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Board dimensions and coordinate mapping.
    #[must_use]
    pub fn geometry(world: &World) -> BoardGeometry {
        world.geometry
    }

    /// Blocking wall positions on the half-cell lattice.
    #[must_use]
    pub fn walls(world: &World) -> &[LatticePoint] {
        &world.walls
    }

    /// Every target on the board.
    #[must_use]
    pub fn targets(world: &World) -> &[Target] {
        &world.targets
    }

    /// Target marking the provided cell, if any.
    #[must_use]
    pub fn target_at(world: &World, cell: CellCoord) -> Option<&Target> {
        world.targets.iter().find(|target| target.cell == cell)
    }

    /// Captures a read-only view of the robots in registration order.
    #[must_use]
    pub fn robot_view(world: &World) -> RobotView {
        let snapshots = world
            .registry
            .robots()
            .iter()
            .map(|robot| RobotSnapshot {
                id: robot.id,
                entity: robot.entity,
                name: robot.name.clone(),
                color: robot.color,
                cell: robot.cell,
            })
            .collect();
        RobotView::from_snapshots(snapshots)
    }

    /// Cell currently occupied by the robot.
    #[must_use]
    pub fn robot_cell(world: &World, robot: RobotId) -> Option<CellCoord> {
        world.registry.robot(robot).map(|robot| robot.cell)
    }

    /// Builds a fresh passability matrix treating every robot except
    /// `excluded` as an obstacle.
    #[must_use]
    pub fn passability(world: &World, excluded: Option<RobotId>) -> PassabilityMatrix {
        let obstacles = world
            .registry
            .robots()
            .iter()
            .filter(|robot| Some(robot.id) != excluded)
            .map(|robot| robot.cell);
        world.occupancy.matrix(obstacles)
    }

    /// Directions the robot may currently slide in. Unknown robots have none.
    #[must_use]
    pub fn available_directions(world: &World, robot: RobotId) -> Vec<Direction> {
        robot_cell(world, robot)
            .map(|cell| passability(world, Some(robot)).available_directions(cell))
            .unwrap_or_default()
    }

    /// Maps a pickable entity back to its gameplay meaning.
    #[must_use]
    pub fn resolve_entity(world: &World, entity: EntityId) -> Option<EntityKind> {
        world.registry.resolve(entity)
    }

    /// Entity identifier of the indicator for `direction`.
    #[must_use]
    pub fn indicator_entity(world: &World, direction: Direction) -> EntityId {
        world.registry.indicator(direction)
    }

    /// Cells eligible for initial robot placement.
    #[must_use]
    pub fn placement_pool(world: &World) -> &[CellCoord] {
        world.registry.pool()
    }

    /// Samples `count` distinct cells from the placement pool.
    pub fn generate_placements<R>(
        world: &World,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<CellCoord>, ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        world.registry.generate_placements(count, rng)
    }
}
