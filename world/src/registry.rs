//! Robot identities, pickable entity ids and the initial placement pool.

use rand::{seq::index, Rng};
use ricochet_core::{CellCoord, Direction, EntityId, EntityKind, RobotColor, RobotId};
use thiserror::Error;

/// Errors that abort session setup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// More robots were requested than there are spawn cells.
    #[error("requested {requested} robots but only {available} spawn cells are available")]
    TooManyRobots {
        /// Number of robots requested.
        requested: usize,
        /// Size of the placement pool.
        available: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Robot {
    pub(crate) id: RobotId,
    pub(crate) entity: EntityId,
    pub(crate) name: String,
    pub(crate) color: RobotColor,
    pub(crate) cell: CellCoord,
}

#[derive(Clone, Debug)]
pub(crate) struct Registry {
    robots: Vec<Robot>,
    next_robot: u32,
    next_entity: u32,
    indicators: [EntityId; 4],
    pool: Vec<CellCoord>,
}

impl Registry {
    /// Creates an empty registry. The four direction indicators receive the
    /// first entity ids.
    pub(crate) fn new(pool: Vec<CellCoord>) -> Self {
        let indicators = Direction::ALL.map(|direction| EntityId::new(direction.index() as u32));
        Self {
            robots: Vec::new(),
            next_robot: 0,
            next_entity: indicators.len() as u32,
            indicators,
            pool,
        }
    }

    pub(crate) fn allocate(&mut self, name: String, color: RobotColor, cell: CellCoord) -> Robot {
        let robot = Robot {
            id: RobotId::new(self.next_robot),
            entity: EntityId::new(self.next_entity),
            name,
            color,
            cell,
        };
        self.next_robot += 1;
        self.next_entity += 1;
        self.upsert(robot.clone());
        robot
    }

    /// Replaces the robot sharing `robot.id`, or appends it when new.
    ///
    /// Replacement keeps the robot's registration slot.
    pub(crate) fn upsert(&mut self, robot: Robot) {
        let slot = self.robots.iter_mut().find(|other| other.id == robot.id);
        match slot {
            Some(existing) => *existing = robot,
            None => self.robots.push(robot),
        }
    }

    pub(crate) fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub(crate) fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.iter().find(|robot| robot.id == id)
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<RobotId> {
        self.robots
            .iter()
            .find(|robot| robot.cell == cell)
            .map(|robot| robot.id)
    }

    pub(crate) fn resolve(&self, entity: EntityId) -> Option<EntityKind> {
        if let Some(position) = self.indicators.iter().position(|id| *id == entity) {
            return Direction::from_index(position).map(EntityKind::Indicator);
        }
        self.robots
            .iter()
            .find(|robot| robot.entity == entity)
            .map(|robot| EntityKind::Robot(robot.id))
    }

    pub(crate) fn indicator(&self, direction: Direction) -> EntityId {
        self.indicators[direction.index()]
    }

    pub(crate) fn pool(&self) -> &[CellCoord] {
        &self.pool
    }

    /// Samples `count` distinct cells uniformly from the placement pool.
    pub(crate) fn generate_placements<R>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<CellCoord>, ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        if count > self.pool.len() {
            return Err(ConfigurationError::TooManyRobots {
                requested: count,
                available: self.pool.len(),
            });
        }

        Ok(index::sample(rng, self.pool.len(), count)
            .into_iter()
            .map(|position| self.pool[position])
            .collect())
    }
}
