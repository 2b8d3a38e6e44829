#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that places the robot roster on the board.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ricochet_core::{Command, RobotColor};
use ricochet_world::{query, ConfigurationError, World};

/// Name and appearance of one robot to spawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RobotSpec {
    name: String,
    color: RobotColor,
}

impl RobotSpec {
    /// Creates a roster entry.
    #[must_use]
    pub fn new(name: impl Into<String>, color: RobotColor) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }

    /// Display name of the robot.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Colour of the robot.
    #[must_use]
    pub const fn color(&self) -> RobotColor {
        self.color
    }
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug)]
pub struct Config {
    roster: Vec<RobotSpec>,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided roster and seed.
    #[must_use]
    pub fn new(roster: Vec<RobotSpec>, rng_seed: u64) -> Self {
        Self { roster, rng_seed }
    }
}

/// Pure system that emits one spawn command per roster entry.
#[derive(Debug)]
pub struct Spawning {
    roster: Vec<RobotSpec>,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            roster: config.roster,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Samples distinct spawn cells and emits the spawn commands.
    ///
    /// Nothing is emitted when the board cannot host the whole roster.
    pub fn handle(
        &mut self,
        world: &World,
        out: &mut Vec<Command>,
    ) -> Result<(), ConfigurationError> {
        let cells = query::generate_placements(world, self.roster.len(), &mut self.rng)?;
        log::info!("spawning {} robots", cells.len());
        for (entry, cell) in self.roster.iter().zip(cells) {
            out.push(Command::SpawnRobot {
                name: entry.name.clone(),
                color: entry.color,
                cell,
            });
        }
        Ok(())
    }
}
