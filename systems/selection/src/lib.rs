#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn and selection controller.
//!
//! The controller owns which robot is selected, the move history of the
//! current turn, the four direction indicators and each robot's idle
//! animation state. It never mutates the world directly: moves are emitted
//! as [`Command`] values for the adapter to apply before the next input.

use std::collections::HashMap;

use glam::DVec2;
use ricochet_core::{AnimationState, CellCoord, Command, Direction, EntityId, EntityKind, RobotId};
use ricochet_system_movement::Movement;
use ricochet_world::{query, World};

/// One discrete player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionInput {
    /// A pick at the provided entity, or at the background when `None`.
    Intersect(Option<EntityId>),
    /// A direction key or swipe.
    Direction(Direction),
    /// Cycles to the next robot in registration order.
    SelectNext,
    /// Reverts the most recent move of the turn.
    Undo,
    /// Starts a new turn from the current layout.
    NewTurn,
    /// Puts every robot back where the turn started.
    ResetTurn,
}

/// Controller state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    /// No robot is selected.
    #[default]
    NoSelection,
    /// The robot receives direction inputs.
    RobotSelected(RobotId),
}

/// One entry of the turn's move history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    /// Robot that moved.
    pub robot: RobotId,
    /// Cell the robot occupied before the move.
    pub previous: CellCoord,
}

/// Pickable arrow pointing in one slide direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionIndicator {
    direction: Direction,
    entity: EntityId,
    position: DVec2,
    visible: bool,
}

impl DirectionIndicator {
    /// Direction the indicator represents.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Entity identifier reported by picks on the indicator.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// World-space position, one cell away from the selected robot.
    #[must_use]
    pub const fn position(&self) -> DVec2 {
        self.position
    }

    /// Whether the indicator is currently shown and pickable.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }
}

/// Turn/selection state machine.
#[derive(Debug)]
pub struct Selection {
    state: SelectionState,
    available: Vec<Direction>,
    indicators: [DirectionIndicator; 4],
    animations: HashMap<RobotId, AnimationState>,
    history: Vec<MoveRecord>,
    turn_start: Vec<(RobotId, CellCoord)>,
    movement: Movement,
}

impl Selection {
    /// Creates a controller with nothing selected and hidden indicators.
    #[must_use]
    pub fn new(world: &World) -> Self {
        let indicators = Direction::ALL.map(|direction| DirectionIndicator {
            direction,
            entity: query::indicator_entity(world, direction),
            position: DVec2::ZERO,
            visible: false,
        });
        Self {
            state: SelectionState::NoSelection,
            available: Vec::new(),
            indicators,
            animations: HashMap::new(),
            history: Vec::new(),
            turn_start: snapshot_positions(world),
            movement: Movement,
        }
    }

    /// Processes one input to completion, emitting world commands into `out`.
    pub fn handle(&mut self, input: SelectionInput, world: &World, out: &mut Vec<Command>) {
        match input {
            SelectionInput::Intersect(entity) => {
                match entity.and_then(|entity| query::resolve_entity(world, entity)) {
                    Some(EntityKind::Robot(robot)) => {
                        if let Some(cell) = query::robot_cell(world, robot) {
                            self.select(world, robot, cell);
                        }
                    }
                    Some(EntityKind::Indicator(direction)) => {
                        if self.indicators[direction.index()].visible {
                            self.request_move(world, direction, out);
                        }
                    }
                    None => self.deselect(),
                }
            }
            SelectionInput::Direction(direction) => self.request_move(world, direction, out),
            SelectionInput::SelectNext => self.select_next(world),
            SelectionInput::Undo => self.undo(world, out),
            SelectionInput::NewTurn => {
                self.deselect();
                self.history.clear();
                self.turn_start = snapshot_positions(world);
                log::debug!("new turn with {} robots", self.turn_start.len());
            }
            SelectionInput::ResetTurn => {
                self.deselect();
                self.history.clear();
                if !self.turn_start.is_empty() {
                    out.push(Command::RestorePositions {
                        positions: self.turn_start.clone(),
                    });
                }
            }
        }
    }

    /// Current controller state.
    #[must_use]
    pub const fn state(&self) -> SelectionState {
        self.state
    }

    /// Directions offered for the selected robot, empty without a selection.
    #[must_use]
    pub fn available_directions(&self) -> &[Direction] {
        &self.available
    }

    /// The four direction indicators in canonical direction order.
    #[must_use]
    pub fn indicators(&self) -> &[DirectionIndicator; 4] {
        &self.indicators
    }

    /// Idle animation state of the robot.
    #[must_use]
    pub fn animation_state(&self, robot: RobotId) -> AnimationState {
        self.animations.get(&robot).copied().unwrap_or_default()
    }

    /// Reports whether an undo would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Number of moves recorded this turn.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Robot positions captured when the turn started.
    #[must_use]
    pub fn turn_start_positions(&self) -> &[(RobotId, CellCoord)] {
        &self.turn_start
    }

    fn select(&mut self, world: &World, robot: RobotId, cell: CellCoord) {
        self.state = SelectionState::RobotSelected(robot);
        self.available = query::passability(world, Some(robot)).available_directions(cell);

        let centre = query::geometry(world).cell_to_world(cell);
        for indicator in &mut self.indicators {
            indicator.position = centre + indicator.direction.world_offset();
            indicator.visible = self.available.contains(&indicator.direction);
        }

        self.animations.clear();
        let _ = self.animations.insert(robot, AnimationState::Suppressed);
        log::debug!(
            "selected robot {} at {cell:?} with directions {:?}",
            robot.get(),
            self.available
        );
    }

    fn deselect(&mut self) {
        if let SelectionState::RobotSelected(robot) = self.state {
            log::debug!("deselected robot {}", robot.get());
        }
        self.state = SelectionState::NoSelection;
        self.available.clear();
        for indicator in &mut self.indicators {
            indicator.visible = false;
        }
        self.animations.clear();
    }

    fn select_next(&mut self, world: &World) {
        let view = query::robot_view(world);
        let robots: Vec<_> = view.iter().collect();
        if robots.is_empty() {
            return;
        }
        let next = match self.state {
            SelectionState::RobotSelected(current) => robots
                .iter()
                .position(|snapshot| snapshot.id == current)
                .map_or(0, |index| (index + 1) % robots.len()),
            SelectionState::NoSelection => 0,
        };
        let snapshot = robots[next];
        self.select(world, snapshot.id, snapshot.cell);
    }

    fn request_move(&mut self, world: &World, direction: Direction, out: &mut Vec<Command>) {
        let SelectionState::RobotSelected(robot) = self.state else {
            return;
        };
        let Some(slide) = self.movement.resolve(world, robot, direction) else {
            self.deselect();
            return;
        };
        let offered = query::passability(world, Some(robot))
            .available_directions(slide.from)
            .contains(&direction);
        if !offered || !slide.moved() {
            log::debug!("robot {} cannot move {direction:?}", robot.get());
            return;
        }

        self.history.push(MoveRecord {
            robot,
            previous: slide.from,
        });
        out.push(Command::PlaceRobot {
            robot,
            cell: slide.to,
        });
        self.select(world, robot, slide.to);
    }

    fn undo(&mut self, world: &World, out: &mut Vec<Command>) {
        let Some(record) = self.history.pop() else {
            return;
        };
        out.push(Command::PlaceRobot {
            robot: record.robot,
            cell: record.previous,
        });
        self.select(world, record.robot, record.previous);
    }
}

fn snapshot_positions(world: &World) -> Vec<(RobotId, CellCoord)> {
    query::robot_view(world)
        .iter()
        .map(|snapshot| (snapshot.id, snapshot.cell))
        .collect()
}
