#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Ricochet Robots adapters.

use std::{collections::HashMap, f64::consts::TAU, time::Duration};

use anyhow::Result as AnyResult;
use glam::DVec2;
use ricochet_core::{
    AnimationState, BoardGeometry, CellCoord, Direction, EntityId, LatticePoint, RobotColor,
    RobotId,
};
use thiserror::Error;

/// Minimum pointer travel, in pixels, before a drag counts as a swipe.
pub const SWIPE_MIN_DISTANCE: f32 = 50.0;

/// Upper bound on fixed ticks simulated for a single frame.
pub const MAX_TICKS_PER_FRAME: u32 = 8;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Formats the opaque part of the color as `#rrggbb`.
    #[must_use]
    pub fn hex(self) -> String {
        let red = channel_byte(self.red);
        let green = channel_byte(self.green);
        let blue = channel_byte(self.blue);
        format!("#{red:02x}{green:02x}{blue:02x}")
    }
}

impl From<RobotColor> for Color {
    fn from(color: RobotColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

fn channel_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Discrete player intent captured by an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    /// A pick landed on the provided entity, or on the background.
    Pick(Option<EntityId>),
    /// A direction key or swipe.
    Direction(Direction),
    /// Cycle to the next robot.
    SelectNext,
    /// Revert the last move.
    Undo,
    /// Start a new turn.
    NewTurn,
    /// Put every robot back where the turn started.
    ResetTurn,
}

/// Physical keys with a gameplay meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Space bar.
    Space,
    /// Left arrow.
    ArrowLeft,
    /// Up arrow.
    ArrowUp,
    /// Right arrow.
    ArrowRight,
    /// Down arrow.
    ArrowDown,
}

impl Key {
    /// Gameplay action bound to the key.
    #[must_use]
    pub const fn action(self) -> InputAction {
        match self {
            Self::Space => InputAction::SelectNext,
            Self::ArrowLeft => InputAction::Direction(Direction::Left),
            Self::ArrowUp => InputAction::Direction(Direction::Top),
            Self::ArrowRight => InputAction::Direction(Direction::Right),
            Self::ArrowDown => InputAction::Direction(Direction::Bottom),
        }
    }
}

/// Classifies a pointer drag from `start` to `end` in screen pixels.
///
/// The dominant axis decides the direction and screen `y` grows downward.
/// Drags shorter than [`SWIPE_MIN_DISTANCE`] along that axis are ignored.
#[must_use]
pub fn classify_swipe(start: (f32, f32), end: (f32, f32)) -> Option<Direction> {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;

    if dx.abs() > dy.abs() {
        if dx.abs() <= SWIPE_MIN_DISTANCE {
            return None;
        }
        Some(if dx < 0.0 {
            Direction::Left
        } else {
            Direction::Right
        })
    } else {
        if dy.abs() <= SWIPE_MIN_DISTANCE {
            return None;
        }
        Some(if dy < 0.0 {
            Direction::Top
        } else {
            Direction::Bottom
        })
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Actions in the order they were received.
    pub actions: Vec<InputAction>,
}

/// Fixed-timestep accumulator derived from a target frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClock {
    step: Duration,
    accumulator: Duration,
}

impl FrameClock {
    /// Creates a clock ticking `fps` times per second.
    pub fn new(fps: u32) -> Result<Self, RenderingError> {
        if fps == 0 {
            return Err(RenderingError::InvalidFrameRate { fps });
        }
        Ok(Self {
            step: Duration::from_secs(1) / fps,
            accumulator: Duration::ZERO,
        })
    }

    /// Accumulates `dt` and returns the number of whole ticks to simulate.
    ///
    /// Time beyond [`MAX_TICKS_PER_FRAME`] ticks is dropped.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.accumulator = self.accumulator.saturating_add(dt);
        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < MAX_TICKS_PER_FRAME {
            self.accumulator -= self.step;
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_FRAME {
            self.accumulator = Duration::ZERO;
        }
        ticks
    }
}

/// Decorative vertical bob of idle robots.
///
/// Reads each robot's [`AnimationState`] and never touches grid positions.
#[derive(Clone, Debug, PartialEq)]
pub struct IdleBob {
    amplitude: f64,
    phase_step: f64,
    phases: HashMap<RobotId, f64>,
}

impl IdleBob {
    /// Creates a bob of `amplitude` world units completing one cycle per
    /// second at `fps` ticks per second.
    #[must_use]
    pub fn new(amplitude: f64, fps: u32) -> Self {
        Self {
            amplitude,
            phase_step: TAU / f64::from(fps.max(1)),
            phases: HashMap::new(),
        }
    }

    /// Advances every idle robot by `ticks` fixed ticks. Suppressed robots
    /// drop back to rest.
    pub fn advance<I>(&mut self, robots: I, ticks: u32)
    where
        I: IntoIterator<Item = (RobotId, AnimationState)>,
    {
        for (robot, state) in robots {
            let phase = self.phases.entry(robot).or_insert(0.0);
            match state {
                AnimationState::Idle => {
                    *phase = (*phase + self.phase_step * f64::from(ticks)) % TAU;
                }
                AnimationState::Suppressed => *phase = 0.0,
            }
        }
    }

    /// Current vertical offset of the robot.
    #[must_use]
    pub fn offset(&self, robot: RobotId) -> f64 {
        self.phases
            .get(&robot)
            .map_or(0.0, |phase| self.amplitude * phase.sin())
    }
}

/// Orientation of a wall on the half-cell lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallOrientation {
    /// Wall between two horizontally adjacent cells.
    Vertical,
    /// Wall between two vertically adjacent cells.
    Horizontal,
}

/// Wall positioned for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallPresentation {
    /// Lattice point the wall occupies.
    pub point: LatticePoint,
    /// World-space centre of the wall.
    pub position: DVec2,
    /// Shape used to draw the wall.
    pub orientation: WallOrientation,
}

impl WallPresentation {
    /// Places a wall edge point on the board.
    ///
    /// Walls sit on cell edges, so an odd `x` means the wall separates two
    /// horizontally adjacent cells.
    #[must_use]
    pub fn new(geometry: BoardGeometry, point: LatticePoint) -> Self {
        let orientation = if point.x() % 2 != 0 {
            WallOrientation::Vertical
        } else {
            WallOrientation::Horizontal
        };
        Self {
            point,
            position: geometry.lattice_to_world(point),
            orientation,
        }
    }
}

/// Target marker positioned for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetPresentation {
    /// Name of the target.
    pub name: String,
    /// Cell marked by the target.
    pub cell: CellCoord,
}

/// Robot positioned for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct RobotPresentation {
    /// Robot identifier.
    pub robot: RobotId,
    /// Entity reported when the robot is picked.
    pub entity: EntityId,
    /// Display name.
    pub name: String,
    /// Body color.
    pub color: Color,
    /// Cell the robot occupies.
    pub cell: CellCoord,
    /// World-space centre of the robot's cell.
    pub position: DVec2,
    /// Decorative vertical offset from the idle bob.
    pub bob_offset: f64,
    /// Whether the robot is currently selected.
    pub selected: bool,
}

/// Direction indicator positioned for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndicatorPresentation {
    /// Direction the indicator points in.
    pub direction: Direction,
    /// Entity reported when the indicator is picked.
    pub entity: EntityId,
    /// World-space position of the indicator.
    pub position: DVec2,
    /// Whether the indicator is drawn and pickable.
    pub visible: bool,
}

/// Scene description combining the board, its walls and the robots.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board dimensions.
    pub geometry: BoardGeometry,
    /// Blocking walls.
    pub walls: Vec<WallPresentation>,
    /// Target markers.
    pub targets: Vec<TargetPresentation>,
    /// Robots in registration order.
    pub robots: Vec<RobotPresentation>,
    /// Direction indicators in canonical direction order.
    pub indicators: Vec<IndicatorPresentation>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        geometry: BoardGeometry,
        walls: Vec<WallPresentation>,
        targets: Vec<TargetPresentation>,
        robots: Vec<RobotPresentation>,
        indicators: Vec<IndicatorPresentation>,
    ) -> Self {
        Self {
            geometry,
            walls,
            targets,
            robots,
            indicators,
        }
    }

    /// Robot drawn on the cell, if any.
    #[must_use]
    pub fn robot_at(&self, cell: CellCoord) -> Option<&RobotPresentation> {
        self.robots.iter().find(|robot| robot.cell == cell)
    }

    /// Visible indicator positioned over the cell, if any.
    #[must_use]
    pub fn indicator_at(&self, cell: CellCoord) -> Option<&IndicatorPresentation> {
        self.indicators
            .iter()
            .filter(|indicator| indicator.visible)
            .find(|indicator| self.geometry.cell_at(indicator.position) == Some(cell))
    }

    /// Target marking the cell, if any.
    #[must_use]
    pub fn target_at(&self, cell: CellCoord) -> Option<&TargetPresentation> {
        self.targets.iter().find(|target| target.cell == cell)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            scene,
        }
    }
}

/// Rendering backend capable of presenting Ricochet Robots scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta, the
    /// input captured by the adapter since the previous frame, and may mutate
    /// the scene before it is presented.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene);
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// The frame rate must be positive to derive a timestep.
    #[error("frame rate must be positive (received {fps})")]
    InvalidFrameRate {
        /// Provided frame rate that failed validation.
        fps: u32,
    },
}
