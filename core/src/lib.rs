#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ricochet Robots engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! actually changed. Systems query immutable snapshots and respond
//! exclusively with new command batches.
//!
//! The board is a square grid addressed by [`CellCoord`]. Level geometry
//! arrives in floating point world space, so [`BoardGeometry`] owns the exact
//! affine mapping between the two spaces and the half-cell [`LatticePoint`]
//! grid that walls are snapped onto.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Ricochet Robots.";

/// Number of cells along each edge of the standard board.
pub const DEFAULT_BOARD_WIDTH: u32 = 16;

/// Largest board width a level may declare.
pub const MAX_BOARD_WIDTH: u32 = 64;

/// Number of decimal places world coordinates are rounded to before lookup.
pub const WORLD_PRECISION_DIGITS: i32 = 10;

/// Rounds a world-space scalar to [`WORLD_PRECISION_DIGITS`] decimal places.
///
/// Wall and target positions originate from floating point 3D transforms, so
/// every comparison goes through this rounding first.
#[must_use]
pub fn round_world(value: f64) -> f64 {
    let scale = 10_f64.powi(WORLD_PRECISION_DIGITS);
    (value * scale).round() / scale
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Registers a new robot at the provided cell.
    SpawnRobot {
        /// Human readable name used by adapters.
        name: String,
        /// Appearance assigned to the robot.
        color: RobotColor,
        /// Cell the robot occupies once spawned.
        cell: CellCoord,
    },
    /// Moves a single robot to the provided cell.
    PlaceRobot {
        /// Identifier of the robot being moved.
        robot: RobotId,
        /// Destination cell.
        cell: CellCoord,
    },
    /// Moves several robots at once, validated as a single layout.
    RestorePositions {
        /// Robots paired with the cells they should occupy afterwards.
        positions: Vec<(RobotId, CellCoord)>,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a robot was registered on the board.
    RobotSpawned {
        /// Identifier assigned to the robot.
        robot: RobotId,
        /// Pickable entity identifier assigned to the robot.
        entity: EntityId,
        /// Cell occupied by the robot.
        cell: CellCoord,
    },
    /// Confirms that a robot changed cells.
    RobotMoved {
        /// Identifier of the robot that moved.
        robot: RobotId,
        /// Cell the robot occupied before the move.
        from: CellCoord,
        /// Cell the robot occupies after the move.
        to: CellCoord,
    },
    /// Reports that a spawn or placement request was rejected.
    PlacementRejected {
        /// Robot targeted by the request, absent for spawn requests.
        robot: Option<RobotId>,
        /// Cell requested by the command.
        cell: CellCoord,
        /// Specific reason the request failed.
        reason: PlacementError,
    },
    /// Reports that a batch restore was rejected as a whole.
    RestoreRejected {
        /// Specific reason the restore failed.
        reason: PlacementError,
    },
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the board.
    OutOfBounds,
    /// The requested cell belongs to the blocked centre quadrant.
    CenterQuadrant,
    /// Another robot already occupies the requested cell.
    Occupied,
    /// No robot with the provided identifier exists.
    UnknownRobot,
    /// The same robot appears more than once in a batch request.
    DuplicateRobot,
}

/// The four slide directions in their canonical order.
///
/// The discriminant doubles as the array index and as the input to the
/// passability bit shift (`3 - index`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing column indices.
    Left = 0,
    /// Toward decreasing row indices.
    Top = 1,
    /// Toward increasing column indices.
    Right = 2,
    /// Toward increasing row indices.
    Bottom = 3,
}

impl Direction {
    /// All directions in canonical order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
    ];

    /// Numeric index of the direction.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Resolves a direction from its numeric index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Top),
            2 => Some(Self::Right),
            3 => Some(Self::Bottom),
            _ => None,
        }
    }

    /// Shift that moves this direction's passability bit into position zero.
    #[must_use]
    pub const fn mask_shift(self) -> u8 {
        3 - self as u8
    }

    /// Passability bit owned by the direction.
    #[must_use]
    pub const fn bit(self) -> u8 {
        1 << self.mask_shift()
    }

    /// Unit offset in world space. World `y` runs along the board's depth axis.
    #[must_use]
    pub const fn world_offset(self) -> DVec2 {
        match self {
            Self::Left => DVec2::new(-1.0, 0.0),
            Self::Top => DVec2::new(0.0, -1.0),
            Self::Right => DVec2::new(1.0, 0.0),
            Self::Bottom => DVec2::new(0.0, 1.0),
        }
    }

    /// Neighbouring cell in this direction, if it lies on a board of `width`.
    #[must_use]
    pub fn step(self, cell: CellCoord, width: u32) -> Option<CellCoord> {
        let (column, row) = (cell.column(), cell.row());
        let next = match self {
            Self::Left => CellCoord::new(column.checked_sub(1)?, row),
            Self::Top => CellCoord::new(column, row.checked_sub(1)?),
            Self::Right => CellCoord::new(column.checked_add(1)?, row),
            Self::Bottom => CellCoord::new(column, row.checked_add(1)?),
        };
        let on_board = next.column() < width && next.row() < width;
        on_board.then_some(next)
    }
}

/// Four-bit passability value of a single cell.
///
/// Bit `3 - direction` is set when a robot may exit the cell in that
/// direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectionMask(u8);

impl DirectionMask {
    /// Every direction open.
    pub const OPEN: Self = Self(0b1111);

    /// Every direction closed.
    pub const BLOCKED: Self = Self(0);

    /// Creates a mask from raw bits, discarding anything above the low nibble.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether a robot may exit through `direction`.
    #[must_use]
    pub const fn allows(self, direction: Direction) -> bool {
        (self.0 >> direction.mask_shift()) & 1 == 1
    }

    /// Returns the mask with `direction` closed.
    #[must_use]
    pub const fn close(self, direction: Direction) -> Self {
        Self(self.0 & Self::clear_mask(direction))
    }

    /// AND mask clearing a single direction: 7, 11, 13 and 14 for
    /// left, top, right and bottom respectively.
    #[must_use]
    pub const fn clear_mask(direction: Direction) -> u8 {
        0b1111 ^ direction.bit()
    }

    /// Open directions in canonical order.
    pub fn open_directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.allows(*direction))
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Point on the half-cell lattice.
///
/// Cell centres sit on even coordinates (`2 * column`, `2 * row`) while the
/// edges between cells sit on odd ones, so a wall between two cells has
/// exactly one lattice point shared by both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LatticePoint {
    x: i32,
    y: i32,
}

impl LatticePoint {
    /// Creates a lattice point from raw half-cell coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Lattice point at the centre of `cell`.
    #[must_use]
    pub const fn cell_center(cell: CellCoord) -> Self {
        Self {
            x: cell.column() as i32 * 2,
            y: cell.row() as i32 * 2,
        }
    }

    /// Horizontal half-cell coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical half-cell coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Moves `half_steps` half cells toward `direction`.
    #[must_use]
    pub const fn toward(self, direction: Direction, half_steps: i32) -> Self {
        match direction {
            Direction::Left => Self::new(self.x - half_steps, self.y),
            Direction::Top => Self::new(self.x, self.y - half_steps),
            Direction::Right => Self::new(self.x + half_steps, self.y),
            Direction::Bottom => Self::new(self.x, self.y + half_steps),
        }
    }

    /// Reports whether the point lies on the edge shared by two neighbouring
    /// cells. Cell centres and the corners between four cells are not edges.
    #[must_use]
    pub const fn is_edge(&self) -> bool {
        (self.x % 2 != 0) != (self.y % 2 != 0)
    }
}

/// Square board dimensions plus the cell/world coordinate mapping.
///
/// `world = cell - width / 2 + 0.5` and `cell = world + width / 2 - 0.5`,
/// so cell centres land on half-integer world offsets around the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardGeometry {
    width: u32,
}

impl BoardGeometry {
    /// Creates a geometry for a square board of `width` cells per edge.
    #[must_use]
    pub const fn new(width: u32) -> Self {
        Self { width }
    }

    /// Number of cells along each edge.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Total number of cells on the board.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.width as usize
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.width
    }

    /// Row-major index of the cell, if it lies on the board.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    /// Every cell in row-major order from the start corner to the end corner.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let width = self.width;
        (0..width).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
    }

    /// World-space position of the cell centre.
    #[must_use]
    pub fn cell_to_world(&self, cell: CellCoord) -> DVec2 {
        let offset = self.half_width() - 0.5;
        DVec2::new(
            round_world(f64::from(cell.column()) - offset),
            round_world(f64::from(cell.row()) - offset),
        )
    }

    /// Exact inverse of [`Self::cell_to_world`] without snapping to a cell.
    #[must_use]
    pub fn world_to_cell_space(&self, world: DVec2) -> DVec2 {
        let offset = self.half_width() - 0.5;
        let column = round_world(world.x + offset);
        let row = round_world(world.y + offset);
        DVec2::new(column, row)
    }

    /// Cell whose centre coincides with `world`, if any.
    #[must_use]
    pub fn cell_at(&self, world: DVec2) -> Option<CellCoord> {
        let cell_space = self.world_to_cell_space(world);
        let column = self.axis_to_index(cell_space.x)?;
        let row = self.axis_to_index(cell_space.y)?;
        Some(CellCoord::new(column, row))
    }

    /// Half-cell lattice point coinciding with `world`.
    ///
    /// Returns `None` when the position is off the lattice or further than
    /// one half cell outside the board edge.
    #[must_use]
    pub fn lattice_point(&self, world: DVec2) -> Option<LatticePoint> {
        let doubled = self.world_to_cell_space(world) * 2.0;
        let x = self.axis_to_lattice(doubled.x)?;
        let y = self.axis_to_lattice(doubled.y)?;
        Some(LatticePoint::new(x, y))
    }

    /// World-space position of a lattice point.
    #[must_use]
    pub fn lattice_to_world(&self, point: LatticePoint) -> DVec2 {
        let offset = self.half_width() - 0.5;
        DVec2::new(
            round_world(f64::from(point.x()) / 2.0 - offset),
            round_world(f64::from(point.y()) / 2.0 - offset),
        )
    }

    /// The 2×2 block of cells around the board centre.
    #[must_use]
    pub const fn center_quadrant(&self) -> [CellCoord; 4] {
        let high = self.width / 2;
        let low = high.saturating_sub(1);
        [
            CellCoord::new(low, low),
            CellCoord::new(high, low),
            CellCoord::new(low, high),
            CellCoord::new(high, high),
        ]
    }

    /// Reports whether the cell belongs to the centre quadrant.
    #[must_use]
    pub const fn is_center(&self, cell: CellCoord) -> bool {
        let high = self.width / 2;
        let low = high.saturating_sub(1);
        (cell.column() == low || cell.column() == high) && (cell.row() == low || cell.row() == high)
    }

    fn half_width(&self) -> f64 {
        f64::from(self.width) / 2.0
    }

    fn axis_to_index(&self, value: f64) -> Option<u32> {
        if value.fract() != 0.0 || value < 0.0 || value >= f64::from(self.width) {
            return None;
        }
        Some(value as u32)
    }

    fn axis_to_lattice(&self, value: f64) -> Option<i32> {
        let upper = f64::from(self.width) * 2.0 - 1.0;
        if value.fract() != 0.0 || value < -1.0 || value > upper {
            return None;
        }
        Some(value as i32)
    }
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_WIDTH)
    }
}

/// Dense per-cell passability masks in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassabilityMatrix {
    geometry: BoardGeometry,
    masks: Vec<DirectionMask>,
}

impl PassabilityMatrix {
    /// Creates a matrix with every cell set to `mask`.
    #[must_use]
    pub fn filled(geometry: BoardGeometry, mask: DirectionMask) -> Self {
        Self {
            geometry,
            masks: vec![mask; geometry.cell_count()],
        }
    }

    /// Geometry of the board the matrix describes.
    #[must_use]
    pub const fn geometry(&self) -> BoardGeometry {
        self.geometry
    }

    /// Mask of the cell. Cells off the board are fully blocked.
    #[must_use]
    pub fn mask(&self, cell: CellCoord) -> DirectionMask {
        self.geometry
            .index(cell)
            .and_then(|index| self.masks.get(index).copied())
            .unwrap_or(DirectionMask::BLOCKED)
    }

    /// Overwrites the mask of a cell on the board.
    pub fn set_mask(&mut self, cell: CellCoord, mask: DirectionMask) {
        if let Some(slot) = self
            .geometry
            .index(cell)
            .and_then(|index| self.masks.get_mut(index))
        {
            *slot = mask;
        }
    }

    /// Directions a robot standing on `cell` may leave through.
    #[must_use]
    pub fn available_directions(&self, cell: CellCoord) -> Vec<Direction> {
        self.mask(cell).open_directions().collect()
    }
}

/// Unique identifier assigned to a robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RobotId(u32);

impl RobotId {
    /// Creates a new robot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opaque identifier of any entity an input device can pick.
///
/// Gameplay code never derives meaning from the numeric value; the world's
/// registry maps it back to an [`EntityKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Gameplay meaning of an [`EntityId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A robot on the board.
    Robot(RobotId),
    /// The direction indicator for the given slide direction.
    Indicator(Direction),
}

/// Visual appearance applied to a robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RobotColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RobotColor {
    /// Creates a new robot color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Idle animation state of a robot, driven by the selection controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationState {
    /// The robot bobs up and down while waiting.
    #[default]
    Idle,
    /// The robot rests while selected.
    Suppressed,
}

/// Immutable representation of a single robot's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RobotSnapshot {
    /// Unique identifier assigned to the robot.
    pub id: RobotId,
    /// Pickable entity identifier of the robot.
    pub entity: EntityId,
    /// Human readable name.
    pub name: String,
    /// Appearance assigned to the robot.
    pub color: RobotColor,
    /// Grid cell currently occupied by the robot.
    pub cell: CellCoord,
}

/// Read-only snapshot describing all robots on the board.
#[derive(Clone, Debug, Default)]
pub struct RobotView {
    snapshots: Vec<RobotSnapshot>,
}

impl RobotView {
    /// Creates a new robot view from the provided snapshots.
    ///
    /// Identifiers are allocated in registration order, so sorting by id
    /// yields registration order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<RobotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RobotSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a robot.
    #[must_use]
    pub fn get(&self, robot: RobotId) -> Option<&RobotSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == robot)
    }

    /// Number of robots captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no robots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<RobotSnapshot> {
        self.snapshots
    }
}
