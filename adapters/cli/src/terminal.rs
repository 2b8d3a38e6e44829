//! Line-oriented terminal backend.
//!
//! Each frame prints the board as ASCII art and then blocks on one line of
//! input. A line is parsed into zero or more [`InputAction`]s for the scene
//! update closure.

use std::{
    io::{BufRead, Write},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use ricochet_core::{CellCoord, Direction, EntityId, LatticePoint};
use ricochet_rendering::{
    classify_swipe, FrameInput, InputAction, Key, Presentation, RenderingBackend, Scene,
    WallOrientation,
};

const HELP: &str = "commands: left/up/right/down (a/w/d/s), next (space), undo, turn, reset, \
                    pick <column> <row>, click [entity], select <name>, \
                    swipe <x0> <y0> <x1> <y1>, help, quit";

/// Outcome of parsing one line of player input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Line {
    /// Gameplay actions to forward.
    Actions(Vec<InputAction>),
    /// The player asked for the command list.
    Help,
    /// The player asked to leave.
    Quit,
    /// The line could not be understood.
    Unknown(String),
}

/// Terminal rendering backend reading commands from `input`.
#[derive(Debug)]
pub(crate) struct TerminalBackend<R, W> {
    input: R,
    output: W,
}

impl<R, W> TerminalBackend<R, W>
where
    R: BufRead,
    W: Write,
{
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R, W> RenderingBackend for TerminalBackend<R, W>
where
    R: BufRead,
    W: Write,
{
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene),
    {
        let mut scene = presentation.scene;
        writeln!(self.output, "{}", presentation.window_title)?;
        writeln!(self.output, "{HELP}")?;
        let mut last_frame = Instant::now();
        let mut line = String::new();

        loop {
            write!(self.output, "{}", draw(&scene))?;
            write!(self.output, "> ")?;
            self.output.flush().context("failed to flush terminal")?;

            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .context("failed to read terminal input")?;
            if read == 0 {
                break;
            }

            let actions = match parse_line(&line, &scene) {
                Line::Actions(actions) => actions,
                Line::Help => {
                    writeln!(self.output, "{HELP}")?;
                    Vec::new()
                }
                Line::Quit => break,
                Line::Unknown(text) => {
                    writeln!(self.output, "unknown command `{text}`; type `help`")?;
                    Vec::new()
                }
            };

            let now = Instant::now();
            let dt = now.duration_since(last_frame);
            last_frame = now;
            update_scene(dt, FrameInput { actions }, &mut scene);
        }

        Ok(())
    }
}

/// Parses one command line against the currently displayed scene.
pub(crate) fn parse_line(line: &str, scene: &Scene) -> Line {
    let words: Vec<&str> = line.split_whitespace().collect();
    let direction = |direction| Line::Actions(vec![InputAction::Direction(direction)]);
    let single = |action| Line::Actions(vec![action]);

    match words.as_slice() {
        [] => Line::Actions(Vec::new()),
        ["left" | "a"] => direction(Direction::Left),
        ["up" | "w"] => direction(Direction::Top),
        ["right" | "d"] => direction(Direction::Right),
        ["down" | "s"] => direction(Direction::Bottom),
        ["next" | "space" | "n"] => single(Key::Space.action()),
        ["undo" | "u"] => single(InputAction::Undo),
        ["turn" | "t"] => single(InputAction::NewTurn),
        ["reset" | "r"] => single(InputAction::ResetTurn),
        ["click"] => single(InputAction::Pick(None)),
        ["click", entity] => match entity.parse::<u32>() {
            Ok(entity) => single(InputAction::Pick(Some(EntityId::new(entity)))),
            Err(_) => Line::Unknown(line.trim().to_owned()),
        },
        ["pick", column, row] => match (column.parse::<u32>(), row.parse::<u32>()) {
            (Ok(column), Ok(row)) => single(InputAction::Pick(pick_cell(
                scene,
                CellCoord::new(column, row),
            ))),
            _ => Line::Unknown(line.trim().to_owned()),
        },
        ["select", name] => match scene.robots.iter().find(|robot| robot.name == *name) {
            Some(robot) => single(InputAction::Pick(Some(robot.entity))),
            None => Line::Unknown(line.trim().to_owned()),
        },
        ["swipe", x0, y0, x1, y1] => {
            let coords: Result<Vec<f32>, _> = [x0, y0, x1, y1]
                .iter()
                .map(|value| value.parse::<f32>())
                .collect();
            match coords.as_deref() {
                Ok([x0, y0, x1, y1]) => Line::Actions(
                    classify_swipe((*x0, *y0), (*x1, *y1))
                        .map(InputAction::Direction)
                        .into_iter()
                        .collect(),
                ),
                _ => Line::Unknown(line.trim().to_owned()),
            }
        }
        ["help" | "h" | "?"] => Line::Help,
        ["quit" | "q" | "exit"] => Line::Quit,
        _ => Line::Unknown(line.trim().to_owned()),
    }
}

/// Entity a pick at `cell` lands on: a visible indicator first, then a robot.
fn pick_cell(scene: &Scene, cell: CellCoord) -> Option<EntityId> {
    scene
        .indicator_at(cell)
        .map(|indicator| indicator.entity)
        .or_else(|| scene.robot_at(cell).map(|robot| robot.entity))
}

/// Renders the scene on a `(2w + 1)` square character canvas.
///
/// Canvas position `(x + 1, y + 1)` shows lattice point `(x, y)`, so cell
/// centres land on odd canvas coordinates and walls between them.
pub(crate) fn draw(scene: &Scene) -> String {
    let geometry = scene.geometry;
    let size = usize::try_from(geometry.width()).unwrap_or(0) * 2 + 1;
    let mut canvas = vec![vec![' '; size]; size];
    let last = size.saturating_sub(1);

    for (y, row) in canvas.iter_mut().enumerate() {
        for (x, slot) in row.iter_mut().enumerate() {
            let on_x_border = x == 0 || x == last;
            let on_y_border = y == 0 || y == last;
            *slot = match (on_x_border, on_y_border) {
                (true, true) => '+',
                (true, false) => '|',
                (false, true) => '-',
                (false, false) if x % 2 == 1 && y % 2 == 1 => '.',
                (false, false) => ' ',
            };
        }
    }

    let mut put = |point: LatticePoint, glyph: char| {
        let x = usize::try_from(point.x() + 1).ok();
        let y = usize::try_from(point.y() + 1).ok();
        if let (Some(x), Some(y)) = (x, y) {
            if let Some(slot) = canvas.get_mut(y).and_then(|row| row.get_mut(x)) {
                *slot = glyph;
            }
        }
    };

    for cell in geometry.center_quadrant() {
        put(LatticePoint::cell_center(cell), '#');
    }
    for wall in &scene.walls {
        let glyph = match wall.orientation {
            WallOrientation::Vertical => '|',
            WallOrientation::Horizontal => '-',
        };
        put(wall.point, glyph);
    }
    for target in &scene.targets {
        put(LatticePoint::cell_center(target.cell), '*');
    }
    for indicator in &scene.indicators {
        if !indicator.visible {
            continue;
        }
        if let Some(cell) = geometry.cell_at(indicator.position) {
            let glyph = match indicator.direction {
                Direction::Left => '<',
                Direction::Top => '^',
                Direction::Right => '>',
                Direction::Bottom => 'v',
            };
            put(LatticePoint::cell_center(cell), glyph);
        }
    }
    for robot in &scene.robots {
        let initial = robot.name.chars().next().unwrap_or('?');
        let glyph = if robot.selected {
            initial.to_ascii_uppercase()
        } else {
            initial.to_ascii_lowercase()
        };
        put(LatticePoint::cell_center(robot.cell), glyph);
    }

    let mut text = String::with_capacity(size * (size + 1));
    for row in canvas {
        text.extend(row);
        text.push('\n');
    }
    for robot in &scene.robots {
        text.push_str(&format!(
            "  {} {} ({}) entity {} at ({}, {}){}\n",
            robot.name,
            robot.color.hex(),
            if robot.selected { "selected" } else { "idle" },
            robot.entity.get(),
            robot.cell.column(),
            robot.cell.row(),
            if robot.bob_offset.abs() > f64::EPSILON {
                " ~"
            } else {
                ""
            }
        ));
    }
    if let Some(target) = scene
        .robots
        .iter()
        .find_map(|robot| scene.target_at(robot.cell).map(|target| (robot, target)))
    {
        text.push_str(&format!("  {} reached {}\n", target.0.name, target.1.name));
    }
    text
}
