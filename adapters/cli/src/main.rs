#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Ricochet Robots experience.

mod config;
mod level;
mod terminal;

use std::{io, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ricochet_core::Event;
use ricochet_rendering::{
    Color, FrameClock, IdleBob, IndicatorPresentation, InputAction, Presentation,
    RenderingBackend, RobotPresentation, Scene, TargetPresentation, WallPresentation,
};
use ricochet_system_bootstrap::Bootstrap;
use ricochet_system_selection::{Selection, SelectionInput, SelectionState};
use ricochet_system_spawning::{Config, Spawning};
use ricochet_world::{self as world, query, World};

use crate::{config::Settings, terminal::TerminalBackend};

/// Play Ricochet Robots in the terminal.
#[derive(Debug, Parser)]
#[command(name = "ricochet", version)]
struct Args {
    /// Settings file with the robot roster and animation parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON level file with four quadrant tiles.
    #[arg(long)]
    level: Option<PathBuf>,
    /// Seed for quadrant shuffling and robot placement.
    #[arg(long)]
    seed: Option<u64>,
}

/// Entry point for the Ricochet Robots command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())?;
    let seed = args
        .seed
        .or(settings.seed)
        .unwrap_or_else(rand::random::<u64>);
    log::info!("session seed {seed}");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let level = level::load(args.level.as_deref(), &mut rng)?;
    let mut world = World::new(&level).context("level geometry is malformed")?;
    spawn_robots(&mut world, &settings, rng.gen())?;

    let bootstrap = Bootstrap;
    let mut selection = Selection::new(&world);
    let mut clock = FrameClock::new(settings.fps)?;
    let mut bob = IdleBob::new(settings.bob_amplitude, settings.fps);

    let presentation = Presentation::new(
        bootstrap.welcome_banner(&world),
        build_scene(&bootstrap, &world, &selection, &bob),
    );

    let stdin = io::stdin();
    TerminalBackend::new(stdin.lock(), io::stdout()).run(presentation, move |dt, input, scene| {
        for action in input.actions {
            play(&mut world, &mut selection, action);
        }
        let ticks = clock.advance(dt);
        bob.advance(
            query::robot_view(&world)
                .iter()
                .map(|robot| (robot.id, selection.animation_state(robot.id))),
            ticks,
        );
        *scene = build_scene(&bootstrap, &world, &selection, &bob);
    })
}

fn spawn_robots(world: &mut World, settings: &Settings, seed: u64) -> Result<()> {
    let mut spawning = Spawning::new(Config::new(settings.roster()?, seed));
    let mut commands = Vec::new();
    spawning
        .handle(world, &mut commands)
        .context("failed to place robots")?;

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    if let Some(rejected) = events
        .iter()
        .find(|event| !matches!(event, Event::RobotSpawned { .. }))
    {
        bail!("robot spawn was rejected: {rejected:?}");
    }
    Ok(())
}

/// Routes one player action through the controller and applies the result.
fn play(world: &mut World, selection: &mut Selection, action: InputAction) {
    let input = match action {
        InputAction::Pick(entity) => SelectionInput::Intersect(entity),
        InputAction::Direction(direction) => SelectionInput::Direction(direction),
        InputAction::SelectNext => SelectionInput::SelectNext,
        InputAction::Undo => SelectionInput::Undo,
        InputAction::NewTurn => SelectionInput::NewTurn,
        InputAction::ResetTurn => SelectionInput::ResetTurn,
    };

    let mut commands = Vec::new();
    selection.handle(input, world, &mut commands);

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    for event in &events {
        match event {
            Event::RobotMoved { robot, from, to } => {
                log::debug!("robot {} moved from {from:?} to {to:?}", robot.get());
            }
            other => log::warn!("world rejected controller command: {other:?}"),
        }
    }
}

fn build_scene(
    bootstrap: &Bootstrap,
    world: &World,
    selection: &Selection,
    bob: &IdleBob,
) -> Scene {
    let geometry = bootstrap.geometry(world);
    let selected = match selection.state() {
        SelectionState::RobotSelected(robot) => Some(robot),
        SelectionState::NoSelection => None,
    };

    let walls = bootstrap
        .walls(world)
        .iter()
        .map(|point| WallPresentation::new(geometry, *point))
        .collect();
    let targets = bootstrap
        .targets(world)
        .iter()
        .map(|target| TargetPresentation {
            name: target.name().to_owned(),
            cell: target.cell(),
        })
        .collect();
    let robots = query::robot_view(world)
        .into_vec()
        .into_iter()
        .map(|robot| RobotPresentation {
            robot: robot.id,
            entity: robot.entity,
            color: Color::from(robot.color),
            position: geometry.cell_to_world(robot.cell),
            bob_offset: bob.offset(robot.id),
            selected: selected == Some(robot.id),
            cell: robot.cell,
            name: robot.name,
        })
        .collect();
    let indicators = selection
        .indicators()
        .iter()
        .map(|indicator| IndicatorPresentation {
            direction: indicator.direction(),
            entity: indicator.entity(),
            position: indicator.position(),
            visible: indicator.visible(),
        })
        .collect();

    Scene::new(geometry, walls, targets, robots, indicators)
}
