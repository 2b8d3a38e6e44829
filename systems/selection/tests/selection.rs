use glam::DVec2;
use ricochet_core::{
    AnimationState, CellCoord, Command, Direction, EntityId, Event, RobotColor, RobotId,
};
use ricochet_system_selection::{Selection, SelectionInput, SelectionState};
use ricochet_world::{self as world, query, LevelGeometry, World};

fn spawn(world: &mut World, name: &str, cell: CellCoord) -> RobotId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnRobot {
            name: name.to_owned(),
            color: RobotColor::from_rgb(0x58, 0x47, 0xff),
            cell,
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::RobotSpawned { robot, .. }] => *robot,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

fn entity_of(world: &World, robot: RobotId) -> EntityId {
    query::robot_view(world)
        .get(robot)
        .expect("robot exists")
        .entity
}

/// Feeds one input through the controller and applies the resulting commands.
fn pump(selection: &mut Selection, world: &mut World, input: SelectionInput) -> Vec<Command> {
    let mut commands = Vec::new();
    selection.handle(input, world, &mut commands);
    let mut events = Vec::new();
    for command in commands.iter().cloned() {
        world::apply(world, command, &mut events);
    }
    for event in &events {
        assert!(
            matches!(event, Event::RobotMoved { .. }),
            "controller emitted a rejected command: {event:?}"
        );
    }
    commands
}

/// Picks an entity, as a click or tap on it would.
fn pick(selection: &mut Selection, world: &mut World, entity: EntityId) -> Vec<Command> {
    pump(selection, world, SelectionInput::Intersect(Some(entity)))
}

struct Fixture {
    world: World,
    selection: Selection,
    red: RobotId,
    blue: RobotId,
}

fn fixture() -> Fixture {
    let mut world = World::new(&LevelGeometry::empty(16)).expect("empty level is valid");
    let red = spawn(&mut world, "red", CellCoord::new(0, 0));
    let blue = spawn(&mut world, "blue", CellCoord::new(5, 0));
    let mut selection = Selection::new(&world);
    let _ = pump(&mut selection, &mut world, SelectionInput::NewTurn);
    Fixture {
        world,
        selection,
        red,
        blue,
    }
}

#[test]
fn picking_a_robot_selects_it_and_shows_open_indicators() {
    let Fixture {
        mut world,
        mut selection,
        red,
        blue,
    } = fixture();
    let entity = entity_of(&world, red);

    let _ = pick(&mut selection, &mut world, entity);

    assert_eq!(selection.state(), SelectionState::RobotSelected(red));
    assert_eq!(
        selection.available_directions(),
        &[Direction::Right, Direction::Bottom]
    );
    let visible: Vec<Direction> = selection
        .indicators()
        .iter()
        .filter(|indicator| indicator.visible())
        .map(|indicator| indicator.direction())
        .collect();
    assert_eq!(visible, vec![Direction::Right, Direction::Bottom]);
    assert_eq!(
        selection.indicators()[Direction::Right.index()].position(),
        DVec2::new(-6.5, -7.5)
    );
    assert_eq!(selection.animation_state(red), AnimationState::Suppressed);
    assert_eq!(selection.animation_state(blue), AnimationState::Idle);
}

#[test]
fn selecting_twice_is_idempotent() {
    let Fixture {
        mut world,
        mut selection,
        red,
        ..
    } = fixture();
    let entity = entity_of(&world, red);

    let _ = pick(&mut selection, &mut world, entity);
    let first = *selection.indicators();
    let _ = pick(&mut selection, &mut world, entity);

    assert_eq!(selection.state(), SelectionState::RobotSelected(red));
    assert_eq!(*selection.indicators(), first);
}

#[test]
fn moving_records_history_and_follows_the_robot() {
    let Fixture {
        mut world,
        mut selection,
        red,
        ..
    } = fixture();
    let entity = entity_of(&world, red);
    let _ = pick(&mut selection, &mut world, entity);

    let commands = pump(
        &mut selection,
        &mut world,
        SelectionInput::Direction(Direction::Right),
    );

    assert_eq!(
        commands,
        vec![Command::PlaceRobot {
            robot: red,
            cell: CellCoord::new(4, 0),
        }]
    );
    assert_eq!(query::robot_cell(&world, red), Some(CellCoord::new(4, 0)));
    assert_eq!(selection.history_len(), 1);
    assert_eq!(
        selection.available_directions(),
        &[Direction::Left, Direction::Bottom]
    );
}

#[test]
fn clicking_a_visible_indicator_moves_the_selected_robot() {
    let Fixture {
        mut world,
        mut selection,
        red,
        ..
    } = fixture();
    let entity = entity_of(&world, red);
    let _ = pick(&mut selection, &mut world, entity);
    let arrow = query::indicator_entity(&world, Direction::Bottom);

    let _ = pick(&mut selection, &mut world, arrow);

    assert_eq!(query::robot_cell(&world, red), Some(CellCoord::new(0, 15)));
    assert_eq!(selection.state(), SelectionState::RobotSelected(red));
}

#[test]
fn blocked_directions_change_nothing() {
    let Fixture {
        mut world,
        mut selection,
        red,
        ..
    } = fixture();
    let entity = entity_of(&world, red);
    let _ = pick(&mut selection, &mut world, entity);
    let hidden = query::indicator_entity(&world, Direction::Left);

    let by_key = pump(
        &mut selection,
        &mut world,
        SelectionInput::Direction(Direction::Left),
    );
    let by_click = pick(&mut selection, &mut world, hidden);

    assert!(by_key.is_empty());
    assert!(by_click.is_empty());
    assert_eq!(query::robot_cell(&world, red), Some(CellCoord::new(0, 0)));
    assert!(!selection.can_undo());
}

#[test]
fn boxed_in_robot_offers_no_directions() {
    let mut world = World::new(&LevelGeometry::empty(16)).expect("empty level is valid");
    let red = spawn(&mut world, "red", CellCoord::new(0, 0));
    let _ = spawn(&mut world, "blue", CellCoord::new(1, 0));
    let _ = spawn(&mut world, "green", CellCoord::new(0, 1));
    let mut selection = Selection::new(&world);
    let entity = entity_of(&world, red);

    let _ = pick(&mut selection, &mut world, entity);

    assert_eq!(selection.state(), SelectionState::RobotSelected(red));
    assert!(selection.available_directions().is_empty());
    let indicators = selection.indicators();
    assert!(indicators.iter().all(|indicator| !indicator.visible()));
    for direction in Direction::ALL {
        let commands = pump(
            &mut selection,
            &mut world,
            SelectionInput::Direction(direction),
        );
        assert!(commands.is_empty());
    }
    assert_eq!(query::robot_cell(&world, red), Some(CellCoord::new(0, 0)));
    assert!(!selection.can_undo());
}

#[test]
fn directions_without_selection_are_ignored() {
    let Fixture {
        mut world,
        mut selection,
        ..
    } = fixture();

    let commands = pump(
        &mut selection,
        &mut world,
        SelectionInput::Direction(Direction::Right),
    );

    assert!(commands.is_empty());
    assert_eq!(selection.state(), SelectionState::NoSelection);
}

#[test]
fn background_and_unknown_picks_deselect() {
    let Fixture {
        mut world,
        mut selection,
        red,
        blue,
    } = fixture();
    let entity = entity_of(&world, red);

    for target in [None, Some(EntityId::new(9_999))] {
        let _ = pick(&mut selection, &mut world, entity);
        let _ = pump(
            &mut selection,
            &mut world,
            SelectionInput::Intersect(target),
        );

        assert_eq!(selection.state(), SelectionState::NoSelection);
        let indicators = selection.indicators();
        assert!(indicators.iter().all(|indicator| !indicator.visible()));
        assert!(selection.available_directions().is_empty());
        assert_eq!(selection.animation_state(red), AnimationState::Idle);
        assert_eq!(selection.animation_state(blue), AnimationState::Idle);
    }
}

#[test]
fn undo_restores_the_exact_previous_cell_and_reselects() {
    let Fixture {
        mut world,
        mut selection,
        red,
        blue,
    } = fixture();
    let entity = entity_of(&world, red);
    let _ = pick(&mut selection, &mut world, entity);
    let _ = pump(
        &mut selection,
        &mut world,
        SelectionInput::Direction(Direction::Bottom),
    );
    let _ = pump(&mut selection, &mut world, SelectionInput::Intersect(None));

    let commands = pump(&mut selection, &mut world, SelectionInput::Undo);

    assert_eq!(
        commands,
        vec![Command::PlaceRobot {
            robot: red,
            cell: CellCoord::new(0, 0),
        }]
    );
    assert_eq!(query::robot_cell(&world, red), Some(CellCoord::new(0, 0)));
    assert_eq!(selection.state(), SelectionState::RobotSelected(red));
    assert_eq!(
        selection.available_directions(),
        &[Direction::Right, Direction::Bottom]
    );
    assert_eq!(selection.animation_state(blue), AnimationState::Idle);
    assert!(!selection.can_undo());
}

#[test]
fn undo_with_empty_history_is_a_no_op() {
    let Fixture {
        mut world,
        mut selection,
        ..
    } = fixture();

    let commands = pump(&mut selection, &mut world, SelectionInput::Undo);

    assert!(commands.is_empty());
    assert_eq!(selection.state(), SelectionState::NoSelection);
}

#[test]
fn select_next_cycles_in_registration_order() {
    let Fixture {
        mut world,
        mut selection,
        red,
        blue,
    } = fixture();

    let _ = pump(&mut selection, &mut world, SelectionInput::SelectNext);
    assert_eq!(selection.state(), SelectionState::RobotSelected(red));
    let _ = pump(&mut selection, &mut world, SelectionInput::SelectNext);
    assert_eq!(selection.state(), SelectionState::RobotSelected(blue));
    let _ = pump(&mut selection, &mut world, SelectionInput::SelectNext);
    assert_eq!(selection.state(), SelectionState::RobotSelected(red));
}

#[test]
fn cycling_order_survives_moves() {
    let Fixture {
        mut world,
        mut selection,
        red,
        blue,
    } = fixture();
    let _ = pump(&mut selection, &mut world, SelectionInput::SelectNext);
    let _ = pump(
        &mut selection,
        &mut world,
        SelectionInput::Direction(Direction::Bottom),
    );

    let _ = pump(&mut selection, &mut world, SelectionInput::SelectNext);

    assert_eq!(selection.state(), SelectionState::RobotSelected(blue));
    assert_ne!(query::robot_cell(&world, red), Some(CellCoord::new(0, 0)));
}

#[test]
fn new_turn_clears_selection_and_history() {
    let Fixture {
        mut world,
        mut selection,
        red,
        blue,
    } = fixture();
    let _ = pump(&mut selection, &mut world, SelectionInput::SelectNext);
    let _ = pump(
        &mut selection,
        &mut world,
        SelectionInput::Direction(Direction::Bottom),
    );

    let _ = pump(&mut selection, &mut world, SelectionInput::NewTurn);

    assert_eq!(selection.state(), SelectionState::NoSelection);
    assert!(!selection.can_undo());
    assert_eq!(
        selection.turn_start_positions(),
        &[(red, CellCoord::new(0, 15)), (blue, CellCoord::new(5, 0))]
    );
}

#[test]
fn reset_turn_restores_every_robot() {
    let Fixture {
        mut world,
        mut selection,
        red,
        blue,
    } = fixture();
    let _ = pump(&mut selection, &mut world, SelectionInput::SelectNext);
    let _ = pump(
        &mut selection,
        &mut world,
        SelectionInput::Direction(Direction::Bottom),
    );
    let _ = pump(&mut selection, &mut world, SelectionInput::SelectNext);
    let _ = pump(
        &mut selection,
        &mut world,
        SelectionInput::Direction(Direction::Left),
    );

    let _ = pump(&mut selection, &mut world, SelectionInput::ResetTurn);

    assert_eq!(query::robot_cell(&world, red), Some(CellCoord::new(0, 0)));
    assert_eq!(query::robot_cell(&world, blue), Some(CellCoord::new(5, 0)));
    assert_eq!(selection.state(), SelectionState::NoSelection);
    assert!(!selection.can_undo());
}
