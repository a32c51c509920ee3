use robotrain_core::{
    BotKind, Command, Direction, Event, MovableId, Position, Specialization, TrainState,
};
use robotrain_world::{self as world, query, World};

fn load(grid: &str, bot_count: u32, earned_bots: u32) -> World {
    let text = format!("Rail yard\n{bot_count}\n{earned_bots}\n0\nCoupling drills.\n{grid}");
    World::new(robotrain_level::parse(&text).expect("level parses"))
}

fn send(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tick(world: &mut World) -> Vec<Event> {
    send(world, Command::Tick)
}

fn latch(world: &mut World, row: i32, column: i32) -> Vec<Event> {
    send(
        world,
        Command::Click {
            position: Position::new(row, column),
        },
    )
}

fn click(world: &mut World, row: i32, column: i32) -> Vec<Event> {
    let mut events = latch(world, row, column);
    events.extend(tick(world));
    events
}

fn toggle(world: &mut World, name: &str) -> Vec<Event> {
    let specialization = Specialization::from_name(name).expect("known specialization");
    send(world, Command::ToggleSpecialization { specialization })
}

fn target_of(world: &World, car: MovableId) -> Option<Position> {
    query::movable_view(world)
        .get(car)
        .and_then(|snapshot| snapshot.advance_target)
}

#[test]
fn deployment_spawns_generic_cars_then_the_caboose() {
    let mut world = load("s.....\n", 2, 0);
    assert_eq!(query::train_state(&world), TrainState::NotDeployed);

    let mut events = click(&mut world, 0, 5);
    assert_eq!(query::train_state(&world), TrainState::Deploying);
    for _ in 0..2 {
        events.extend(tick(&mut world));
    }

    let deployed: Vec<(MovableId, BotKind, Position)> = events
        .iter()
        .filter_map(|event| match event {
            Event::CarDeployed {
                car,
                kind,
                position,
            } => Some((*car, *kind, *position)),
            _ => None,
        })
        .collect();
    let start = Position::new(0, 0);
    assert_eq!(
        deployed,
        vec![
            (MovableId::new(0), BotKind::Generic, start),
            (MovableId::new(1), BotKind::Generic, start),
            (MovableId::new(2), BotKind::Caboose, start),
        ]
    );
    assert_eq!(
        query::train_cars(&world),
        vec![MovableId::new(0), MovableId::new(1), MovableId::new(2)]
    );
    assert_eq!(query::train_head(&world), Some(MovableId::new(0)));
    assert_eq!(query::caboose(&world), Some(MovableId::new(2)));
    assert_eq!(query::train_state(&world), TrainState::Moving);

    for _ in 0..3 {
        let _ = tick(&mut world);
    }
    let head = query::movable_view(&world);
    let head = head.get(MovableId::new(0)).expect("head alive");
    assert_eq!(head.position, Position::new(0, 5));
    assert_eq!(head.advance_target, None);
    assert_eq!(query::train_state(&world), TrainState::AwaitingClick);
}

#[test]
fn clicking_the_train_path_sends_the_head_further() {
    let mut world = load("s.....\n", 1, 0);
    let _ = click(&mut world, 0, 2);
    for _ in 0..2 {
        let _ = tick(&mut world);
    }
    assert_eq!(query::train_state(&world), TrainState::AwaitingClick);

    let marks = query::cell_at(&world, Position::new(0, 4))
        .expect("cell")
        .marks();
    assert_eq!(marks.on_train_path(), Some(Direction::Right));

    let events = click(&mut world, 0, 4);
    assert_eq!(
        events.first(),
        Some(&Event::AdvanceOrdered {
            car: MovableId::new(0),
            target: Position::new(0, 4),
        })
    );
    assert_eq!(query::train_state(&world), TrainState::Moving);
}

#[test]
fn launch_detaches_the_head_into_a_specialized_car() {
    let mut world = load("s....\n", 1, 1);
    let _ = click(&mut world, 0, 2);
    for _ in 0..2 {
        let _ = tick(&mut world);
    }
    let head = MovableId::new(0);
    let caboose = MovableId::new(1);

    let _ = toggle(&mut world, "arrow");
    let marks = query::cell_at(&world, Position::new(0, 4))
        .expect("cell")
        .marks();
    assert_eq!(marks.on_launch_path(), Some(Direction::Right));
    assert_eq!(marks.on_train_path(), None);

    let arrow = Specialization::new(BotKind::Arrow);
    let view = query::movable_view(&world);
    assert_eq!(view.get(head).expect("head").appearance, Some(arrow));
    assert_eq!(view.get(caboose).expect("caboose").appearance, None);

    let _ = latch(&mut world, 0, 4);
    assert_eq!(query::train_state(&world), TrainState::Launching);

    let events = tick(&mut world);
    assert_eq!(
        events,
        vec![
            Event::LaunchQueued {
                direction: Direction::Right,
                target: Position::new(0, 4),
            },
            Event::CarLaunched {
                retired: head,
                car: MovableId::new(2),
                kind: BotKind::Arrow,
                direction: Direction::Right,
            },
            Event::SpecializationChanged {
                specialization: None
            },
        ]
    );
    assert_eq!(query::specialization(&world), None);
    assert_eq!(query::train_head(&world), Some(caboose));
    assert_eq!(query::train_cars(&world), vec![caboose]);
    assert_eq!(target_of(&world, MovableId::new(2)), Some(Position::new(0, 4)));
    assert!(query::movable_view(&world).get(head).is_none());
    assert!(query::is_advancing(&world));
}

#[test]
fn launched_car_leaves_from_the_head_position() {
    let mut world = load("s....\n", 1, 0);
    let _ = click(&mut world, 0, 2);
    for _ in 0..2 {
        let _ = tick(&mut world);
    }
    let _ = toggle(&mut world, "generic");
    let _ = click(&mut world, 0, 4);

    let view = query::movable_view(&world);
    let launched = view.get(MovableId::new(2)).expect("launched car");
    assert_eq!(launched.position, Position::new(0, 2));
    assert_eq!(launched.kind, robotrain_core::MovableKind::Bot(BotKind::Generic));

    let _ = tick(&mut world);
    let view = query::movable_view(&world);
    assert_eq!(
        view.get(MovableId::new(2)).expect("launched car").position,
        Position::new(0, 3)
    );
    assert_eq!(
        view.get(MovableId::new(1)).expect("caboose").position,
        Position::new(0, 2)
    );
}

#[test]
fn launching_from_the_caboose_moves_the_caboose_instead() {
    let mut world = load("s....\n", 0, 0);
    let _ = click(&mut world, 0, 2);
    for _ in 0..2 {
        let _ = tick(&mut world);
    }
    let _ = toggle(&mut world, "generic");

    let view = query::movable_view(&world);
    assert_eq!(view.get(MovableId::new(0)).expect("caboose").appearance, None);

    let _ = latch(&mut world, 0, 3);
    assert_eq!(query::train_state(&world), TrainState::AwaitingClick);
    let events = tick(&mut world);

    assert_eq!(
        events,
        vec![
            Event::LaunchQueued {
                direction: Direction::Right,
                target: Position::new(0, 3),
            },
            Event::MovableAdvanced {
                movable: MovableId::new(0),
                from: Position::new(0, 2),
                to: Position::new(0, 3),
            },
            Event::LaunchDiscarded {
                direction: Direction::Right,
            },
            Event::AdvanceHalted {
                car: MovableId::new(0),
                position: Position::new(0, 3),
            },
        ]
    );
    assert_eq!(query::train_head(&world), Some(MovableId::new(0)));
    assert_eq!(
        query::specialization(&world),
        Specialization::from_name("generic")
    );
    assert_eq!(query::train_state(&world), TrainState::AwaitingClick);
}

#[test]
fn dying_head_hands_its_target_to_the_car_behind() {
    let mut world = load("s..6f\n", 2, 0);
    let _ = click(&mut world, 0, 4);
    for _ in 0..2 {
        let _ = tick(&mut world);
    }

    let events = tick(&mut world);

    assert!(events.contains(&Event::TargetHandedOff {
        from: MovableId::new(0),
        to: MovableId::new(1),
        target: Position::new(0, 4),
    }));
    assert_eq!(query::train_head(&world), Some(MovableId::new(1)));
    assert_eq!(target_of(&world, MovableId::new(1)), Some(Position::new(0, 4)));
    assert_eq!(
        query::train_cars(&world),
        vec![MovableId::new(1), MovableId::new(2)]
    );
}

#[test]
fn specialization_catalog_follows_earned_bots() {
    let world = load("s.\n", 0, 4);
    let names: Vec<_> = query::catalog(&world)
        .iter()
        .map(|specialization| specialization.kind().name())
        .collect();
    assert_eq!(
        names,
        vec!["generic", "arrow", "bomb", "bridge", "turn-cw", "turn-ccw"]
    );
}
