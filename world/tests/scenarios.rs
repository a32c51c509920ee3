use robotrain_core::{
    Command, DeathCause, Event, GateColor, MovableId, Outcome, Position, Specialization, TileKind,
    TrainState,
};
use robotrain_world::{self as world, query, World};

fn load(grid: &str, bot_count: u32) -> World {
    let text = format!("Scenario\n{bot_count}\n0\n0\nGet the caboose home.\n{grid}");
    World::new(robotrain_level::parse(&text).expect("level parses"))
}

fn send(world: &mut World, command: Command, log: &mut Vec<Event>) {
    world::apply(world, command, log);
}

fn click(world: &mut World, row: i32, column: i32, log: &mut Vec<Event>) {
    send(
        world,
        Command::Click {
            position: Position::new(row, column),
        },
        log,
    );
    send(world, Command::Tick, log);
}

fn run_until_settled(world: &mut World, log: &mut Vec<Event>) {
    for _ in 0..32 {
        if query::outcome(world).is_some() || !query::is_advancing(world) {
            return;
        }
        send(world, Command::Tick, log);
    }
    panic!("simulation never settled");
}

fn game_over(log: &[Event]) -> Vec<Outcome> {
    log.iter()
        .filter_map(|event| match event {
            Event::GameOver { outcome } => Some(*outcome),
            _ => None,
        })
        .collect()
}

#[test]
fn lone_caboose_reaches_the_finish() {
    let mut world = load("s.f\n", 0);
    let mut log = Vec::new();

    click(&mut world, 0, 2, &mut log);
    run_until_settled(&mut world, &mut log);

    assert_eq!(query::outcome(&world), Some(Outcome::Won));
    assert_eq!(query::train_state(&world), TrainState::Won);
    assert_eq!(game_over(&log), vec![Outcome::Won]);
}

#[test]
fn launching_the_head_lets_the_caboose_finish() {
    let mut world = load("s.f\n", 1);
    let mut log = Vec::new();

    click(&mut world, 0, 2, &mut log);
    run_until_settled(&mut world, &mut log);
    assert_eq!(query::outcome(&world), None);

    let view = query::movable_view(&world);
    assert_eq!(
        view.get(MovableId::new(0)).expect("head").position,
        Position::new(0, 2)
    );
    assert_eq!(
        view.get(MovableId::new(1)).expect("caboose").position,
        Position::new(0, 1)
    );

    let generic = Specialization::from_name("generic").expect("known specialization");
    send(
        &mut world,
        Command::ToggleSpecialization {
            specialization: generic,
        },
        &mut log,
    );
    click(&mut world, 0, 1, &mut log);
    run_until_settled(&mut world, &mut log);

    assert_eq!(query::outcome(&world), Some(Outcome::Won));
    assert_eq!(game_over(&log), vec![Outcome::Won]);
}

#[test]
fn lava_claims_the_whole_train() {
    let mut world = load("s6f\n", 1);
    let mut log = Vec::new();

    click(&mut world, 0, 2, &mut log);
    run_until_settled(&mut world, &mut log);

    let deaths: Vec<(MovableId, DeathCause)> = log
        .iter()
        .filter_map(|event| match event {
            Event::CarDied { car, cause } => Some((*car, *cause)),
            _ => None,
        })
        .collect();
    let lava = DeathCause::Tile(TileKind::Lava);
    assert_eq!(
        deaths,
        vec![(MovableId::new(0), lava), (MovableId::new(1), lava)]
    );
    assert_eq!(query::outcome(&world), Some(Outcome::Lost));
    assert_eq!(query::train_state(&world), TrainState::Lost);
    assert!(query::movable_view(&world).into_vec().is_empty());
}

#[test]
fn switch_opens_the_gate_ahead() {
    let mut world = load("s.rR.f\n", 0);
    let mut log = Vec::new();

    click(&mut world, 0, 5, &mut log);
    run_until_settled(&mut world, &mut log);

    assert!(log.contains(&Event::GatesOpened {
        color: GateColor::Red
    }));
    assert_eq!(query::outcome(&world), Some(Outcome::Won));
}

#[test]
fn closed_gate_stops_the_caboose() {
    let mut world = load("s.Rf\n", 0);
    let mut log = Vec::new();

    click(&mut world, 0, 3, &mut log);
    run_until_settled(&mut world, &mut log);

    assert!(log.contains(&Event::CarDied {
        car: MovableId::new(0),
        cause: DeathCause::Tile(TileKind::Gate),
    }));
    assert_eq!(query::outcome(&world), Some(Outcome::Lost));
}
