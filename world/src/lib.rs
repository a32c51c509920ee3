#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Robotrain.

mod behavior;
mod board;
mod movable;
mod paths;
mod train;

use log::{debug, info};
use robotrain_core::{
    BotKind, Command, Direction, Event, Level, LevelInfo, MovableId, MovableKind, Outcome,
    PathChannel, Position, Specialization, WELCOME_BANNER,
};

pub use board::{Board, Cell, PathMarks};

use movable::Movable;
use train::{Deployment, Train};

/// Direction blocks face when the level places them.
const BLOCK_DIRECTION: Direction = Direction::Down;

/// Represents the authoritative Robotrain world state for one level attempt.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    level: LevelInfo,
    board: Board,
    movables: Vec<Movable>,
    next_movable_id: u32,
    train: Train,
    deployment: Option<Deployment>,
    advancing: bool,
    pending_click: Option<Position>,
    pending_launch: Option<Direction>,
    specialization: Option<Specialization>,
    won: bool,
    lost: bool,
    outcome: Option<Outcome>,
    tick_index: u64,
}

impl World {
    /// Creates a world seeded with the tiles and blocks of the provided level.
    ///
    /// Path highlights are computed immediately so the first click can be
    /// accepted before any tick ran.
    #[must_use]
    pub fn new(level: Level) -> Self {
        let mut board = Board::new();
        for (position, tile) in level.tiles {
            board.place_tile(tile, position);
        }

        let mut world = Self {
            banner: WELCOME_BANNER,
            level: level.info,
            board,
            movables: Vec::new(),
            next_movable_id: 0,
            train: Train::default(),
            deployment: None,
            advancing: false,
            pending_click: None,
            pending_launch: None,
            specialization: None,
            won: false,
            lost: false,
            outcome: None,
            tick_index: 0,
        };
        for position in level.blocks {
            let id = world.allocate_id();
            world.movables.push(Movable::new(
                id,
                MovableKind::Block,
                position,
                BLOCK_DIRECTION,
            ));
        }
        world.highlight_paths();
        world
    }

    fn allocate_id(&mut self) -> MovableId {
        let id = MovableId::new(self.next_movable_id);
        self.next_movable_id = self.next_movable_id.saturating_add(1);
        id
    }

    fn index_of(&self, id: MovableId) -> Option<usize> {
        self.movables.iter().position(|movable| movable.id == id)
    }

    fn movable(&self, id: MovableId) -> Option<&Movable> {
        self.movables.iter().find(|movable| movable.id == id)
    }

    fn target_of(&self, id: MovableId) -> Option<Position> {
        self.movable(id).and_then(|movable| movable.advance_target)
    }

    fn set_target(&mut self, id: MovableId, target: Option<Position>) {
        if let Some(movable) = self.movables.iter_mut().find(|movable| movable.id == id) {
            movable.advance_target = target;
        }
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);

        self.process_click(out_events);

        for movable in &mut self.movables {
            movable.previous_position = movable.position;
        }

        if self.deployment.is_some() && self.advancing {
            self.advance_all(out_events);
            self.sweep_retired();
            self.check_all_collisions(out_events);
            self.sweep_retired();
        }

        self.remove_dying();
        self.resolve_launch(out_events);
        self.resolve_deployment(out_events);
        self.stop_at_targets(out_events);
        self.highlight_paths();
        self.check_game_over(out_events);
    }

    fn process_click(&mut self, out_events: &mut Vec<Event>) {
        let Some(position) = self.pending_click.take() else {
            return;
        };
        let marks = self.board.cell_at(position).map(Cell::marks).unwrap_or_default();

        if let Some(direction) = marks.on_train_path() {
            match (self.deployment.is_some(), self.train.head()) {
                (false, _) => {
                    let cars = self.level.bot_count;
                    self.deployment = Some(Deployment::new(direction, cars));
                    self.train.defer_target(position);
                    self.advancing = true;
                    info!("deploying {cars} cars {direction} toward {position}");
                    out_events.push(Event::DeploymentStarted {
                        direction,
                        target: position,
                        cars,
                    });
                }
                (true, Some(head)) => {
                    self.set_target(head, Some(position));
                    self.advancing = true;
                    out_events.push(Event::AdvanceOrdered {
                        car: head,
                        target: position,
                    });
                }
                (true, None) => out_events.push(Event::ClickIgnored { position }),
            }
            return;
        }

        if let Some(direction) = marks.on_launch_path() {
            match self.train.head() {
                Some(head) => {
                    self.pending_launch = Some(direction);
                    self.set_target(head, Some(position));
                    // A caboose never detaches, so it sets off toward the
                    // target itself and the launch is discarded.
                    if self.train.is_caboose(head) {
                        self.advancing = true;
                    }
                    out_events.push(Event::LaunchQueued {
                        direction,
                        target: position,
                    });
                }
                None => out_events.push(Event::ClickIgnored { position }),
            }
            return;
        }

        out_events.push(Event::ClickIgnored { position });
    }

    fn remove_dying(&mut self) {
        let dying: Vec<MovableId> = self
            .movables
            .iter()
            .filter(|movable| movable.dying)
            .map(|movable| movable.id)
            .collect();
        for id in dying {
            if self.train.head() == Some(id) {
                if let Some(next) = self.train.behind(id) {
                    debug!("car {} takes over as train head", next.get());
                }
            }
            let _ = self.train.uncouple(id);
        }
        self.movables.retain(|movable| !movable.dying);
    }

    fn resolve_launch(&mut self, out_events: &mut Vec<Event>) {
        let Some(direction) = self.pending_launch.take() else {
            return;
        };
        let head = match self.train.head() {
            Some(head) if !self.train.is_caboose(head) => head,
            _ => {
                out_events.push(Event::LaunchDiscarded { direction });
                return;
            }
        };
        let Some(index) = self.index_of(head) else {
            out_events.push(Event::LaunchDiscarded { direction });
            return;
        };

        let _ = self.train.detach_head();
        let retired = self.movables.remove(index);
        let kind = self
            .specialization
            .take()
            .map_or(BotKind::Generic, |specialization| specialization.kind());

        let id = self.allocate_id();
        let mut launched = Movable::new(id, MovableKind::Bot(kind), retired.position, direction);
        launched.advance_target = retired.advance_target;
        match launched.advance_target {
            Some(target) => debug!("{kind} launched {direction}, advancing toward {target}"),
            None => debug!("{kind} launched {direction} without a target"),
        }
        self.movables.push(launched);
        self.advancing = true;

        out_events.push(Event::CarLaunched {
            retired: head,
            car: id,
            kind,
            direction,
        });
        out_events.push(Event::SpecializationChanged {
            specialization: None,
        });
    }

    fn resolve_deployment(&mut self, out_events: &mut Vec<Event>) {
        if !self.advancing {
            return;
        }
        let Some((direction, remaining)) = self
            .deployment
            .as_mut()
            .and_then(Deployment::next_car)
        else {
            return;
        };

        let kind = if remaining == 0 {
            BotKind::Caboose
        } else {
            BotKind::Generic
        };
        let id = self.allocate_id();
        let position = self.level.start;
        self.movables
            .push(Movable::new(id, MovableKind::Bot(kind), position, direction));
        out_events.push(Event::CarDeployed {
            car: id,
            kind,
            position,
        });

        if self.train.couple(id) {
            if let Some(target) = self.train.take_deferred_target() {
                self.set_target(id, Some(target));
                out_events.push(Event::AdvanceOrdered { car: id, target });
            }
        }
        if kind == BotKind::Caboose {
            self.train.mark_caboose(id);
        }
    }

    fn stop_at_targets(&mut self, out_events: &mut Vec<Event>) {
        if !self.advancing {
            return;
        }
        for movable in &mut self.movables {
            if movable.advance_target == Some(movable.position) {
                self.advancing = false;
                movable.advance_target = None;
                out_events.push(Event::AdvanceHalted {
                    car: movable.id,
                    position: movable.position,
                });
            }
        }
    }

    fn highlight_paths(&mut self) {
        self.board.clear_marks();
        if self.deployment.is_none() {
            paths::flood(&mut self.board, self.level.start, PathChannel::Train);
            return;
        }
        let Some(head) = self.train.head().and_then(|head| self.movable(head)) else {
            return;
        };
        let (position, direction) = (head.position, head.direction);
        if self.specialization.is_some() {
            paths::flood(&mut self.board, position, PathChannel::Launch);
        } else {
            paths::follow(&mut self.board, position.step(direction), direction);
        }
    }

    fn check_game_over(&mut self, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }
        let outcome = if self.won {
            Outcome::Won
        } else if self.lost {
            Outcome::Lost
        } else {
            return;
        };
        info!("level attempt finished: {outcome:?}");
        self.outcome = Some(outcome);
        out_events.push(Event::GameOver { outcome });
    }

    fn toggle_specialization(
        &mut self,
        specialization: Specialization,
        out_events: &mut Vec<Event>,
    ) {
        if !Specialization::catalog(self.level.earned_bots).contains(&specialization) {
            out_events.push(Event::SpecializationRejected { specialization });
            return;
        }
        self.specialization = if self.specialization == Some(specialization) {
            None
        } else {
            Some(specialization)
        };
        self.highlight_paths();
        out_events.push(Event::SpecializationChanged {
            specialization: self.specialization,
        });
    }

    fn sweep_retired(&mut self) {
        let retired: Vec<MovableId> = self
            .movables
            .iter()
            .filter(|movable| movable.retired)
            .map(|movable| movable.id)
            .collect();
        for id in retired {
            let _ = self.train.uncouple(id);
        }
        self.movables.retain(|movable| !movable.retired);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the attempt has an outcome every command is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_some() {
        return;
    }
    match command {
        Command::Click { position } => world.pending_click = Some(position),
        Command::ToggleSpecialization { specialization } => {
            world.toggle_specialization(specialization, out_events);
        }
        Command::Tick => world.tick(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use robotrain_core::{
        Direction, LevelInfo, MovableId, MovableKind, Outcome, Position, Specialization,
        TrainState,
    };

    use super::{Board, Cell, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Metadata of the level being played.
    #[must_use]
    pub fn level_info(world: &World) -> &LevelInfo {
        &world.level
    }

    /// Provides read-only access to the board.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Returns the cell at the provided position, if any.
    #[must_use]
    pub fn cell_at(world: &World, position: Position) -> Option<&Cell> {
        world.board.cell_at(position)
    }

    /// Terminal result of the attempt, once decided.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Coarse phase of the train and deployment state machine.
    #[must_use]
    pub fn train_state(world: &World) -> TrainState {
        match world.outcome {
            Some(Outcome::Won) => return TrainState::Won,
            Some(Outcome::Lost) => return TrainState::Lost,
            None => {}
        }
        let Some(deployment) = world.deployment else {
            return TrainState::NotDeployed;
        };
        if launch_latched(world) {
            TrainState::Launching
        } else if !world.advancing {
            TrainState::AwaitingClick
        } else if deployment.is_spawning() {
            TrainState::Deploying
        } else {
            TrainState::Moving
        }
    }

    /// A latched click on a launch highlight launches on the next tick unless
    /// the caboose leads the train.
    fn launch_latched(world: &World) -> bool {
        let on_launch_path = world
            .pending_click
            .and_then(|position| world.board.cell_at(position))
            .map_or(false, |cell| cell.marks().on_launch_path().is_some());
        let head_can_launch = world
            .train
            .head()
            .map_or(false, |head| !world.train.is_caboose(head));
        on_launch_path && head_can_launch
    }

    /// Specialization applied to the next launch, if any.
    #[must_use]
    pub fn specialization(world: &World) -> Option<Specialization> {
        world.specialization
    }

    /// Specializations the player may pick on this level.
    #[must_use]
    pub fn catalog(world: &World) -> Vec<Specialization> {
        Specialization::catalog(world.level.earned_bots)
    }

    /// Front car of the train, if any car is coupled.
    #[must_use]
    pub fn train_head(world: &World) -> Option<MovableId> {
        world.train.head()
    }

    /// Coupled cars, head first.
    #[must_use]
    pub fn train_cars(world: &World) -> Vec<MovableId> {
        world.train.cars().collect()
    }

    /// Last car of the train once it has been deployed.
    #[must_use]
    pub fn caboose(world: &World) -> Option<MovableId> {
        world.train.caboose()
    }

    /// Reports whether movables advance on the next tick.
    #[must_use]
    pub fn is_advancing(world: &World) -> bool {
        world.advancing
    }

    /// Number of logic ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only view of every movable on the board.
    #[must_use]
    pub fn movable_view(world: &World) -> MovableView {
        let appearance_holder = world
            .train
            .head()
            .filter(|head| !world.train.is_caboose(*head));
        let mut snapshots: Vec<MovableSnapshot> = world
            .movables
            .iter()
            .map(|movable| MovableSnapshot {
                id: movable.id,
                kind: movable.kind,
                position: movable.position,
                previous_position: movable.previous_position,
                direction: movable.direction,
                dying: movable.dying,
                advance_target: movable.advance_target,
                appearance: if appearance_holder == Some(movable.id) {
                    world.specialization
                } else {
                    None
                },
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        MovableView { snapshots }
    }

    /// Read-only snapshot describing all movables on the board.
    #[derive(Clone, Debug)]
    pub struct MovableView {
        snapshots: Vec<MovableSnapshot>,
    }

    impl MovableView {
        /// Iterator over the captured snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &MovableSnapshot> {
            self.snapshots.iter()
        }

        /// Returns the snapshot of the provided movable, if it still exists.
        #[must_use]
        pub fn get(&self, id: MovableId) -> Option<&MovableSnapshot> {
            self.snapshots.iter().find(|snapshot| snapshot.id == id)
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<MovableSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single movable used for queries.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct MovableSnapshot {
        /// Unique identifier assigned to the movable.
        pub id: MovableId,
        /// Bot behaviour or block.
        pub kind: MovableKind,
        /// Cell currently occupied.
        pub position: Position,
        /// Cell occupied at the start of the last tick.
        pub previous_position: Position,
        /// Direction of travel.
        pub direction: Direction,
        /// Whether the movable is about to be removed.
        pub dying: bool,
        /// Cell the movable stops the train at, if any.
        pub advance_target: Option<Position>,
        /// Specialization a generic head car is presented as.
        pub appearance: Option<Specialization>,
    }
}
